//! WalletGate - 多链钱包操作网关
//!
//! 网关只做输入验证与结果封装，钱包生成、地址/私钥派生、
//! 订阅与汇率全部委托给外部钱包工具，本身不保存任何状态

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod error_body;
pub mod infrastructure;
pub mod metrics;
pub mod service;

// 重新导出常用类型
pub use app_state::AppState;
pub use error::{AppError, AppErrorCode, GatewayError};

