pub mod tatum_client; // ✅ 生产级: Tatum v3 REST 客户端
pub mod toolkit;
pub mod wallet_gateway;

pub use tatum_client::TatumToolkit;
pub use toolkit::{Toolkit, ToolkitError, ToolkitResult, WalletRecord, WalletToolkit};
pub use wallet_gateway::WalletGateway;
