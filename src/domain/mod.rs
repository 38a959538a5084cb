//! Domain 模块
//!
//! 链枚举与各操作的请求模型

pub mod blockchain;
pub mod requests;

// 重新导出常用类型
pub use blockchain::{Blockchain, UnknownBlockchain};
pub use requests::{
    AddressByXpubRequest, CreateSubscriptionRequest, ExchangeRateRequest, GenerateWalletRequest,
    MnemonicPrivateKeyRequest, RemoveSubscriptionRequest,
};
