//! 外部钱包工具接口
//!
//! 网关只依赖这些窄接口；生产实现见 `tatum_client`，测试中可替换为内存替身。

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::Blockchain;

/// 钱包生成结果：工具返回的不透明字段
pub type WalletRecord = Map<String, Value>;

pub type ToolkitResult<T> = Result<T, ToolkitError>;

#[derive(Debug, thiserror::Error)]
pub enum ToolkitError {
    /// 工具以 4xx 拒绝请求（如订阅不存在），状态与响应体原样透传
    #[error("toolkit rejected request with status {status}")]
    Rejected { status: u16, body: Value },
    #[error("toolkit upstream error: {0}")]
    Upstream(String),
    #[error("toolkit transport error: {0}")]
    Transport(String),
    #[error("unexpected toolkit response: {0}")]
    Decode(String),
    #[error("toolkit call timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait WalletGenerator: Send + Sync {
    async fn generate_wallet(&self, blockchain_name: &str) -> ToolkitResult<WalletRecord>;
}

#[async_trait]
pub trait AddressDeriver: Send + Sync {
    async fn address_by_xpub(
        &self,
        blockchain_name: &str,
        xpub: &str,
        index: u32,
    ) -> ToolkitResult<String>;
}

#[async_trait]
pub trait SubscriptionManager: Send + Sync {
    async fn create_subscription(
        &self,
        address: &str,
        chain: Blockchain,
        subscription_type: &str,
    ) -> ToolkitResult<Value>;

    async fn remove_subscription(&self, subscription_id: &str) -> ToolkitResult<Value>;
}

#[async_trait]
pub trait PrivateKeyDeriver: Send + Sync {
    async fn private_key_by_mnemonic(&self, mnemonic: &str, index: u32) -> ToolkitResult<String>;
}

#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    async fn exchange_rate(&self, crypto_symbol: &str, fiat_symbol: &str) -> ToolkitResult<f64>;
}

/// 同时实现全部能力的工具
pub trait WalletToolkit:
    WalletGenerator + AddressDeriver + SubscriptionManager + PrivateKeyDeriver + ExchangeRateProvider
{
}

impl<T> WalletToolkit for T where
    T: WalletGenerator
        + AddressDeriver
        + SubscriptionManager
        + PrivateKeyDeriver
        + ExchangeRateProvider
{
}

/// 网关持有的各项能力句柄
#[derive(Clone)]
pub struct Toolkit {
    pub wallets: Arc<dyn WalletGenerator>,
    pub addresses: Arc<dyn AddressDeriver>,
    pub subscriptions: Arc<dyn SubscriptionManager>,
    pub keys: Arc<dyn PrivateKeyDeriver>,
    pub rates: Arc<dyn ExchangeRateProvider>,
}

impl Toolkit {
    /// 用同一个实现提供全部能力
    pub fn from_single<T>(toolkit: Arc<T>) -> Self
    where
        T: WalletToolkit + 'static,
    {
        Self {
            wallets: toolkit.clone(),
            addresses: toolkit.clone(),
            subscriptions: toolkit.clone(),
            keys: toolkit.clone(),
            rates: toolkit,
        }
    }
}
