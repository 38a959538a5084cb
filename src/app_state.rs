use std::sync::Arc;

use crate::{config::Config, service::wallet_gateway::WalletGateway};

/// 应用状态
/// 请求之间只共享只读资源
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<WalletGateway>,
    pub config: Arc<Config>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(gateway: Arc<WalletGateway>, config: Arc<Config>) -> Self {
        Self { gateway, config }
    }
}
