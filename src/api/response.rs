//! 响应信封
//!
//! 每个操作把结果放在固定的键下：
//! `wallet_data` / `address` / `subscription_data` / `data` /
//! `private_key` / `exchange_rate` / `blockchain_choices`

use axum::{http::StatusCode, Json};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::service::toolkit::WalletRecord;

#[derive(Debug, Serialize, ToSchema)]
pub struct WalletDataResponse {
    /// 工具返回的钱包字段，附带 `blockchain_name`
    #[schema(value_type = Object)]
    pub wallet_data: WalletRecord,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddressResponse {
    pub address: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriptionDataResponse {
    #[schema(value_type = Object)]
    pub subscription_data: Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriptionRemovedResponse {
    #[schema(value_type = Object)]
    pub data: Value,
}

#[derive(Serialize, ToSchema)]
pub struct PrivateKeyResponse {
    pub private_key: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExchangeRateResponse {
    pub exchange_rate: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BlockchainChoicesResponse {
    #[schema(value_type = Vec<String>, example = json!(["bitcoin", "ethereum"]))]
    pub blockchain_choices: Vec<&'static str>,
}

/// 创建类操作：201
pub fn created<T: Serialize>(body: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(body))
}

/// 读取/删除类操作：200
pub fn ok<T: Serialize>(body: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(body))
}
