//! 钱包操作 API
//!
//! 每个处理器：验证请求体 → 一次工具调用 → 信封响应

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};

use crate::{
    api::{
        extract::ValidatedJson,
        middleware::TraceId,
        response::{
            created, ok, AddressResponse, BlockchainChoicesResponse, ExchangeRateResponse,
            PrivateKeyResponse, SubscriptionDataResponse, SubscriptionRemovedResponse,
            WalletDataResponse,
        },
    },
    app_state::AppState,
    domain::{
        AddressByXpubRequest, Blockchain, CreateSubscriptionRequest, ExchangeRateRequest,
        GenerateWalletRequest, MnemonicPrivateKeyRequest, RemoveSubscriptionRequest,
    },
    error::GatewayError,
    service::ToolkitError,
};

type Trace = Option<Extension<TraceId>>;

/// 工具错误 → 对外错误，附带 trace_id
fn map_toolkit(trace: &Trace) -> impl FnOnce(ToolkitError) -> GatewayError + '_ {
    move |err| GatewayError::from_toolkit(err, trace.as_ref().map(|Extension(id)| id.as_str()))
}

/// POST /wallet
///
/// 为指定链生成钱包
#[utoipa::path(
    post,
    path = "/wallet",
    tag = "wallets",
    request_body = GenerateWalletRequest,
    responses(
        (status = 201, description = "Wallet generated", body = WalletDataResponse),
        (status = 400, description = "Bad request", body = crate::infrastructure::validation::FieldErrors),
        (status = 500, description = "Internal Server Error", body = crate::error_body::ErrorBodyDoc)
    )
)]
pub async fn generate_wallet(
    State(state): State<Arc<AppState>>,
    trace: Trace,
    ValidatedJson(req): ValidatedJson<GenerateWalletRequest>,
) -> Result<(StatusCode, Json<WalletDataResponse>), GatewayError> {
    tracing::info!(blockchain_name = %req.blockchain_name, "Generating wallet");

    let wallet_data = state
        .gateway
        .generate_wallet(&req)
        .await
        .map_err(map_toolkit(&trace))?;

    Ok(created(WalletDataResponse { wallet_data }))
}

/// POST /address-by-xpub
///
/// 由扩展公钥派生指定索引的地址
#[utoipa::path(
    post,
    path = "/address-by-xpub",
    tag = "wallets",
    request_body = AddressByXpubRequest,
    responses(
        (status = 200, description = "Address derived", body = AddressResponse),
        (status = 400, description = "Bad request", body = crate::infrastructure::validation::FieldErrors),
        (status = 500, description = "Internal Server Error", body = crate::error_body::ErrorBodyDoc)
    )
)]
pub async fn address_by_xpub(
    State(state): State<Arc<AppState>>,
    trace: Trace,
    ValidatedJson(req): ValidatedJson<AddressByXpubRequest>,
) -> Result<(StatusCode, Json<AddressResponse>), GatewayError> {
    tracing::info!(
        blockchain_name = %req.blockchain_name,
        index = req.index,
        "Deriving address from xpub"
    );

    let address = state
        .gateway
        .address_by_xpub(&req)
        .await
        .map_err(map_toolkit(&trace))?;

    Ok(ok(AddressResponse { address }))
}

/// POST /subscription
#[utoipa::path(
    post,
    path = "/subscription",
    tag = "subscriptions",
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 201, description = "Subscription created", body = SubscriptionDataResponse),
        (status = 400, description = "Bad request", body = crate::infrastructure::validation::FieldErrors),
        (status = 500, description = "Internal Server Error", body = crate::error_body::ErrorBodyDoc)
    )
)]
pub async fn create_subscription(
    State(state): State<Arc<AppState>>,
    trace: Trace,
    ValidatedJson(req): ValidatedJson<CreateSubscriptionRequest>,
) -> Result<(StatusCode, Json<SubscriptionDataResponse>), GatewayError> {
    tracing::info!(
        chain = %req.chain,
        subscription_type = %req.subscription_type,
        "Creating subscription"
    );

    let subscription_data = state
        .gateway
        .create_subscription(&req)
        .await
        .map_err(map_toolkit(&trace))?;

    Ok(created(SubscriptionDataResponse { subscription_data }))
}

/// DELETE /subscription
///
/// 未知 id 时返回工具自身的状态码与响应体
#[utoipa::path(
    delete,
    path = "/subscription",
    tag = "subscriptions",
    request_body = RemoveSubscriptionRequest,
    responses(
        (status = 200, description = "Subscription removed", body = SubscriptionRemovedResponse),
        (status = 400, description = "Bad request", body = crate::infrastructure::validation::FieldErrors),
        (status = 500, description = "Internal Server Error", body = crate::error_body::ErrorBodyDoc)
    )
)]
pub async fn remove_subscription(
    State(state): State<Arc<AppState>>,
    trace: Trace,
    ValidatedJson(req): ValidatedJson<RemoveSubscriptionRequest>,
) -> Result<(StatusCode, Json<SubscriptionRemovedResponse>), GatewayError> {
    tracing::info!(subscription_id = %req.subscription_id, "Removing subscription");

    let data = state
        .gateway
        .remove_subscription(&req)
        .await
        .map_err(map_toolkit(&trace))?;

    Ok(ok(SubscriptionRemovedResponse { data }))
}

/// POST /mnemonic-private-key
///
/// 助记词与私钥都不写日志
#[utoipa::path(
    post,
    path = "/mnemonic-private-key",
    tag = "wallets",
    request_body = MnemonicPrivateKeyRequest,
    responses(
        (status = 200, description = "Private key derived", body = PrivateKeyResponse),
        (status = 400, description = "Bad request", body = crate::infrastructure::validation::FieldErrors),
        (status = 500, description = "Internal Server Error", body = crate::error_body::ErrorBodyDoc)
    )
)]
pub async fn mnemonic_private_key(
    State(state): State<Arc<AppState>>,
    trace: Trace,
    ValidatedJson(req): ValidatedJson<MnemonicPrivateKeyRequest>,
) -> Result<(StatusCode, Json<PrivateKeyResponse>), GatewayError> {
    tracing::info!(
        words = req.word_count(),
        index = req.index,
        "Deriving private key from mnemonic"
    );

    let private_key = state
        .gateway
        .private_key_by_mnemonic(&req)
        .await
        .map_err(map_toolkit(&trace))?;

    Ok(ok(PrivateKeyResponse { private_key }))
}

/// POST /exchange-rate
#[utoipa::path(
    post,
    path = "/exchange-rate",
    tag = "rates",
    request_body = ExchangeRateRequest,
    responses(
        (status = 200, description = "Exchange rate", body = ExchangeRateResponse),
        (status = 400, description = "Bad request", body = crate::infrastructure::validation::FieldErrors),
        (status = 500, description = "Internal Server Error", body = crate::error_body::ErrorBodyDoc)
    )
)]
pub async fn exchange_rate(
    State(state): State<Arc<AppState>>,
    trace: Trace,
    ValidatedJson(req): ValidatedJson<ExchangeRateRequest>,
) -> Result<(StatusCode, Json<ExchangeRateResponse>), GatewayError> {
    tracing::info!(
        crypto_symbol = %req.crypto_symbol,
        fiat_symbol = %req.fiat_symbol,
        "Fetching exchange rate"
    );

    let exchange_rate = state
        .gateway
        .exchange_rate(&req)
        .await
        .map_err(map_toolkit(&trace))?;

    Ok(ok(ExchangeRateResponse { exchange_rate }))
}

/// GET /blockchain-choices
#[utoipa::path(
    get,
    path = "/blockchain-choices",
    tag = "wallets",
    responses(
        (status = 200, description = "Supported blockchains", body = BlockchainChoicesResponse)
    )
)]
pub async fn blockchain_choices() -> Json<BlockchainChoicesResponse> {
    Json(BlockchainChoicesResponse {
        blockchain_choices: Blockchain::choices(),
    })
}
