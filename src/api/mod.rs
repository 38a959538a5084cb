use std::{sync::Arc, time::Instant};

use axum::{
    extract::{DefaultBodyLimit, MatchedPath, Request},
    http::{
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, CONTENT_TYPE, PRAGMA, REFERRER_POLICY,
            X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
        },
        HeaderName, HeaderValue, Method,
    },
    middleware::{from_fn, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::Level;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::{
    api::middleware::{trace_id::TRACE_ID_HEADER, trace_id_middleware, TraceId},
    app_state::AppState,
};

pub mod extract;
pub mod middleware;
pub mod response;
pub mod system_api;
pub mod wallet_api;

#[derive(OpenApi)]
#[openapi(
    paths(
        wallet_api::generate_wallet,
        wallet_api::address_by_xpub,
        wallet_api::create_subscription,
        wallet_api::remove_subscription,
        wallet_api::mnemonic_private_key,
        wallet_api::exchange_rate,
        wallet_api::blockchain_choices,
        system_api::healthz,
    ),
    components(
        schemas(
            crate::domain::Blockchain,
            crate::domain::GenerateWalletRequest,
            crate::domain::AddressByXpubRequest,
            crate::domain::CreateSubscriptionRequest,
            crate::domain::RemoveSubscriptionRequest,
            crate::domain::MnemonicPrivateKeyRequest,
            crate::domain::ExchangeRateRequest,
            response::WalletDataResponse,
            response::AddressResponse,
            response::SubscriptionDataResponse,
            response::SubscriptionRemovedResponse,
            response::PrivateKeyResponse,
            response::ExchangeRateResponse,
            response::BlockchainChoicesResponse,
            system_api::HealthResponse,
            crate::infrastructure::validation::FieldErrors,
            crate::error_body::ErrorBodyDoc
        )
    ),
    tags(
        (name = "wallets", description = "Wallet generation and key derivation"),
        (name = "subscriptions", description = "Address activity subscriptions"),
        (name = "rates", description = "Crypto/fiat exchange rates"),
        (name = "system", description = "Health and diagnostics")
    )
)]
pub struct ApiDoc;

pub fn routes(state: Arc<AppState>) -> Router {
    let server = &state.config.server;
    let body_limit = server.body_limit_bytes;
    let cors = cors_layer(&server.cors_allow_origins);

    Router::new()
        // 钱包操作
        .route("/wallet", post(wallet_api::generate_wallet))
        .route("/address-by-xpub", post(wallet_api::address_by_xpub))
        .route(
            "/subscription",
            post(wallet_api::create_subscription).delete(wallet_api::remove_subscription),
        )
        .route(
            "/mnemonic-private-key",
            post(wallet_api::mnemonic_private_key),
        )
        .route("/exchange-rate", post(wallet_api::exchange_rate))
        .route("/blockchain-choices", get(wallet_api::blockchain_choices))
        // 运维
        .route("/healthz", get(system_api::healthz))
        .route("/metrics", get(system_api::metrics))
        // 只统计已匹配的路由，避免任意路径撑大指标表
        .route_layer(from_fn(count_endpoint))
        .merge(utoipa_swagger_ui::SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(set_request_id))
                .layer(from_fn(trace_id_middleware))
                .layer(from_fn(trace_log))
                .layer(from_fn(add_response_time_header))
                .layer(from_fn(add_security_headers)),
        )
        .layer(cors)
        .with_state(state)
}

/// `*` 允许任意来源，否则按逗号分隔的列表匹配
fn cors_layer(allow_origins: &str) -> CorsLayer {
    let origins = allow_origins.trim();
    let allow_origin = if origins.is_empty() || origins == "*" {
        AllowOrigin::from(Any)
    } else {
        let list: Vec<HeaderValue> = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!("⚠️ Ignoring invalid CORS origin: {}", o);
                    None
                }
            })
            .collect();
        AllowOrigin::list(list)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(TRACE_ID_HEADER)])
        .expose_headers([
            HeaderName::from_static(TRACE_ID_HEADER),
            HeaderName::from_static("x-request-id"),
        ])
}

async fn add_security_headers(req: Request, next: Next) -> Response {
    let mut resp = next.run(req).await;
    let headers = resp.headers_mut();

    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    // 响应可能包含助记词或私钥，禁止任何缓存
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    if !headers.contains_key(CONTENT_SECURITY_POLICY) {
        headers.insert(
            CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'self'"),
        );
    }
    resp
}

async fn set_request_id(mut req: Request, next: Next) -> Response {
    let req_id = Uuid::new_v4().to_string();
    let value = HeaderValue::from_str(&req_id).unwrap_or(HeaderValue::from_static("gen-failed"));

    req.headers_mut().insert("x-request-id", value.clone());
    let mut resp = next.run(req).await;
    resp.headers_mut().insert("x-request-id", value);
    resp
}

async fn add_response_time_header(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let mut resp = next.run(req).await;
    let elapsed_ms = start.elapsed().as_millis();
    resp.headers_mut().insert(
        "x-response-time",
        HeaderValue::from_str(&format!("{}ms", elapsed_ms))
            .unwrap_or(HeaderValue::from_static("0ms")),
    );
    resp
}

async fn trace_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();
    let req_id = req
        .headers()
        .get("x-request-id")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-")
        .to_string();
    // 外层 trace_id_middleware 已写入请求扩展
    let trace_id = req
        .extensions()
        .get::<TraceId>()
        .map(|t| t.0.clone())
        .unwrap_or_else(|| "-".to_string());
    let resp = next.run(req).await;
    let status = resp.status();
    let elapsed = start.elapsed().as_millis();
    tracing::event!(Level::INFO, request_id=%req_id, trace_id=%trace_id, method=%method, path=%path, status=%status.as_u16(), elapsed_ms=%elapsed, "http_request");
    resp
}

async fn count_endpoint(req: Request, next: Next) -> Response {
    let endpoint = format!(
        "{} {}",
        req.method(),
        req.extensions()
            .get::<MatchedPath>()
            .map(MatchedPath::as_str)
            .unwrap_or_else(|| req.uri().path())
    );
    let resp = next.run(req).await;
    if resp.status().is_client_error() || resp.status().is_server_error() {
        crate::metrics::count_err(&endpoint);
    } else {
        crate::metrics::count_ok(&endpoint);
    }
    resp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_operation() {
        let doc = ApiDoc::openapi();
        for path in [
            "/wallet",
            "/address-by-xpub",
            "/subscription",
            "/mnemonic-private-key",
            "/exchange-rate",
            "/blockchain-choices",
            "/healthz",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_cors_layer_accepts_lists() {
        // 无效来源只会被忽略
        let _ = cors_layer("*");
        let _ = cors_layer("https://a.example, https://b.example");
        let _ = cors_layer("bad\nvalue");
    }
}
