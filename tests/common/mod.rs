//! 测试辅助模块
//! 内存版钱包工具与路由构建

#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, Response},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt as _;
use walletgate::{
    api,
    app_state::AppState,
    config::{Config, LoggingConfig, MonitoringConfig, ServerConfig, ToolkitConfig},
    domain::Blockchain,
    service::{
        toolkit::{
            AddressDeriver, ExchangeRateProvider, PrivateKeyDeriver, SubscriptionManager,
            WalletGenerator,
        },
        Toolkit, ToolkitError, ToolkitResult, WalletGateway, WalletRecord,
    },
};

pub const KNOWN_SUBSCRIPTION: &str = "sub-123";
pub const TEST_XPUB: &str = "xpub6EsCk1uU6cJzqvP9CdsTiJwT2rF748YkPnhv5Qo8q44DG7nn2vbyt48YRsNSUYS44jFCW9gwvD9kLQu9AuqXpTpM1c5hgg9PsuBLdeNncid";

/// 工具行为
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// 每次调用都返回不可恢复的上游错误
    Failing,
    /// 每次调用都超过网关超时
    Slow,
}

/// 内存版钱包工具：记录调用次数与最近一次参数
pub struct MockToolkit {
    mode: Mode,
    calls: AtomicUsize,
    last_args: Mutex<Vec<String>>,
}

impl MockToolkit {
    pub fn new(mode: Mode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            calls: AtomicUsize::new(0),
            last_args: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_args(&self) -> Vec<String> {
        self.last_args.lock().unwrap().clone()
    }

    async fn enter(&self, args: &[&str]) -> ToolkitResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_args.lock().unwrap() = args.iter().map(|s| s.to_string()).collect();
        match self.mode {
            Mode::Normal => Ok(()),
            Mode::Failing => Err(ToolkitError::Transport(
                "connection refused by 10.0.0.7:443".into(),
            )),
            Mode::Slow => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            }
        }
    }
}

/// 与地址派生保持一致的确定性地址
pub fn derived_address(blockchain_name: &str, xpub: &str, index: u32) -> String {
    let tail: String = xpub.chars().rev().take(8).collect();
    format!("{}:{}:{}", blockchain_name.to_lowercase(), tail, index)
}

#[async_trait]
impl WalletGenerator for MockToolkit {
    async fn generate_wallet(&self, blockchain_name: &str) -> ToolkitResult<WalletRecord> {
        self.enter(&[blockchain_name]).await?;
        let record = json!({
            "mnemonic": "urge pulp usage sister evidence arrest palm math please chief egg abuse",
            "xpub": TEST_XPUB,
        });
        Ok(record.as_object().cloned().unwrap_or_default())
    }
}

#[async_trait]
impl AddressDeriver for MockToolkit {
    async fn address_by_xpub(
        &self,
        blockchain_name: &str,
        xpub: &str,
        index: u32,
    ) -> ToolkitResult<String> {
        self.enter(&[blockchain_name, xpub, &index.to_string()]).await?;
        Ok(derived_address(blockchain_name, xpub, index))
    }
}

#[async_trait]
impl SubscriptionManager for MockToolkit {
    async fn create_subscription(
        &self,
        address: &str,
        chain: Blockchain,
        subscription_type: &str,
    ) -> ToolkitResult<Value> {
        self.enter(&[address, chain.code(), subscription_type]).await?;
        Ok(json!({ "id": KNOWN_SUBSCRIPTION }))
    }

    async fn remove_subscription(&self, subscription_id: &str) -> ToolkitResult<Value> {
        self.enter(&[subscription_id]).await?;
        if subscription_id == KNOWN_SUBSCRIPTION {
            Ok(json!({ "subscription_id": subscription_id, "removed": true }))
        } else {
            Err(ToolkitError::Rejected {
                status: 404,
                body: json!({
                    "statusCode": 404,
                    "errorCode": "subscription.not.found",
                    "message": "Subscription not found."
                }),
            })
        }
    }
}

#[async_trait]
impl PrivateKeyDeriver for MockToolkit {
    async fn private_key_by_mnemonic(&self, mnemonic: &str, index: u32) -> ToolkitResult<String> {
        let words = mnemonic.split(' ').count().to_string();
        self.enter(&[&words, &index.to_string()]).await?;
        Ok(format!("0x{:064x}", index))
    }
}

#[async_trait]
impl ExchangeRateProvider for MockToolkit {
    async fn exchange_rate(&self, crypto_symbol: &str, fiat_symbol: &str) -> ToolkitResult<f64> {
        self.enter(&[crypto_symbol, fiat_symbol]).await?;
        Ok(43250.5)
    }
}

pub fn test_config(enable_metrics: bool) -> Config {
    Config {
        server: ServerConfig {
            bind_addr: "127.0.0.1:0".into(),
            cors_allow_origins: "*".into(),
            body_limit_bytes: 16 * 1024,
        },
        logging: LoggingConfig {
            level: "debug".into(),
            format: "text".into(),
            enable_file_logging: false,
            log_file_path: None,
        },
        monitoring: MonitoringConfig { enable_metrics },
        toolkit: ToolkitConfig {
            base_url: "http://127.0.0.1:1".into(),
            api_key: "test-key".into(),
            timeout_secs: 5,
            webhook_url: None,
            mnemonic_chain: "ethereum".into(),
        },
    }
}

/// 构建使用内存工具的完整路由
pub fn build_app(mock: Arc<MockToolkit>, timeout: Duration) -> Router {
    build_app_with_config(mock, timeout, test_config(true))
}

pub fn build_app_with_config(mock: Arc<MockToolkit>, timeout: Duration, config: Config) -> Router {
    let gateway = Arc::new(WalletGateway::new(Toolkit::from_single(mock), timeout));
    api::routes(Arc::new(AppState::new(gateway, Arc::new(config))))
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn send_raw(app: &Router, method: Method, uri: &str, raw: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(raw.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
