//! Tatum API客户端
//!
//! 钱包生成、地址派生、私钥派生、订阅管理与汇率查询全部委托给 Tatum v3 REST 接口，
//! 网关本身不做任何密钥运算。
//!
//! API文档: https://apidoc.tatum.io/

use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Method, Url};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    config::ToolkitConfig,
    domain::Blockchain,
    service::toolkit::{
        AddressDeriver, ExchangeRateProvider, PrivateKeyDeriver, SubscriptionManager,
        ToolkitError, ToolkitResult, WalletGenerator, WalletRecord,
    },
};

/// Tatum客户端配置
pub struct TatumToolkit {
    base_url: Url,
    api_key: String,
    webhook_url: Option<String>,
    mnemonic_chain: String,
    client: reqwest::Client,
}

/// 私钥派生请求体
#[derive(Serialize)]
struct PrivateKeyBody<'a> {
    mnemonic: &'a str,
    index: u32,
}

/// 订阅创建请求体
#[derive(Serialize)]
struct SubscriptionBody<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    attr: SubscriptionAttr<'a>,
}

#[derive(Serialize)]
struct SubscriptionAttr<'a> {
    address: &'a str,
    chain: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
}

impl TatumToolkit {
    /// 创建新的Tatum客户端
    pub fn new(config: &ToolkitConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid toolkit base URL: {}", config.base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Toolkit base URL cannot be used as a base: {}", config.base_url);
        }

        Ok(Self {
            base_url,
            api_key: config.api_key.clone(),
            webhook_url: config.webhook_url.clone(),
            mnemonic_chain: config.mnemonic_chain.clone(),
            client: reqwest::Client::builder()
                .timeout(config.timeout())
                .build()
                .context("Failed to create HTTP client")?,
        })
    }

    /// `{base}/v3/<segments...>`，每段单独编码
    fn url(&self, segments: &[&str]) -> ToolkitResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ToolkitError::Transport("toolkit base URL cannot be a base".into()))?
            .pop_if_empty()
            .push("v3")
            .extend(segments);
        Ok(url)
    }

    /// 已知链使用其路径段，其余名称按小写原样传给工具
    fn chain_path(blockchain_name: &str) -> String {
        blockchain_name
            .parse::<Blockchain>()
            .map(|chain| chain.api_path().to_string())
            .unwrap_or_else(|_| blockchain_name.to_lowercase())
    }

    /// 发送请求；2xx 空响应体返回 `None`
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> ToolkitResult<Option<Value>> {
        tracing::debug!(method = %method, path = %url.path(), "🌐 Calling Tatum API");

        let mut request = self
            .client
            .request(method, url)
            .header("x-api-key", &self.api_key);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ToolkitError::Transport(e.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ToolkitError::Transport(e.to_string()))?;

        if status.is_success() {
            if bytes.is_empty() {
                return Ok(None);
            }
            return serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| ToolkitError::Decode(e.to_string()));
        }

        let body = serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| json!({ "message": String::from_utf8_lossy(&bytes) }));

        // 401/403 是网关自身的凭据问题，不透传给客户端
        if status.is_client_error()
            && status != reqwest::StatusCode::UNAUTHORIZED
            && status != reqwest::StatusCode::FORBIDDEN
        {
            tracing::warn!("❌ Tatum API rejected request ({}): {}", status, body);
            return Err(ToolkitError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::error!("❌ Tatum API错误 ({}): {}", status, body);
        Err(ToolkitError::Upstream(format!("Tatum API returned {}", status)))
    }

    async fn get(&self, url: Url) -> ToolkitResult<Value> {
        self.send::<Value>(Method::GET, url, &[], None)
            .await?
            .ok_or_else(|| ToolkitError::Decode("empty response body".into()))
    }
}

/// 从响应对象中取出字符串字段
fn string_field(body: &Value, field: &str) -> ToolkitResult<String> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ToolkitError::Decode(format!("missing string field `{}`", field)))
}

/// 汇率值可能是字符串或数字
fn parse_rate(body: &Value) -> ToolkitResult<f64> {
    let raw = match body.get("value") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(ToolkitError::Decode("missing field `value`".into())),
    };
    let rate = Decimal::from_str(raw.trim())
        .or_else(|_| Decimal::from_scientific(raw.trim()))
        .map_err(|e| ToolkitError::Decode(format!("invalid rate `{}`: {}", raw, e)))?;
    rate.to_f64()
        .ok_or_else(|| ToolkitError::Decode("rate value out of range for f64".into()))
}

#[async_trait]
impl WalletGenerator for TatumToolkit {
    async fn generate_wallet(&self, blockchain_name: &str) -> ToolkitResult<WalletRecord> {
        let chain = Self::chain_path(blockchain_name);
        let url = self.url(&[&chain, "wallet"])?;
        match self.get(url).await? {
            Value::Object(record) => Ok(record),
            other => Err(ToolkitError::Decode(format!(
                "expected wallet object, got {}",
                crate::infrastructure::validation::json_type_name(&other)
            ))),
        }
    }
}

#[async_trait]
impl AddressDeriver for TatumToolkit {
    async fn address_by_xpub(
        &self,
        blockchain_name: &str,
        xpub: &str,
        index: u32,
    ) -> ToolkitResult<String> {
        let chain = Self::chain_path(blockchain_name);
        let index = index.to_string();
        let url = self.url(&[&chain, "address", xpub, &index])?;
        let body = self.get(url).await?;
        string_field(&body, "address")
    }
}

#[async_trait]
impl PrivateKeyDeriver for TatumToolkit {
    async fn private_key_by_mnemonic(&self, mnemonic: &str, index: u32) -> ToolkitResult<String> {
        let chain = Self::chain_path(&self.mnemonic_chain);
        let url = self.url(&[&chain, "wallet", "priv"])?;
        let body = self
            .send(
                Method::POST,
                url,
                &[],
                Some(&PrivateKeyBody { mnemonic, index }),
            )
            .await?
            .ok_or_else(|| ToolkitError::Decode("empty response body".into()))?;
        string_field(&body, "key")
    }
}

#[async_trait]
impl SubscriptionManager for TatumToolkit {
    async fn create_subscription(
        &self,
        address: &str,
        chain: Blockchain,
        subscription_type: &str,
    ) -> ToolkitResult<Value> {
        let url = self.url(&["subscription"])?;
        let body = SubscriptionBody {
            kind: subscription_type,
            attr: SubscriptionAttr {
                address,
                chain: chain.code(),
                url: self.webhook_url.as_deref(),
            },
        };
        self.send(Method::POST, url, &[], Some(&body))
            .await?
            .ok_or_else(|| ToolkitError::Decode("empty response body".into()))
    }

    async fn remove_subscription(&self, subscription_id: &str) -> ToolkitResult<Value> {
        let url = self.url(&["subscription", subscription_id])?;
        let body = self.send::<Value>(Method::DELETE, url, &[], None).await?;
        // Tatum 删除成功返回 204
        Ok(body.unwrap_or_else(|| {
            json!({
                "subscription_id": subscription_id,
                "removed": true,
            })
        }))
    }
}

#[async_trait]
impl ExchangeRateProvider for TatumToolkit {
    async fn exchange_rate(&self, crypto_symbol: &str, fiat_symbol: &str) -> ToolkitResult<f64> {
        let crypto = crypto_symbol.to_uppercase();
        let fiat = fiat_symbol.to_uppercase();
        let url = self.url(&["tatum", "rate", &crypto])?;
        let body = self
            .send::<Value>(Method::GET, url, &[("basePair", fiat.as_str())], None)
            .await?
            .ok_or_else(|| ToolkitError::Decode("empty response body".into()))?;
        parse_rate(&body)
    }
}
