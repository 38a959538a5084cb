//! 钱包操作网关：验证后的请求 → 恰好一次工具调用
//!
//! 不重试、不缓存、不批处理。每次调用受超时约束，
//! 超时记为故障而不是挂起请求。

use std::{future::Future, time::Duration, time::Instant};

use serde_json::Value;

use crate::{
    domain::{
        AddressByXpubRequest, CreateSubscriptionRequest, ExchangeRateRequest,
        GenerateWalletRequest, MnemonicPrivateKeyRequest, RemoveSubscriptionRequest,
    },
    service::toolkit::{Toolkit, ToolkitError, ToolkitResult, WalletRecord},
};

pub struct WalletGateway {
    toolkit: Toolkit,
    timeout: Duration,
}

impl WalletGateway {
    pub fn new(toolkit: Toolkit, timeout: Duration) -> Self {
        Self { toolkit, timeout }
    }

    /// 执行一次工具调用并记录耗时与结果
    async fn delegate<T, F>(&self, operation: &'static str, call: F) -> ToolkitResult<T>
    where
        F: Future<Output = ToolkitResult<T>>,
    {
        let start = Instant::now();
        let outcome = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ToolkitError::Timeout(self.timeout)),
        };
        let elapsed_ms = start.elapsed().as_millis();
        crate::metrics::observe_upstream_latency_ms(operation, elapsed_ms, outcome.is_ok());

        match &outcome {
            Ok(_) => {
                tracing::info!(operation, elapsed_ms = %elapsed_ms, "toolkit call succeeded");
            }
            Err(ToolkitError::Rejected { status, .. }) => {
                tracing::warn!(
                    operation,
                    elapsed_ms = %elapsed_ms,
                    status = *status,
                    "toolkit rejected request"
                );
            }
            Err(e) => {
                tracing::error!(operation, elapsed_ms = %elapsed_ms, error = %e, "toolkit call failed");
            }
        }
        outcome
    }

    /// 生成钱包；结果中的 `blockchain_name` 为去除空白后的输入值
    pub async fn generate_wallet(&self, req: &GenerateWalletRequest) -> ToolkitResult<WalletRecord> {
        let mut record = self
            .delegate(
                "generate_wallet",
                self.toolkit.wallets.generate_wallet(&req.blockchain_name),
            )
            .await?;
        record.insert(
            "blockchain_name".to_string(),
            Value::String(req.blockchain_name.clone()),
        );
        Ok(record)
    }

    pub async fn address_by_xpub(&self, req: &AddressByXpubRequest) -> ToolkitResult<String> {
        self.delegate(
            "address_by_xpub",
            self.toolkit
                .addresses
                .address_by_xpub(&req.blockchain_name, &req.xpub, req.index),
        )
        .await
    }

    pub async fn create_subscription(&self, req: &CreateSubscriptionRequest) -> ToolkitResult<Value> {
        self.delegate(
            "create_subscription",
            self.toolkit.subscriptions.create_subscription(
                &req.address,
                req.chain,
                &req.subscription_type,
            ),
        )
        .await
    }

    /// 不做存在性检查，未知 id 的处理完全交给工具
    pub async fn remove_subscription(&self, req: &RemoveSubscriptionRequest) -> ToolkitResult<Value> {
        self.delegate(
            "remove_subscription",
            self.toolkit
                .subscriptions
                .remove_subscription(&req.subscription_id),
        )
        .await
    }

    pub async fn private_key_by_mnemonic(
        &self,
        req: &MnemonicPrivateKeyRequest,
    ) -> ToolkitResult<String> {
        self.delegate(
            "private_key_by_mnemonic",
            self.toolkit
                .keys
                .private_key_by_mnemonic(&req.mnemonic, req.index),
        )
        .await
    }

    pub async fn exchange_rate(&self, req: &ExchangeRateRequest) -> ToolkitResult<f64> {
        self.delegate(
            "exchange_rate",
            self.toolkit
                .rates
                .exchange_rate(&req.crypto_symbol, &req.fiat_symbol),
        )
        .await
    }
}
