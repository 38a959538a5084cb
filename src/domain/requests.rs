//! 各操作的请求模型
//!
//! 每个请求类型声明字段集合并实现 `ValidateRequest`，
//! 验证通过后得到已去除首尾空白的类型化值。

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::{
    domain::Blockchain,
    infrastructure::validation::{FieldErrors, FieldReader, ValidateRequest},
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 字段长度上限
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const MAX_BLOCKCHAIN_NAME: usize = 64;
const MAX_XPUB: usize = 256;
const MAX_ADDRESS: usize = 256;
const MAX_SUBSCRIPTION_TYPE: usize = 64;
const MAX_SUBSCRIPTION_ID: usize = 128;
const MAX_MNEMONIC: usize = 1024;
const MAX_SYMBOL: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct GenerateWalletRequest {
    #[schema(example = "bitcoin")]
    pub blockchain_name: String,
}

impl ValidateRequest for GenerateWalletRequest {
    fn validate(body: &Map<String, Value>) -> Result<Self, FieldErrors> {
        let mut reader = FieldReader::new(body);
        let blockchain_name = reader.string("blockchain_name", MAX_BLOCKCHAIN_NAME);
        reader.finish()?;
        Ok(Self { blockchain_name })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AddressByXpubRequest {
    #[schema(example = "bitcoin")]
    pub blockchain_name: String,
    pub xpub: String,
    #[schema(minimum = 0)]
    pub index: u32,
}

impl ValidateRequest for AddressByXpubRequest {
    fn validate(body: &Map<String, Value>) -> Result<Self, FieldErrors> {
        let mut reader = FieldReader::new(body);
        let blockchain_name = reader.string("blockchain_name", MAX_BLOCKCHAIN_NAME);
        let xpub = reader.string("xpub", MAX_XPUB);
        let index = reader.index("index");
        reader.finish()?;
        Ok(Self {
            blockchain_name,
            xpub,
            index,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CreateSubscriptionRequest {
    pub address: String,
    pub chain: Blockchain,
    #[schema(example = "ADDRESS_TRANSACTION")]
    pub subscription_type: String,
}

impl ValidateRequest for CreateSubscriptionRequest {
    fn validate(body: &Map<String, Value>) -> Result<Self, FieldErrors> {
        let mut reader = FieldReader::new(body);
        let address = reader.string("address", MAX_ADDRESS);
        let chain = reader.choice::<Blockchain>("chain");
        let subscription_type = reader.string("subscription_type", MAX_SUBSCRIPTION_TYPE);
        reader.finish()?;
        // finish() 已保证 chain 解析成功
        let chain = chain.ok_or_else(|| {
            let mut errors = FieldErrors::new();
            errors.add("chain", crate::infrastructure::validation::MSG_REQUIRED);
            errors
        })?;
        Ok(Self {
            address,
            chain,
            subscription_type,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RemoveSubscriptionRequest {
    pub subscription_id: String,
}

impl ValidateRequest for RemoveSubscriptionRequest {
    fn validate(body: &Map<String, Value>) -> Result<Self, FieldErrors> {
        let mut reader = FieldReader::new(body);
        let subscription_id = reader.string("subscription_id", MAX_SUBSCRIPTION_ID);
        reader.finish()?;
        Ok(Self { subscription_id })
    }
}

/// 助记词请求：Debug 输出不包含助记词内容
#[derive(Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MnemonicPrivateKeyRequest {
    pub mnemonic: String,
    #[schema(minimum = 0)]
    pub index: u32,
}

impl MnemonicPrivateKeyRequest {
    pub fn word_count(&self) -> usize {
        self.mnemonic.split(' ').count()
    }
}

impl fmt::Debug for MnemonicPrivateKeyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MnemonicPrivateKeyRequest")
            .field("mnemonic", &format_args!("<{} words>", self.word_count()))
            .field("index", &self.index)
            .finish()
    }
}

impl ValidateRequest for MnemonicPrivateKeyRequest {
    fn validate(body: &Map<String, Value>) -> Result<Self, FieldErrors> {
        let mut reader = FieldReader::new(body);
        let mnemonic = reader.string("mnemonic", MAX_MNEMONIC);
        let index = reader.index("index");
        reader.finish()?;
        // 单词之间统一为单个空格
        let mnemonic = mnemonic.split_whitespace().collect::<Vec<_>>().join(" ");
        Ok(Self { mnemonic, index })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ExchangeRateRequest {
    #[schema(example = "BTC")]
    pub crypto_symbol: String,
    #[schema(example = "EUR")]
    pub fiat_symbol: String,
}

impl ValidateRequest for ExchangeRateRequest {
    fn validate(body: &Map<String, Value>) -> Result<Self, FieldErrors> {
        let mut reader = FieldReader::new(body);
        let crypto_symbol = reader.string("crypto_symbol", MAX_SYMBOL);
        let fiat_symbol = reader.string("fiat_symbol", MAX_SYMBOL);
        reader.finish()?;
        Ok(Self {
            crypto_symbol,
            fiat_symbol,
        })
    }
}
