//! 支持的区块链枚举
//!
//! 封闭集合：声明顺序即 `/blockchain-choices` 对外暴露的顺序

use std::{collections::HashMap, fmt, str::FromStr};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Blockchain {
    Bitcoin,
    Ethereum,
    Litecoin,
    BitcoinCash,
    Dogecoin,
    Bsc,
    Polygon,
    Tron,
    Solana,
}

/// 链标识符解析失败
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{0}\" is not a valid choice.")]
pub struct UnknownBlockchain(pub String);

/// 别名注册表（小写键）：规范名称、短代码、常见别名
static ALIASES: Lazy<HashMap<&'static str, Blockchain>> = Lazy::new(|| {
    let mut registry = HashMap::new();
    for chain in Blockchain::ALL {
        registry.insert(chain.as_str(), chain);
        for alias in chain.aliases() {
            registry.insert(*alias, chain);
        }
    }
    registry
});

impl Blockchain {
    pub const ALL: [Blockchain; 9] = [
        Blockchain::Bitcoin,
        Blockchain::Ethereum,
        Blockchain::Litecoin,
        Blockchain::BitcoinCash,
        Blockchain::Dogecoin,
        Blockchain::Bsc,
        Blockchain::Polygon,
        Blockchain::Tron,
        Blockchain::Solana,
    ];

    /// 规范标识符（choices 中的取值）
    pub fn as_str(&self) -> &'static str {
        match self {
            Blockchain::Bitcoin => "bitcoin",
            Blockchain::Ethereum => "ethereum",
            Blockchain::Litecoin => "litecoin",
            Blockchain::BitcoinCash => "bitcoin_cash",
            Blockchain::Dogecoin => "dogecoin",
            Blockchain::Bsc => "bsc",
            Blockchain::Polygon => "polygon",
            Blockchain::Tron => "tron",
            Blockchain::Solana => "solana",
        }
    }

    /// 订阅接口使用的链短代码
    pub fn code(&self) -> &'static str {
        match self {
            Blockchain::Bitcoin => "BTC",
            Blockchain::Ethereum => "ETH",
            Blockchain::Litecoin => "LTC",
            Blockchain::BitcoinCash => "BCH",
            Blockchain::Dogecoin => "DOGE",
            Blockchain::Bsc => "BSC",
            Blockchain::Polygon => "MATIC",
            Blockchain::Tron => "TRON",
            Blockchain::Solana => "SOL",
        }
    }

    /// 钱包工具 REST 路径中的链段
    pub fn api_path(&self) -> &'static str {
        match self {
            Blockchain::BitcoinCash => "bcash",
            other => other.as_str(),
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Blockchain::Bitcoin => &["btc"],
            Blockchain::Ethereum => &["eth"],
            Blockchain::Litecoin => &["ltc"],
            Blockchain::BitcoinCash => &["bch", "bcash"],
            Blockchain::Dogecoin => &["doge"],
            Blockchain::Bsc => &["bnb", "binance"],
            Blockchain::Polygon => &["matic"],
            Blockchain::Tron => &["trx"],
            Blockchain::Solana => &["sol"],
        }
    }

    /// 只读 choices 列表，保持声明顺序
    pub fn choices() -> Vec<&'static str> {
        Self::ALL.iter().map(Blockchain::as_str).collect()
    }
}

impl fmt::Display for Blockchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Blockchain {
    type Err = UnknownBlockchain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        ALIASES
            .get(key.as_str())
            .copied()
            .ok_or_else(|| UnknownBlockchain(s.trim().to_string()))
    }
}
