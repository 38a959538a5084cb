//! 配置管理模块
//! 支持从环境变量和配置文件加载配置

use std::{fmt, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub toolkit: ToolkitConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// 逗号分隔，`*` 表示允许任意来源
    pub cors_allow_origins: String,
    pub body_limit_bytes: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "text"
    pub enable_file_logging: bool,
    pub log_file_path: Option<String>,
}

/// 监控配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enable_metrics: bool,
}

/// 外部钱包工具（Tatum）配置
#[derive(Clone, Serialize, Deserialize)]
pub struct ToolkitConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    /// 订阅通知回调地址
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// 助记词派生私钥时使用的链
    pub mnemonic_chain: String,
}

impl ToolkitConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// api_key 不进入日志
impl fmt::Debug for ToolkitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolkitConfig")
            .field("base_url", &self.base_url)
            .field(
                "api_key",
                &if self.api_key.is_empty() {
                    "<unset>"
                } else {
                    "<redacted>"
                },
            )
            .field("timeout_secs", &self.timeout_secs)
            .field("webhook_url", &self.webhook_url)
            .field("mnemonic_chain", &self.mnemonic_chain)
            .finish()
    }
}

/// 布尔开关：1/true/yes/on 与 0/false/no/off（不区分大小写），其余取默认值
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| parse_flag(&v))
        .unwrap_or(default)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8088".into()),
            cors_allow_origins: std::env::var("CORS_ALLOW_ORIGINS").unwrap_or_else(|_| "*".into()),
            body_limit_bytes: std::env::var("BODY_LIMIT_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(64 * 1024),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".into()),
            enable_file_logging: env_flag("LOG_FILE_ENABLED", false),
            log_file_path: std::env::var("LOG_FILE_PATH").ok(),
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enable_metrics: env_flag("ENABLE_METRICS", true),
        }
    }
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("TATUM_API_URL")
                .unwrap_or_else(|_| "https://api.tatum.io".into()),
            api_key: std::env::var("TATUM_API_KEY").unwrap_or_default(),
            timeout_secs: std::env::var("TOOLKIT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            webhook_url: std::env::var("SUBSCRIPTION_WEBHOOK_URL").ok(),
            mnemonic_chain: std::env::var("MNEMONIC_CHAIN").unwrap_or_else(|_| "ethereum".into()),
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            monitoring: MonitoringConfig::default(),
            toolkit: ToolkitConfig::default(),
        })
    }

    /// 从配置文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file as TOML")?;

        Ok(config)
    }

    /// 从环境变量和配置文件合并加载（配置文件优先级更高）
    ///
    /// 文件中缺省的整段配置回落到环境变量默认值。
    pub fn from_env_and_file<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut config = Self::from_env()?;

        if let Some(path) = path {
            if path.as_ref().exists() {
                config = Self::from_file(path)?;
            } else {
                tracing::warn!("Config file {:?} not found, using environment", path.as_ref());
            }
        }

        Ok(config)
    }

    /// 加载配置：`CONFIG_PATH` 指定的文件优先
    pub fn load() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").ok();
        Self::from_env_and_file(path.as_deref())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<()> {
        if self.server.bind_addr.trim().is_empty() {
            anyhow::bail!("BIND_ADDR must not be empty");
        }

        // 验证日志级别
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!("LOG_LEVEL must be one of: {:?}", valid_levels);
        }

        // 验证日志格式
        if self.logging.format != "json" && self.logging.format != "text" {
            anyhow::bail!("LOG_FORMAT must be 'json' or 'text'");
        }

        if !self.toolkit.base_url.starts_with("http://")
            && !self.toolkit.base_url.starts_with("https://")
        {
            anyhow::bail!("TATUM_API_URL must start with http:// or https://");
        }

        if self.toolkit.timeout_secs == 0 {
            anyhow::bail!("TOOLKIT_TIMEOUT_SECS must be greater than 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_config_from_env_is_valid() {
        let config = Config::from_env().unwrap();
        assert!(!config.toolkit.base_url.is_empty());
        assert!(!config.toolkit.mnemonic_chain.is_empty());
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
bind_addr = "127.0.0.1:9000"
cors_allow_origins = "https://app.example.com"
body_limit_bytes = 1024

[logging]
level = "debug"
format = "json"
enable_file_logging = false

[monitoring]
enable_metrics = false

[toolkit]
base_url = "https://toolkit.example.com"
api_key = "secret-key"
timeout_secs = 5
webhook_url = "https://hooks.example.com/tatum"
mnemonic_chain = "bitcoin"
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.server.body_limit_bytes, 1024);
        assert_eq!(config.logging.format, "json");
        assert!(!config.monitoring.enable_metrics);
        assert_eq!(config.toolkit.timeout(), Duration::from_secs(5));
        assert_eq!(config.toolkit.mnemonic_chain, "bitcoin");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_flag() {
        for on in ["1", "true", "TRUE", " True ", "yes", "on"] {
            assert_eq!(parse_flag(on), Some(true), "{}", on);
        }
        for off in ["0", "false", "False", "no", "OFF"] {
            assert_eq!(parse_flag(off), Some(false), "{}", off);
        }
        assert_eq!(parse_flag("maybe"), None);
        assert_eq!(parse_flag(""), None);
    }

    #[test]
    fn test_missing_file_falls_back_to_env() {
        let config =
            Config::from_env_and_file(Some("/nonexistent/walletgate/config.toml")).unwrap();
        assert!(!config.toolkit.base_url.is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::from_env().unwrap();
        config.logging.level = "info".into();
        config.logging.format = "text".into();
        config.toolkit.base_url = "https://api.tatum.io".into();
        config.toolkit.timeout_secs = 30;
        config.server.bind_addr = "0.0.0.0:8088".into();
        assert!(config.validate().is_ok());

        let mut bad = config.clone();
        bad.logging.format = "xml".into();
        assert!(bad.validate().is_err());

        let mut bad = config.clone();
        bad.toolkit.base_url = "ftp://toolkit".into();
        assert!(bad.validate().is_err());

        let mut bad = config;
        bad.toolkit.timeout_secs = 0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let mut toolkit = ToolkitConfig::default();
        toolkit.api_key = "very-secret".into();
        let debug = format!("{:?}", toolkit);
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
