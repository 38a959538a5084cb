//! 日志系统配置模块
//! 支持结构化日志、日志级别配置和按天轮转的文件日志

use std::{ffi::OsStr, path::Path};

use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

use crate::config::LoggingConfig;

const DEFAULT_LOG_FILE: &str = "walletgate.log";

/// 初始化日志系统
///
/// 启用文件日志时返回后台写入线程的 guard，调用方需持有到进程退出。
pub fn init_logging(
    config: &LoggingConfig,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
    // RUST_LOG 优先于配置中的级别
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let json = config.format == "json";

    if config.enable_file_logging {
        let log_dir = log_dir(config);
        std::fs::create_dir_all(log_dir)?;

        let file_appender = rolling::daily(log_dir, log_file_name(config));
        let (non_blocking_appender, guard) = non_blocking(file_appender);

        if json {
            let file_layer = fmt::layer()
                .json()
                .with_writer(non_blocking_appender)
                .with_timer(ChronoUtc::rfc_3339());
            let stdout_layer = fmt::layer().json().with_timer(ChronoUtc::rfc_3339());
            Registry::default()
                .with(filter)
                .with(file_layer)
                .with(stdout_layer)
                .try_init()?;
        } else {
            let file_layer = fmt::layer()
                .with_writer(non_blocking_appender)
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(false);
            let stdout_layer = fmt::layer()
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(true);
            Registry::default()
                .with(filter)
                .with(file_layer)
                .with(stdout_layer)
                .try_init()?;
        }

        return Ok(Some(guard));
    }

    // 仅控制台日志
    if json {
        Registry::default()
            .with(filter)
            .with(fmt::layer().json().with_timer(ChronoUtc::rfc_3339()))
            .try_init()?;
    } else {
        Registry::default()
            .with(filter)
            .with(
                fmt::layer()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(true),
            )
            .try_init()?;
    }

    Ok(None)
}

/// 轮转文件名前缀，取自 `log_file_path` 的文件名部分
fn log_file_name(config: &LoggingConfig) -> &OsStr {
    config
        .log_file_path
        .as_deref()
        .map(Path::new)
        .and_then(Path::file_name)
        .unwrap_or_else(|| OsStr::new(DEFAULT_LOG_FILE))
}

fn log_dir(config: &LoggingConfig) -> &Path {
    config
        .log_file_path
        .as_deref()
        .map(Path::new)
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("./logs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(path: Option<&str>) -> LoggingConfig {
        LoggingConfig {
            level: "debug".to_string(),
            format: "json".to_string(),
            enable_file_logging: true,
            log_file_path: path.map(str::to_string),
        }
    }

    #[test]
    fn test_log_dir_from_file_path() {
        let cfg = config(Some("/var/log/walletgate/app.log"));
        assert_eq!(log_dir(&cfg), Path::new("/var/log/walletgate"));
    }

    #[test]
    fn test_log_file_name_from_path() {
        let cfg = config(Some("/var/log/walletgate/gateway.log"));
        assert_eq!(log_file_name(&cfg), OsStr::new("gateway.log"));
        assert_eq!(log_file_name(&config(Some("app.log"))), OsStr::new("app.log"));
        assert_eq!(log_file_name(&config(None)), OsStr::new(DEFAULT_LOG_FILE));
        // 仅目录时退回默认文件名
        assert_eq!(log_file_name(&config(Some("/"))), OsStr::new(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_log_dir_defaults() {
        assert_eq!(log_dir(&config(None)), Path::new("./logs"));
        assert_eq!(log_dir(&config(Some("app.log"))), Path::new("./logs"));
    }
}
