//! WalletGate 主入口

use std::sync::Arc;

use anyhow::Result;
use walletgate::{
    api,
    app_state::AppState,
    config::Config,
    infrastructure::logging::init_logging,
    service::{TatumToolkit, Toolkit, WalletGateway},
};

#[tokio::main]
async fn main() -> Result<()> {
    // ✅ 1. 加载环境变量
    dotenvy::dotenv().ok();

    // ✅ 2. 加载配置（CONFIG_PATH 指向的 TOML 文件优先于环境变量）
    let config = Config::load()?;
    config.validate()?;

    // ✅ 3. 初始化日志；guard 必须活到进程退出
    let _log_guard = init_logging(&config.logging).map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!("🚀 Starting WalletGate {}", env!("CARGO_PKG_VERSION"));
    tracing::debug!(toolkit = ?config.toolkit, "Toolkit configuration");
    if config.toolkit.api_key.is_empty() {
        tracing::warn!("⚠️ TATUM_API_KEY is not set, toolkit calls will be rejected upstream");
    }

    // ✅ 4. 外部钱包工具
    let tatum = Arc::new(TatumToolkit::new(&config.toolkit)?);
    let gateway = Arc::new(WalletGateway::new(
        Toolkit::from_single(tatum),
        config.toolkit.timeout(),
    ));
    tracing::info!("✅ Toolkit client ready: {}", config.toolkit.base_url);

    // ✅ 5. 路由
    let bind_addr = config.server.bind_addr.clone();
    let state = Arc::new(AppState::new(gateway, Arc::new(config)));
    let app = api::routes(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("🎉 Server listening on http://{}", bind_addr);
    tracing::info!("📖 Swagger UI: http://{}/docs", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
