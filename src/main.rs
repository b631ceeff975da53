//! Aide 指令服务
//!
//! 入口：加载配置、初始化日志、组装指令管线并启动 HTTP 服务。
//! 启动: cargo run -- [config.toml]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use aide::config::load_config;
use aide::core::{CommandPipeline, ShutdownManager};
use aide::domain::DomainStores;

#[cfg(feature = "server")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use aide::server::{create_router, AppState};

    aide::observability::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = load_config(config_path).context("Failed to load config")?;

    let (stores, _) = DomainStores::in_memory();
    let pipeline = Arc::new(CommandPipeline::from_config(&cfg, stores).context("Failed to build command pipeline")?);
    pipeline.warm_up().await;

    let shutdown = Arc::new(ShutdownManager::new());
    shutdown.install_signal_handlers();

    let app = create_router(AppState::new(Arc::clone(&pipeline)));
    let listener = tokio::net::TcpListener::bind(&cfg.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", cfg.server.bind_addr))?;
    tracing::info!(
        "{} listening on http://{}",
        cfg.app.name.as_deref().unwrap_or("aide"),
        cfg.server.bind_addr
    );

    let signal = Arc::clone(&shutdown);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { signal.wait_for_shutdown().await })
        .await
        .context("Server error")?;

    tracing::info!(reason = ?shutdown.reason(), "Server stopped");
    Ok(())
}

/// 不带 HTTP 服务时：从标准输入逐行读取指令并输出 JSON 结果
#[cfg(not(feature = "server"))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use tokio::io::{AsyncBufReadExt, BufReader};

    aide::observability::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = load_config(config_path).context("Failed to load config")?;
    let (stores, _) = DomainStores::in_memory();
    let pipeline = CommandPipeline::from_config(&cfg, stores).context("Failed to build command pipeline")?;
    pipeline.warm_up().await;

    let shutdown = Arc::new(ShutdownManager::new());
    shutdown.install_signal_handlers();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = shutdown.wait_for_shutdown() => break,
        };
        let Some(line) = line else { break };
        match pipeline.process("local", &line).await {
            Ok(outcome) => println!("{}", serde_json::to_string(&outcome)?),
            Err(e) => println!("{}", serde_json::json!({ "msg": e.to_string() })),
        }
    }
    tracing::info!(reason = ?shutdown.reason(), "Stopped");
    Ok(())
}
