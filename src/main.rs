use idis::{config::Config, server, snapshot, store::StoreEngine, web};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Initialize logging, INFO by default, overridable via RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("idis starting...");

    let config = Config::from_env();
    let engine = Arc::new(StoreEngine::new());

    // Best-effort restore of the previous snapshot
    if config.snapshot_path.exists() {
        match snapshot::load_from_dump(&engine, &config.snapshot_path) {
            Ok(()) => info!(
                path = %config.snapshot_path.display(),
                keys = engine.key_count(),
                "Restored state from snapshot"
            ),
            Err(e) => warn!(
                path = %config.snapshot_path.display(),
                error = %e,
                "Could not restore snapshot, starting empty"
            ),
        }
    }

    // Periodic dump; the handle must stay alive for the process lifetime
    let _snapshot_task = snapshot::SnapshotTask::start(
        engine.clone(),
        snapshot::SnapshotConfig {
            path: config.snapshot_path.clone(),
            interval: config.snapshot_interval,
        },
    );

    let line_engine = engine.clone();
    let line_addr = config.line_addr.clone();
    let line_handle = tokio::spawn(async move {
        info!("Starting line-protocol server on {}", line_addr);
        if let Err(e) = server::run(&line_addr, line_engine).await {
            error!("Line-protocol server error: {}", e);
        }
    });

    let web_engine = engine.clone();
    let web_addr = config.http_addr.clone();
    let web_handle = tokio::spawn(async move {
        info!("Starting HTTP server on {}", web_addr);
        if let Err(e) = web::run_web_server(&web_addr, web_engine).await {
            error!("HTTP server error: {}", e);
        }
    });

    tokio::select! {
        _ = line_handle => error!("Line-protocol server stopped"),
        _ = web_handle => error!("HTTP server stopped"),
    }
}
