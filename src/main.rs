use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;

use garment_requests::app_state::AppState;
use garment_requests::build_router;
use garment_requests::config::Config;
use garment_requests::db::schema;
use garment_requests::db::store::{MemoryStore, PgStore, RecordStore};
use garment_requests::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let _log_guard = logging::init(&config.log_dir).context("failed to initialise logging")?;

    let store: Arc<dyn RecordStore> = match &config.database_url {
        Some(url) => {
            let collections: Vec<&str> = schema::ALL.iter().map(|s| s.collection).collect();
            let store = PgStore::connect(url, config.db_max_connections, &collections)
                .await
                .context("failed to connect to the database")?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, records are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let app = build_router(AppState::new(store.clone()));

    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "🚀 server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server encountered an error")?;

    tracing::info!("🛠️ closing store");
    store.close().await;
    tracing::info!("✅ shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
    }
    tracing::info!("received Ctrl+C, shutting down");
}
