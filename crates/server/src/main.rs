mod api;
mod auth;
mod router;
mod state;
mod views;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use relay_core::config::StoreBackend;
use relay_core::Config;
use relay_store::{MemoryStore, SessionStore, SqliteStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    relay_core::config::load_dotenv();
    let config = Config::from_env();
    config.log_summary();

    let store: Arc<dyn SessionStore> = match config.store.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Sqlite => Arc::new(SqliteStore::open(&config.store.db_path).await?),
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(state::AppState::new(config, store)?);
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Relay listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
