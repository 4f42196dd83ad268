use std::error::Error;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

use romi::api::RestApi;
use romi::catalog::SymptomCatalog;
use romi::config::{self, load_config, StorageBackend};
use romi::storage::{DocumentStore, FileStore, MemoryStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    let config = load_config(Path::new("config.yaml"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .init();

    tracing::info!("Starting {} v{}", config::APP_NAME, config::APP_VERSION);

    let catalog = Arc::new(SymptomCatalog::builtin());
    for issue in catalog.coverage_issues() {
        tracing::warn!(?issue, "symptom tiers do not cover the pain scale cleanly");
    }

    let store: Arc<dyn DocumentStore> = match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; intakes are lost on shutdown");
            Arc::new(MemoryStore::new())
        }
        StorageBackend::File => {
            let store = FileStore::open(&config.storage.path).await?;
            tracing::info!(path = %store.base_path().display(), "opened document store");
            Arc::new(store)
        }
    };

    let api = RestApi::new(catalog, store, config.api.public_dir.clone());
    let addr: SocketAddr = format!("{}:{}", config.api.host, config.api.port).parse()?;

    // Create a channel for shutdown signal
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let (bound, server) = warp::serve(api.routes())
        .try_bind_with_graceful_shutdown(addr, async move {
            shutdown_rx.await.ok();
            tracing::info!("Shutting down server...");
        })?;
    tracing::info!("Listening on http://{}", bound);

    let server_handle = tokio::spawn(server);

    signal::ctrl_c().await?;
    tracing::info!("Ctrl+C received, starting graceful shutdown");
    shutdown_tx.send(()).ok();

    server_handle.await?;
    tracing::info!("Server shutdown complete");
    Ok(())
}
