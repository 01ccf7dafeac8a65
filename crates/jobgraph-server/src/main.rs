//! JobGraph — job-posting knowledge graph server.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod routes;
mod state;

use state::AppState;

fn resolve_data_dir() -> PathBuf {
    std::env::var("JOBGRAPH_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = jobgraph_core::JobGraphConfig::from_env(&data_dir)?;
    let port = config.port;

    let store = jobgraph_store::GraphStore::open(&config.data_paths.graphdb)
        .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))?;

    let state = Arc::new(AppState::new(config, store));
    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("JobGraph server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
