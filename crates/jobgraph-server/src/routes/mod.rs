//! HTTP route handlers — ingestion plus the read-only query facade.

pub mod jobs;
pub mod resumes;
pub mod stats;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(jobs::routes())
        .merge(resumes::routes())
        .merge(stats::routes())
}
