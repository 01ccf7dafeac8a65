//! Graph statistics route.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/stats", get(get_stats))
}

/// GET /api/stats — node and edge counts.
async fn get_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.stats() {
        Ok(stats) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "nodes": stats.total_nodes,
                "edges": stats.total_edges,
                "jobs": stats.jobs,
                "resumes": stats.resumes,
                "skills": stats.skills,
                "companies": stats.companies,
                "dbPath": stats.db_path,
                "dbSizeMb": stats.db_size_mb,
                "generatedAt": chrono::Utc::now().to_rfc3339(),
            })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        ),
    }
}
