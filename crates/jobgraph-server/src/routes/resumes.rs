//! Resume routes — listing and ranked job matching.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::state::AppState;
use jobgraph_core::Error;
use jobgraph_match::SkillMatcher;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/resumes", get(list_resumes))
        .route("/resumes/{id}/matches", get(match_jobs))
}

/// GET /api/resumes — resume nodes currently in the graph.
async fn list_resumes(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.list_resumes(10) {
        Ok(resumes) => (StatusCode::OK, Json(serde_json::json!(resumes))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        ),
    }
}

#[derive(Deserialize)]
struct MatchParams {
    limit: Option<usize>,
}

/// GET /api/resumes/{id}/matches?limit=N — jobs ranked by skill overlap.
async fn match_jobs(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<MatchParams>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(5);

    match SkillMatcher::match_jobs(&state.store, &id, limit) {
        Ok(matches) => {
            let total = matches.len();
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "resume_id": id,
                    "matches": matches,
                    "total": total,
                })),
            )
        }
        Err(Error::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": format!("Resume not found: {}", id),
            })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        ),
    }
}
