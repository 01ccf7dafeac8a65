//! Job routes — ingestion, listing, skill search, detail lookup.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::state::AppState;
use jobgraph_ingest::{JobIngester, JobRecord};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/jobs", post(ingest_job).get(list_jobs))
        .route("/jobs/search_by_skill/{skill}", get(search_by_skill))
        .route("/jobs/details/{title}", get(job_details))
}

/// POST /api/jobs — ingest an extracted job record into the graph.
async fn ingest_job(
    State(state): State<Arc<AppState>>,
    Json(record): Json<JobRecord>,
) -> impl IntoResponse {
    match JobIngester::new(&state.store).ingest(&record) {
        Ok(job_id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "job_id": job_id,
                "status": "ingested",
            })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        ),
    }
}

/// GET /api/jobs — job postings with their employment type and location.
async fn list_jobs(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.list_jobs(50) {
        Ok(jobs) => (StatusCode::OK, Json(serde_json::json!(jobs))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        ),
    }
}

/// GET /api/jobs/search_by_skill/{skill} — jobs requiring a skill whose name
/// contains the given fragment (case-insensitive).
async fn search_by_skill(
    State(state): State<Arc<AppState>>,
    Path(skill): Path<String>,
) -> impl IntoResponse {
    match state.store.search_jobs_by_skill(&skill) {
        Ok(hits) if hits.is_empty() => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": format!("No jobs found requiring a skill matching: {}", skill),
            })),
        ),
        Ok(hits) => (StatusCode::OK, Json(serde_json::json!(hits))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        ),
    }
}

/// GET /api/jobs/details/{title} — skills and tools required for the first
/// job whose title contains the given fragment.
async fn job_details(
    State(state): State<Arc<AppState>>,
    Path(title): Path<String>,
) -> impl IntoResponse {
    match state.store.job_details(&title) {
        Ok(Some(details)) => (StatusCode::OK, Json(serde_json::json!(details))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": format!("Job title not found: {}", title),
            })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        ),
    }
}
