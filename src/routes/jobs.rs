use std::collections::BTreeMap;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use crate::services::scheduler::JobStatus;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_job_statuses))
}

/// Last-known status of every scheduled job.
pub async fn get_job_statuses(State(state): State<AppState>) -> Json<BTreeMap<String, JobStatus>> {
    info!("GET /jobs - Listing job statuses");
    let statuses = state
        .job_statuses
        .iter()
        .map(|e| (e.key().to_string(), e.value().clone()))
        .collect();
    Json(statuses)
}
