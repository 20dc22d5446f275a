use std::sync::Arc;

use dashmap::DashMap;
use sqlx::PgPool;

use crate::services::scheduler::JobStatus;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub job_statuses: Arc<DashMap<&'static str, JobStatus>>,
}
