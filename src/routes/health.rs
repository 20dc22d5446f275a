use axum::{
    Router,
    extract::State,
    routing::get,
};
use tracing::info;

use crate::errors::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
}

/// Liveness plus store connectivity: a trivial query against the pool so a
/// dead database shows up here instead of only in the job logs. Served at
/// both `/` and `/health`.
pub(crate) async fn health(State(state): State<AppState>) -> Result<&'static str, AppError> {
    info!("Health check");
    sqlx::query("SELECT 1").execute(&state.pool).await?;
    Ok("OK")
}
