use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use crate::db::investor_queries;
use crate::errors::AppError;
use crate::models::InvestorRecord;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_investors))
}

pub async fn get_investors(
    State(state): State<AppState>,
) -> Result<Json<Vec<InvestorRecord>>, AppError> {
    info!("GET /investors - Listing investors");
    let investors = investor_queries::fetch_all(&state.pool, 100).await?;
    Ok(Json(investors))
}
