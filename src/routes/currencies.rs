use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use crate::db::currency_queries;
use crate::errors::AppError;
use crate::models::FilteredCurrencyRecord;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_filtered_currencies))
}

pub async fn get_filtered_currencies(
    State(state): State<AppState>,
) -> Result<Json<Vec<FilteredCurrencyRecord>>, AppError> {
    info!("GET /currencies - Listing filtered currencies");
    let currencies = currency_queries::fetch_all(&state.pool, 250).await?;
    Ok(Json(currencies))
}
