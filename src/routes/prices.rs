use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info};

use crate::db::price_queries;
use crate::errors::AppError;
use crate::models::PriceRecord;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    limit: Option<i64>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:symbol", get(get_prices))
        .route("/:symbol/latest", get(get_latest_price))
}

pub async fn get_prices(
    Path(symbol): Path<String>,
    Query(params): Query<HistoryParams>,
    State(state): State<AppState>,
) -> Result<Json<Vec<PriceRecord>>, AppError> {
    info!("GET /prices/{} - Getting price history", symbol);
    let limit = params.limit.unwrap_or(100).clamp(1, 1000);
    let prices = price_queries::fetch_by_symbol(&state.pool, &symbol, limit)
        .await
        .map_err(|e| {
            error!("Failed to get price history for {}: {}", symbol, e);
            AppError::from(e)
        })?;
    Ok(Json(prices))
}

pub async fn get_latest_price(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<PriceRecord>, AppError> {
    info!("GET /prices/{}/latest - Getting latest price", symbol);
    let price = price_queries::fetch_latest(&state.pool, &symbol)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(price))
}
