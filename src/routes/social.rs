use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info};

use crate::db::social_queries;
use crate::errors::AppError;
use crate::models::SocialTrendRecord;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SocialParams {
    symbol: String,
    limit: Option<i64>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_social_trends))
}

pub async fn get_social_trends(
    Query(params): Query<SocialParams>,
    State(state): State<AppState>,
) -> Result<Json<Vec<SocialTrendRecord>>, AppError> {
    info!("GET /social?symbol={} - Getting social trends", params.symbol);
    let limit = params.limit.unwrap_or(100).clamp(1, 1000);
    let trends = social_queries::fetch_by_symbol(&state.pool, &params.symbol, limit)
        .await
        .map_err(|e| {
            error!("Failed to get social trends for {}: {}", params.symbol, e);
            AppError::from(e)
        })?;

    if trends.is_empty() {
        return Err(AppError::NotFound);
    }
    Ok(Json(trends))
}
