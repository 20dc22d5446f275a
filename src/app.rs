use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;

use crate::routes::{currencies, health, investors, jobs, prices, social};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .route("/", get(health::health))
        .nest("/health", health::router())
        .nest("/api/prices", prices::router())
        .nest("/api/social", social::router())
        .nest("/api/investors", investors::router())
        .nest("/api/currencies", currencies::router())
        .nest("/api/jobs", jobs::router())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
