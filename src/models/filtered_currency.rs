use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A market-listing entry that passed the configured filter bounds.
/// Natural key: coin_id (the source's stable coin identifier).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FilteredCurrencyRecord {
    pub id: Uuid,
    pub coin_id: String,
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    pub market_cap: f64,
    pub total_volume: f64,
    pub price_change_24h_pct: f64,
    pub fetched_at: DateTime<Utc>,
}

impl FilteredCurrencyRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        coin_id: String,
        symbol: String,
        name: String,
        current_price: f64,
        market_cap: f64,
        total_volume: f64,
        price_change_24h_pct: f64,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            coin_id,
            symbol,
            name,
            current_price,
            market_cap,
            total_volume,
            price_change_24h_pct,
            fetched_at,
        }
    }
}
