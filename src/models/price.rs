use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// One observed price for a coin. Prices are a time series, so the natural key
// is (symbol, bucket_start) rather than symbol alone: bucket_start floors the
// observation time to the polling interval, so repeated runs inside one
// interval replace the same row instead of piling up duplicates.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PriceRecord {
    pub id: Uuid,
    pub symbol: String,
    pub price: f64,
    pub market_cap: Option<f64>,
    pub volume_24h: Option<f64>,
    pub observed_at: DateTime<Utc>, // TIMESTAMPTZ, set by the pipeline in UTC
    pub bucket_start: DateTime<Utc>,
}

impl PriceRecord {
    pub fn new(
        symbol: String,
        price: f64,
        market_cap: Option<f64>,
        volume_24h: Option<f64>,
        observed_at: DateTime<Utc>,
        bucket: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol,
            price,
            market_cap,
            volume_24h,
            observed_at,
            bucket_start: floor_to_bucket(observed_at, bucket),
        }
    }
}

fn floor_to_bucket(ts: DateTime<Utc>, bucket: Duration) -> DateTime<Utc> {
    let secs = bucket.num_seconds().max(1);
    let floored = ts.timestamp() - ts.timestamp().rem_euclid(secs);
    Utc.timestamp_opt(floored, 0).single().unwrap_or(ts)
}
