use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An institutional backer or large investor. Natural key: name.
/// `amount_invested` is None when the upstream source reports it as unknown.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InvestorRecord {
    pub id: Uuid,
    pub name: String,
    pub cryptos_supported: Vec<String>,
    pub amount_invested: Option<f64>,
    pub fetched_at: DateTime<Utc>,
}

impl InvestorRecord {
    pub fn new(
        name: String,
        cryptos_supported: Vec<String>,
        amount_invested: Option<f64>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            cryptos_supported,
            amount_invested,
            fetched_at,
        }
    }
}
