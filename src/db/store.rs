use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::models::{FilteredCurrencyRecord, InvestorRecord, PriceRecord, SocialTrendRecord};

/// Store unreachable or a write rejected. The whole batch is reported failed;
/// which keys made it in beforehand is logged at the failure site.
#[derive(Debug, Error)]
#[error("write error: {0}")]
pub struct WriteError(pub String);

impl From<sqlx::Error> for WriteError {
    fn from(e: sqlx::Error) -> Self {
        WriteError(e.to_string())
    }
}

/// Outcome of one upsert batch: how many records replaced an existing
/// document vs. how many were newly inserted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    pub matched: u64,
    pub inserted: u64,
}

impl WriteSummary {
    pub fn record(&mut self, inserted: bool) {
        if inserted {
            self.inserted += 1;
        } else {
            self.matched += 1;
        }
    }

    pub fn total(&self) -> u64 {
        self.matched + self.inserted
    }
}

/// Replace-or-insert persistence keyed on each entity's natural key.
///
/// Every upsert must be atomic per document at the store level; batches are
/// semantically N independent per-key upserts with no cross-record
/// transactionality. Records reaching this seam have already resolved their
/// natural key (the Normalizer drops the rest).
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn upsert_prices(&self, records: &[PriceRecord]) -> Result<WriteSummary, WriteError>;

    async fn upsert_social_trends(
        &self,
        records: &[SocialTrendRecord],
    ) -> Result<WriteSummary, WriteError>;

    async fn upsert_investors(
        &self,
        records: &[InvestorRecord],
    ) -> Result<WriteSummary, WriteError>;

    async fn upsert_filtered_currencies(
        &self,
        records: &[FilteredCurrencyRecord],
    ) -> Result<WriteSummary, WriteError>;
}
