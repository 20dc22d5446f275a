//! In-memory RecordStore used by tests that exercise the pipeline without
//! Postgres. Mirrors the replace-or-insert contract of PgStore.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::db::store::{RecordStore, WriteError, WriteSummary};
use crate::models::{FilteredCurrencyRecord, InvestorRecord, PriceRecord, SocialTrendRecord};

#[derive(Default)]
pub struct MemoryStore {
    pub prices: Mutex<HashMap<(String, i64), PriceRecord>>,
    pub social: Mutex<HashMap<(String, String), SocialTrendRecord>>,
    pub investors: Mutex<HashMap<String, InvestorRecord>>,
    pub currencies: Mutex<HashMap<String, FilteredCurrencyRecord>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent upsert report a store-level failure.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), WriteError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(WriteError("store unavailable".into()))
        } else {
            Ok(())
        }
    }
}

fn upsert_into<K: std::hash::Hash + Eq, V>(
    map: &mut HashMap<K, V>,
    key: K,
    value: V,
    summary: &mut WriteSummary,
) {
    let existed = map.insert(key, value).is_some();
    summary.record(!existed);
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn upsert_prices(&self, records: &[PriceRecord]) -> Result<WriteSummary, WriteError> {
        self.check_available()?;
        let mut map = self.prices.lock();
        let mut summary = WriteSummary::default();
        for rec in records {
            let key = (rec.symbol.clone(), rec.bucket_start.timestamp());
            upsert_into(&mut *map, key, rec.clone(), &mut summary);
        }
        Ok(summary)
    }

    async fn upsert_social_trends(
        &self,
        records: &[SocialTrendRecord],
    ) -> Result<WriteSummary, WriteError> {
        self.check_available()?;
        let mut map = self.social.lock();
        let mut summary = WriteSummary::default();
        for rec in records {
            let key = (rec.external_id.clone(), rec.platform.as_str().to_string());
            upsert_into(&mut *map, key, rec.clone(), &mut summary);
        }
        Ok(summary)
    }

    async fn upsert_investors(
        &self,
        records: &[InvestorRecord],
    ) -> Result<WriteSummary, WriteError> {
        self.check_available()?;
        let mut map = self.investors.lock();
        let mut summary = WriteSummary::default();
        for rec in records {
            upsert_into(&mut *map, rec.name.clone(), rec.clone(), &mut summary);
        }
        Ok(summary)
    }

    async fn upsert_filtered_currencies(
        &self,
        records: &[FilteredCurrencyRecord],
    ) -> Result<WriteSummary, WriteError> {
        self.check_available()?;
        let mut map = self.currencies.lock();
        let mut summary = WriteSummary::default();
        for rec in records {
            upsert_into(&mut *map, rec.coin_id.clone(), rec.clone(), &mut summary);
        }
        Ok(summary)
    }
}
