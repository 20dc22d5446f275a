use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::error;

use crate::db::store::{RecordStore, WriteError, WriteSummary};
use crate::models::{FilteredCurrencyRecord, InvestorRecord, PriceRecord, SocialTrendRecord};

/// Postgres-backed store. Each record is written with a single
/// `INSERT .. ON CONFLICT (<natural key>) DO UPDATE`, which is atomic per row;
/// there is deliberately no wrapping transaction, so a batch behaves as N
/// independent per-key upserts. `xmax = 0` on the returned row distinguishes a
/// fresh insert from a replaced document.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn log_partial_failure(entity: &str, succeeded: &[String], failing_key: &str) {
    error!(
        "{} batch failed at key {}; keys already upserted: [{}]",
        entity,
        failing_key,
        succeeded.join(", ")
    );
}

#[async_trait]
impl RecordStore for PgStore {
    async fn upsert_prices(&self, records: &[PriceRecord]) -> Result<WriteSummary, WriteError> {
        let mut summary = WriteSummary::default();
        let mut succeeded = Vec::new();

        for rec in records {
            let key = format!("{}@{}", rec.symbol, rec.bucket_start);
            let row = sqlx::query(
                r#"
                INSERT INTO prices (id, symbol, price, market_cap, volume_24h, observed_at, bucket_start)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (symbol, bucket_start)
                DO UPDATE SET price = EXCLUDED.price,
                              market_cap = EXCLUDED.market_cap,
                              volume_24h = EXCLUDED.volume_24h,
                              observed_at = EXCLUDED.observed_at
                RETURNING (xmax = 0) AS inserted
                "#,
            )
            .bind(rec.id)
            .bind(&rec.symbol)
            .bind(rec.price)
            .bind(rec.market_cap)
            .bind(rec.volume_24h)
            .bind(rec.observed_at)
            .bind(rec.bucket_start)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                log_partial_failure("prices", &succeeded, &key);
                WriteError::from(e)
            })?;

            summary.record(row.get::<bool, _>("inserted"));
            succeeded.push(key);
        }

        Ok(summary)
    }

    async fn upsert_social_trends(
        &self,
        records: &[SocialTrendRecord],
    ) -> Result<WriteSummary, WriteError> {
        let mut summary = WriteSummary::default();
        let mut succeeded = Vec::new();

        for rec in records {
            let key = format!("{}/{}", rec.platform.as_str(), rec.external_id);
            let row = sqlx::query(
                r#"
                INSERT INTO social_trends
                    (id, external_id, symbol_or_title, platform, followers_or_comments,
                     engagement_score, sentiment, trend_label, body_text, fetched_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ON CONFLICT (external_id, platform)
                DO UPDATE SET symbol_or_title = EXCLUDED.symbol_or_title,
                              followers_or_comments = EXCLUDED.followers_or_comments,
                              engagement_score = EXCLUDED.engagement_score,
                              sentiment = EXCLUDED.sentiment,
                              trend_label = EXCLUDED.trend_label,
                              body_text = EXCLUDED.body_text,
                              fetched_at = EXCLUDED.fetched_at
                RETURNING (xmax = 0) AS inserted
                "#,
            )
            .bind(rec.id)
            .bind(&rec.external_id)
            .bind(&rec.symbol_or_title)
            .bind(rec.platform.as_str())
            .bind(rec.followers_or_comments)
            .bind(rec.engagement_score)
            .bind(rec.sentiment)
            .bind(&rec.trend_label)
            .bind(&rec.body_text)
            .bind(rec.fetched_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                log_partial_failure("social_trends", &succeeded, &key);
                WriteError::from(e)
            })?;

            summary.record(row.get::<bool, _>("inserted"));
            succeeded.push(key);
        }

        Ok(summary)
    }

    async fn upsert_investors(
        &self,
        records: &[InvestorRecord],
    ) -> Result<WriteSummary, WriteError> {
        let mut summary = WriteSummary::default();
        let mut succeeded = Vec::new();

        for rec in records {
            let row = sqlx::query(
                r#"
                INSERT INTO investors (id, name, cryptos_supported, amount_invested, fetched_at)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (name)
                DO UPDATE SET cryptos_supported = EXCLUDED.cryptos_supported,
                              amount_invested = EXCLUDED.amount_invested,
                              fetched_at = EXCLUDED.fetched_at
                RETURNING (xmax = 0) AS inserted
                "#,
            )
            .bind(rec.id)
            .bind(&rec.name)
            .bind(&rec.cryptos_supported)
            .bind(rec.amount_invested)
            .bind(rec.fetched_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                log_partial_failure("investors", &succeeded, &rec.name);
                WriteError::from(e)
            })?;

            summary.record(row.get::<bool, _>("inserted"));
            succeeded.push(rec.name.clone());
        }

        Ok(summary)
    }

    async fn upsert_filtered_currencies(
        &self,
        records: &[FilteredCurrencyRecord],
    ) -> Result<WriteSummary, WriteError> {
        let mut summary = WriteSummary::default();
        let mut succeeded = Vec::new();

        for rec in records {
            let row = sqlx::query(
                r#"
                INSERT INTO filtered_currencies
                    (id, coin_id, symbol, name, current_price, market_cap,
                     total_volume, price_change_24h_pct, fetched_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT (coin_id)
                DO UPDATE SET symbol = EXCLUDED.symbol,
                              name = EXCLUDED.name,
                              current_price = EXCLUDED.current_price,
                              market_cap = EXCLUDED.market_cap,
                              total_volume = EXCLUDED.total_volume,
                              price_change_24h_pct = EXCLUDED.price_change_24h_pct,
                              fetched_at = EXCLUDED.fetched_at
                RETURNING (xmax = 0) AS inserted
                "#,
            )
            .bind(rec.id)
            .bind(&rec.coin_id)
            .bind(&rec.symbol)
            .bind(&rec.name)
            .bind(rec.current_price)
            .bind(rec.market_cap)
            .bind(rec.total_volume)
            .bind(rec.price_change_24h_pct)
            .bind(rec.fetched_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                log_partial_failure("filtered_currencies", &succeeded, &rec.coin_id);
                WriteError::from(e)
            })?;

            summary.record(row.get::<bool, _>("inserted"));
            succeeded.push(rec.coin_id.clone());
        }

        Ok(summary)
    }
}
