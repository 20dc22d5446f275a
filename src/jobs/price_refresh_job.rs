use chrono::Utc;
use tracing::info;

use crate::jobs::JobError;
use crate::services::filter;
use crate::services::normalizer;
use crate::services::scheduler::{JobContext, JobResult};

/// Fetches spot prices for the configured coin ids and upserts one record per
/// coin, keyed on (symbol, polling-interval bucket).
pub async fn run(ctx: JobContext) -> Result<JobResult, JobError> {
    let cfg = &ctx.config;

    let raw = ctx
        .coingecko
        .simple_price(&cfg.coin_ids, &cfg.vs_currency)
        .await?;

    // The pipeline stamps its own UTC observation time; upstream timestamps
    // are never trusted.
    let observed_at = Utc::now();
    let bucket = chrono::Duration::from_std(cfg.intervals.prices)
        .unwrap_or_else(|_| chrono::Duration::minutes(10));

    let batch = normalizer::normalize_prices(&raw, observed_at, bucket)?;
    let skipped = batch.skipped;

    let records = filter::apply(batch.records, &cfg.price_filter);
    let summary = ctx.store.upsert_prices(&records).await?;

    info!(
        "price refresh: {} written ({} inserted, {} matched), {} skipped",
        summary.total(),
        summary.inserted,
        summary.matched,
        skipped
    );

    Ok(JobResult {
        items_processed: summary.total() as i32,
        items_failed: skipped as i32,
    })
}
