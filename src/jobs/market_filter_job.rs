use chrono::Utc;
use tracing::info;

use crate::jobs::JobError;
use crate::services::filter;
use crate::services::normalizer;
use crate::services::scheduler::{JobContext, JobResult};

const MARKETS_PER_PAGE: u32 = 100;

/// Fetches the market listing, applies the configured price/market-cap/volume
/// bounds and upserts the surviving coins keyed on their source coin id.
pub async fn run(ctx: JobContext) -> Result<JobResult, JobError> {
    let cfg = &ctx.config;

    let raw = ctx
        .coingecko
        .markets(&cfg.vs_currency, MARKETS_PER_PAGE, 1)
        .await?;

    let batch = normalizer::normalize_markets(&raw, Utc::now())?;
    let skipped = batch.skipped;
    let candidates = batch.records.len();

    let records = filter::apply(batch.records, &cfg.market_filter);
    let summary = ctx.store.upsert_filtered_currencies(&records).await?;

    info!(
        "market filter: {} of {} candidates passed, {} written ({} inserted, {} matched), {} skipped",
        records.len(),
        candidates,
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
