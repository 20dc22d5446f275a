use chrono::Utc;
use tracing::info;

use crate::jobs::JobError;
use crate::services::normalizer;
use crate::services::scheduler::{JobContext, JobResult};

/// Fetches the investor listing and upserts one record per investor, keyed on
/// name. Identity filter; investors carry no filterable market metrics.
pub async fn run(ctx: JobContext) -> Result<JobResult, JobError> {
    let raw = ctx.investors.list_investors(&ctx.config.coin_ids).await?;

    let batch = normalizer::normalize_investors(&raw, Utc::now())?;
    let skipped = batch.skipped;

    let summary = ctx.store.upsert_investors(&batch.records).await?;

    info!(
        "investors: {} written ({} inserted, {} matched), {} skipped",
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
