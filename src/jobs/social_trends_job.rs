use chrono::Utc;
use futures::future::join_all;
use tracing::info;

use crate::jobs::JobError;
use crate::services::normalizer;
use crate::services::scheduler::{JobContext, JobResult};

/// Fetches the top listing of every configured subreddit concurrently, joins
/// all of them, and upserts the normalized items on (external_id, platform).
/// No numeric bounds apply to social items; the filter stage is the identity.
pub async fn run(ctx: JobContext) -> Result<JobResult, JobError> {
    let cfg = &ctx.config;
    let fetched_at = Utc::now();

    // All in-flight calls are joined before the job can complete, so the
    // non-overlap guarantee covers every request this invocation issued.
    let listings = join_all(
        cfg.subreddits
            .iter()
            .map(|subreddit| ctx.reddit.top_listing(subreddit)),
    )
    .await;

    let mut records = Vec::new();
    let mut skipped = 0;

    for (subreddit, listing) in cfg.subreddits.iter().zip(listings) {
        let raw = listing?;
        let batch = normalizer::normalize_social(&raw, fetched_at)?;
        info!(
            "r/{}: {} items normalized, {} skipped",
            subreddit,
            batch.records.len(),
            batch.skipped
        );
        skipped += batch.skipped;
        records.extend(batch.records);
    }

    let summary = ctx.store.upsert_social_trends(&records).await?;

    info!(
        "social trends: {} written ({} inserted, {} matched), {} skipped",
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
