//! Background Jobs Module
//!
//! The four scheduled ingestion pipelines, each a strict
//! fetch -> normalize -> filter -> write sequence executed by the scheduler:
//!
//! - `price_refresh_job` - spot prices for the configured coin ids
//! - `social_trends_job` - top social posts per configured subreddit
//! - `investors_job` - investor/institutional-backer listing
//! - `market_filter_job` - market listing filtered down to candidate coins
//!
//! Jobs are idempotent (records are upserted on their natural keys), isolated
//! (an error ends only that invocation; retry is the next tick) and report a
//! `JobResult` with processed/skipped counts for observability.

pub mod investors_job;
pub mod market_filter_job;
pub mod price_refresh_job;
pub mod social_trends_job;

use thiserror::Error;

use crate::db::store::WriteError;
use crate::external::client::FetchError;
use crate::services::normalizer::NormalizationError;

/// Anything that can end a job invocation. Caught at the job boundary by the
/// scheduler; nothing here is fatal to the process.
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    #[error(transparent)]
    Write(#[from] WriteError),
}
