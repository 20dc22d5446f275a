use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::future::BoxFuture;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::db::store::RecordStore;
use crate::external::coingecko::CoinGeckoProvider;
use crate::external::investors::InvestorApiProvider;
use crate::external::reddit::RedditProvider;
use crate::jobs::JobError;

/// Shared resources handed to every job invocation.
#[derive(Clone)]
pub struct JobContext {
    pub store: Arc<dyn RecordStore>,
    pub coingecko: Arc<CoinGeckoProvider>,
    pub reddit: Arc<RedditProvider>,
    pub investors: Arc<InvestorApiProvider>,
    pub config: Arc<Config>,
}

#[derive(Debug)]
pub struct JobResult {
    pub items_processed: i32,
    pub items_failed: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Idle,
    Running,
    /// Last invocation errored; the cause is in `JobStatus::last_error`.
    /// Cleared when the next invocation starts.
    Failed,
}

impl Default for JobState {
    fn default() -> Self {
        JobState::Idle
    }
}

/// Last-known status of one job, kept in memory for the /api/jobs endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobStatus {
    pub state: JobState,
    pub last_started_at: Option<DateTime<Utc>>,
    pub last_finished_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub last_items_processed: Option<i32>,
    pub last_items_failed: Option<i32>,
    pub runs_completed: u64,
}

type JobFn = Arc<dyn Fn(JobContext) -> BoxFuture<'static, Result<JobResult, JobError>> + Send + Sync>;

struct JobSpec {
    name: &'static str,
    every: Duration,
    run: JobFn,
}

/// Interval-driven scheduler owning a set of named jobs.
///
/// Each job runs in its own task, looping on a `tokio` interval with
/// `MissedTickBehavior::Skip` and awaiting the job body inline. Invocation
/// N+1 of a job therefore never starts before invocation N finishes; ticks
/// that elapse while a run is in flight are skipped, not queued. Jobs are
/// isolated: a failing invocation is logged and the loop proceeds to its
/// next tick without touching any other job.
pub struct Scheduler {
    context: JobContext,
    jobs: Vec<JobSpec>,
    statuses: Arc<DashMap<&'static str, JobStatus>>,
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(context: JobContext) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            context,
            jobs: Vec::new(),
            statuses: Arc::new(DashMap::new()),
            shutdown_tx,
            handles: Vec::new(),
        }
    }

    pub fn register<F, Fut>(&mut self, name: &'static str, every: Duration, job_fn: F)
    where
        F: Fn(JobContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<JobResult, JobError>> + Send + 'static,
    {
        self.statuses.insert(name, JobStatus::default());
        self.jobs.push(JobSpec {
            name,
            every,
            run: Arc::new(move |ctx| Box::pin(job_fn(ctx))),
        });
    }

    /// Activates every registered job. Nothing fires immediately; each job's
    /// first run happens one full interval after this call.
    pub fn start(&mut self) {
        for spec in &self.jobs {
            info!("📅 scheduled job {} every {:?}", spec.name, spec.every);
            self.handles.push(spawn_job_loop(
                spec.name,
                spec.every,
                spec.run.clone(),
                self.context.clone(),
                self.statuses.clone(),
                self.shutdown_tx.subscribe(),
            ));
        }
        info!("🚀 scheduler started with {} jobs", self.jobs.len());
    }

    /// Signals every job loop to halt and waits for in-flight invocations to
    /// run to completion. Never aborts a pipeline mid-write.
    pub async fn stop(&mut self) {
        if self.handles.is_empty() {
            return;
        }
        info!("🛑 stopping scheduler...");
        let _ = self.shutdown_tx.send(true);
        for handle in self.handles.drain(..) {
            let _ = handle.await;
        }
        info!("✅ scheduler stopped");
    }

    pub fn status_snapshot(&self) -> BTreeMap<String, JobStatus> {
        self.statuses
            .iter()
            .map(|e| (e.key().to_string(), e.value().clone()))
            .collect()
    }

    pub fn statuses(&self) -> Arc<DashMap<&'static str, JobStatus>> {
        self.statuses.clone()
    }
}

fn spawn_job_loop(
    name: &'static str,
    every: Duration,
    run: JobFn,
    context: JobContext,
    statuses: Arc<DashMap<&'static str, JobStatus>>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The interval's first tick completes immediately; consume it so the
        // job waits a full interval before its first run.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    run_once(name, every, &run, &context, &statuses).await;
                }
                _ = shutdown.changed() => {
                    info!("job {} loop stopped", name);
                    break;
                }
            }
        }
    })
}

/// One invocation: Idle -> Running -> Idle (or Failed, with the cause kept
/// until the next run), with any error caught at this boundary so it cannot
/// affect the timer or any other job.
async fn run_once(
    name: &'static str,
    every: Duration,
    run: &JobFn,
    context: &JobContext,
    statuses: &DashMap<&'static str, JobStatus>,
) {
    {
        let mut entry = statuses.entry(name).or_default();
        entry.state = JobState::Running;
        entry.last_started_at = Some(Utc::now());
    }
    info!("🏃 job {} started", name);
    let t0 = Instant::now();

    let result = run(context.clone()).await;

    let elapsed = t0.elapsed();
    let mut entry = statuses.entry(name).or_default();
    entry.last_finished_at = Some(Utc::now());
    entry.runs_completed += 1;

    match result {
        Ok(r) => {
            info!(
                "✅ job {} completed (processed: {}, skipped: {}, {}ms)",
                name,
                r.items_processed,
                r.items_failed,
                elapsed.as_millis()
            );
            entry.state = JobState::Idle;
            entry.last_error = None;
            entry.last_items_processed = Some(r.items_processed);
            entry.last_items_failed = Some(r.items_failed);
        }
        Err(e) => {
            error!("❌ job {} failed: {}", name, e);
            entry.state = JobState::Failed;
            entry.last_error = Some(e.to_string());
        }
    }

    if elapsed > every {
        warn!(
            "job {} ran for {}ms, longer than its {}ms interval; intervening ticks were skipped",
            name,
            elapsed.as_millis(),
            every.as_millis()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::db::mem::MemoryStore;
    use crate::external::client::UpstreamClient;

    fn test_context() -> JobContext {
        let client = UpstreamClient::new(Duration::from_secs(1)).unwrap();
        JobContext {
            store: Arc::new(MemoryStore::new()),
            coingecko: Arc::new(CoinGeckoProvider::new(client.clone())),
            reddit: Arc::new(RedditProvider::new(client.clone(), None)),
            investors: Arc::new(InvestorApiProvider::new(client, "http://invalid".into())),
            config: Arc::new(Config::from_env()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_ticks_are_skipped_not_queued() {
        let mut scheduler = Scheduler::new(test_context());
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();

        // 250ms body on a 100ms interval: ticks at 200ms and 300ms fall
        // inside the first run and must be skipped.
        scheduler.register("slow", Duration::from_millis(100), move |_ctx| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(250)).await;
                Ok(JobResult { items_processed: 0, items_failed: 0 })
            }
        });
        scheduler.start();

        // Runs: 100-350ms and 400-650ms. Stop mid-second-run.
        tokio::time::sleep(Duration::from_millis(645)).await;
        scheduler.stop().await;

        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn jobs_do_not_fire_at_start() {
        let mut scheduler = Scheduler::new(test_context());
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();

        scheduler.register("quiet", Duration::from_millis(100), move |_ctx| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(JobResult { items_processed: 0, items_failed: 0 })
            }
        });
        scheduler.start();

        tokio::time::sleep(Duration::from_millis(50)).await;
        scheduler.stop().await;

        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn a_failing_job_does_not_affect_its_siblings() {
        let mut scheduler = Scheduler::new(test_context());
        let ok_runs = Arc::new(AtomicUsize::new(0));
        let counter = ok_runs.clone();

        scheduler.register("doomed", Duration::from_millis(100), |_ctx| async {
            Err(JobError::Write(crate::db::store::WriteError(
                "store unavailable".into(),
            )))
        });
        scheduler.register("healthy", Duration::from_millis(100), move |_ctx| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(JobResult { items_processed: 1, items_failed: 0 })
            }
        });
        scheduler.start();

        tokio::time::sleep(Duration::from_millis(250)).await;
        scheduler.stop().await;

        assert_eq!(ok_runs.load(Ordering::SeqCst), 2);
        let snapshot = scheduler.status_snapshot();
        let doomed = &snapshot["doomed"];
        assert_eq!(doomed.runs_completed, 2);
        assert!(doomed.last_error.as_deref().unwrap().contains("store unavailable"));
        assert_eq!(doomed.state, JobState::Failed);
        assert!(snapshot["healthy"].last_error.is_none());
        assert_eq!(snapshot["healthy"].state, JobState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_waits_for_the_inflight_invocation() {
        let mut scheduler = Scheduler::new(test_context());
        let finished = Arc::new(AtomicUsize::new(0));
        let flag = finished.clone();

        scheduler.register("inflight", Duration::from_millis(100), move |_ctx| {
            let flag = flag.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                flag.fetch_add(1, Ordering::SeqCst);
                Ok(JobResult { items_processed: 0, items_failed: 0 })
            }
        });
        scheduler.start();

        // First run starts at 100ms and finishes at 150ms; stop at 110ms must
        // wait for it rather than abort it.
        tokio::time::sleep(Duration::from_millis(110)).await;
        scheduler.stop().await;

        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }
}
