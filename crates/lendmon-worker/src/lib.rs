//! Periodic job scheduler.
//!
//! Each registered [`Job`] gets its own tokio task: one run immediately
//! on start, then one per interval tick. A run that fails or panics is
//! logged and never affects other jobs or future ticks. A run that
//! overruns its interval coalesces the ticks it missed: the next run
//! starts when the slow one finishes, and no backlog forms.


use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// A periodic monitoring job.
#[async_trait]
pub trait Job: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Tick period. Must be positive.
    fn interval(&self) -> Duration;

    /// One monitoring pass. Errors are logged by the worker, not
    /// propagated.
    async fn run(&self) -> anyhow::Result<()>;

    /// Resource release at shutdown. Jobs without resources keep the
    /// default.
    async fn close(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Runs registered jobs concurrently, each on its own interval.
#[derive(Default)]
pub struct Worker {
    jobs: Vec<Arc<dyn Job>>,
    handles: Vec<JoinHandle<()>>,
}

impl Worker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, job: Arc<dyn Job>) {
        self.jobs.push(job);
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Launches one task per registered job. Call once.
    pub fn start(&mut self, cancel: CancellationToken) {
        for job in &self.jobs {
            let job = job.clone();
            let cancel = cancel.clone();
            self.handles.push(tokio::spawn(run_job(job, cancel)));
        }
        tracing::info!(count = self.jobs.len(), "workers started");
    }

    /// Blocks until every worker task has exited.
    pub async fn wait(&mut self) {
        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    tracing::error!(error = %e, "worker task panicked");
                }
            }
        }
    }

    /// Invokes each job's `close`. Call after `wait`.
    pub async fn close(&self) {
        for job in &self.jobs {
            match job.close().await {
                Ok(()) => tracing::info!(job = job.name(), "closed"),
                Err(e) => tracing::error!(job = job.name(), error = %e, "error closing"),
            }
        }
    }
}

async fn run_job(job: Arc<dyn Job>, cancel: CancellationToken) {
    tracing::info!(job = job.name(), "started");

    execute(&job, &cancel).await;

    let period = job.interval();
    let mut tick = interval_at(Instant::now() + period, period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(job = job.name(), "stopped");
                return;
            }
            _ = tick.tick() => {
                execute(&job, &cancel).await;
            }
        }
    }
}

/// One run under a fault barrier: the run happens in its own task so a
/// panic is contained, and cancellation aborts it at the next await
/// point.
async fn execute(job: &Arc<dyn Job>, cancel: &CancellationToken) {
    let start = Instant::now();
    let runner = job.clone();
    let mut handle = tokio::spawn(async move { runner.run().await });

    tokio::select! {
        _ = cancel.cancelled() => {
            handle.abort();
            tracing::info!(job = job.name(), "run aborted for shutdown");
        }
        result = &mut handle => {
            let elapsed = start.elapsed();
            match result {
                Ok(Ok(())) => {
                    tracing::debug!(job = job.name(), ?elapsed, "completed");
                }
                Ok(Err(e)) => {
                    tracing::error!(job = job.name(), ?elapsed, error = %e, "run failed");
                }
                Err(e) if e.is_panic() => {
                    tracing::error!(job = job.name(), ?elapsed, error = %e, "run panicked");
                }
                Err(_) => {}
            }
        }
    }
}
