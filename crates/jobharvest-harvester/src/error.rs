use jobharvest_db::StoreError;
use thiserror::Error;
use tokio_cron_scheduler::JobSchedulerError;

#[derive(Debug, Error)]
pub enum HarvestError {
    /// The preflight health check failed; nothing was scraped.
    #[error("listing store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    #[error("listing store write failed: {0}")]
    Store(#[from] StoreError),

    /// The cycle task panicked or was cancelled before producing a result.
    #[error("harvest cycle aborted: {0}")]
    CycleAborted(String),

    #[error("scheduler error: {0}")]
    Scheduler(#[from] JobSchedulerError),

    #[error("cycle scheduler is already running")]
    AlreadyRunning,
}
