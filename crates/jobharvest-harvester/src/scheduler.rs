//! Periodic harvest cycles with a bounded pool for manual triggers.
//!
//! Every cycle (timer tick, [`CycleScheduler::trigger`], or
//! [`CycleScheduler::run_now`]) needs a permit from one semaphore, so at most
//! `max_concurrent_cycles` cycles overlap. Timer ticks that find the pool
//! saturated are skipped; manual triggers queue for a permit.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jobharvest_core::{HarvestConfig, HarvestResult, Platform};
use jobharvest_db::ListingFilter;
use serde::Serialize;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio_cron_scheduler::{Job, JobScheduler};
use uuid::Uuid;

use crate::error::HarvestError;
use crate::orchestrator::Harvester;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleState {
    Idle,
    Running,
}

/// Identifies a cycle submitted through [`CycleScheduler::trigger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CycleTicket(pub u64);

/// Progress of a triggered cycle, looked up with [`CycleScheduler::ticket_status`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum TicketStatus {
    /// Waiting for a free cycle slot.
    Queued,
    Running,
    Succeeded { result: HarvestResult },
    Failed { error: String },
}

impl TicketStatus {
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }
}

/// Finished tickets beyond this many are forgotten, oldest first.
const TICKET_HISTORY: usize = 64;

#[derive(Debug, Clone, Serialize)]
pub struct CycleStatus {
    pub state: CycleState,
    /// Whether the interval timer is active.
    pub scheduled: bool,
    pub running_cycles: usize,
    pub last_run: Option<DateTime<Utc>>,
    pub last_result: Option<HarvestResult>,
    /// Error of the most recent cycle, cleared by the next successful one.
    pub last_error: Option<String>,
    pub next_run: Option<DateTime<Utc>>,
    /// Active listings per platform, read from the store.
    pub platform_counts: BTreeMap<Platform, u64>,
}

/// Bookkeeping shared by the scheduler and its cycle tasks. Only ever
/// locked briefly; never held across a harvest cycle.
#[derive(Debug, Default)]
struct SchedulerState {
    running_cycles: usize,
    next_ticket: u64,
    last_run: Option<DateTime<Utc>>,
    last_result: Option<HarvestResult>,
    last_error: Option<String>,
    next_run: Option<DateTime<Utc>>,
    tickets: BTreeMap<CycleTicket, TicketStatus>,
}

impl SchedulerState {
    fn remember(&mut self, ticket: CycleTicket, status: TicketStatus) {
        self.tickets.insert(ticket, status);
        while self.tickets.len() > TICKET_HISTORY {
            let Some(oldest) = self
                .tickets
                .iter()
                .find(|(_, s)| s.is_finished())
                .map(|(t, _)| *t)
            else {
                break;
            };
            self.tickets.remove(&oldest);
        }
    }
}

struct CycleRunner {
    harvester: Arc<Harvester>,
    config: HarvestConfig,
    permits: Arc<Semaphore>,
    state: Mutex<SchedulerState>,
}

impl CycleRunner {
    /// Runs one cycle and records its outcome. The cycle itself runs on a
    /// separate task, so a panic inside it is recorded as a failed cycle.
    async fn run(
        &self,
        _permit: OwnedSemaphorePermit,
        ticket: Option<CycleTicket>,
    ) -> Result<HarvestResult, HarvestError> {
        {
            let mut state = self.state.lock().await;
            state.running_cycles += 1;
            state.last_run = Some(Utc::now());
            if let Some(ticket) = ticket {
                state.remember(ticket, TicketStatus::Running);
            }
        }

        let harvester = Arc::clone(&self.harvester);
        let config = self.config.clone();
        let cycle = tokio::spawn(async move { harvester.run_harvest_cycle(&config).await });
        let outcome = match cycle.await {
            Ok(outcome) => outcome,
            Err(join_err) => Err(HarvestError::CycleAborted(join_err.to_string())),
        };

        let mut state = self.state.lock().await;
        state.running_cycles = state.running_cycles.saturating_sub(1);
        let ticket_id = ticket.map(|t| t.0);
        let finished = match &outcome {
            Ok(result) => {
                tracing::info!(
                    ticket = ticket_id,
                    saved = result.total_saved,
                    failed = result.total_failed,
                    "harvest cycle complete"
                );
                state.last_result = Some(result.clone());
                state.last_error = None;
                TicketStatus::Succeeded {
                    result: result.clone(),
                }
            }
            Err(e) => {
                tracing::error!(ticket = ticket_id, error = %e, "harvest cycle failed");
                state.last_error = Some(e.to_string());
                TicketStatus::Failed {
                    error: e.to_string(),
                }
            }
        };
        if let Some(ticket) = ticket {
            state.remember(ticket, finished);
        }
        outcome
    }
}

/// Drives [`Harvester`] cycles on a fixed interval.
pub struct CycleScheduler {
    runner: Arc<CycleRunner>,
    interval: Duration,
    max_concurrent_cycles: usize,
    timer: Mutex<Option<(JobScheduler, Uuid)>>,
}

impl CycleScheduler {
    #[must_use]
    pub fn new(
        harvester: Arc<Harvester>,
        config: HarvestConfig,
        interval: Duration,
        max_concurrent_cycles: usize,
    ) -> Self {
        let max_concurrent_cycles = max_concurrent_cycles.max(1);
        Self {
            runner: Arc::new(CycleRunner {
                harvester,
                config,
                permits: Arc::new(Semaphore::new(max_concurrent_cycles)),
                state: Mutex::new(SchedulerState::default()),
            }),
            interval,
            max_concurrent_cycles,
            timer: Mutex::new(None),
        }
    }

    /// Starts the interval timer. The first cycle fires one interval from now.
    ///
    /// # Errors
    ///
    /// [`HarvestError::AlreadyRunning`] if the timer is already active, or
    /// [`HarvestError::Scheduler`] if the job scheduler cannot start.
    pub async fn start(&self) -> Result<(), HarvestError> {
        let mut timer = self.timer.lock().await;
        if timer.is_some() {
            return Err(HarvestError::AlreadyRunning);
        }

        let scheduler = JobScheduler::new().await?;
        let runner = Arc::clone(&self.runner);
        let interval = self.interval;

        let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
            let runner = Arc::clone(&runner);
            Box::pin(async move {
                runner.state.lock().await.next_run = Some(next_after(interval));

                let Ok(permit) = Arc::clone(&runner.permits).try_acquire_owned() else {
                    tracing::warn!("scheduler: all cycle slots busy; skipping this tick");
                    return;
                };
                tracing::info!("scheduler: starting harvest cycle");
                // Outcome is recorded in the scheduler state.
                runner.run(permit, None).await.ok();
            })
        })?;

        let job_id = scheduler.add(job).await?;
        scheduler.start().await?;
        self.runner.state.lock().await.next_run = Some(next_after(interval));

        tracing::info!(interval_secs = interval.as_secs(), "cycle scheduler started");
        *timer = Some((scheduler, job_id));
        Ok(())
    }

    /// Stops the interval timer and waits for in-flight cycles to finish.
    /// Stopping a scheduler that is not running is a no-op.
    ///
    /// # Errors
    ///
    /// [`HarvestError::Scheduler`] if the job scheduler fails to shut down.
    pub async fn stop(&self) -> Result<(), HarvestError> {
        let Some((mut scheduler, job_id)) = self.timer.lock().await.take() else {
            return Ok(());
        };

        scheduler.remove(&job_id).await?;
        scheduler.shutdown().await?;
        self.runner.state.lock().await.next_run = None;

        let all = u32::try_from(self.max_concurrent_cycles).unwrap_or(u32::MAX);
        if let Ok(drained) = self.runner.permits.acquire_many(all).await {
            drop(drained);
        }

        tracing::info!("cycle scheduler stopped");
        Ok(())
    }

    /// Submits a cycle to the bounded pool and returns without waiting.
    /// Track it with [`CycleScheduler::ticket_status`].
    pub async fn trigger(&self) -> CycleTicket {
        let ticket = {
            let mut state = self.runner.state.lock().await;
            state.next_ticket += 1;
            let ticket = CycleTicket(state.next_ticket);
            state.remember(ticket, TicketStatus::Queued);
            ticket
        };

        let runner = Arc::clone(&self.runner);
        tokio::spawn(async move {
            let Ok(permit) = Arc::clone(&runner.permits).acquire_owned().await else {
                runner.state.lock().await.remember(
                    ticket,
                    TicketStatus::Failed {
                        error: "cycle pool closed".to_owned(),
                    },
                );
                return;
            };
            tracing::info!(ticket = ticket.0, "scheduler: running triggered cycle");
            runner.run(permit, Some(ticket)).await.ok();
        });

        ticket
    }

    /// Where a triggered cycle stands. `None` for tickets never issued or
    /// already evicted from the history.
    pub async fn ticket_status(&self, ticket: CycleTicket) -> Option<TicketStatus> {
        self.runner.state.lock().await.tickets.get(&ticket).cloned()
    }

    /// Runs a cycle through the bounded pool and waits for its result.
    ///
    /// # Errors
    ///
    /// Propagates the cycle's [`HarvestError`].
    pub async fn run_now(&self) -> Result<HarvestResult, HarvestError> {
        let permit = Arc::clone(&self.runner.permits)
            .acquire_owned()
            .await
            .map_err(|_| HarvestError::AlreadyRunning)?;
        let runner = Arc::clone(&self.runner);
        // Detached so a caller that stops waiting cannot strand the bookkeeping.
        match tokio::spawn(async move { runner.run(permit, None).await }).await {
            Ok(outcome) => outcome,
            Err(join_err) => Err(HarvestError::CycleAborted(join_err.to_string())),
        }
    }

    /// Snapshot of scheduler state plus per-platform active listing counts.
    pub async fn status(&self) -> CycleStatus {
        let scheduled = self.timer.lock().await.is_some();
        let mut status = {
            let state = self.runner.state.lock().await;
            CycleStatus {
                state: if state.running_cycles > 0 {
                    CycleState::Running
                } else {
                    CycleState::Idle
                },
                scheduled,
                running_cycles: state.running_cycles,
                last_run: state.last_run,
                last_result: state.last_result.clone(),
                last_error: state.last_error.clone(),
                next_run: state.next_run,
                platform_counts: BTreeMap::new(),
            }
        };

        let store = self.runner.harvester.store();
        for platform in Platform::ALL {
            let filter = ListingFilter {
                platform: Some(platform),
                is_active: Some(true),
                posted_after: None,
            };
            match store.count(&filter).await {
                Ok(count) => {
                    status.platform_counts.insert(platform, count);
                }
                Err(e) => {
                    tracing::warn!(%platform, error = %e, "could not count listings for status");
                }
            }
        }
        status
    }
}

fn next_after(interval: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(interval)
        .ok()
        .and_then(|step| Utc::now().checked_add_signed(step))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
