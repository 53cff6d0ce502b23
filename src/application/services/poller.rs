use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::application::ports::{ApiError, DocumentApi, Notification, Notifier};
use crate::domain::{JobId, JobStatus};

use super::JobStore;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(300);
pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 12;

/// Timing of the status poll loop and the retry budget of a single job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Failed polls in a row before a job is marked stalled. Zero never stalls.
    pub max_consecutive_failures: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
        }
    }
}

impl PollPolicy {
    /// Delay before the next attempt after `failures` consecutive failures.
    pub fn backoff_for(&self, failures: u32) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }
        let exponent = failures.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub polled: usize,
    pub updated: usize,
    pub failed: usize,
    pub skipped: usize,
    pub stalled: usize,
}

struct RetryState {
    failures: u32,
    next_attempt: Instant,
}

/// Refreshes every non-terminal job of a [`JobStore`] on a fixed interval.
pub struct Poller {
    store: Arc<JobStore>,
    api: Arc<dyn DocumentApi>,
    notifier: Arc<dyn Notifier>,
    policy: PollPolicy,
    retries: Mutex<HashMap<JobId, RetryState>>,
}

impl Poller {
    pub fn new(
        store: Arc<JobStore>,
        api: Arc<dyn DocumentApi>,
        notifier: Arc<dyn Notifier>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            store,
            api,
            notifier,
            policy,
            retries: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Runs one poll tick. Jobs are polled one after another; a failing job
    /// never aborts the tick for the others.
    ///
    /// Backoff deadlines count from the start of the tick, so request latency
    /// does not push a retry past the tick it was scheduled for.
    pub async fn tick(&self) -> TickReport {
        let started = Instant::now();
        let mut report = TickReport::default();

        for job_id in self.store.active_job_ids().await {
            if !self.is_due(&job_id, started).await {
                report.skipped += 1;
                continue;
            }
            report.polled += 1;

            match self.api.job_status(&job_id).await {
                Ok(update) => {
                    self.retries.lock().await.remove(&job_id);
                    let status = update.status;
                    let file_name = update.file_name.clone();
                    let message = update.message.clone();

                    match self.store.apply_update(&job_id, update).await {
                        Ok(true) => {
                            report.updated += 1;
                            tracing::debug!(job_id = %job_id, status = %status, "Job status updated");
                            self.announce(status, &file_name, &message);
                        }
                        Ok(false) => {}
                        Err(e) => {
                            report.failed += 1;
                            tracing::warn!(job_id = %job_id, error = %e, "Failed to apply job status");
                        }
                    }
                }
                Err(e) if e.is_auth_failure() => {
                    report.failed += 1;
                    tracing::warn!(
                        job_id = %job_id,
                        error = %e,
                        "Session rejected while polling; remaining jobs wait for the next tick"
                    );
                    break;
                }
                Err(e) => {
                    report.failed += 1;
                    if self.record_failure(&job_id, &e, started).await {
                        report.stalled += 1;
                    }
                }
            }
        }

        report
    }

    async fn is_due(&self, job_id: &JobId, now: Instant) -> bool {
        self.retries
            .lock()
            .await
            .get(job_id)
            .is_none_or(|state| now >= state.next_attempt)
    }

    /// Returns `true` when the job ran out of retries and was marked stalled.
    async fn record_failure(
        &self,
        job_id: &JobId,
        error: &ApiError,
        tick_started: Instant,
    ) -> bool {
        let (failures, exhausted) = {
            let mut retries = self.retries.lock().await;
            let state = retries.entry(job_id.clone()).or_insert(RetryState {
                failures: 0,
                next_attempt: tick_started,
            });
            state.failures += 1;
            state.next_attempt = tick_started + self.policy.backoff_for(state.failures);
            let failures = state.failures;

            let exhausted = self.policy.max_consecutive_failures > 0
                && failures >= self.policy.max_consecutive_failures;
            if exhausted {
                retries.remove(job_id);
            }
            (failures, exhausted)
        };

        if !exhausted {
            tracing::warn!(
                job_id = %job_id,
                error = %error,
                failures,
                retry_in_ms = self.policy.backoff_for(failures).as_millis() as u64,
                "Job status poll failed"
            );
            return false;
        }

        let reason = format!(
            "Status unavailable after {} attempts: {}",
            failures, error
        );
        match self.store.mark_stalled(job_id, reason).await {
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "Failed to persist stalled job");
            }
        }
        let file_name = self
            .store
            .get(job_id)
            .await
            .map(|j| j.file_name)
            .unwrap_or_else(|| job_id.to_string());
        tracing::error!(job_id = %job_id, failures, "Giving up on job status polling");
        self.notifier.notify(Notification::warning(format!(
            "Stopped tracking {}: the status service did not respond",
            file_name
        )));
        true
    }

    fn announce(&self, status: JobStatus, file_name: &str, message: &str) {
        match status {
            JobStatus::Complete => self
                .notifier
                .notify(Notification::success(format!("{} processed", file_name))),
            JobStatus::Failed => self.notifier.notify(Notification::error(format!(
                "Processing failed for {}: {}",
                file_name, message
            ))),
            _ => {}
        }
    }

    /// Polls until `shutdown` fires. The first tick happens one interval after
    /// start; a tick that overruns delays the next one instead of bursting.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        tracing::info!(
            username = %self.store.session().username,
            interval_ms = self.policy.interval.as_millis() as u64,
            "Poller started"
        );

        let mut interval =
            tokio::time::interval_at(Instant::now() + self.policy.interval, self.policy.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    let report = self.tick().await;
                    if report.polled > 0 {
                        tracing::debug!(
                            polled = report.polled,
                            updated = report.updated,
                            failed = report.failed,
                            skipped = report.skipped,
                            stalled = report.stalled,
                            "Poll tick finished"
                        );
                    }
                }
            }
        }

        tracing::info!("Poller stopped");
    }

    pub fn spawn(self: Arc<Self>, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
