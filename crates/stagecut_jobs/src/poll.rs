use crate::error::{JobError, Result};
use crate::{JobBackend, JobId, StatusReport};
use std::time::Duration;
use tokio::sync::watch;

/// Poll cadence and the bound on how long a job may stay unsettled.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_wait: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(300),
        }
    }
}

impl PollConfig {
    /// How many status checks fit inside `max_wait`.
    pub fn max_attempts(&self) -> u32 {
        let interval = self.interval.as_millis().max(1);
        (self.max_wait.as_millis() / interval).max(1) as u32
    }
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_canceled(&self) -> bool {
        *self.rx.borrow()
    }

    async fn canceled(&mut self) {
        while !*self.rx.borrow() {
            if self.rx.changed().await.is_err() {
                // Handle dropped without canceling; never resolve.
                std::future::pending::<()>().await;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Polling loop
// ---------------------------------------------------------------------------

/// Poll `id` until it settles, the attempt budget runs out, or the token
/// cancels. Backend errors propagate immediately.
pub async fn poll_until_settled<B: JobBackend>(
    backend: &B,
    id: &JobId,
    config: PollConfig,
    mut cancel: CancelToken,
) -> Result<StatusReport> {
    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    for attempt in 0..config.max_attempts() {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = cancel.canceled() => {
                tracing::info!(job = %id, "polling canceled");
                return Err(JobError::Canceled);
            }
        }

        let report = backend.status(id).await?;
        tracing::debug!(job = %id, attempt, status = ?report.status, "polled job");
        if report.status.is_settled() {
            return Ok(report);
        }
    }

    tracing::warn!(job = %id, max_wait = ?config.max_wait, "job did not settle in time");
    Err(JobError::TimedOut)
}
