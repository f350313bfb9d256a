//! Periodic job runner
//!
//! A [`Trigger`] runs an async job on the tokio runtime every `period`,
//! starting one period after creation. Ticks missed while a job is still
//! running are delayed rather than bunched up.

use crate::domain::{Result, StrataError};
use std::future::Future;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Handle to a running periodic task; dropping it stops the task
pub struct Trigger {
    period: Duration,
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Trigger {
    /// Spawn `job` every `period` on the current tokio runtime
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Trigger`] when called outside a tokio runtime
    /// or with a zero period.
    pub fn start<F, Fut>(period: Duration, job: F) -> Result<Self>
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if period.is_zero() {
            return Err(StrataError::Trigger("period must be greater than 0".to_string()));
        }
        let handle = Handle::try_current()
            .map_err(|e| StrataError::Trigger(format!("no tokio runtime available: {e}")))?;

        let (stop, mut stopped) = watch::channel(false);
        let task = handle.spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => job().await,
                    changed = stopped.changed() => {
                        if changed.is_err() || *stopped.borrow() {
                            break;
                        }
                    }
                }
            }

            tracing::debug!(period_ms = period.as_millis() as u64, "Trigger stopped");
        });

        tracing::debug!(period_ms = period.as_millis() as u64, "Trigger started");
        Ok(Self { period, stop, task })
    }

    /// Signal the task to stop; an in-flight job still completes
    pub fn stop(&self) {
        self.stop.send_replace(true);
    }

    /// Whether the task is still scheduled
    pub fn is_running(&self) -> bool {
        !*self.stop.borrow() && !self.task.is_finished()
    }

    /// Time between two runs
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Drop for Trigger {
    fn drop(&mut self) {
        self.stop();
    }
}
