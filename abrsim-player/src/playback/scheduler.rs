//! Recurring scheduled tasks
//!
//! A [`ScheduledTask`] runs an async tick closure every `period` on the tokio
//! runtime until either the closure returns [`TaskControl::Finish`] or its
//! cancellation token is cancelled. The first tick fires one period after
//! spawn; each later tick is scheduled one period after the previous tick
//! completed.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Returned by a tick closure to continue or end the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskControl {
    Continue,
    Finish,
}

pub struct ScheduledTask {
    name: &'static str,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Spawn a recurring task
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F, Fut>(
        name: &'static str,
        period: Duration,
        cancel: CancellationToken,
        mut tick: F,
    ) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = TaskControl> + Send + 'static,
    {
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            debug!(task = name, period_ms = period.as_millis() as u64, "Scheduled task started");
            let mut ticks: u64 = 0;

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!(task = name, ticks, "Scheduled task cancelled");
                        break;
                    }
                    _ = tokio::time::sleep(period) => {}
                }

                ticks += 1;
                if tick().await == TaskControl::Finish {
                    debug!(task = name, ticks, "Scheduled task finished");
                    break;
                }
            }
        });

        Self {
            name,
            cancel,
            handle,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Request cancellation; takes effect before the next tick fires
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// True once the task loop has exited
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel and wait for the task loop to exit
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            if e.is_panic() {
                warn!(task = self.name, "Scheduled task panicked: {}", e);
            }
        }
    }
}
