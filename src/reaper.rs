//! Background sweep that reclaims idle cursors.

use crate::lock;
use crate::registry::Shared;
use std::sync::{Mutex, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Shortest period the reaper will run at.
const MIN_PERIOD: Duration = Duration::from_millis(10);

/// Handle on the running reaper task.
#[derive(Debug)]
pub(crate) struct CursorReaper {
    period: Duration,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl CursorReaper {
    /// Starts sweeping `registry` every `period` until `shutdown` fires or the
    /// registry is dropped. The first sweep happens one period from now.
    #[instrument(skip(registry, shutdown))]
    pub(crate) fn spawn(
        registry: Weak<Shared>,
        period: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        let period = period.max(MIN_PERIOD);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(?period, "Cursor reaper running");

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                let Some(shared) = registry.upgrade() else {
                    break;
                };
                let reaped = shared.sweep_cursors();
                debug!(reaped, "Sweep complete");
            }
            info!("Cursor reaper stopped");
        });

        Self {
            period,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Sweep period.
    pub(crate) fn period(&self) -> Duration {
        self.period
    }

    /// Waits for the task to exit. The caller cancels the token first.
    pub(crate) async fn join(&self) {
        let handle = lock(&self.handle).take();
        if let Some(handle) = handle
            && let Err(err) = handle.await
        {
            warn!(error = %err, "Cursor reaper task failed");
        }
    }
}
