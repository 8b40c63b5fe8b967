use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Shortest interval a poller will run at.
pub const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Runs a refetch task immediately and then once per interval until stopped.
/// Dropping the poller stops it. Stopping never waits on an in-flight tick;
/// the tick finishes in the background and no further tick is started.
#[derive(Debug)]
pub struct Poller {
    name: &'static str,
    shutdown_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Spawns the polling loop. Must be called from within a tokio runtime.
    /// Intervals below [`MIN_INTERVAL`] are raised to it.
    pub fn start<F, Fut>(name: &'static str, interval: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let interval = if interval < MIN_INTERVAL {
            tracing::warn!(poller = name, requested = ?interval, "Poll interval too short, using minimum");
            MIN_INTERVAL
        } else {
            interval
        };
        let (shutdown_tx, mut shutdown) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut next_tick = tokio::time::Instant::now();

            while !*shutdown.borrow() {
                tokio::select! {
                    biased;
                    result = shutdown.changed() => {
                        if result.is_err() {
                            break;
                        }
                    }
                    () = tokio::time::sleep_until(next_tick) => {
                        tick().instrument(tracing::debug_span!("poll_iteration", poller = name)).await;
                        next_tick = tokio::time::Instant::now() + interval;
                    }
                }
            }
            tracing::debug!(poller = name, "Poller shutting down");
        });

        Self { name, shutdown_tx, handle: Some(handle) }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signals the loop and returns at once. An in-flight tick is left to finish detached.
    pub fn stop(mut self) {
        let _ = self.shutdown_tx.send(true);
        if self.handle.take().is_some_and(|h| !h.is_finished()) {
            tracing::debug!(poller = self.name, "Poller stop signalled, task detached");
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}
