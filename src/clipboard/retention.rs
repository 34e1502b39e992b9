/*!
 * Retention Task
 *
 * Background task that periodically purges expired clips. The period is
 * re-read after every check so retention changes apply on the next cycle.
 */

use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Control messages for the retention task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetentionCommand {
    Shutdown,
}

/// Handle to the retention background task
#[derive(Debug)]
pub struct RetentionTask {
    command_tx: mpsc::UnboundedSender<RetentionCommand>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl RetentionTask {
    /// Spawn on the current tokio runtime.
    ///
    /// `tick` runs once per period and returns the delay before the next
    /// run; `None` or a zero delay ends the task. Returns `None` when no
    /// runtime is available.
    pub fn spawn<F>(first_delay: Duration, tick: F) -> Option<Self>
    where
        F: FnMut() -> Option<Duration> + Send + 'static,
    {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!(error = %e, "No tokio runtime, retention check not scheduled");
                return None;
            }
        };

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let handle = runtime.spawn(run_retention_loop(first_delay, tick, command_rx));
        info!(delay_ms = first_delay.as_millis() as u64, "Retention task spawned");

        Some(Self {
            command_tx,
            handle: Some(handle),
        })
    }

    /// Whether the task is still alive
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the task without waiting for it
    pub fn cancel(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.command_tx.send(RetentionCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Retention task cancelled");
        }
    }
}

async fn run_retention_loop<F>(
    first_delay: Duration,
    mut tick: F,
    mut command_rx: mpsc::UnboundedReceiver<RetentionCommand>,
) where
    F: FnMut() -> Option<Duration>,
{
    let mut delay = first_delay;

    loop {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {
                match tick() {
                    Some(next) if !next.is_zero() => delay = next,
                    _ => {
                        debug!("Retention task finished");
                        break;
                    }
                }
            }

            cmd = command_rx.recv() => {
                match cmd {
                    Some(RetentionCommand::Shutdown) | None => {
                        debug!("Retention task shutting down");
                        break;
                    }
                }
            }
        }
    }
}

impl Drop for RetentionTask {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop();
        }
    }
}
