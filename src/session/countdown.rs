//! One-second tick source for an active quiz.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Events fed from background tasks into the app event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// One second elapsed for the countdown started as `generation`.
    Tick { generation: u64 },
}

/// Owns the background tick task. At most one task runs at a time.
#[derive(Debug, Default)]
pub struct Countdown {
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start ticking into `sender`, cancelling any previous countdown.
    ///
    /// Returns the generation stamped on the new countdown's ticks. Must be
    /// called from within a tokio runtime.
    pub fn start(&mut self, sender: mpsc::UnboundedSender<SessionEvent>) -> u64 {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;

        self.handle = Some(tokio::spawn(async move {
            let mut interval = time::interval(TICK_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;

            loop {
                interval.tick().await;
                if sender.send(SessionEvent::Tick { generation }).is_err() {
                    break;
                }
            }
        }));

        debug!(generation, "countdown started");
        generation
    }

    /// Abort the running countdown, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!(generation = self.generation, "countdown cancelled");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Whether a tick belongs to the countdown currently running.
    pub fn is_current(&self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::Tick { generation } => {
                self.handle.is_some() && generation == self.generation
            }
        }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel();
    }
}
