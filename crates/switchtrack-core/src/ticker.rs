//! Display refresh ticker.
//!
//! A tick carries no state change. It only tells the presentation layer to
//! re-read the engine against a fresher "now" so the live elapsed time
//! advances. The scheduled task is owned by a [`TickerHandle`] and is
//! aborted on `cancel()` or drop, so it never outlives the tracking period.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// 1-based sequence number within one ticker run.
    pub seq: u64,
}

pub struct Ticker;

impl Ticker {
    /// Spawn a periodic tick task on the current tokio runtime.
    ///
    /// The first tick arrives one `period` after spawning. The task stops on
    /// its own once the receiver is gone.
    pub fn spawn(period: Duration, sender: UnboundedSender<Tick>) -> TickerHandle {
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval.tick().await;
            let mut seq = 0;
            loop {
                interval.tick().await;
                seq += 1;
                if sender.send(Tick { seq }).is_err() {
                    break;
                }
            }
        });
        tracing::trace!(?period, "ticker spawned");
        TickerHandle { task }
    }
}

/// Owning handle of a running ticker. Dropping it cancels the ticker.
#[derive(Debug)]
pub struct TickerHandle {
    task: JoinHandle<()>,
}

impl TickerHandle {
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.task.abort();
        tracing::trace!("ticker cancelled");
    }
}

/// Keeps a ticker running exactly while a task is being tracked.
#[derive(Debug)]
pub struct LiveTicker {
    period: Duration,
    sender: UnboundedSender<Tick>,
    handle: Option<TickerHandle>,
}

impl LiveTicker {
    pub fn new(period: Duration, sender: UnboundedSender<Tick>) -> Self {
        Self {
            period,
            sender,
            handle: None,
        }
    }

    /// Start or cancel the ticker to match `is_tracking`.
    ///
    /// Returns `true` if the ticker was started or cancelled by this call.
    pub fn sync(&mut self, is_tracking: bool) -> bool {
        match (is_tracking, self.handle.is_some()) {
            (true, false) => {
                self.handle = Some(Ticker::spawn(self.period, self.sender.clone()));
                true
            }
            (false, true) => {
                if let Some(handle) = self.handle.take() {
                    handle.cancel();
                }
                true
            }
            _ => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}
