//! Clock source module
//!
//! Ticks drive the live display of an active session. Every tick carries the
//! wall-clock instant it was emitted at, so a consumer that missed ticks (the
//! host was suspended, the scheduler stalled) can catch up from the timestamp
//! instead of trusting the tick count.

pub mod fake;
pub mod interval;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::error::ClockError;

pub use fake::FakeClock;
pub use interval::{IntervalClock, SystemWallClock};

/// One elapsed-second event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub at: DateTime<Utc>,
}

/// Channel a running clock pushes its ticks into
pub type TickSink = mpsc::UnboundedSender<Tick>;

/// A periodic one-second tick emitter
pub trait ClockSource: Send {
    /// Begin emitting ticks into `sink`. Restarts the clock if it was running.
    fn start(&mut self, sink: TickSink) -> Result<(), ClockError>;

    /// Stop emitting ticks. Calling this on a stopped clock does nothing.
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}

/// Source of the current wall-clock time
pub trait WallClock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Whole seconds from `from` to `to`, rounded to the nearest second.
/// Never negative.
pub fn whole_seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    let millis = (to - from).num_milliseconds();
    if millis <= 0 {
        0
    } else {
        ((millis + 500) / 1000) as u64
    }
}
