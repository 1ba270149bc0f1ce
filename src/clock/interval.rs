//! Tokio-backed tick clock

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::{
    runtime::Handle,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::debug;

use super::{ClockSource, Tick, TickSink, WallClock};
use crate::error::ClockError;

/// Wall clock reading the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemWallClock;

impl WallClock for SystemWallClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Emits a tick every `period` from a spawned tokio task
pub struct IntervalClock {
    period: Duration,
    wall: Arc<dyn WallClock>,
    ticker: Option<JoinHandle<()>>,
}

impl IntervalClock {
    /// One tick per second, stamped with the system time
    pub fn new() -> Self {
        Self::with_period(Duration::from_secs(1), Arc::new(SystemWallClock))
    }

    pub fn with_period(period: Duration, wall: Arc<dyn WallClock>) -> Self {
        Self {
            period,
            wall,
            ticker: None,
        }
    }
}

impl Default for IntervalClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for IntervalClock {
    fn start(&mut self, sink: TickSink) -> Result<(), ClockError> {
        let runtime = Handle::try_current().map_err(|_| ClockError::NoRuntime)?;
        self.stop();

        let period = self.period;
        let wall = Arc::clone(&self.wall);
        let handle = runtime.spawn(async move {
            let mut interval = time::interval(period);
            // A stalled host is reconciled from tick timestamps, no need to burst
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if sink.send(Tick { at: wall.now() }).is_err() {
                    debug!("Tick receiver dropped, stopping interval clock");
                    break;
                }
            }
        });

        debug!("Interval clock started with period {:?}", period);
        self.ticker = Some(handle);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
            debug!("Interval clock stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.ticker.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for IntervalClock {
    fn drop(&mut self) {
        self.stop();
    }
}
