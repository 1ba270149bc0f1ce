//! Synthetic clock for deterministic tests and simulations

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};

use super::{ClockSource, Tick, TickSink, WallClock};
use crate::error::ClockError;

#[derive(Debug)]
struct FakeInner {
    now: DateTime<Utc>,
    sink: Option<TickSink>,
    refuse_start: bool,
}

/// A clock whose time only moves when told to.
///
/// Clones share the same time and tick sink, so one handle can be given to
/// a controller as both its clock source and its wall clock while the test
/// keeps another to drive time.
#[derive(Debug, Clone)]
pub struct FakeClock {
    inner: Arc<Mutex<FakeInner>>,
}

impl FakeClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeInner {
                now,
                sink: None,
                refuse_start: false,
            })),
        }
    }

    /// A clock whose `start` always fails, to exercise degraded mode
    pub fn refusing_start(now: DateTime<Utc>) -> Self {
        let clock = Self::new(now);
        clock.lock().refuse_start = true;
        clock
    }

    /// Let a refusing clock start again
    pub fn allow_start(&self) {
        self.lock().refuse_start = false;
    }

    fn lock(&self) -> MutexGuard<'_, FakeInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Move time forward one second at a time, emitting a tick for each
    /// second while started. Returns how many ticks were delivered.
    pub fn advance(&self, seconds: u64) -> u64 {
        let mut delivered = 0;
        for _ in 0..seconds {
            let mut inner = self.lock();
            inner.now += Duration::seconds(1);
            let at = inner.now;
            if let Some(sink) = &inner.sink {
                if sink.send(Tick { at }).is_ok() {
                    delivered += 1;
                }
            }
        }
        delivered
    }

    /// Move time forward without ticking, as if the host had been suspended
    pub fn jump(&self, seconds: u64) {
        self.lock().now += Duration::seconds(seconds as i64);
    }

    pub fn is_started(&self) -> bool {
        self.lock().sink.is_some()
    }
}

impl ClockSource for FakeClock {
    fn start(&mut self, sink: TickSink) -> Result<(), ClockError> {
        let mut inner = self.lock();
        if inner.refuse_start {
            return Err(ClockError::Unavailable("fake clock refuses to start".to_string()));
        }
        inner.sink = Some(sink);
        Ok(())
    }

    fn stop(&mut self) {
        self.lock().sink = None;
    }

    fn is_running(&self) -> bool {
        self.is_started()
    }
}

impl WallClock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        self.lock().now
    }
}
