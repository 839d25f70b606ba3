use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use foundation::time::Time;

/// Source of monotonic timestamps.
pub trait Clock {
    fn now(&self) -> Time;
}

/// Wall-clock backed monotonic clock. Time zero is the moment of creation.
#[derive(Debug, Copy, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Time {
        Time(self.origin.elapsed().as_secs_f64())
    }
}

/// Manually advanced clock for deterministic replay.
///
/// Clones share the same timeline, so a clone can be handed to a consumer
/// while the owner keeps advancing it.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_s: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, t: Time) {
        self.now_s.set(t.0);
    }

    pub fn advance(&self, seconds: f64) {
        self.now_s.set(self.now_s.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Time {
        Time(self.now_s.get())
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Time {
        (**self).now()
    }
}
