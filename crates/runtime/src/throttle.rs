use foundation::time::Time;

use crate::clock::Clock;

/// Default throttle window, roughly one 60 Hz frame.
pub const FRAME_INTERVAL_S: f64 = 0.016;

/// Rate limiter for a callback: at most one invocation per `interval_s`.
///
/// Calls arriving inside the window collapse into a single trailing call.
/// The trailing call fires from [`Throttle::poll`] once the window closes,
/// or immediately from [`Throttle::flush`]. No timers or threads are
/// involved; the owner drives it from its frame loop.
pub struct Throttle<C: Clock, F: FnMut()> {
    clock: C,
    interval_s: f64,
    last_invoked: Option<Time>,
    pending: bool,
    invocations: u64,
    callback: F,
}

impl<C: Clock, F: FnMut()> Throttle<C, F> {
    pub fn new(clock: C, interval_s: f64, callback: F) -> Self {
        Self {
            clock,
            interval_s: interval_s.max(0.0),
            last_invoked: None,
            pending: false,
            invocations: 0,
            callback,
        }
    }

    pub fn interval_s(&self) -> f64 {
        self.interval_s
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Total number of callback invocations so far.
    pub fn invocations(&self) -> u64 {
        self.invocations
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Request an invocation. Returns `true` if the callback ran now.
    pub fn schedule(&mut self) -> bool {
        let now = self.clock.now();
        if self.window_open(now) {
            self.pending = true;
            return false;
        }
        self.invoke(now);
        true
    }

    /// Fire the trailing call if one is pending and its window has closed.
    pub fn poll(&mut self) -> bool {
        if !self.pending {
            return false;
        }
        let now = self.clock.now();
        if self.window_open(now) {
            return false;
        }
        self.invoke(now);
        true
    }

    /// Fire the pending call now, ignoring the window.
    pub fn flush(&mut self) -> bool {
        if !self.pending {
            return false;
        }
        let now = self.clock.now();
        self.invoke(now);
        true
    }

    /// Invoke unconditionally, absorbing any pending call.
    pub fn force(&mut self) {
        let now = self.clock.now();
        self.invoke(now);
    }

    /// Drop any pending call and reset the window.
    pub fn cancel(&mut self) {
        self.pending = false;
        self.last_invoked = None;
    }

    fn window_open(&self, now: Time) -> bool {
        match self.last_invoked {
            Some(last) => now.since(last) < self.interval_s,
            None => false,
        }
    }

    fn invoke(&mut self, now: Time) {
        self.pending = false;
        self.last_invoked = Some(now);
        self.invocations += 1;
        (self.callback)();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use foundation::time::Time;

    use super::{FRAME_INTERVAL_S, Throttle};
    use crate::clock::{Clock, ManualClock};

    fn counter() -> (Rc<Cell<u32>>, impl FnMut()) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, move || c.set(c.get() + 1))
    }

    #[test]
    fn first_call_runs_on_leading_edge() {
        let clock = ManualClock::new();
        let (count, cb) = counter();
        let mut t = Throttle::new(clock.clone(), FRAME_INTERVAL_S, cb);
        assert_eq!(t.interval_s(), FRAME_INTERVAL_S);
        assert!(t.schedule());
        assert_eq!(count.get(), 1);
        assert!(!t.is_pending());
    }

    #[test]
    fn negative_interval_clamps_to_zero() {
        let clock = ManualClock::new();
        let (count, cb) = counter();
        let mut t = Throttle::new(clock.clone(), -1.0, cb);
        assert_eq!(t.interval_s(), 0.0);
        assert!(t.schedule());
        assert!(t.schedule());
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn shares_the_owners_timeline() {
        let clock = ManualClock::new();
        let (_count, cb) = counter();
        let t = Throttle::new(clock.clone(), FRAME_INTERVAL_S, cb);
        clock.advance(0.5);
        assert_eq!(t.clock().now(), Time(0.5));
    }

    #[test]
    fn calls_inside_window_coalesce_into_one_trailing_call() {
        let clock = ManualClock::new();
        let (count, cb) = counter();
        let mut t = Throttle::new(clock.clone(), 0.016, cb);

        t.schedule();
        for _ in 0..5 {
            clock.advance(0.002);
            assert!(!t.schedule());
        }
        assert_eq!(count.get(), 1);
        assert!(t.is_pending());

        // Window still open.
        assert!(!t.poll());

        clock.advance(0.01);
        assert!(t.poll());
        assert_eq!(count.get(), 2);
        assert!(!t.poll());
        assert_eq!(t.invocations(), 2);
    }

    #[test]
    fn schedule_after_window_runs_immediately() {
        let clock = ManualClock::new();
        let (count, cb) = counter();
        let mut t = Throttle::new(clock.clone(), 0.016, cb);
        t.schedule();
        clock.advance(0.02);
        assert!(t.schedule());
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn flush_fires_pending_only() {
        let clock = ManualClock::new();
        let (count, cb) = counter();
        let mut t = Throttle::new(clock.clone(), 0.016, cb);

        assert!(!t.flush());
        t.schedule();
        t.schedule();
        assert!(t.flush());
        assert_eq!(count.get(), 2);
        assert!(!t.flush());
    }

    #[test]
    fn cancel_drops_pending_call() {
        let clock = ManualClock::new();
        let (count, cb) = counter();
        let mut t = Throttle::new(clock.clone(), 0.016, cb);

        t.schedule();
        t.schedule();
        t.cancel();
        clock.advance(1.0);
        assert!(!t.poll());
        assert!(!t.flush());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn force_ignores_window() {
        let clock = ManualClock::new();
        let (count, cb) = counter();
        let mut t = Throttle::new(clock.clone(), 0.016, cb);
        t.schedule();
        t.schedule();
        t.force();
        assert_eq!(count.get(), 2);
        assert!(!t.is_pending());
    }
}
