//! Monotonic time sources for the hold engine

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Monotonic clock measured from an arbitrary origin
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Manually advanced clock.
///
/// Clones share the same time, so a test or replay can keep one handle while
/// the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Jump to `at`; earlier times are ignored to keep the clock monotonic
    pub fn set(&self, at: Duration) {
        if at > self.now.get() {
            self.now.set(at);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}
