//! Wall-clock sources for the animation controller.
//!
//! Animation progress is always derived from `now - start`, never from a
//! tick count, so a throttled or delayed frame source simply observes a
//! larger elapsed time on its next tick. The [`Clock`] trait decouples the
//! controller from the real system time so tests can step time by hand.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of wall-clock time in milliseconds since the Unix epoch.
pub trait Clock: Send {
    /// Current wall-clock time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A manually driven clock.
///
/// Cloning yields a handle onto the same time value, so a test can keep one
/// handle and give the other to the controller.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    /// Create a clock reading `start_ms`.
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_ms)),
        }
    }

    /// Set the current time.
    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::Release);
    }

    /// Move the clock forward by `delta_ms` (saturating).
    pub fn advance(&self, delta_ms: i64) {
        let current = self.now.load(Ordering::Acquire);
        self.now
            .store(current.saturating_add(delta_ms), Ordering::Release);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::Acquire)
    }
}
