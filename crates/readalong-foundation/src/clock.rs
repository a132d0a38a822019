//! Clock abstraction for test determinism.
//!
//! The engine itself is batch and has no real-time constraints (§5), but
//! the CLI reports elapsed-time metrics per book; a trait here keeps those
//! metrics testable without sleeping in unit tests.

use std::time::Instant;

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Default)]
pub struct RealClock;

impl RealClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for RealClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Virtual clock for deterministic tests: advances only when told to.
pub struct TestClock {
    current: std::sync::Mutex<Instant>,
}

impl TestClock {
    pub fn new() -> Self {
        Self {
            current: std::sync::Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, duration: std::time::Duration) {
        let mut t = self.current.lock().unwrap();
        *t += duration;
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        *self.current.lock().unwrap()
    }
}

pub type SharedClock = std::sync::Arc<dyn Clock>;

pub fn real_clock() -> SharedClock {
    std::sync::Arc::new(RealClock::new())
}

pub fn test_clock() -> SharedClock {
    std::sync::Arc::new(TestClock::new())
}
