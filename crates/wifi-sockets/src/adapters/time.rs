use std::thread;
use std::time::{Duration, Instant};

use crate::ports::outbound::{Scheduler, TimeSource};

/// Monotonic time since construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Sleep and yield on OS threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }

    fn yield_now(&self) {
        thread::yield_now();
    }
}
