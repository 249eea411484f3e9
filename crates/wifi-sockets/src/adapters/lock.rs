//! Channel lock on host threads.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::ports::outbound::ChannelLock;

/// Binary semaphore with timed acquisition.
///
/// Not bound to the acquiring thread: any thread may release it, as with an
/// RTOS semaphore.
#[derive(Debug, Default)]
pub struct MutexChannelLock {
    held: Mutex<bool>,
    released: Condvar,
}

impl MutexChannelLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while some task holds the channel.
    pub fn is_held(&self) -> bool {
        *self.held.lock()
    }
}

impl ChannelLock for MutexChannelLock {
    fn try_acquire_for(&self, timeout: Duration) -> bool {
        let mut held = self.held.lock();
        match Instant::now().checked_add(timeout) {
            Some(deadline) => {
                while *held {
                    if self.released.wait_until(&mut held, deadline).timed_out() && *held {
                        return false;
                    }
                }
            }
            // Too far in the future to represent: wait without a bound.
            None => {
                while *held {
                    self.released.wait(&mut held);
                }
            }
        }
        *held = true;
        true
    }

    fn acquire(&self) {
        let mut held = self.held.lock();
        while *held {
            self.released.wait(&mut held);
        }
        *held = true;
    }

    fn release(&self) {
        *self.held.lock() = false;
        self.released.notify_one();
    }
}
