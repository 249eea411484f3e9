//! RAII hold on the channel lock.

use std::time::Duration;

use crate::ports::outbound::ChannelLock;

/// Releases the channel lock when dropped.
#[must_use = "the channel lock is released as soon as the permit is dropped"]
pub(crate) struct ChannelPermit<'a, L: ChannelLock> {
    lock: &'a L,
}

impl<'a, L: ChannelLock> ChannelPermit<'a, L> {
    /// Bounded acquisition. `None` when the wait ran out.
    pub(crate) fn try_acquire(lock: &'a L, timeout: Duration) -> Option<Self> {
        // Built only on success: dropping a refused permit would release the owner's hold.
        if lock.try_acquire_for(timeout) {
            Some(Self { lock })
        } else {
            None
        }
    }

    /// Unbounded acquisition.
    pub(crate) fn acquire(lock: &'a L) -> Self {
        lock.acquire();
        Self { lock }
    }
}

impl<L: ChannelLock> Drop for ChannelPermit<'_, L> {
    fn drop(&mut self) {
        self.lock.release();
    }
}
