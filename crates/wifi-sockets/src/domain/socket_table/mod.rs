//! # Socket Table
//!
//! Fixed arena of socket slots with index-based, generation-checked handles.
//!
//! ## Locking
//!
//! Every mutation happens inside one short `parking_lot` critical section
//! owned by the table. The table never waits on the channel lock, so its
//! allocation bits stay consistent while an unrelated task holds the channel.
//!
//! ## Allocation Order
//!
//! `allocate` scans index-ascending and claims the first free slot. When
//! several tasks race to open a socket, the lowest free index goes to
//! whichever enters the critical section first.

use std::time::Duration;

use parking_lot::Mutex;

use crate::domain::config::SocketsConfig;
use crate::domain::slot::{ChannelIndex, SocketHandle, SocketInfo, SocketSlot};


/// The socket slot arena.
#[derive(Debug)]
pub struct SocketTable {
    slots: Mutex<Box<[SocketSlot]>>,
    default_send_timeout: Duration,
    default_receive_timeout: Duration,
}

impl SocketTable {
    /// Create a table with `capacity` free, closed slots.
    ///
    /// Capacity is capped at [`ChannelIndex::COUNT`].
    pub fn new(
        capacity: usize,
        default_send_timeout: Duration,
        default_receive_timeout: Duration,
    ) -> Self {
        let capacity = capacity.min(ChannelIndex::COUNT);
        let slots = (0..capacity)
            .map(|index| {
                // Capped above, the cast cannot truncate.
                SocketSlot::new(ChannelIndex::new(index as u8), default_send_timeout)
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();

        let table = Self {
            slots: Mutex::new(slots),
            default_send_timeout,
            default_receive_timeout,
        };
        table.reset_all();
        table
    }

    /// Create a table sized and defaulted from the configuration.
    pub fn from_config(config: &SocketsConfig) -> Self {
        Self::new(
            config.max_sockets,
            config.default_send_timeout,
            config.default_receive_timeout,
        )
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.lock().len()
    }

    /// Claim the first free slot.
    ///
    /// Returns `None` when the table is exhausted.
    pub fn allocate(&self) -> Option<SocketHandle> {
        let mut slots = self.slots.lock();
        let (index, slot) = slots.iter_mut().enumerate().find(|(_, s)| !s.in_use)?;
        slot.claim(self.default_send_timeout, self.default_receive_timeout);
        Some(SocketHandle::new(index, slot.generation))
    }

    /// Return a slot to the pool.
    ///
    /// Returns `false` if the handle was not valid, in which case nothing changes.
    pub fn release(&self, handle: SocketHandle) -> bool {
        let mut slots = self.slots.lock();
        match Self::slot_mut(&mut slots, handle) {
            Some(slot) => {
                slot.free();
                true
            }
            None => false,
        }
    }

    /// True iff the index is in range, the slot is in use and the generation matches.
    pub fn is_valid(&self, handle: SocketHandle) -> bool {
        let mut slots = self.slots.lock();
        Self::slot_mut(&mut slots, handle).is_some()
    }

    /// Put every slot back to free and fully closed, regardless of state.
    ///
    /// Every outstanding handle goes stale.
    pub fn reset_all(&self) {
        let mut slots = self.slots.lock();
        for slot in slots.iter_mut() {
            slot.reset();
            slot.send_timeout = self.default_send_timeout;
            slot.receive_timeout = self.default_receive_timeout;
        }
    }

    /// Run `f` on a validated slot inside the critical section.
    ///
    /// `f` must be a quick field update; it must not block.
    pub fn with_slot<R>(
        &self,
        handle: SocketHandle,
        f: impl FnOnce(&mut SocketSlot) -> R,
    ) -> Option<R> {
        let mut slots = self.slots.lock();
        Self::slot_mut(&mut slots, handle).map(f)
    }

    /// Copy of a validated slot.
    pub fn snapshot(&self, handle: SocketHandle) -> Option<SocketInfo> {
        self.with_slot(handle, |slot| slot.snapshot(handle.index()))
    }

    /// Copies of every slot, in index order.
    pub fn snapshots(&self) -> Vec<SocketInfo> {
        self.slots
            .lock()
            .iter()
            .enumerate()
            .map(|(index, slot)| slot.snapshot(index))
            .collect()
    }

    /// Occupancy counters.
    pub fn stats(&self) -> SocketTableStats {
        let slots = self.slots.lock();
        SocketTableStats {
            capacity: slots.len(),
            in_use: slots.iter().filter(|s| s.in_use).count(),
            connected: slots
                .iter()
                .filter(|s| s.in_use && s.flags.is_connected())
                .count(),
        }
    }

    fn slot_mut(slots: &mut [SocketSlot], handle: SocketHandle) -> Option<&mut SocketSlot> {
        slots
            .get_mut(handle.index())
            .filter(|slot| slot.in_use && slot.generation == handle.generation())
    }
}

/// Socket table occupancy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SocketTableStats {
    pub capacity: usize,
    pub in_use: usize,
    pub connected: usize,
}
