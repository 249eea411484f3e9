//! Socket slots and the handles that name them.

use std::fmt;
use std::time::Duration;

use crate::domain::flags::SocketFlags;

/// The co-processor's number for a logical connection.
///
/// Fixed 1:1 to a slot index when the table is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelIndex(u8);

impl ChannelIndex {
    /// Number of distinct channels a one-byte index can address.
    pub const COUNT: usize = u8::MAX as usize + 1;

    /// Create a channel index.
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Raw value passed to the driver.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for ChannelIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to an open socket.
///
/// The index selects the slot; the generation must match the slot's current
/// generation, so a handle goes stale once its slot is released or the
/// table is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketHandle {
    index: usize,
    generation: u32,
}

impl SocketHandle {
    /// Index reported by legacy callers for "no socket".
    pub const INVALID_INDEX: usize = usize::MAX;

    pub(crate) const fn new(index: usize, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index (equal to the channel index).
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Generation the handle was issued in.
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for SocketHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.index, self.generation)
    }
}

/// One entry of the socket table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketSlot {
    pub(crate) in_use: bool,
    pub(crate) channel: ChannelIndex,
    pub(crate) flags: SocketFlags,
    pub(crate) send_timeout: Duration,
    pub(crate) receive_timeout: Duration,
    pub(crate) generation: u32,
}

impl SocketSlot {
    pub(crate) fn new(channel: ChannelIndex, default_timeout: Duration) -> Self {
        Self {
            in_use: false,
            channel,
            flags: SocketFlags::CLOSED,
            send_timeout: default_timeout,
            receive_timeout: default_timeout,
            generation: 0,
        }
    }

    /// Hand the slot out with fresh flags and default timeouts.
    pub(crate) fn claim(&mut self, send_timeout: Duration, receive_timeout: Duration) {
        self.in_use = true;
        self.flags = SocketFlags::OPENED;
        self.send_timeout = send_timeout;
        self.receive_timeout = receive_timeout;
    }

    /// Return the slot to the pool. Bumps the generation.
    pub(crate) fn free(&mut self) {
        self.in_use = false;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Force the slot back to free and fully closed.
    pub(crate) fn reset(&mut self) {
        self.flags = SocketFlags::CLOSED;
        if self.in_use {
            self.free();
        } else {
            self.generation = self.generation.wrapping_add(1);
        }
    }

    pub(crate) fn snapshot(&self, index: usize) -> SocketInfo {
        SocketInfo {
            handle: SocketHandle::new(index, self.generation),
            channel: self.channel,
            in_use: self.in_use,
            flags: self.flags,
            send_timeout: self.send_timeout,
            receive_timeout: self.receive_timeout,
        }
    }
}

/// Read-only copy of a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketInfo {
    pub handle: SocketHandle,
    pub channel: ChannelIndex,
    pub in_use: bool,
    pub flags: SocketFlags,
    pub send_timeout: Duration,
    pub receive_timeout: Duration,
}
