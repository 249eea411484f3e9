//! Per-socket state flags.

use bitflags::bitflags;

bitflags! {
    /// Properties of a socket slot.
    ///
    /// A free or freshly reset slot always carries `READ_CLOSED | WRITE_CLOSED`
    /// and never `CONNECTED`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SocketFlags: u32 {
        /// The socket carries TLS traffic from the layer above.
        const SECURE = 1 << 0;
        /// The socket is closed for receive.
        const READ_CLOSED = 1 << 1;
        /// The socket is closed for send.
        const WRITE_CLOSED = 1 << 2;
        /// A connection is established on the co-processor.
        const CONNECTED = 1 << 3;
    }
}

impl SocketFlags {
    /// Flags of a slot that is free, or was just reset.
    pub const CLOSED: Self = Self::READ_CLOSED.union(Self::WRITE_CLOSED);

    /// Flags of a slot handed out by `open` and not yet connected.
    pub const OPENED: Self = Self::SECURE.union(Self::CLOSED);

    /// True when both directions are closed.
    pub fn is_fully_closed(&self) -> bool {
        self.contains(Self::CLOSED)
    }

    /// True when the co-processor holds a connection for this slot.
    pub fn is_connected(&self) -> bool {
        self.contains(Self::CONNECTED)
    }

    /// Transition applied when a connect command succeeds.
    pub fn mark_connected(&mut self) {
        self.remove(Self::CLOSED);
        self.insert(Self::CONNECTED);
    }

    /// Transition applied when the socket is shut down.
    pub fn mark_shutdown(&mut self) {
        self.insert(Self::CLOSED);
        self.remove(Self::CONNECTED);
    }
}

impl Default for SocketFlags {
    fn default() -> Self {
        Self::CLOSED
    }
}
