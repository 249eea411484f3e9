//! Driving Ports (API - Inbound)
//!
//! The blocking sockets API offered to the transport/TLS layer above.

use crate::domain::errors::SocketResult;
use crate::domain::options::SocketOption;
use crate::domain::slot::SocketHandle;

/// Sockets API.
///
/// Any number of tasks may call into it concurrently.
pub trait SocketsApi: Send + Sync {
    /// Reset the socket table to all-free, all-closed. Idempotent.
    fn init(&self) -> SocketResult<()>;

    /// Tear down. Nothing to do at this layer.
    fn deinit(&self) -> SocketResult<()>;

    /// Claim a free socket.
    ///
    /// # Errors
    ///
    /// `NoResourceAvailable` when every slot is in use.
    fn open(&self) -> SocketResult<SocketHandle>;

    /// Release a socket without sending any command to the co-processor.
    fn close(&self, handle: SocketHandle) -> SocketResult<()>;

    /// Resolve `host` and connect the socket to `host:port` over TCP.
    fn connect(&self, handle: SocketHandle, host: &str, port: u16) -> SocketResult<()>;

    /// Close the co-processor connection (best effort) and release the socket.
    fn disconnect(&self, handle: SocketHandle) -> SocketResult<()>;

    /// Receive into `buffer`.
    ///
    /// Returns `Ok(0)` when the receive timeout elapsed with no data.
    fn recv(&self, handle: SocketHandle, buffer: &mut [u8]) -> SocketResult<usize>;

    /// Send `data`, returning how many bytes were accepted. Partial sends are normal.
    fn send(&self, handle: SocketHandle, data: &[u8]) -> SocketResult<usize>;

    /// Set a socket option. Only the send and receive timeouts are supported.
    fn set_option(&self, handle: SocketHandle, option: SocketOption) -> SocketResult<()>;

    /// Most bytes a single `recv` or `send` moves.
    fn max_transfer_size(&self) -> usize;
}
