//! # Domain Errors
//!
//! Error types surfaced by the socket layer.
//!
//! Receive poll timeouts and receive lock timeouts never appear here: they are
//! absorbed into the zero-byte "would block" result of `recv`.

use thiserror::Error;

use crate::domain::options::OptionName;

/// Legacy integer status codes of the secure-sockets ABI consumed by the
/// TLS layer above.
pub mod status {
    /// Success.
    pub const ERROR_NONE: i32 = 0;
    /// Generic socket failure.
    pub const SOCKET_ERROR: i32 = -1;
    /// Operation would block (receive timeout).
    pub const EWOULDBLOCK: i32 = -11;
    /// No socket memory / slot available.
    pub const ENOMEM: i32 = -12;
    /// Invalid argument, typically a stale or out of range handle.
    pub const EINVAL: i32 = -22;
    /// Socket option not supported.
    pub const ENOPROTOOPT: i32 = -109;
    /// The co-processor was reset and every socket is gone.
    pub const PERIPHERAL_RESET: i32 = -1006;
}

/// Errors returned by socket operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SocketError {
    /// Every slot is in use, or `connect` was handed a handle it cannot use
    #[error("No socket slot available")]
    NoResourceAvailable,

    /// Handle is out of range, not in use, or from an older generation
    #[error("Invalid socket handle: index {index}, generation {generation}")]
    InvalidHandle { index: usize, generation: u32 },

    /// The resolver could not produce an address
    #[error("Address resolution failed for {host}")]
    AddressResolutionFailed { host: String },

    /// The channel lock was not granted within its bound
    #[error("Channel busy: lock not acquired for {operation}")]
    ChannelBusy { operation: &'static str },

    /// The co-processor did not finish a command within its own timeout
    #[error("Driver timed out during {operation}")]
    Timeout { operation: &'static str },

    /// The co-processor refused or failed the connect command
    #[error("Connect failed on channel {channel}")]
    ConnectFailed { channel: u8 },

    /// The co-processor reported a hardware error and could not be reset
    #[error("Hardware fault during {operation}")]
    HardwareFault { operation: &'static str },

    /// The co-processor was reset; every open socket is now closed
    #[error("Peripheral reset: all sockets were closed")]
    PeripheralReset,

    /// Option is not handled by this layer
    #[error("Unsupported socket option: {option}")]
    UnsupportedOption { option: OptionName },

    /// The blocking task running the operation panicked or was cancelled
    #[error("Task running {operation} did not complete")]
    TaskFailed { operation: &'static str },

    /// Configuration rejected at construction
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SocketError {
    /// Legacy integer code for this error.
    pub fn status_code(&self) -> i32 {
        match self {
            Self::NoResourceAvailable => status::ENOMEM,
            Self::InvalidHandle { .. } | Self::InvalidConfig(_) => status::EINVAL,
            Self::AddressResolutionFailed { .. }
            | Self::ChannelBusy { .. }
            | Self::Timeout { .. }
            | Self::ConnectFailed { .. }
            | Self::HardwareFault { .. }
            | Self::TaskFailed { .. } => status::SOCKET_ERROR,
            Self::PeripheralReset => status::PERIPHERAL_RESET,
            Self::UnsupportedOption { .. } => status::ENOPROTOOPT,
        }
    }

    /// True when the caller must treat all of its handles as closed.
    pub fn invalidates_all_sockets(&self) -> bool {
        matches!(self, Self::PeripheralReset)
    }
}

/// Result type for socket operations
pub type SocketResult<T> = Result<T, SocketError>;
