//! Socket layer configuration.
//!
//! Defaults reproduce the reference board: four sockets, 10 s socket
//! timeouts, a 60 s channel lock bound and a 1200 byte co-processor payload.

use std::time::Duration;

use crate::domain::errors::SocketError;
use crate::domain::slot::ChannelIndex;

/// Default number of socket slots.
pub const DEFAULT_MAX_SOCKETS: usize = 4;
/// Default send and receive timeout of a freshly opened socket.
pub const DEFAULT_SOCKET_TIMEOUT: Duration = Duration::from_millis(10_000);
/// Bound on channel lock acquisition for resolve, connect, send and disconnect.
pub const DEFAULT_CHANNEL_LOCK_TIMEOUT: Duration = Duration::from_millis(60_000);
/// Extra wait allowed on top of the receive timeout when acquiring the lock.
pub const DEFAULT_RECEIVE_LOCK_SLACK: Duration = Duration::from_millis(5);
/// Hardware poll bound for a single receive attempt. Zero means "forever"
/// to the co-processor, so one millisecond is the floor.
pub const DEFAULT_RECEIVE_POLL_TIMEOUT: Duration = Duration::from_millis(1);
/// Pause between receive polls.
pub const DEFAULT_RECEIVE_RETRY_DELAY: Duration = Duration::from_millis(5);
/// Largest payload the co-processor moves in one command.
pub const DEFAULT_MAX_TRANSFER_SIZE: usize = 1200;
/// Largest timeout the co-processor accepts on a command.
pub const DEFAULT_MAX_DRIVER_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Tunables of the socket layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketsConfig {
    /// Number of socket slots (one co-processor connection each)
    pub max_sockets: usize,
    /// Send timeout given to newly opened sockets
    pub default_send_timeout: Duration,
    /// Receive timeout given to newly opened sockets
    pub default_receive_timeout: Duration,
    /// Channel lock bound for everything except receive polls
    pub channel_lock_timeout: Duration,
    /// Slack added to the receive timeout for the receive lock bound
    pub receive_lock_slack: Duration,
    /// Poll bound passed to the driver on each receive attempt
    pub receive_poll_timeout: Duration,
    /// Sleep between two receive attempts
    pub receive_retry_delay: Duration,
    /// Clamp applied to receive buffers and send payloads
    pub max_transfer_size: usize,
    /// Clamp applied to the send timeout handed to the driver
    pub max_driver_timeout: Duration,
}

impl Default for SocketsConfig {
    fn default() -> Self {
        Self {
            max_sockets: DEFAULT_MAX_SOCKETS,
            default_send_timeout: DEFAULT_SOCKET_TIMEOUT,
            default_receive_timeout: DEFAULT_SOCKET_TIMEOUT,
            channel_lock_timeout: DEFAULT_CHANNEL_LOCK_TIMEOUT,
            receive_lock_slack: DEFAULT_RECEIVE_LOCK_SLACK,
            receive_poll_timeout: DEFAULT_RECEIVE_POLL_TIMEOUT,
            receive_retry_delay: DEFAULT_RECEIVE_RETRY_DELAY,
            max_transfer_size: DEFAULT_MAX_TRANSFER_SIZE,
            max_driver_timeout: DEFAULT_MAX_DRIVER_TIMEOUT,
        }
    }
}

impl SocketsConfig {
    /// Smaller bounds so tests do not wait on wall-clock time.
    pub fn for_testing() -> Self {
        Self {
            default_send_timeout: Duration::from_millis(200),
            default_receive_timeout: Duration::from_millis(200),
            channel_lock_timeout: Duration::from_millis(500),
            max_transfer_size: 64,
            ..Self::default()
        }
    }

    /// Set the number of socket slots.
    #[must_use]
    pub fn with_max_sockets(mut self, max_sockets: usize) -> Self {
        self.max_sockets = max_sockets;
        self
    }

    /// Set both default socket timeouts.
    #[must_use]
    pub fn with_default_timeouts(mut self, send: Duration, receive: Duration) -> Self {
        self.default_send_timeout = send;
        self.default_receive_timeout = receive;
        self
    }

    /// Lock bound used by a single receive attempt.
    pub fn receive_lock_timeout(&self, receive_timeout: Duration) -> Duration {
        receive_timeout.saturating_add(self.receive_lock_slack)
    }

    /// Send timeout as the driver is allowed to see it.
    pub fn driver_send_timeout(&self, send_timeout: Duration) -> Duration {
        send_timeout.min(self.max_driver_timeout)
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<(), SocketError> {
        if self.max_sockets == 0 {
            return Err(SocketError::InvalidConfig(
                "max_sockets must be at least 1".into(),
            ));
        }
        if self.max_sockets > ChannelIndex::COUNT {
            return Err(SocketError::InvalidConfig(format!(
                "max_sockets {} exceeds the co-processor channel range",
                self.max_sockets
            )));
        }
        if self.max_transfer_size == 0 {
            return Err(SocketError::InvalidConfig(
                "max_transfer_size must be non-zero".into(),
            ));
        }
        if self.receive_poll_timeout.is_zero() {
            return Err(SocketError::InvalidConfig(
                "receive_poll_timeout of zero blocks the driver forever".into(),
            ));
        }
        Ok(())
    }
}
