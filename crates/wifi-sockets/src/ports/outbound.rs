//! Driven Ports (SPI - Outbound Dependencies)
//!
//! Everything the socket layer consumes from its surroundings: the
//! co-processor driver, the channel lock, a monotonic clock, sleep/yield
//! primitives and a configuration source.

use std::net::Ipv4Addr;
use std::time::Duration;

use thiserror::Error;

use crate::domain::config::SocketsConfig;
use crate::domain::slot::ChannelIndex;

/// Non-OK status reported by the co-processor driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DriverError {
    /// The command's own timeout elapsed
    #[error("driver timeout")]
    Timeout,
    /// The co-processor reported an error; the channel may be wedged
    #[error("driver hardware error")]
    Hardware,
}

/// Result of a driver command.
pub type DriverResult<T> = Result<T, DriverError>;

/// Transport protocol of a co-processor connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportProtocol {
    Tcp,
}

/// Connect command for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectRequest {
    pub channel: ChannelIndex,
    pub protocol: TransportProtocol,
    pub address: Ipv4Addr,
    pub port: u16,
}

/// The co-processor command channel.
///
/// Every method except `reset_module` must only be called while the
/// channel lock is held. The driver serves one outstanding command at a time.
pub trait ChannelDriver: Send + Sync {
    /// Resolve a host name. An unspecified address counts as failure.
    fn resolve(&self, host: &str) -> DriverResult<Ipv4Addr>;

    /// Open a connection on the request's channel.
    fn open_connection(&self, request: &ConnectRequest) -> DriverResult<()>;

    /// Close the connection on a channel.
    fn close_connection(&self, channel: ChannelIndex) -> DriverResult<()>;

    /// Send `data`, returning how many bytes the co-processor accepted.
    fn send(&self, channel: ChannelIndex, data: &[u8], timeout: Duration) -> DriverResult<usize>;

    /// Poll for received bytes for at most `timeout`.
    ///
    /// `Ok(0)` and `Err(Timeout)` both mean nothing arrived.
    fn receive(
        &self,
        channel: ChannelIndex,
        buffer: &mut [u8],
        timeout: Duration,
    ) -> DriverResult<usize>;

    /// Hardware reset of the co-processor.
    ///
    /// Safe to call without the channel lock, possibly while another task
    /// is stuck inside a failing command.
    fn reset_module(&self) -> DriverResult<()>;
}

/// Timed mutual exclusion over the co-processor channel.
///
/// The lock is not tied to the acquiring thread's stack, so it is expressed
/// as acquire/release rather than a guard. The service wraps it in a permit.
pub trait ChannelLock: Send + Sync {
    /// Acquire within `timeout`. Returns `false` if the wait ran out.
    fn try_acquire_for(&self, timeout: Duration) -> bool;

    /// Acquire, waiting as long as it takes.
    fn acquire(&self);

    /// Release a lock acquired by either method.
    fn release(&self);
}

/// Monotonic clock.
pub trait TimeSource: Send + Sync {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Blocking and yielding primitives of the scheduler.
pub trait Scheduler: Send + Sync {
    /// Block the calling task for `duration`.
    fn sleep(&self, duration: Duration);

    /// Let other ready tasks of the same priority run.
    fn yield_now(&self);
}

/// Source of socket layer configuration.
pub trait ConfigProvider: Send + Sync {
    /// Current configuration.
    fn sockets_config(&self) -> SocketsConfig;
}
