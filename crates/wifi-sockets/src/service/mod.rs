//! # Socket Service
//!
//! Multiplexes the fixed socket table onto the single co-processor channel.
//!
//! ## Lock Discipline
//!
//! - Every driver command except `reset_module` runs under the channel lock.
//! - The socket table has its own short critical section and is never held
//!   across a driver call.
//! - The recovery path resets the module *without* the channel lock, then
//!   takes the lock with an unbounded wait to reinitialise the table.
//!
//! ## Submodules
//!
//! - `lifecycle` - init, open, close, set_option
//! - `connection` - resolve, connect, disconnect
//! - `io` - send, and the timeout-emulating receive loop
//! - `recovery` - peripheral reset after a hardware error

mod connection;
mod io;
mod lifecycle;
mod permit;
mod recovery;


use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::adapters::lock::MutexChannelLock;
use crate::adapters::time::{SystemTimeSource, ThreadScheduler};
use crate::domain::config::SocketsConfig;
use crate::domain::errors::{SocketError, SocketResult};
use crate::domain::options::SocketOption;
use crate::domain::recovery::{ChannelHealth, RecoveryTracker};
use crate::domain::slot::{SocketHandle, SocketInfo};
use crate::domain::socket_table::{SocketTable, SocketTableStats};
use crate::metrics;
use crate::ports::inbound::SocketsApi;
use crate::ports::outbound::{ChannelDriver, ChannelLock, ConfigProvider, Scheduler, TimeSource};

/// Socket layer context object.
///
/// Owns the socket table and the channel collaborators; share it between
/// tasks behind an `Arc`.
pub struct SocketService<D, L, T, S> {
    config: SocketsConfig,
    table: SocketTable,
    driver: D,
    lock: L,
    clock: T,
    scheduler: S,
    recovery: Mutex<RecoveryTracker>,
}

/// Service-wide counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceStats {
    pub table: SocketTableStats,
    /// Successful peripheral resets
    pub resets: u64,
    pub failed_resets: u64,
    pub health: ChannelHealth,
}

impl<D, L, T, S> SocketService<D, L, T, S>
where
    D: ChannelDriver,
    L: ChannelLock,
    T: TimeSource,
    S: Scheduler,
{
    /// Build a service with an initialised, all-free table.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the configuration does not validate.
    pub fn new(
        config: SocketsConfig,
        driver: D,
        lock: L,
        clock: T,
        scheduler: S,
    ) -> SocketResult<Self> {
        config.validate()?;
        let table = SocketTable::from_config(&config);
        debug!(
            capacity = config.max_sockets,
            max_transfer = config.max_transfer_size,
            "[wifi-sockets] socket service created"
        );
        Ok(Self {
            config,
            table,
            driver,
            lock,
            clock,
            scheduler,
            recovery: Mutex::new(RecoveryTracker::new()),
        })
    }

    /// Build a service from a configuration provider.
    pub fn from_provider(
        provider: &impl ConfigProvider,
        driver: D,
        lock: L,
        clock: T,
        scheduler: S,
    ) -> SocketResult<Self> {
        Self::new(provider.sockets_config(), driver, lock, clock, scheduler)
    }

    pub fn config(&self) -> &SocketsConfig {
        &self.config
    }

    /// The co-processor driver, for callers that need to reach it directly.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Snapshot of one open socket.
    pub fn socket_info(&self, handle: SocketHandle) -> Option<SocketInfo> {
        self.table.snapshot(handle)
    }

    /// Snapshots of every slot, free or not.
    pub fn sockets(&self) -> Vec<SocketInfo> {
        self.table.snapshots()
    }

    pub fn stats(&self) -> ServiceStats {
        let recovery = self.recovery.lock();
        ServiceStats {
            table: self.table.stats(),
            resets: recovery.epoch(),
            failed_resets: recovery.failed_resets(),
            health: recovery.health(),
        }
    }

    /// Log and count a channel lock timeout, and build the error for it.
    fn channel_busy(&self, operation: &'static str) -> SocketError {
        metrics::record_lock_timeout(operation);
        warn!(
            operation,
            timeout_ms = self.config.channel_lock_timeout.as_millis() as u64,
            "[wifi-sockets] channel lock not acquired"
        );
        SocketError::ChannelBusy { operation }
    }
}

impl<D: ChannelDriver> SocketService<D, MutexChannelLock, SystemTimeSource, ThreadScheduler> {
    /// Build a service on the host's threads and clock.
    pub fn with_system_defaults(config: SocketsConfig, driver: D) -> SocketResult<Self> {
        Self::new(
            config,
            driver,
            MutexChannelLock::new(),
            SystemTimeSource::new(),
            ThreadScheduler,
        )
    }
}

pub(crate) fn invalid_handle(handle: SocketHandle) -> SocketError {
    SocketError::InvalidHandle {
        index: handle.index(),
        generation: handle.generation(),
    }
}

impl<D, L, T, S> SocketsApi for SocketService<D, L, T, S>
where
    D: ChannelDriver,
    L: ChannelLock,
    T: TimeSource,
    S: Scheduler,
{
    fn init(&self) -> SocketResult<()> {
        self.init_table();
        Ok(())
    }

    fn deinit(&self) -> SocketResult<()> {
        debug!("[wifi-sockets] deinit");
        Ok(())
    }

    fn open(&self) -> SocketResult<SocketHandle> {
        self.open_socket()
    }

    fn close(&self, handle: SocketHandle) -> SocketResult<()> {
        self.close_socket(handle)
    }

    fn connect(&self, handle: SocketHandle, host: &str, port: u16) -> SocketResult<()> {
        self.connect_socket(handle, host, port)
    }

    fn disconnect(&self, handle: SocketHandle) -> SocketResult<()> {
        self.disconnect_socket(handle)
    }

    fn recv(&self, handle: SocketHandle, buffer: &mut [u8]) -> SocketResult<usize> {
        self.receive(handle, buffer)
    }

    fn send(&self, handle: SocketHandle, data: &[u8]) -> SocketResult<usize> {
        self.send_data(handle, data)
    }

    fn set_option(&self, handle: SocketHandle, option: SocketOption) -> SocketResult<()> {
        self.set_socket_option(handle, option)
    }

    fn max_transfer_size(&self) -> usize {
        self.config.max_transfer_size
    }
}
