//! Fault Recovery Controller
//!
//! Runs after the driver reports a hardware error on send or receive. The
//! module reset is issued without the channel lock: the current holder may
//! be the task stuck in the failing command. Only the table reinitialisation
//! takes the lock, and it waits for as long as that takes.

use tracing::{error, info, warn};

use super::permit::ChannelPermit;
use super::SocketService;
use crate::domain::errors::SocketError;
use crate::domain::recovery::RecoveryEvent;
use crate::metrics;
use crate::ports::outbound::{ChannelDriver, ChannelLock, Scheduler, TimeSource};

impl<D, L, T, S> SocketService<D, L, T, S>
where
    D: ChannelDriver,
    L: ChannelLock,
    T: TimeSource,
    S: Scheduler,
{
    /// Reset the co-processor and the table.
    ///
    /// Returns `PeripheralReset` when every socket was closed, or
    /// `HardwareFault` when the module refused to reset and nothing changed.
    /// The caller must not hold the channel lock.
    pub(crate) fn recover_from_fault(&self, operation: &'static str) -> SocketError {
        warn!(operation, "[wifi-sockets] co-processor hardware error, resetting module");

        if let Err(e) = self.driver.reset_module() {
            let consecutive_failures = {
                let mut tracker = self.recovery.lock();
                tracker.record(RecoveryEvent::ResetFailed);
                tracker.consecutive_failures()
            };
            metrics::record_peripheral_reset(false);
            error!(
                operation,
                error = %e,
                consecutive_failures,
                "[wifi-sockets] co-processor reset failed"
            );
            return SocketError::HardwareFault { operation };
        }

        {
            let _permit = ChannelPermit::acquire(&self.lock);
            self.table.reset_all();
        }

        let epoch = {
            let mut tracker = self.recovery.lock();
            tracker.record(RecoveryEvent::ResetSucceeded);
            tracker.epoch()
        };
        metrics::record_peripheral_reset(true);
        info!(
            operation,
            epoch,
            "[wifi-sockets] co-processor reset, all sockets closed"
        );
        SocketError::PeripheralReset
    }
}
