//! Connection Manager
//!
//! Resolution and connect share the co-processor channel with data traffic,
//! so both run under the channel lock, each in its own hold. Handles are
//! checked again once the lock is held: a peripheral reset may have
//! invalidated them while the caller waited.

use std::net::Ipv4Addr;

use tracing::{debug, warn};

use super::permit::ChannelPermit;
use super::{invalid_handle, SocketService};
use crate::domain::errors::{SocketError, SocketResult};
use crate::domain::slot::SocketHandle;
use crate::ports::outbound::{
    ChannelDriver, ChannelLock, ConnectRequest, Scheduler, TimeSource, TransportProtocol,
};

impl<D, L, T, S> SocketService<D, L, T, S>
where
    D: ChannelDriver,
    L: ChannelLock,
    T: TimeSource,
    S: Scheduler,
{
    pub(crate) fn connect_socket(
        &self,
        handle: SocketHandle,
        host: &str,
        port: u16,
    ) -> SocketResult<()> {
        // The legacy ABI reports a bad handle on connect as "no memory".
        let channel = self
            .table
            .with_slot(handle, |slot| slot.channel)
            .ok_or(SocketError::NoResourceAvailable)?;

        let address = self.resolve(host)?;
        let request = ConnectRequest {
            channel,
            protocol: TransportProtocol::Tcp,
            address,
            port,
        };

        {
            let _permit = ChannelPermit::try_acquire(&self.lock, self.config.channel_lock_timeout)
                .ok_or_else(|| self.channel_busy("connect"))?;
            if !self.table.is_valid(handle) {
                return Err(invalid_handle(handle));
            }
            self.driver.open_connection(&request).map_err(|e| {
                warn!(
                    socket = %handle,
                    %address,
                    port,
                    error = %e,
                    "[wifi-sockets] connect command failed"
                );
                SocketError::ConnectFailed {
                    channel: channel.get(),
                }
            })?;
        }

        self.table
            .with_slot(handle, |slot| slot.flags.mark_connected())
            .ok_or_else(|| {
                warn!(
                    socket = %handle,
                    "[wifi-sockets] socket released while its connect was in flight"
                );
                invalid_handle(handle)
            })?;

        debug!(socket = %handle, %address, port, "[wifi-sockets] socket connected");
        Ok(())
    }

    fn resolve(&self, host: &str) -> SocketResult<Ipv4Addr> {
        let _permit = ChannelPermit::try_acquire(&self.lock, self.config.channel_lock_timeout)
            .ok_or_else(|| self.channel_busy("resolve"))?;

        match self.driver.resolve(host) {
            Ok(address) if !address.is_unspecified() => Ok(address),
            outcome => {
                debug!(host, ?outcome, "[wifi-sockets] address resolution failed");
                Err(SocketError::AddressResolutionFailed {
                    host: host.to_owned(),
                })
            }
        }
    }

    /// Shut the socket down, close the co-processor connection and release the slot.
    ///
    /// The close command is best effort: a busy channel or a driver error is
    /// logged and the slot is released anyway.
    pub(crate) fn disconnect_socket(&self, handle: SocketHandle) -> SocketResult<()> {
        let channel = self
            .table
            .with_slot(handle, |slot| {
                slot.flags.mark_shutdown();
                slot.channel
            })
            .ok_or_else(|| invalid_handle(handle))?;

        match ChannelPermit::try_acquire(&self.lock, self.config.channel_lock_timeout) {
            Some(_permit) => {
                // A reset while waiting for the lock already closed everything.
                if !self.table.is_valid(handle) {
                    return Err(invalid_handle(handle));
                }
                if let Err(e) = self.driver.close_connection(channel) {
                    debug!(socket = %handle, error = %e, "[wifi-sockets] close command failed, ignored");
                }
            }
            None => {
                self.channel_busy("disconnect");
            }
        }

        self.table.release(handle);
        debug!(socket = %handle, "[wifi-sockets] socket disconnected");
        Ok(())
    }
}
