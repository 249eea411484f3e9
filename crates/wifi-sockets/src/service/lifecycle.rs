//! Table initialisation, open, close and socket options.

use tracing::{debug, warn};

use super::{invalid_handle, SocketService};
use crate::domain::errors::{SocketError, SocketResult};
use crate::domain::options::SocketOption;
use crate::domain::slot::SocketHandle;
use crate::metrics;
use crate::ports::outbound::{ChannelDriver, ChannelLock, Scheduler, TimeSource};

impl<D, L, T, S> SocketService<D, L, T, S>
where
    D: ChannelDriver,
    L: ChannelLock,
    T: TimeSource,
    S: Scheduler,
{
    pub(crate) fn init_table(&self) {
        self.table.reset_all();
        debug!(
            capacity = self.table.capacity(),
            "[wifi-sockets] socket table initialised"
        );
    }

    pub(crate) fn open_socket(&self) -> SocketResult<SocketHandle> {
        match self.table.allocate() {
            Some(handle) => {
                metrics::record_socket_opened();
                debug!(socket = %handle, "[wifi-sockets] socket opened");
                Ok(handle)
            }
            None => {
                metrics::record_open_rejected();
                debug!(
                    capacity = self.table.capacity(),
                    "[wifi-sockets] no free socket slot"
                );
                Err(SocketError::NoResourceAvailable)
            }
        }
    }

    /// Local-only release. The co-processor is not told.
    pub(crate) fn close_socket(&self, handle: SocketHandle) -> SocketResult<()> {
        let info = self
            .table
            .snapshot(handle)
            .ok_or_else(|| invalid_handle(handle))?;

        if info.flags.is_connected() {
            warn!(
                socket = %handle,
                channel = %info.channel,
                "[wifi-sockets] closing a connected socket without disconnect, co-processor connection left open"
            );
        }

        if !self.table.release(handle) {
            return Err(invalid_handle(handle));
        }
        debug!(socket = %handle, "[wifi-sockets] socket closed");
        Ok(())
    }

    /// Only the two timeouts are applied; anything else leaves the slot untouched.
    pub(crate) fn set_socket_option(
        &self,
        handle: SocketHandle,
        option: SocketOption,
    ) -> SocketResult<()> {
        let name = option.name();
        self.table
            .with_slot(handle, |slot| match option {
                SocketOption::ReceiveTimeout(timeout) => {
                    slot.receive_timeout = timeout;
                    Ok(())
                }
                SocketOption::SendTimeout(timeout) => {
                    slot.send_timeout = timeout;
                    Ok(())
                }
                _ => Err(SocketError::UnsupportedOption { option: name }),
            })
            .ok_or_else(|| invalid_handle(handle))??;

        debug!(socket = %handle, option = %name, "[wifi-sockets] option set");
        Ok(())
    }
}
