//! # Timeout-Emulating I/O Engine
//!
//! The driver's timeout argument only bounds a single busy poll of the
//! co-processor. A long poll would starve every other task waiting on the
//! channel, so `receive` loops over 1 ms polls, checks the elapsed time
//! against the socket's receive timeout itself and sleeps between attempts.
//!
//! ```text
//! t0 = now
//! loop:
//!   lock(recv_timeout + slack) ── fail ──→ Ok(0)
//!   poll(1 ms); unlock
//!   ├─ Ok(n > 0)          → Ok(n)
//!   ├─ Ok(0) | Timeout    → now - t0 < recv_timeout ? sleep(5 ms) : Ok(0)
//!   └─ Hardware           → recovery
//! ```
//!
//! Sends are not looped: the co-processor honours the send timeout itself.

use tracing::{debug, trace};

use super::permit::ChannelPermit;
use super::{invalid_handle, SocketService};
use crate::domain::errors::{SocketError, SocketResult};
use crate::domain::slot::SocketHandle;
use crate::metrics;
use crate::ports::outbound::{ChannelDriver, ChannelLock, DriverError, Scheduler, TimeSource};

impl<D, L, T, S> SocketService<D, L, T, S>
where
    D: ChannelDriver,
    L: ChannelLock,
    T: TimeSource,
    S: Scheduler,
{
    /// Receive at most `max_transfer_size` bytes.
    ///
    /// `Ok(0)` means the receive timeout elapsed, or the buffer was empty.
    pub(crate) fn receive(&self, handle: SocketHandle, buffer: &mut [u8]) -> SocketResult<usize> {
        let (channel, receive_timeout) = self
            .table
            .with_slot(handle, |slot| (slot.channel, slot.receive_timeout))
            .ok_or_else(|| invalid_handle(handle))?;

        let len = buffer.len().min(self.config.max_transfer_size);
        if len == 0 {
            return Ok(0);
        }
        let buffer = &mut buffer[..len];

        let lock_timeout = self.config.receive_lock_timeout(receive_timeout);
        let started = self.clock.now();

        loop {
            let outcome = {
                let Some(_permit) = ChannelPermit::try_acquire(&self.lock, lock_timeout) else {
                    // The lock wait already used up the whole receive budget.
                    metrics::record_lock_timeout("recv");
                    metrics::record_receive_timeout();
                    debug!(socket = %handle, "[wifi-sockets] receive lock timed out");
                    return Ok(0);
                };
                if !self.table.is_valid(handle) {
                    return Err(invalid_handle(handle));
                }
                self.driver
                    .receive(channel, buffer, self.config.receive_poll_timeout)
            };

            match outcome {
                Ok(received) if received > 0 => {
                    let received = received.min(len);
                    metrics::record_bytes_received(received);
                    trace!(socket = %handle, bytes = received, "[wifi-sockets] received");
                    return Ok(received);
                }
                Ok(_) | Err(DriverError::Timeout) => {
                    let elapsed = self.clock.now().saturating_sub(started);
                    if elapsed >= receive_timeout {
                        metrics::record_receive_timeout();
                        trace!(
                            socket = %handle,
                            elapsed_ms = elapsed.as_millis() as u64,
                            "[wifi-sockets] receive timed out"
                        );
                        return Ok(0);
                    }
                    self.scheduler.sleep(self.config.receive_retry_delay);
                }
                Err(DriverError::Hardware) => return Err(self.recover_from_fault("recv")),
            }
        }
    }

    /// Send at most `max_transfer_size` bytes, then yield once.
    pub(crate) fn send_data(&self, handle: SocketHandle, data: &[u8]) -> SocketResult<usize> {
        let result = self.send_locked(handle, data);
        // Waiters of equal priority would otherwise only get the channel at
        // the next tick, by which time this task may have taken it again.
        self.scheduler.yield_now();
        result
    }

    fn send_locked(&self, handle: SocketHandle, data: &[u8]) -> SocketResult<usize> {
        let (channel, send_timeout) = self
            .table
            .with_slot(handle, |slot| (slot.channel, slot.send_timeout))
            .ok_or_else(|| invalid_handle(handle))?;

        let payload = &data[..data.len().min(self.config.max_transfer_size)];
        let driver_timeout = self.config.driver_send_timeout(send_timeout);

        let outcome = {
            let _permit = ChannelPermit::try_acquire(&self.lock, self.config.channel_lock_timeout)
                .ok_or_else(|| self.channel_busy("send"))?;
            if !self.table.is_valid(handle) {
                return Err(invalid_handle(handle));
            }
            self.driver.send(channel, payload, driver_timeout)
        };

        match outcome {
            Ok(sent) => {
                let sent = sent.min(payload.len());
                metrics::record_bytes_sent(sent);
                trace!(
                    socket = %handle,
                    bytes = sent,
                    requested = data.len(),
                    "[wifi-sockets] sent"
                );
                Ok(sent)
            }
            Err(DriverError::Timeout) => {
                debug!(
                    socket = %handle,
                    timeout_ms = driver_timeout.as_millis() as u64,
                    "[wifi-sockets] send timed out"
                );
                Err(SocketError::Timeout { operation: "send" })
            }
            Err(DriverError::Hardware) => Err(self.recover_from_fault("send")),
        }
    }
}
