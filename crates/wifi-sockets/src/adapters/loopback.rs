//! # Loopback Co-Processor
//!
//! In-memory stand-in for the WiFi module: every connection is an echo
//! server, so bytes sent on a channel come back on the same channel's
//! receive side. Hardware faults and failed resets can be injected to
//! exercise the recovery path without a board.

use std::collections::{HashMap, VecDeque};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::trace;

use crate::domain::config::DEFAULT_MAX_TRANSFER_SIZE;
use crate::domain::slot::ChannelIndex;
use crate::ports::outbound::{ChannelDriver, ConnectRequest, DriverError, DriverResult};

/// Command a fault can be injected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    Send,
    Receive,
}

#[derive(Debug)]
struct Connection {
    peer: SocketAddrV4,
    echo: VecDeque<u8>,
}

#[derive(Debug, Default)]
struct LoopbackState {
    hosts: HashMap<String, Ipv4Addr>,
    connections: HashMap<ChannelIndex, Connection>,
    pending_faults: HashMap<FaultPoint, usize>,
    failing_resets: usize,
    resets: u64,
}

/// Echoing in-memory co-processor.
#[derive(Debug)]
pub struct LoopbackDriver {
    state: Mutex<LoopbackState>,
    /// Largest chunk accepted by one send command
    send_chunk: usize,
}

impl LoopbackDriver {
    pub fn new() -> Self {
        let mut hosts = HashMap::new();
        hosts.insert("localhost".to_owned(), Ipv4Addr::LOCALHOST);
        Self {
            state: Mutex::new(LoopbackState {
                hosts,
                ..LoopbackState::default()
            }),
            send_chunk: DEFAULT_MAX_TRANSFER_SIZE,
        }
    }

    /// Accept at most `chunk` bytes per send, to produce partial sends.
    #[must_use]
    pub fn with_send_chunk(mut self, chunk: usize) -> Self {
        self.send_chunk = chunk.max(1);
        self
    }

    /// Make `host` resolvable.
    #[must_use]
    pub fn with_host(self, host: impl Into<String>, address: Ipv4Addr) -> Self {
        self.state.lock().hosts.insert(host.into(), address);
        self
    }

    /// Fail the next command at `point` with a hardware error.
    pub fn inject_fault(&self, point: FaultPoint) {
        *self.state.lock().pending_faults.entry(point).or_default() += 1;
    }

    /// Make the next reset attempt fail.
    pub fn fail_next_reset(&self) {
        self.state.lock().failing_resets += 1;
    }

    /// Queue bytes as if the peer on `channel` had sent them.
    ///
    /// Returns `false` if the channel has no connection.
    pub fn push_incoming(&self, channel: ChannelIndex, data: &[u8]) -> bool {
        match self.state.lock().connections.get_mut(&channel) {
            Some(connection) => {
                connection.echo.extend(data);
                true
            }
            None => false,
        }
    }

    /// Peer of the connection on `channel`, if any.
    pub fn peer(&self, channel: ChannelIndex) -> Option<SocketAddrV4> {
        self.state.lock().connections.get(&channel).map(|c| c.peer)
    }

    pub fn open_connections(&self) -> usize {
        self.state.lock().connections.len()
    }

    /// Successful module resets.
    pub fn resets(&self) -> u64 {
        self.state.lock().resets
    }

    fn take_fault(state: &mut LoopbackState, point: FaultPoint) -> bool {
        match state.pending_faults.get_mut(&point) {
            Some(pending) if *pending > 0 => {
                *pending -= 1;
                true
            }
            _ => false,
        }
    }
}

impl Default for LoopbackDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelDriver for LoopbackDriver {
    fn resolve(&self, host: &str) -> DriverResult<Ipv4Addr> {
        let state = self.state.lock();
        let address = state
            .hosts
            .get(host)
            .copied()
            .or_else(|| host.parse().ok())
            .unwrap_or(Ipv4Addr::UNSPECIFIED);
        Ok(address)
    }

    fn open_connection(&self, request: &ConnectRequest) -> DriverResult<()> {
        let mut state = self.state.lock();
        if state.connections.contains_key(&request.channel) {
            return Err(DriverError::Hardware);
        }
        state.connections.insert(
            request.channel,
            Connection {
                peer: SocketAddrV4::new(request.address, request.port),
                echo: VecDeque::new(),
            },
        );
        trace!(channel = %request.channel, address = %request.address, port = request.port, "[loopback] connected");
        Ok(())
    }

    fn close_connection(&self, channel: ChannelIndex) -> DriverResult<()> {
        match self.state.lock().connections.remove(&channel) {
            Some(_) => Ok(()),
            None => Err(DriverError::Timeout),
        }
    }

    fn send(&self, channel: ChannelIndex, data: &[u8], _timeout: Duration) -> DriverResult<usize> {
        let mut state = self.state.lock();
        if Self::take_fault(&mut state, FaultPoint::Send) {
            return Err(DriverError::Hardware);
        }
        let connection = state
            .connections
            .get_mut(&channel)
            .ok_or(DriverError::Timeout)?;

        let accepted = data.len().min(self.send_chunk);
        connection.echo.extend(&data[..accepted]);
        Ok(accepted)
    }

    fn receive(
        &self,
        channel: ChannelIndex,
        buffer: &mut [u8],
        _timeout: Duration,
    ) -> DriverResult<usize> {
        let mut state = self.state.lock();
        if Self::take_fault(&mut state, FaultPoint::Receive) {
            return Err(DriverError::Hardware);
        }
        let connection = state
            .connections
            .get_mut(&channel)
            .ok_or(DriverError::Timeout)?;
        if connection.echo.is_empty() {
            return Err(DriverError::Timeout);
        }

        let count = buffer.len().min(connection.echo.len());
        for (slot, byte) in buffer.iter_mut().zip(connection.echo.drain(..count)) {
            *slot = byte;
        }
        Ok(count)
    }

    fn reset_module(&self) -> DriverResult<()> {
        let mut state = self.state.lock();
        if state.failing_resets > 0 {
            state.failing_resets -= 1;
            return Err(DriverError::Hardware);
        }
        state.connections.clear();
        state.pending_faults.clear();
        state.resets += 1;
        Ok(())
    }
}
