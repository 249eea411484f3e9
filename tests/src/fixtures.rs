//! Shared fixtures for the suite.

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use wifi_sockets::{
    ChannelDriver, ChannelIndex, ConnectRequest, DriverResult, LoopbackDriver, MutexChannelLock,
    SocketService, SocketsConfig, SystemTimeSource, ThreadScheduler,
};

/// Service on host threads and clock.
pub type HostService<D = LoopbackDriver> =
    SocketService<D, MutexChannelLock, SystemTimeSource, ThreadScheduler>;

/// Echo port of the loopback co-processor.
pub const ECHO_PORT: u16 = 7;

/// Service over a fresh loopback driver with test timeouts.
pub fn loopback_service() -> HostService {
    loopback_service_with(SocketsConfig::for_testing())
}

pub fn loopback_service_with(config: SocketsConfig) -> HostService {
    SocketService::with_system_defaults(config, LoopbackDriver::new())
        .expect("test config is valid")
}

/// Driver wrapper that records how many channel commands overlap.
///
/// Module resets are excluded: they are issued without the channel lock.
#[derive(Debug)]
pub struct ExclusiveDriver<D> {
    inner: D,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    commands: AtomicUsize,
    send_hold: Mutex<Duration>,
}

impl<D: ChannelDriver> ExclusiveDriver<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            commands: AtomicUsize::new(0),
            send_hold: Mutex::new(Duration::ZERO),
        }
    }

    /// Keep every later send command on the channel for `hold`.
    pub fn hold_sends(&self, hold: Duration) {
        *self.send_hold.lock() = hold;
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    /// Highest number of commands seen running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn commands(&self) -> usize {
        self.commands.load(Ordering::SeqCst)
    }

    fn track<R>(&self, command: impl FnOnce(&D) -> R) -> R {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.commands.fetch_add(1, Ordering::SeqCst);
        // Widen the window so overlapping commands would be observed.
        std::thread::yield_now();
        let result = command(&self.inner);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl<D: ChannelDriver> ChannelDriver for ExclusiveDriver<D> {
    fn resolve(&self, host: &str) -> DriverResult<Ipv4Addr> {
        self.track(|d| d.resolve(host))
    }

    fn open_connection(&self, request: &ConnectRequest) -> DriverResult<()> {
        self.track(|d| d.open_connection(request))
    }

    fn close_connection(&self, channel: ChannelIndex) -> DriverResult<()> {
        self.track(|d| d.close_connection(channel))
    }

    fn send(&self, channel: ChannelIndex, data: &[u8], timeout: Duration) -> DriverResult<usize> {
        let hold = *self.send_hold.lock();
        self.track(|d| {
            if !hold.is_zero() {
                std::thread::sleep(hold);
            }
            d.send(channel, data, timeout)
        })
    }

    fn receive(
        &self,
        channel: ChannelIndex,
        buffer: &mut [u8],
        timeout: Duration,
    ) -> DriverResult<usize> {
        self.track(|d| d.receive(channel, buffer, timeout))
    }

    fn reset_module(&self) -> DriverResult<()> {
        self.inner.reset_module()
    }
}
