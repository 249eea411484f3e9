//! Test utilities for the socket layer.
//!
//! Deterministic stand-ins for the outbound ports. Enable with the
//! `test-utils` feature flag.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use wifi_sockets::test_utils::{ManualClock, ManualScheduler};
//! use wifi_sockets::{Scheduler, TimeSource};
//!
//! let clock = ManualClock::new();
//! let scheduler = ManualScheduler::new(clock.clone());
//! scheduler.sleep(Duration::from_millis(5));
//! assert_eq!(clock.now(), Duration::from_millis(5));
//! ```

use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::domain::slot::ChannelIndex;
use crate::ports::outbound::{
    ChannelDriver, ChannelLock, ConnectRequest, DriverError, DriverResult, Scheduler, TimeSource,
};

// =============================================================================
// Time
// =============================================================================

/// A clock that only moves when told to.
///
/// Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now = now.saturating_add(by);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock()
    }
}

/// A scheduler whose `sleep` advances a `ManualClock` instead of blocking.
#[derive(Debug, Clone)]
pub struct ManualScheduler {
    clock: ManualClock,
    sleeps: Arc<Mutex<Vec<Duration>>>,
    yields: Arc<AtomicUsize>,
}

impl ManualScheduler {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            sleeps: Arc::default(),
            yields: Arc::default(),
        }
    }

    /// Every sleep requested so far.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }

    pub fn yields(&self) -> usize {
        self.yields.load(Ordering::SeqCst)
    }
}

impl Scheduler for ManualScheduler {
    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
        self.clock.advance(duration);
    }

    fn yield_now(&self) {
        self.yields.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Driver
// =============================================================================

/// A driver command as seen by `ScriptedDriver`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    Resolve(String),
    Open(ConnectRequest),
    Close(ChannelIndex),
    Send {
        channel: ChannelIndex,
        len: usize,
        timeout: Duration,
    },
    Receive {
        channel: ChannelIndex,
        capacity: usize,
        timeout: Duration,
    },
    Reset,
}

#[derive(Debug, Default)]
struct Script {
    resolve: VecDeque<DriverResult<Ipv4Addr>>,
    open: VecDeque<DriverResult<()>>,
    close: VecDeque<DriverResult<()>>,
    send: VecDeque<DriverResult<usize>>,
    receive: VecDeque<DriverResult<Vec<u8>>>,
    reset: VecDeque<DriverResult<()>>,
    calls: Vec<DriverCall>,
}

/// A driver that replays queued outcomes and records every call.
///
/// When a queue is empty the command falls back to a quiet default:
/// resolve to 10.0.0.1, open/close/reset succeed, send accepts everything
/// and receive times out.
#[derive(Debug, Default)]
pub struct ScriptedDriver {
    script: Mutex<Script>,
    /// Advanced by the poll timeout on every receive, like a busy-polling driver
    clock: Option<ManualClock>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance `clock` by each receive's poll timeout.
    #[must_use]
    pub fn with_clock(mut self, clock: ManualClock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn push_resolve(&self, outcome: DriverResult<Ipv4Addr>) {
        self.script.lock().resolve.push_back(outcome);
    }

    pub fn push_open(&self, outcome: DriverResult<()>) {
        self.script.lock().open.push_back(outcome);
    }

    pub fn push_close(&self, outcome: DriverResult<()>) {
        self.script.lock().close.push_back(outcome);
    }

    pub fn push_send(&self, outcome: DriverResult<usize>) {
        self.script.lock().send.push_back(outcome);
    }

    /// Queue a receive outcome; `Ok(bytes)` is copied into the caller's buffer.
    pub fn push_receive(&self, outcome: DriverResult<Vec<u8>>) {
        self.script.lock().receive.push_back(outcome);
    }

    pub fn push_reset(&self, outcome: DriverResult<()>) {
        self.script.lock().reset.push_back(outcome);
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.script.lock().calls.clone()
    }

    /// Number of recorded calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&DriverCall) -> bool) -> usize {
        self.script.lock().calls.iter().filter(|c| predicate(c)).count()
    }
}

impl ChannelDriver for ScriptedDriver {
    fn resolve(&self, host: &str) -> DriverResult<Ipv4Addr> {
        let mut script = self.script.lock();
        script.calls.push(DriverCall::Resolve(host.to_owned()));
        script
            .resolve
            .pop_front()
            .unwrap_or(Ok(Ipv4Addr::new(10, 0, 0, 1)))
    }

    fn open_connection(&self, request: &ConnectRequest) -> DriverResult<()> {
        let mut script = self.script.lock();
        script.calls.push(DriverCall::Open(*request));
        script.open.pop_front().unwrap_or(Ok(()))
    }

    fn close_connection(&self, channel: ChannelIndex) -> DriverResult<()> {
        let mut script = self.script.lock();
        script.calls.push(DriverCall::Close(channel));
        script.close.pop_front().unwrap_or(Ok(()))
    }

    fn send(&self, channel: ChannelIndex, data: &[u8], timeout: Duration) -> DriverResult<usize> {
        let mut script = self.script.lock();
        script.calls.push(DriverCall::Send {
            channel,
            len: data.len(),
            timeout,
        });
        script.send.pop_front().unwrap_or(Ok(data.len()))
    }

    fn receive(
        &self,
        channel: ChannelIndex,
        buffer: &mut [u8],
        timeout: Duration,
    ) -> DriverResult<usize> {
        let outcome = {
            let mut script = self.script.lock();
            script.calls.push(DriverCall::Receive {
                channel,
                capacity: buffer.len(),
                timeout,
            });
            script.receive.pop_front().unwrap_or(Err(DriverError::Timeout))
        };
        if let Some(clock) = &self.clock {
            clock.advance(timeout);
        }

        let bytes = outcome?;
        let count = bytes.len().min(buffer.len());
        buffer[..count].copy_from_slice(&bytes[..count]);
        // Report what the script claims, so over-reporting drivers can be modelled.
        Ok(bytes.len())
    }

    fn reset_module(&self) -> DriverResult<()> {
        let mut script = self.script.lock();
        script.calls.push(DriverCall::Reset);
        script.reset.pop_front().unwrap_or(Ok(()))
    }
}

// =============================================================================
// Lock
// =============================================================================

/// A channel lock permanently held by someone else.
///
/// Bounded acquisitions always time out; the unbounded acquisition used by
/// recovery succeeds, as if the holder had finally let go.
#[derive(Debug, Default)]
pub struct BusyChannelLock {
    bounded_waits: Mutex<Vec<Duration>>,
    unbounded: AtomicUsize,
    releases: AtomicUsize,
}

impl BusyChannelLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timeouts passed to every refused bounded acquisition.
    pub fn bounded_waits(&self) -> Vec<Duration> {
        self.bounded_waits.lock().clone()
    }

    pub fn unbounded_acquisitions(&self) -> usize {
        self.unbounded.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

impl ChannelLock for BusyChannelLock {
    fn try_acquire_for(&self, timeout: Duration) -> bool {
        self.bounded_waits.lock().push(timeout);
        false
    }

    fn acquire(&self) {
        self.unbounded.fetch_add(1, Ordering::SeqCst);
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}
