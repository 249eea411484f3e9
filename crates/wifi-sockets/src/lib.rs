//! # WiFi Co-Processor Sockets
//!
//! Socket multiplexing layer between a blocking sockets API and the single,
//! half-duplex command channel of a WiFi co-processor.
//!
//! A small, fixed number of logical sockets share one physical channel that
//! can serve exactly one outstanding command. This crate:
//!
//! - hands out sockets from a fixed table with generation-checked handles
//! - serialises every channel command behind one timed lock
//! - emulates receive timeouts on top of a 1 ms polling primitive
//! - resets the co-processor and the whole table after a hardware error
//!
//! ## Architecture
//!
//! - **Domain Layer:** socket table, flags, configuration, errors
//! - **Ports Layer:** `SocketsApi` inbound; driver, lock, clock, scheduler outbound
//! - **Service Layer:** `SocketService`, the context object that owns the table
//! - **Adapters Layer:** host lock and clock, loopback co-processor, config providers
//!
//! ## Features
//!
//! - `config-file` - TOML configuration (serde, toml)
//! - `tokio` - async facade on the blocking pool
//! - `metrics` - prometheus counters
//! - `test-utils` - manual clock, scripted driver, busy lock
//!
//! ## Example
//!
//! ```rust
//! use wifi_sockets::{LoopbackDriver, SocketService, SocketsApi, SocketsConfig};
//!
//! let sockets = SocketService::with_system_defaults(
//!     SocketsConfig::default(),
//!     LoopbackDriver::new(),
//! )
//! .unwrap();
//!
//! let handle = sockets.open().unwrap();
//! sockets.connect(handle, "localhost", 7).unwrap();
//! assert_eq!(sockets.send(handle, b"ping").unwrap(), 4);
//!
//! let mut buf = [0u8; 16];
//! assert_eq!(sockets.recv(handle, &mut buf).unwrap(), 4);
//! sockets.disconnect(handle).unwrap();
//! ```

// =============================================================================
// CORE MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

// =============================================================================
// FEATURE-GATED MODULES
// =============================================================================

/// Deterministic port implementations for tests.
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-exports
pub use adapters::{LoopbackDriver, MutexChannelLock, StaticConfigProvider, SystemTimeSource, ThreadScheduler};
pub use domain::{
    status, ChannelHealth, ChannelIndex, OptionName, SocketError, SocketFlags, SocketHandle,
    SocketInfo, SocketOption, SocketResult, SocketTableStats, SocketsConfig,
};
pub use ports::{
    ChannelDriver, ChannelLock, ConfigProvider, ConnectRequest, DriverError, DriverResult,
    Scheduler, SocketsApi, TimeSource, TransportProtocol,
};
pub use service::{ServiceStats, SocketService};

#[cfg(feature = "tokio")]
pub use adapters::AsyncSockets;
#[cfg(feature = "config-file")]
pub use adapters::{ConfigError, TomlConfigProvider};
