//! # Adapters Layer
//!
//! Implementations of the outbound ports for host builds, plus the loopback
//! co-processor used by the demo runtime and integration tests.
//!
//! - `lock` - timed channel lock (always available)
//! - `time` - system clock and thread scheduler (always available)
//! - `config` - static provider; TOML provider with `config-file`
//! - `loopback` - echoing in-memory co-processor with fault injection
//! - `async_bridge` - tokio facade with `tokio`

pub mod config;
pub mod lock;
pub mod loopback;
pub mod time;

#[cfg(feature = "tokio")]
pub mod async_bridge;

pub use config::StaticConfigProvider;
#[cfg(feature = "config-file")]
pub use config::{ConfigError, TomlConfigProvider};
pub use lock::MutexChannelLock;
pub use loopback::{FaultPoint, LoopbackDriver};
pub use time::{SystemTimeSource, ThreadScheduler};

#[cfg(feature = "tokio")]
pub use async_bridge::AsyncSockets;
