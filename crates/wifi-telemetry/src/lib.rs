//! # WiFi Telemetry
//!
//! Log setup shared by the binaries of the workspace.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wifi_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_logging(&config).expect("Failed to init logging");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `WIFI_SERVICE_NAME` | `wifi-sockets` | Service name in log lines |
//! | `WIFI_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `WIFI_CONSOLE_OUTPUT` | `true` | Write logs to the console |
//! | `WIFI_JSON_LOGS` | `false` | JSON formatted logs (default on in containers) |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{build_filter, init_logging, LoggingGuard};

#[doc(hidden)]
pub use tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}
