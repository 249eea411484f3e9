//! # Socket Layer Metrics
//!
//! Prometheus counters for socket usage and co-processor health.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! wifi-sockets = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `wifi_sockets_opened_total` - Sockets handed out by `open`
//! - `wifi_sockets_open_rejected_total` - `open` calls refused because the table was full
//! - `wifi_sockets_receive_timeouts_total` - Receives that ended with zero bytes
//! - `wifi_sockets_lock_timeouts_total` - Channel lock waits that ran out (by operation)
//! - `wifi_sockets_peripheral_resets_total` - Recovery attempts (by outcome)
//! - `wifi_sockets_bytes_sent_total` / `wifi_sockets_bytes_received_total`

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Sockets handed out
    pub static ref SOCKETS_OPENED: IntCounter = register_int_counter!(
        "wifi_sockets_opened_total",
        "Total number of sockets opened"
    )
    .expect("Failed to create SOCKETS_OPENED metric");

    /// Open calls refused
    pub static ref OPEN_REJECTED: IntCounter = register_int_counter!(
        "wifi_sockets_open_rejected_total",
        "Total number of open calls refused because no slot was free"
    )
    .expect("Failed to create OPEN_REJECTED metric");

    /// Receives that timed out
    pub static ref RECEIVE_TIMEOUTS: IntCounter = register_int_counter!(
        "wifi_sockets_receive_timeouts_total",
        "Total number of receives that returned zero bytes on timeout"
    )
    .expect("Failed to create RECEIVE_TIMEOUTS metric");

    /// Channel lock timeouts, labeled by operation
    pub static ref LOCK_TIMEOUTS: IntCounterVec = register_int_counter_vec!(
        "wifi_sockets_lock_timeouts_total",
        "Total number of channel lock acquisitions that timed out",
        &["operation"]
    )
    .expect("Failed to create LOCK_TIMEOUTS metric");

    /// Peripheral reset attempts, labeled by outcome
    pub static ref PERIPHERAL_RESETS: IntCounterVec = register_int_counter_vec!(
        "wifi_sockets_peripheral_resets_total",
        "Total number of co-processor reset attempts",
        &["outcome"]
    )
    .expect("Failed to create PERIPHERAL_RESETS metric");

    /// Bytes accepted by the co-processor
    pub static ref BYTES_SENT: IntCounter = register_int_counter!(
        "wifi_sockets_bytes_sent_total",
        "Total number of bytes accepted by the co-processor"
    )
    .expect("Failed to create BYTES_SENT metric");

    /// Bytes received from the co-processor
    pub static ref BYTES_RECEIVED: IntCounter = register_int_counter!(
        "wifi_sockets_bytes_received_total",
        "Total number of bytes received from the co-processor"
    )
    .expect("Failed to create BYTES_RECEIVED metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a socket opened
#[cfg(feature = "metrics")]
pub fn record_socket_opened() {
    SOCKETS_OPENED.inc();
}

/// Record an open refused for lack of slots
#[cfg(feature = "metrics")]
pub fn record_open_rejected() {
    OPEN_REJECTED.inc();
}

/// Record a receive that timed out
#[cfg(feature = "metrics")]
pub fn record_receive_timeout() {
    RECEIVE_TIMEOUTS.inc();
}

/// Record a channel lock timeout
#[cfg(feature = "metrics")]
pub fn record_lock_timeout(operation: &str) {
    LOCK_TIMEOUTS.with_label_values(&[operation]).inc();
}

/// Record a reset attempt
#[cfg(feature = "metrics")]
pub fn record_peripheral_reset(succeeded: bool) {
    let outcome = if succeeded { "succeeded" } else { "failed" };
    PERIPHERAL_RESETS.with_label_values(&[outcome]).inc();
}

/// Record bytes sent
#[cfg(feature = "metrics")]
pub fn record_bytes_sent(count: usize) {
    BYTES_SENT.inc_by(count as u64);
}

/// Record bytes received
#[cfg(feature = "metrics")]
pub fn record_bytes_received(count: usize) {
    BYTES_RECEIVED.inc_by(count as u64);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_socket_opened() {}

#[cfg(not(feature = "metrics"))]
pub fn record_open_rejected() {}

#[cfg(not(feature = "metrics"))]
pub fn record_receive_timeout() {}

#[cfg(not(feature = "metrics"))]
pub fn record_lock_timeout(_operation: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_peripheral_reset(_succeeded: bool) {}

#[cfg(not(feature = "metrics"))]
pub fn record_bytes_sent(_count: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_bytes_received(_count: usize) {}
