//! Peripheral reset bookkeeping
//!
//! Counts what the fault recovery path did, so operators can tell a flaky
//! co-processor from a dead one.
//!
//! ```text
//! [HEALTHY] ──hardware fault──→ reset ok ──→ [HEALTHY, epoch+1]
//!                                 │
//!                                 └── reset failed ──→ [DEGRADED]
//!                                                           │
//! [HEALTHY] ←────────────── next successful reset ─────────┘
//! ```

/// Health of the co-processor channel as seen by the recovery path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelHealth {
    /// No unrecovered fault
    #[default]
    Healthy,
    /// The last reset attempt failed
    Degraded,
}

/// Outcome of one recovery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryEvent {
    /// The module reset and the table was reinitialised
    ResetSucceeded,
    /// The module refused to reset; the table is untouched
    ResetFailed,
}

/// Tracks recovery outcomes.
#[derive(Debug, Default)]
pub struct RecoveryTracker {
    health: ChannelHealth,
    /// Completed table resets since start
    epoch: u64,
    failed_resets: u64,
    consecutive_failures: u64,
}

impl RecoveryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an attempt and return the new health.
    pub fn record(&mut self, event: RecoveryEvent) -> ChannelHealth {
        match event {
            RecoveryEvent::ResetSucceeded => {
                self.epoch += 1;
                self.consecutive_failures = 0;
                self.health = ChannelHealth::Healthy;
            }
            RecoveryEvent::ResetFailed => {
                self.failed_resets += 1;
                self.consecutive_failures += 1;
                self.health = ChannelHealth::Degraded;
            }
        }
        self.health
    }

    pub fn health(&self) -> ChannelHealth {
        self.health
    }

    /// Number of successful peripheral resets.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn failed_resets(&self) -> u64 {
        self.failed_resets
    }

    pub fn consecutive_failures(&self) -> u64 {
        self.consecutive_failures
    }
}
