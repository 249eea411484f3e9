//! Domain Layer - Pure socket bookkeeping with no I/O
//!
//! This module contains:
//! - Socket flags and slots
//! - The fixed socket table (allocation, validation, reset)
//! - Configuration and socket options
//! - Error taxonomy and legacy status codes
//! - Peripheral reset bookkeeping

pub mod config;
pub mod errors;
pub mod flags;
pub mod options;
pub mod recovery;
pub mod slot;
pub mod socket_table;

pub use config::*;
pub use errors::{status, SocketError, SocketResult};
pub use flags::SocketFlags;
pub use options::{OptionName, SocketOption};
pub use recovery::{ChannelHealth, RecoveryEvent, RecoveryTracker};
pub use slot::{ChannelIndex, SocketHandle, SocketInfo, SocketSlot};
pub use socket_table::{SocketTable, SocketTableStats};
