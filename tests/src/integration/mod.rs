//! # Integration Tests
//!
//! Real threads, the real channel lock and the system clock, with the
//! loopback driver standing in for the co-processor.

pub mod flows;
pub mod surfaces;
