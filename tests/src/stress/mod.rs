//! # Stress Tests
//!
//! Oversubscribed socket tables and concurrent I/O.

pub mod concurrency;
