//! # Ports Layer - Hexagonal Architecture Boundaries
//!
//! - **Driving Ports (Inbound):** the sockets API offered to upper layers
//! - **Driven Ports (Outbound):** the co-processor driver, channel lock,
//!   clock, scheduler and configuration this layer requires

pub mod inbound;
pub mod outbound;

pub use inbound::SocketsApi;
pub use outbound::{
    ChannelDriver, ChannelLock, ConfigProvider, ConnectRequest, DriverError, DriverResult,
    Scheduler, TimeSource, TransportProtocol,
};
