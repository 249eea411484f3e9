//! Socket options accepted by `set_option`.
//!
//! Only the two timeouts are handled by this layer. The remaining options
//! belong to the TLS layer or to network stacks with a real non-blocking mode
//! and are answered with `UnsupportedOption`.

use std::fmt;
use std::time::Duration;

/// A socket option together with its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketOption {
    /// Receive timeout (emulated by the receive loop)
    ReceiveTimeout(Duration),
    /// Send timeout (handed to the driver)
    SendTimeout(Duration),
    /// Send buffer size
    SendBufferSize(usize),
    /// Receive buffer size
    ReceiveBufferSize(usize),
    /// Switch to non-blocking mode
    NonBlocking,
    /// Require TLS on the socket
    RequireTls,
    /// SNI host name
    ServerNameIndication(String),
    /// Trusted server certificate (PEM or DER)
    TrustedServerCertificate(Vec<u8>),
    /// ALPN protocol list
    AlpnProtocols(Vec<String>),
}

impl SocketOption {
    /// Name of the option, without its value.
    pub fn name(&self) -> OptionName {
        match self {
            Self::ReceiveTimeout(_) => OptionName::ReceiveTimeout,
            Self::SendTimeout(_) => OptionName::SendTimeout,
            Self::SendBufferSize(_) => OptionName::SendBufferSize,
            Self::ReceiveBufferSize(_) => OptionName::ReceiveBufferSize,
            Self::NonBlocking => OptionName::NonBlocking,
            Self::RequireTls => OptionName::RequireTls,
            Self::ServerNameIndication(_) => OptionName::ServerNameIndication,
            Self::TrustedServerCertificate(_) => OptionName::TrustedServerCertificate,
            Self::AlpnProtocols(_) => OptionName::AlpnProtocols,
        }
    }
}

/// Option names, used in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionName {
    ReceiveTimeout,
    SendTimeout,
    SendBufferSize,
    ReceiveBufferSize,
    NonBlocking,
    RequireTls,
    ServerNameIndication,
    TrustedServerCertificate,
    AlpnProtocols,
}

impl fmt::Display for OptionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ReceiveTimeout => "SO_RCVTIMEO",
            Self::SendTimeout => "SO_SNDTIMEO",
            Self::SendBufferSize => "SO_SNDBUF",
            Self::ReceiveBufferSize => "SO_RCVBUF",
            Self::NonBlocking => "SO_NONBLOCK",
            Self::RequireTls => "SO_REQUIRE_TLS",
            Self::ServerNameIndication => "SO_SERVER_NAME_INDICATION",
            Self::TrustedServerCertificate => "SO_TRUSTED_SERVER_CERTIFICATE",
            Self::AlpnProtocols => "SO_ALPN_PROTOCOLS",
        };
        f.write_str(name)
    }
}
