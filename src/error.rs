//! Error types for the packet transport layer.
//!
//! All fallible operations in this crate return [`Result<T>`], which uses
//! the [`Error`] enum for error variants.

/// Errors that can occur while building, receiving, or transmitting packets.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File system or network I/O error.
    ///
    /// A failed read on the receive path surfaces here, distinct from
    /// [`Error::InvalidCookie`] so callers can tell a dead socket from a
    /// garbage datagram.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error (config file).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A received datagram did not carry the DHCP magic cookie.
    ///
    /// The payload is discarded whole; no partially decoded message is
    /// returned alongside this error.
    #[error("Invalid magic cookie {0:#010x}, expected 0x63825363")]
    InvalidCookie(u32),

    /// Malformed DHCP message or options area.
    ///
    /// This includes truncated options, declared lengths running past the
    /// end of the options area, and appends that do not fit.
    #[error("Invalid DHCP packet: {0}")]
    InvalidPacket(String),

    /// Invalid configuration.
    ///
    /// Returned by [`Config::validate`](crate::Config::validate) when the
    /// configuration contains invalid values (e.g., client and server
    /// ports set equal).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Socket creation or configuration error.
    ///
    /// Typically occurs when opening a packet socket without CAP_NET_RAW,
    /// or when the specified network interface doesn't exist.
    #[error("Socket error: {0}")]
    Socket(String),
}

/// A specialized Result type for packet transport operations.
pub type Result<T> = std::result::Result<T, Error>;
