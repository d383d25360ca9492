//! # dhcpwire
//!
//! The packet transport layer of a DHCP client or server: building
//! outbound BOOTP/DHCP messages, validating inbound ones, and getting
//! them on the wire with or without kernel help.
//!
//! ## Features
//!
//! - Fixed-layout message encoding and decoding per RFC 2131 (548-byte
//!   records, explicit per-field serialization)
//! - Message construction with the correct BOOTP operation class for
//!   each message type
//! - Inbound validation with the magic cookie check and the legacy
//!   broken-vendor broadcast quirk
//! - Raw transmission over `AF_PACKET` with hand-built IP/UDP headers,
//!   for hosts that are not yet addressable
//! - Kernel-framed transmission over a connected UDP socket
//! - RFC 1071 Internet checksum shared by the IP and UDP headers
//!
//! ## Quick Start
//!
//! ```no_run
//! use dhcpwire::{DhcpMessage, KernelTransport, MessageType, Transport};
//! use std::net::{Ipv4Addr, SocketAddrV4};
//!
//! fn main() -> dhcpwire::Result<()> {
//!     let mut message = DhcpMessage::new(MessageType::Inform);
//!     message.xid = 0x3903f326;
//!
//!     let transport = KernelTransport::new(
//!         SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 68),
//!         SocketAddrV4::new(Ipv4Addr::new(192, 168, 1, 1), 67),
//!     );
//!     transport.send(&message)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`DhcpMessage`] - fixed-size message record, builder and codec
//! - [`recv_message`] - receive-and-validate with the vendor quirk
//! - [`RawTransport`] / [`KernelTransport`] - the two transmit paths
//! - [`UdpDatagram`] - manual IP/UDP framing for the raw path
//! - [`checksum()`] - RFC 1071 Internet checksum
//! - [`Config`] - interface, ports, and the broken-vendor table

pub mod checksum;
pub mod config;
pub mod error;
pub mod frame;
pub mod message;
pub mod options;
pub mod reader;
pub mod transport;

pub use checksum::checksum;
pub use config::Config;
pub use error::{Error, Result};
pub use frame::UdpDatagram;
pub use message::DhcpMessage;
pub use options::{MessageType, OptionCode};
pub use reader::recv_message;
pub use transport::{KernelTransport, RawTransport, Transport};
