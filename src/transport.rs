//! Transmit paths for outbound DHCP messages.
//!
//! Two ways to put a message on the wire:
//!
//! - [`RawTransport`] writes the IP and UDP headers itself and hands the
//!   finished datagram to an `AF_PACKET` socket addressed by interface
//!   index and destination hardware address. This works before the host
//!   has a usable address, route, or ARP entry for the peer.
//! - [`KernelTransport`] sends over an ordinary connected UDP socket and
//!   lets the kernel build the headers. This needs routable source and
//!   destination addresses, which a renewing client or a unicasting
//!   server has.
//!
//! Both open a fresh socket per call and drop it before returning.
//! Nothing is cached across sends, and retry policy stays with the
//! caller.

use std::net::{SocketAddrV4, UdpSocket};

use socket2::{Domain, Protocol, Socket, Type};
#[cfg(target_os = "linux")]
use socket2::SockAddr;
use tracing::debug;

use crate::error::{Error, Result};
#[cfg(target_os = "linux")]
use crate::frame::UdpDatagram;
use crate::message::DhcpMessage;
#[cfg(target_os = "linux")]
use crate::message::HLEN_ETHERNET;

/// A mechanism for transmitting one fully formed DHCP message.
pub trait Transport {
    /// Transmits `message` and returns the number of bytes handed to the
    /// kernel.
    fn send(&self, message: &DhcpMessage) -> Result<usize>;
}

/// Transmits by framing the IP and UDP headers manually over a packet
/// socket.
///
/// The socket is bound to the *destination* hardware address, which is
/// how the frame reaches a peer the kernel has no ARP entry for. Only
/// available on Linux; elsewhere [`send`](Transport::send) fails with
/// [`Error::Socket`].
#[derive(Debug, Clone)]
pub struct RawTransport {
    /// Source address written into the frame (may be 0.0.0.0:68).
    pub source: SocketAddrV4,
    /// Destination address written into the frame.
    pub dest: SocketAddrV4,
    /// Destination hardware address, ff:ff:ff:ff:ff:ff for broadcast.
    pub dest_mac: [u8; 6],
    /// Index of the interface the frame leaves through.
    pub ifindex: i32,
}

impl RawTransport {
    /// Creates a raw transport for the given endpoints.
    pub fn new(source: SocketAddrV4, dest: SocketAddrV4, dest_mac: [u8; 6], ifindex: i32) -> Self {
        Self {
            source,
            dest,
            dest_mac,
            ifindex,
        }
    }

    /// Builds the link-layer address the socket binds and sends to.
    #[cfg(target_os = "linux")]
    fn link_layer_address(&self) -> std::io::Result<SockAddr> {
        let (_, address) = unsafe {
            SockAddr::try_init(|storage, len| {
                let sll = storage.cast::<libc::sockaddr_ll>();
                (*sll).sll_family = libc::AF_PACKET as libc::sa_family_t;
                (*sll).sll_protocol = (libc::ETH_P_IP as u16).to_be();
                (*sll).sll_ifindex = self.ifindex;
                (*sll).sll_halen = HLEN_ETHERNET;
                // The borrow for slicing has to be explicit; indexing the
                // array straight through the raw pointer is rejected.
                (&mut (*sll).sll_addr)[..usize::from(HLEN_ETHERNET)]
                    .copy_from_slice(&self.dest_mac);
                *len = std::mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t;
                Ok(())
            })
        }?;
        Ok(address)
    }
}

impl Transport for RawTransport {
    #[cfg(target_os = "linux")]
    fn send(&self, message: &DhcpMessage) -> Result<usize> {
        let protocol = i32::from((libc::ETH_P_IP as u16).to_be());
        let socket = Socket::new(Domain::PACKET, Type::DGRAM, Some(Protocol::from(protocol)))
            .map_err(|error| Error::Socket(format!("Failed to create packet socket: {}", error)))?;

        let address = self.link_layer_address().map_err(|error| {
            Error::Socket(format!("Failed to build link-layer address: {}", error))
        })?;

        socket.bind(&address).map_err(|error| {
            Error::Socket(format!(
                "Failed to bind to interface {}: {}",
                self.ifindex, error
            ))
        })?;

        let datagram = UdpDatagram::build(
            message,
            *self.source.ip(),
            self.source.port(),
            *self.dest.ip(),
            self.dest.port(),
        );

        let sent = socket
            .send_to(datagram.as_bytes(), &address)
            .map_err(|error| Error::Socket(format!("Failed to send raw packet: {}", error)))?;

        debug!(bytes = sent, ifindex = self.ifindex, "sent raw datagram");
        Ok(sent)
    }

    #[cfg(not(target_os = "linux"))]
    fn send(&self, _message: &DhcpMessage) -> Result<usize> {
        Err(Error::Socket(
            "Raw packet transmit requires a Linux packet socket".to_string(),
        ))
    }
}

/// Transmits through the kernel's UDP stack over a connected socket.
#[derive(Debug, Clone)]
pub struct KernelTransport {
    /// Local address the socket binds to.
    pub source: SocketAddrV4,
    /// Peer address the socket connects to.
    pub dest: SocketAddrV4,
}

impl KernelTransport {
    /// Creates a kernel transport between the given endpoints.
    pub fn new(source: SocketAddrV4, dest: SocketAddrV4) -> Self {
        Self { source, dest }
    }
}

impl Transport for KernelTransport {
    fn send(&self, message: &DhcpMessage) -> Result<usize> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
            .map_err(|error| Error::Socket(format!("Failed to create socket: {}", error)))?;

        socket
            .set_reuse_address(true)
            .map_err(|error| Error::Socket(format!("Failed to set SO_REUSEADDR: {}", error)))?;

        socket.bind(&self.source.into()).map_err(|error| {
            Error::Socket(format!("Failed to bind to {}: {}", self.source, error))
        })?;

        socket.connect(&self.dest.into()).map_err(|error| {
            Error::Socket(format!("Failed to connect to {}: {}", self.dest, error))
        })?;

        let socket: UdpSocket = socket.into();
        let sent = socket
            .send(&message.encode())
            .map_err(|error| Error::Socket(format!("Failed to send to {}: {}", self.dest, error)))?;

        debug!(bytes = sent, dest = %self.dest, "sent kernel datagram");
        Ok(sent)
    }
}

/// Returns the kernel interface index for `name`.
///
/// # Errors
///
/// Returns [`Error::Socket`] if the interface does not exist or sysfs is
/// unavailable.
pub fn interface_index(name: &str) -> Result<i32> {
    let path = format!("/sys/class/net/{}/ifindex", name);
    let data = std::fs::read_to_string(&path)
        .map_err(|error| Error::Socket(format!("Failed to read {}: {}", path, error)))?;
    data.trim()
        .parse::<i32>()
        .map_err(|error| Error::Socket(format!("Failed to parse ifindex for {}: {}", name, error)))
}

/// Returns the hardware address of interface `name`.
///
/// # Errors
///
/// Returns [`Error::Socket`] if the interface does not exist or its
/// address is not six colon-separated hex bytes.
pub fn interface_mac(name: &str) -> Result<[u8; 6]> {
    let path = format!("/sys/class/net/{}/address", name);
    let data = std::fs::read_to_string(&path)
        .map_err(|error| Error::Socket(format!("Failed to read {}: {}", path, error)))?;

    let text = data.trim();
    parse_mac(text)
        .ok_or_else(|| Error::Socket(format!("Invalid MAC address for {}: {}", name, text)))
}

/// Parses a colon-separated hardware address like "aa:bb:cc:dd:ee:ff".
pub fn parse_mac(text: &str) -> Option<[u8; 6]> {
    let mut mac = [0u8; 6];
    let mut parts = text.split(':');

    for byte in &mut mac {
        *byte = u8::from_str_radix(parts.next()?, 16).ok()?;
    }
    if parts.next().is_some() {
        return None;
    }

    Some(mac)
}
