//! IP/UDP framing for the raw transmit path.
//!
//! When the kernel cannot address the peer (no lease yet, so no route and
//! no ARP entry), the headers have to be written by hand. The frame is a
//! fixed 576-byte datagram, the minimum MTU every host must accept:
//!
//! ```text
//! +-----------------+----------------+--------------------------+
//! | IPv4 header (20)| UDP header (8) |   DHCP message (548)     |
//! +-----------------+----------------+--------------------------+
//! ```
//!
//! Header fields are populated in a fixed order because the UDP checksum
//! is computed over the entire buffer while most IP fields still read
//! zero. See [`UdpDatagram::build`].

use std::net::Ipv4Addr;

use crate::checksum::checksum;
use crate::message::{DHCP_MESSAGE_SIZE, DhcpMessage};

const IP_HEADER_SIZE: usize = 20;
const UDP_HEADER_SIZE: usize = 8;

/// Total size of the raw datagram: IP and UDP headers plus the payload.
pub const RAW_DATAGRAM_SIZE: usize = IP_HEADER_SIZE + UDP_HEADER_SIZE + DHCP_MESSAGE_SIZE;

const IP_VERSION: u8 = 4;
const IP_DEFAULT_TTL: u8 = 64;
const IP_PROTOCOL_UDP: u8 = 17;

// IPv4 header field offsets.
const IP_VERSION_IHL_OFFSET: usize = 0;
const IP_TOT_LEN_OFFSET: usize = 2;
const IP_TTL_OFFSET: usize = 8;
const IP_PROTOCOL_OFFSET: usize = 9;
const IP_CHECKSUM_OFFSET: usize = 10;
const IP_SADDR_OFFSET: usize = 12;
const IP_DADDR_OFFSET: usize = 16;

// UDP header field offsets within the datagram.
const UDP_SOURCE_OFFSET: usize = IP_HEADER_SIZE;
const UDP_DEST_OFFSET: usize = IP_HEADER_SIZE + 2;
const UDP_LEN_OFFSET: usize = IP_HEADER_SIZE + 4;
const UDP_CHECKSUM_OFFSET: usize = IP_HEADER_SIZE + 6;

const PAYLOAD_OFFSET: usize = IP_HEADER_SIZE + UDP_HEADER_SIZE;

/// A fully framed UDP/IP datagram carrying one DHCP message.
///
/// Built in one shot by [`build`](Self::build) and handed to the packet
/// socket as-is; nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct UdpDatagram {
    buffer: [u8; RAW_DATAGRAM_SIZE],
}

impl UdpDatagram {
    /// Frames `payload` into a complete IP/UDP datagram.
    ///
    /// The population order is load-bearing. The IP total length field
    /// holds the UDP length while the UDP checksum is computed over the
    /// whole buffer; with version, IHL, TTL and the IP checksum still
    /// zero at that point, the sum over the IP header equals the RFC 768
    /// pseudo-header sum. Only then are the real total length, version,
    /// TTL and IP header checksum written.
    pub fn build(
        payload: &DhcpMessage,
        source_ip: Ipv4Addr,
        source_port: u16,
        dest_ip: Ipv4Addr,
        dest_port: u16,
    ) -> Self {
        let mut buffer = [0u8; RAW_DATAGRAM_SIZE];

        buffer[IP_PROTOCOL_OFFSET] = IP_PROTOCOL_UDP;
        buffer[IP_SADDR_OFFSET..IP_SADDR_OFFSET + 4].copy_from_slice(&source_ip.octets());
        buffer[IP_DADDR_OFFSET..IP_DADDR_OFFSET + 4].copy_from_slice(&dest_ip.octets());

        let udp_length = (UDP_HEADER_SIZE + DHCP_MESSAGE_SIZE) as u16;
        buffer[UDP_SOURCE_OFFSET..UDP_SOURCE_OFFSET + 2]
            .copy_from_slice(&source_port.to_be_bytes());
        buffer[UDP_DEST_OFFSET..UDP_DEST_OFFSET + 2].copy_from_slice(&dest_port.to_be_bytes());
        buffer[UDP_LEN_OFFSET..UDP_LEN_OFFSET + 2].copy_from_slice(&udp_length.to_be_bytes());

        // Borrowed position: the UDP length sits in the total length
        // field for the duration of the UDP checksum.
        buffer[IP_TOT_LEN_OFFSET..IP_TOT_LEN_OFFSET + 2]
            .copy_from_slice(&udp_length.to_be_bytes());

        buffer[PAYLOAD_OFFSET..].copy_from_slice(&payload.encode());

        let udp_checksum = checksum(&buffer);
        buffer[UDP_CHECKSUM_OFFSET..UDP_CHECKSUM_OFFSET + 2]
            .copy_from_slice(&udp_checksum.to_be_bytes());

        buffer[IP_TOT_LEN_OFFSET..IP_TOT_LEN_OFFSET + 2]
            .copy_from_slice(&(RAW_DATAGRAM_SIZE as u16).to_be_bytes());
        buffer[IP_VERSION_IHL_OFFSET] = (IP_VERSION << 4) | ((IP_HEADER_SIZE >> 2) as u8);
        buffer[IP_TTL_OFFSET] = IP_DEFAULT_TTL;

        let ip_checksum = checksum(&buffer[..IP_HEADER_SIZE]);
        buffer[IP_CHECKSUM_OFFSET..IP_CHECKSUM_OFFSET + 2]
            .copy_from_slice(&ip_checksum.to_be_bytes());

        Self { buffer }
    }

    /// The full wire image.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// The finalized 20-byte IP header.
    pub fn ip_header(&self) -> &[u8] {
        &self.buffer[..IP_HEADER_SIZE]
    }

    /// The DHCP message bytes carried by this datagram.
    pub fn payload(&self) -> &[u8] {
        &self.buffer[PAYLOAD_OFFSET..]
    }

    /// The IP total length field.
    pub fn total_length(&self) -> u16 {
        u16::from_be_bytes([
            self.buffer[IP_TOT_LEN_OFFSET],
            self.buffer[IP_TOT_LEN_OFFSET + 1],
        ])
    }

    /// The UDP length field (header plus payload).
    pub fn udp_length(&self) -> u16 {
        u16::from_be_bytes([self.buffer[UDP_LEN_OFFSET], self.buffer[UDP_LEN_OFFSET + 1]])
    }

    /// The UDP checksum as transmitted.
    pub fn udp_checksum(&self) -> u16 {
        u16::from_be_bytes([
            self.buffer[UDP_CHECKSUM_OFFSET],
            self.buffer[UDP_CHECKSUM_OFFSET + 1],
        ])
    }

    /// The IP header checksum as transmitted.
    pub fn ip_checksum(&self) -> u16 {
        u16::from_be_bytes([
            self.buffer[IP_CHECKSUM_OFFSET],
            self.buffer[IP_CHECKSUM_OFFSET + 1],
        ])
    }
}
