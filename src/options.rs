//! DHCP option helpers for the fixed options area.
//!
//! Options are (code, length, value) triples laid out back to back and
//! terminated by an End marker; Pad bytes carry no length. This module
//! provides the message type codes plus the small scan and append
//! routines the transport layer itself needs. Typed handling of the full
//! option set belongs to the protocol layer above.
//!
//! # References
//!
//! - RFC 2132: DHCP Options and BOOTP Vendor Extensions

use crate::error::{Error, Result};

/// DHCP option codes the transport layer touches.
///
/// Every other code passes through this layer opaquely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OptionCode {
    /// Padding (no operation). Used for alignment.
    Pad = 0,
    /// DHCP message type (RFC 2132 §9.6).
    MessageType = 53,
    /// Vendor class identifier (RFC 2132 §9.13).
    VendorClassIdentifier = 60,
    /// End of options marker.
    End = 255,
}

/// DHCP message types (Option 53) as defined in RFC 2132 §9.6.
///
/// These values indicate the purpose of a DHCP message in the protocol exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    /// Client broadcast to locate servers.
    Discover = 1,
    /// Server response to DISCOVER with IP offer.
    Offer = 2,
    /// Client request for offered parameters.
    Request = 3,
    /// Client indicates address is already in use.
    Decline = 4,
    /// Server acknowledgement with configuration.
    Ack = 5,
    /// Server negative acknowledgement.
    Nak = 6,
    /// Client releases IP address.
    Release = 7,
    /// Client requests config without IP allocation.
    Inform = 8,
}

impl TryFrom<u8> for MessageType {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Discover),
            2 => Ok(Self::Offer),
            3 => Ok(Self::Request),
            4 => Ok(Self::Decline),
            5 => Ok(Self::Ack),
            6 => Ok(Self::Nak),
            7 => Ok(Self::Release),
            8 => Ok(Self::Inform),
            other => Err(other),
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discover => write!(f, "DISCOVER"),
            Self::Offer => write!(f, "OFFER"),
            Self::Request => write!(f, "REQUEST"),
            Self::Decline => write!(f, "DECLINE"),
            Self::Ack => write!(f, "ACK"),
            Self::Nak => write!(f, "NAK"),
            Self::Release => write!(f, "RELEASE"),
            Self::Inform => write!(f, "INFORM"),
        }
    }
}

/// Returns the value of the first option with the given `code`.
///
/// The scan skips Pad bytes and stops at the End marker. Returns `None`
/// when the option is absent, or when a declared length runs past the
/// end of the area; the value slice is exactly as long as the option's
/// length byte claims.
pub fn get_option(options: &[u8], code: u8) -> Option<&[u8]> {
    let mut index = 0;

    while index < options.len() {
        let current = options[index];

        if current == OptionCode::Pad as u8 {
            index += 1;
            continue;
        }

        if current == OptionCode::End as u8 {
            return None;
        }

        if index + 1 >= options.len() {
            return None;
        }

        let length = options[index + 1] as usize;
        if index + 2 + length > options.len() {
            return None;
        }

        if current == code {
            return Some(&options[index + 2..index + 2 + length]);
        }

        index += 2 + length;
    }

    None
}

/// Returns the offset of the End marker in `options`.
fn end_offset(options: &[u8]) -> Result<usize> {
    let mut index = 0;

    while index < options.len() {
        let current = options[index];

        if current == OptionCode::End as u8 {
            return Ok(index);
        }

        if current == OptionCode::Pad as u8 {
            index += 1;
            continue;
        }

        if index + 1 >= options.len() {
            break;
        }

        index += 2 + options[index + 1] as usize;
    }

    Err(Error::InvalidPacket(
        "Options area has no end marker".to_string(),
    ))
}

/// Appends an option at the End marker and re-terminates the area.
///
/// # Errors
///
/// Returns [`Error::InvalidPacket`] if `data` exceeds 255 bytes (the
/// option length field is one byte), the area has no End marker, or the
/// encoded option plus a fresh End byte does not fit.
pub fn add_option(options: &mut [u8], code: u8, data: &[u8]) -> Result<()> {
    if data.len() > u8::MAX as usize {
        return Err(Error::InvalidPacket(format!(
            "Option 0x{:02x} data too long: {} bytes",
            code,
            data.len()
        )));
    }

    let end = end_offset(options)?;
    if end + 2 + data.len() + 1 > options.len() {
        return Err(Error::InvalidPacket(format!(
            "Option 0x{:02x} did not fit into the packet",
            code
        )));
    }

    options[end] = code;
    options[end + 1] = data.len() as u8;
    options[end + 2..end + 2 + data.len()].copy_from_slice(data);
    options[end + 2 + data.len()] = OptionCode::End as u8;

    Ok(())
}

/// Appends a single-byte option such as the message type.
pub fn add_simple_option(options: &mut [u8], code: u8, value: u8) -> Result<()> {
    add_option(options, code, &[value])
}
