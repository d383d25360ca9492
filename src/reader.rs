//! Receiving and validating inbound DHCP messages.

use std::net::UdpSocket;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::message::{DHCP_MESSAGE_SIZE, DhcpMessage};
use crate::options::OptionCode;

/// Vendor class identifiers of clients known to need broadcast replies.
///
/// These clients ignore unicast replies sent before they have committed
/// to an address. The table is open for extension through
/// [`Config::broken_vendors`](crate::Config::broken_vendors).
pub const DEFAULT_BROKEN_VENDORS: &[&str] = &["MSFT 98"];

/// Receives one DHCP message from a bound socket.
///
/// Blocks until a datagram arrives or the socket's read timeout fires.
/// The datagram is read into a zeroed record-sized buffer, so short
/// datagrams decode as zero-padded and longer ones are truncated.
///
/// Request-class messages whose vendor class identifier (Option 60)
/// exactly matches an entry of `broken_vendors`, declared length and
/// content both, get the broadcast flag forced on before the message is
/// returned; the layers above then reply by broadcast without
/// special-casing such clients. An empty table entry terminates the
/// scan, it is not a wildcard.
///
/// # Errors
///
/// - [`Error::Io`] if the read fails or times out.
/// - [`Error::InvalidCookie`] if the payload lacks the DHCP magic cookie.
pub fn recv_message(socket: &UdpSocket, broken_vendors: &[String]) -> Result<DhcpMessage> {
    let mut buffer = [0u8; DHCP_MESSAGE_SIZE];

    let bytes = socket.recv(&mut buffer).map_err(|error| {
        debug!("couldn't read on listening socket, ignoring");
        Error::Io(error)
    })?;

    let mut message = DhcpMessage::decode(&buffer[..bytes])
        .inspect_err(|_| warn!("received bogus message, ignoring"))?;
    debug!(bytes, "received a packet");

    let broken_vendor = if message.is_request() {
        message
            .get_option(OptionCode::VendorClassIdentifier as u8)
            .and_then(|vendor| {
                broken_vendors
                    .iter()
                    .take_while(|entry| !entry.is_empty())
                    .find(|entry| vendor == entry.as_bytes())
            })
            .cloned()
    } else {
        None
    };

    if let Some(vendor) = broken_vendor {
        debug!(%vendor, "broken client, forcing broadcast");
        message.set_broadcast();
    }

    Ok(message)
}
