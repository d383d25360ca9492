//! DHCP message encoding and decoding per RFC 2131.
//!
//! A message is a fixed 548-byte record: a 236-byte header, the 4-byte
//! magic cookie, and a 308-byte options area terminated by an End marker.
//! The whole record travels on the wire every time, so encoding always
//! produces exactly [`DHCP_MESSAGE_SIZE`] bytes and decoding treats any
//! shorter datagram as zero-padded to that size.
//!
//! # Message Structure
//!
//! ```text
//! 0                   1                   2                   3
//! 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |     op (1)    |   htype (1)   |   hlen (1)    |   hops (1)    |
//! +---------------+---------------+---------------+---------------+
//! |                            xid (4)                            |
//! +-------------------------------+-------------------------------+
//! |           secs (2)            |           flags (2)           |
//! +-------------------------------+-------------------------------+
//! |                          ciaddr (4)                           |
//! +---------------------------------------------------------------+
//! |                          yiaddr (4)                           |
//! +---------------------------------------------------------------+
//! |                          siaddr (4)                           |
//! +---------------------------------------------------------------+
//! |                          giaddr (4)                           |
//! +---------------------------------------------------------------+
//! |                          chaddr (16)                          |
//! +---------------------------------------------------------------+
//! |                          sname (64)                           |
//! +---------------------------------------------------------------+
//! |                          file (128)                           |
//! +---------------------------------------------------------------+
//! |                    magic cookie (4) = 99.130.83.99            |
//! +---------------------------------------------------------------+
//! |                          options (308)                        |
//! +---------------------------------------------------------------+
//! ```
//!
//! # References
//!
//! - RFC 2131: Dynamic Host Configuration Protocol

use std::net::Ipv4Addr;

use crate::error::{Error, Result};
use crate::options::{self, MessageType, OptionCode};

/// DHCP magic cookie that identifies DHCP messages (vs plain BOOTP).
pub const DHCP_MAGIC_COOKIE: [u8; 4] = [99, 130, 83, 99];

const DHCP_OP_HTYPE_HLEN_HOPS_SIZE: usize = 4;
const DHCP_XID_SIZE: usize = 4;
const DHCP_SECS_SIZE: usize = 2;
const DHCP_FLAGS_SIZE: usize = 2;
const DHCP_CIADDR_SIZE: usize = 4;
const DHCP_YIADDR_SIZE: usize = 4;
const DHCP_SIADDR_SIZE: usize = 4;
const DHCP_GIADDR_SIZE: usize = 4;
const DHCP_CHADDR_SIZE: usize = 16;
const DHCP_SNAME_SIZE: usize = 64;
const DHCP_FILE_SIZE: usize = 128;

/// Size of the fixed options area.
pub const DHCP_OPTIONS_SIZE: usize = 308;

const DHCP_SNAME_OFFSET: usize = DHCP_OP_HTYPE_HLEN_HOPS_SIZE
    + DHCP_XID_SIZE
    + DHCP_SECS_SIZE
    + DHCP_FLAGS_SIZE
    + DHCP_CIADDR_SIZE
    + DHCP_YIADDR_SIZE
    + DHCP_SIADDR_SIZE
    + DHCP_GIADDR_SIZE
    + DHCP_CHADDR_SIZE;

const DHCP_FILE_OFFSET: usize = DHCP_SNAME_OFFSET + DHCP_SNAME_SIZE;

const DHCP_MAGIC_COOKIE_OFFSET: usize = DHCP_FILE_OFFSET + DHCP_FILE_SIZE;

const DHCP_OPTIONS_OFFSET: usize = DHCP_MAGIC_COOKIE_OFFSET + DHCP_MAGIC_COOKIE.len();

/// Total size of a DHCP message on the wire.
pub const DHCP_MESSAGE_SIZE: usize = DHCP_OPTIONS_OFFSET + DHCP_OPTIONS_SIZE;

/// BOOTP/DHCP operation code for client requests.
pub const BOOTREQUEST: u8 = 1;

/// BOOTP/DHCP operation code for server replies.
pub const BOOTREPLY: u8 = 2;

/// Hardware type for 10Mb Ethernet.
pub const HTYPE_ETHERNET: u8 = 1;

/// Hardware address length for Ethernet (6 bytes).
pub const HLEN_ETHERNET: u8 = 6;

/// Flag bit (bit 15) requesting broadcast delivery of replies.
pub const BROADCAST_FLAG: u16 = 0x8000;

/// A DHCP message.
///
/// Represents both client requests and server replies. Use
/// [`new`](Self::new) to start an outbound message of a given type,
/// [`decode`](Self::decode) for received datagrams, and
/// [`encode`](Self::encode) to produce the wire image.
#[derive(Debug, Clone)]
pub struct DhcpMessage {
    /// Operation code: [`BOOTREQUEST`] (1) or [`BOOTREPLY`] (2).
    pub op: u8,

    /// Hardware address type. [`HTYPE_ETHERNET`] (1) for Ethernet.
    pub htype: u8,

    /// Hardware address length. [`HLEN_ETHERNET`] (6) for Ethernet.
    pub hlen: u8,

    /// Hop count, incremented by relay agents.
    pub hops: u8,

    /// Transaction ID chosen by client, echoed in replies.
    pub xid: u32,

    /// Seconds elapsed since client began address acquisition.
    pub secs: u16,

    /// Flags. Bit 15 ([`BROADCAST_FLAG`]) requests broadcast replies.
    pub flags: u16,

    /// Client IP address (set by client in RENEWING/REBINDING states).
    pub ciaddr: Ipv4Addr,

    /// "Your" IP address - the address being assigned to the client.
    pub yiaddr: Ipv4Addr,

    /// Server IP address (next server in BOOTP, or DHCP server).
    pub siaddr: Ipv4Addr,

    /// Gateway IP address - set by relay agents.
    pub giaddr: Ipv4Addr,

    /// Client hardware address (MAC for Ethernet).
    pub chaddr: [u8; 16],

    /// Server host name, zero-terminated.
    pub sname: [u8; 64],

    /// Boot file name, zero-terminated.
    pub file: [u8; 128],

    /// Raw options area, terminated by an End (255) marker.
    pub options: [u8; DHCP_OPTIONS_SIZE],
}

impl DhcpMessage {
    /// Creates a fresh message of the given type.
    ///
    /// The record starts zeroed; the operation code is chosen by message
    /// class (client-originated types get [`BOOTREQUEST`], server replies
    /// get [`BOOTREPLY`]), hardware addressing is set to Ethernet, and the
    /// options area holds exactly one option, the message type, followed
    /// by the End marker. The magic cookie is supplied by
    /// [`encode`](Self::encode).
    pub fn new(message_type: MessageType) -> Self {
        let op = match message_type {
            MessageType::Discover
            | MessageType::Request
            | MessageType::Decline
            | MessageType::Release
            | MessageType::Inform => BOOTREQUEST,
            MessageType::Offer | MessageType::Ack | MessageType::Nak => BOOTREPLY,
        };

        let mut message_options = [0u8; DHCP_OPTIONS_SIZE];
        message_options[0] = OptionCode::MessageType as u8;
        message_options[1] = 1;
        message_options[2] = message_type as u8;
        message_options[3] = OptionCode::End as u8;

        Self {
            op,
            htype: HTYPE_ETHERNET,
            hlen: HLEN_ETHERNET,
            hops: 0,
            xid: 0,
            secs: 0,
            flags: 0,
            ciaddr: Ipv4Addr::UNSPECIFIED,
            yiaddr: Ipv4Addr::UNSPECIFIED,
            siaddr: Ipv4Addr::UNSPECIFIED,
            giaddr: Ipv4Addr::UNSPECIFIED,
            chaddr: [0u8; 16],
            sname: [0u8; 64],
            file: [0u8; 128],
            options: message_options,
        }
    }

    /// Decodes a message from raw datagram bytes.
    ///
    /// The bytes are copied into a zeroed record-sized buffer first, so a
    /// short datagram reads as zero-padded and anything beyond
    /// [`DHCP_MESSAGE_SIZE`] is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCookie`] if the magic cookie field does not
    /// hold 99.130.83.99. This is the only validation performed here;
    /// protocol-level checks belong to the layer above.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut image = [0u8; DHCP_MESSAGE_SIZE];
        let len = data.len().min(DHCP_MESSAGE_SIZE);
        image[..len].copy_from_slice(&data[..len]);

        let cookie_end = DHCP_MAGIC_COOKIE_OFFSET + DHCP_MAGIC_COOKIE.len();
        let cookie = &image[DHCP_MAGIC_COOKIE_OFFSET..cookie_end];
        if cookie != DHCP_MAGIC_COOKIE {
            return Err(Error::InvalidCookie(u32::from_be_bytes([
                cookie[0], cookie[1], cookie[2], cookie[3],
            ])));
        }

        let op = image[0];
        let htype = image[1];
        let hlen = image[2];
        let hops = image[3];

        let xid = u32::from_be_bytes([image[4], image[5], image[6], image[7]]);
        let secs = u16::from_be_bytes([image[8], image[9]]);
        let flags = u16::from_be_bytes([image[10], image[11]]);

        let ciaddr = Ipv4Addr::new(image[12], image[13], image[14], image[15]);
        let yiaddr = Ipv4Addr::new(image[16], image[17], image[18], image[19]);
        let siaddr = Ipv4Addr::new(image[20], image[21], image[22], image[23]);
        let giaddr = Ipv4Addr::new(image[24], image[25], image[26], image[27]);

        let mut chaddr = [0u8; 16];
        chaddr.copy_from_slice(&image[28..44]);

        let mut sname = [0u8; 64];
        sname.copy_from_slice(&image[DHCP_SNAME_OFFSET..DHCP_SNAME_OFFSET + DHCP_SNAME_SIZE]);

        let mut file = [0u8; 128];
        file.copy_from_slice(&image[DHCP_FILE_OFFSET..DHCP_FILE_OFFSET + DHCP_FILE_SIZE]);

        let mut message_options = [0u8; DHCP_OPTIONS_SIZE];
        message_options.copy_from_slice(&image[DHCP_OPTIONS_OFFSET..]);

        Ok(Self {
            op,
            htype,
            hlen,
            hops,
            xid,
            secs,
            flags,
            ciaddr,
            yiaddr,
            siaddr,
            giaddr,
            chaddr,
            sname,
            file,
            options: message_options,
        })
    }

    /// Encodes the message to its fixed-size wire image.
    ///
    /// The magic cookie is stamped at offset 236; the options area is
    /// copied whole, trailing zeros included.
    pub fn encode(&self) -> [u8; DHCP_MESSAGE_SIZE] {
        let mut image = [0u8; DHCP_MESSAGE_SIZE];

        image[0] = self.op;
        image[1] = self.htype;
        image[2] = self.hlen;
        image[3] = self.hops;

        image[4..8].copy_from_slice(&self.xid.to_be_bytes());
        image[8..10].copy_from_slice(&self.secs.to_be_bytes());
        image[10..12].copy_from_slice(&self.flags.to_be_bytes());

        image[12..16].copy_from_slice(&self.ciaddr.octets());
        image[16..20].copy_from_slice(&self.yiaddr.octets());
        image[20..24].copy_from_slice(&self.siaddr.octets());
        image[24..28].copy_from_slice(&self.giaddr.octets());

        image[28..44].copy_from_slice(&self.chaddr);
        image[DHCP_SNAME_OFFSET..DHCP_SNAME_OFFSET + DHCP_SNAME_SIZE].copy_from_slice(&self.sname);
        image[DHCP_FILE_OFFSET..DHCP_FILE_OFFSET + DHCP_FILE_SIZE].copy_from_slice(&self.file);

        image[DHCP_MAGIC_COOKIE_OFFSET..DHCP_OPTIONS_OFFSET].copy_from_slice(&DHCP_MAGIC_COOKIE);
        image[DHCP_OPTIONS_OFFSET..].copy_from_slice(&self.options);

        image
    }

    /// Returns the value of an option from the options area.
    pub fn get_option(&self, code: u8) -> Option<&[u8]> {
        options::get_option(&self.options, code)
    }

    /// Appends an option to the options area.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPacket`] if the option does not fit or the
    /// area is unterminated.
    pub fn add_option(&mut self, code: u8, data: &[u8]) -> Result<()> {
        options::add_option(&mut self.options, code, data)
    }

    /// Returns the DHCP message type (Option 53) if present and valid.
    ///
    /// Returns `None` for plain BOOTP messages which don't carry this
    /// option.
    pub fn message_type(&self) -> Option<MessageType> {
        let value = self.get_option(OptionCode::MessageType as u8)?;
        MessageType::try_from(*value.first()?).ok()
    }

    /// Returns true for client-originated messages (`op` == BOOTREQUEST).
    pub fn is_request(&self) -> bool {
        self.op == BOOTREQUEST
    }

    /// Returns true if the broadcast flag (bit 15) is set.
    ///
    /// When set, servers must broadcast replies instead of unicasting.
    pub fn is_broadcast(&self) -> bool {
        (self.flags & BROADCAST_FLAG) != 0
    }

    /// Sets the broadcast flag, leaving the other flag bits alone.
    pub fn set_broadcast(&mut self) {
        self.flags |= BROADCAST_FLAG;
    }

    /// Returns the client hardware address bytes (respecting hlen).
    pub fn chaddr_bytes(&self) -> &[u8] {
        let len = (self.hlen as usize).min(self.chaddr.len());
        &self.chaddr[..len]
    }

    /// Formats the client hardware address as a colon-separated string.
    ///
    /// For Ethernet, returns format like "aa:bb:cc:dd:ee:ff".
    pub fn format_mac(&self) -> String {
        use std::fmt::Write;
        let bytes = self.chaddr_bytes();
        let mut result = String::with_capacity(bytes.len() * 3);
        for (index, byte) in bytes.iter().enumerate() {
            if index > 0 {
                result.push(':');
            }
            let _ = write!(result, "{:02x}", byte);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_message(message_type: MessageType) -> DhcpMessage {
        let mut message = DhcpMessage::new(message_type);
        message.xid = 0x12345678;
        message.chaddr[..6].copy_from_slice(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        message
    }

    #[test]
    fn test_new_discover() {
        let message = DhcpMessage::new(MessageType::Discover);

        assert_eq!(message.op, BOOTREQUEST);
        assert_eq!(message.htype, HTYPE_ETHERNET);
        assert_eq!(message.hlen, HLEN_ETHERNET);
        assert_eq!(message.message_type(), Some(MessageType::Discover));
        assert_eq!(
            &message.options[..4],
            &[
                OptionCode::MessageType as u8,
                1,
                MessageType::Discover as u8,
                OptionCode::End as u8
            ]
        );
    }

    #[test]
    fn test_new_op_class_per_message_type() {
        let requests = [
            MessageType::Discover,
            MessageType::Request,
            MessageType::Decline,
            MessageType::Release,
            MessageType::Inform,
        ];
        for message_type in requests {
            let message = DhcpMessage::new(message_type);
            assert_eq!(message.op, BOOTREQUEST, "{} should be a request", message_type);
            assert!(message.is_request());
        }

        let replies = [MessageType::Offer, MessageType::Ack, MessageType::Nak];
        for message_type in replies {
            let message = DhcpMessage::new(message_type);
            assert_eq!(message.op, BOOTREPLY, "{} should be a reply", message_type);
            assert!(!message.is_request());
        }
    }

    #[test]
    fn test_encode_produces_correct_offsets() {
        let mut message = sample_message(MessageType::Discover);
        message.hops = 3;
        message.secs = 999;
        message.flags = BROADCAST_FLAG;
        message.ciaddr = Ipv4Addr::new(192, 168, 1, 10);
        message.yiaddr = Ipv4Addr::new(192, 168, 1, 20);
        message.siaddr = Ipv4Addr::new(192, 168, 1, 1);
        message.giaddr = Ipv4Addr::new(192, 168, 2, 1);

        let encoded = message.encode();

        assert_eq!(encoded.len(), DHCP_MESSAGE_SIZE);
        assert_eq!(encoded[0], BOOTREQUEST);
        assert_eq!(encoded[1], HTYPE_ETHERNET);
        assert_eq!(encoded[2], HLEN_ETHERNET);
        assert_eq!(encoded[3], 3);
        assert_eq!(&encoded[4..8], &0x12345678u32.to_be_bytes());
        assert_eq!(&encoded[8..10], &999u16.to_be_bytes());
        assert_eq!(&encoded[10..12], &0x8000u16.to_be_bytes());
        assert_eq!(&encoded[12..16], &[192, 168, 1, 10]);
        assert_eq!(&encoded[16..20], &[192, 168, 1, 20]);
        assert_eq!(&encoded[20..24], &[192, 168, 1, 1]);
        assert_eq!(&encoded[24..28], &[192, 168, 2, 1]);
        assert_eq!(&encoded[28..34], &[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        assert_eq!(&encoded[236..240], &DHCP_MAGIC_COOKIE);
        assert_eq!(encoded[240], OptionCode::MessageType as u8);
        assert_eq!(encoded[242], MessageType::Discover as u8);
        assert_eq!(encoded[243], OptionCode::End as u8);
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let mut message = sample_message(MessageType::Request);
        message.secs = 7;
        message.ciaddr = Ipv4Addr::new(10, 0, 0, 42);
        message.sname[..4].copy_from_slice(b"srv0");
        message.file[..4].copy_from_slice(b"boot");

        let decoded = DhcpMessage::decode(&message.encode()).unwrap();

        assert_eq!(decoded.op, message.op);
        assert_eq!(decoded.xid, message.xid);
        assert_eq!(decoded.secs, message.secs);
        assert_eq!(decoded.ciaddr, message.ciaddr);
        assert_eq!(decoded.chaddr, message.chaddr);
        assert_eq!(decoded.sname, message.sname);
        assert_eq!(decoded.file, message.file);
        assert_eq!(decoded.options[..], message.options[..]);
        assert_eq!(decoded.message_type(), Some(MessageType::Request));
    }

    #[test]
    fn test_decode_short_input_reads_as_zero_padded() {
        let full = sample_message(MessageType::Discover).encode();
        // Clip right after the message type option.
        let decoded = DhcpMessage::decode(&full[..244]).unwrap();

        assert_eq!(decoded.xid, 0x12345678);
        assert_eq!(decoded.message_type(), Some(MessageType::Discover));
        assert!(decoded.options[4..].iter().all(|&byte| byte == 0));
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let image = sample_message(MessageType::Inform).encode();
        let mut oversized = vec![0xffu8; DHCP_MESSAGE_SIZE + 100];
        oversized[..DHCP_MESSAGE_SIZE].copy_from_slice(&image);

        let decoded = DhcpMessage::decode(&oversized).unwrap();
        assert_eq!(decoded.message_type(), Some(MessageType::Inform));
    }

    #[test]
    fn test_decode_rejects_bad_cookie() {
        let mut image = sample_message(MessageType::Discover).encode();
        image[236..240].copy_from_slice(&[0x12, 0x34, 0x56, 0x78]);

        match DhcpMessage::decode(&image) {
            Err(Error::InvalidCookie(cookie)) => assert_eq!(cookie, 0x12345678),
            other => panic!("expected InvalidCookie, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_short_datagram_has_zero_cookie() {
        match DhcpMessage::decode(&[BOOTREQUEST, HTYPE_ETHERNET, HLEN_ETHERNET]) {
            Err(Error::InvalidCookie(cookie)) => assert_eq!(cookie, 0),
            other => panic!("expected InvalidCookie, got {:?}", other),
        }
    }

    #[test]
    fn test_broadcast_flag() {
        let mut message = DhcpMessage::new(MessageType::Discover);
        assert!(!message.is_broadcast());

        message.flags = 0x0001;
        message.set_broadcast();
        assert!(message.is_broadcast());
        assert_eq!(message.flags, 0x8001);
    }

    #[test]
    fn test_format_mac() {
        let message = sample_message(MessageType::Discover);
        assert_eq!(message.format_mac(), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn test_format_mac_respects_hlen() {
        let mut message = sample_message(MessageType::Discover);
        message.hlen = 4;
        assert_eq!(message.format_mac(), "aa:bb:cc:dd");
    }

    #[test]
    fn test_add_option_after_new() {
        let mut message = DhcpMessage::new(MessageType::Request);
        message
            .add_option(OptionCode::VendorClassIdentifier as u8, b"dhcpwire 0.1")
            .unwrap();

        assert_eq!(
            message.get_option(OptionCode::VendorClassIdentifier as u8),
            Some(&b"dhcpwire 0.1"[..])
        );
        assert_eq!(message.message_type(), Some(MessageType::Request));
    }

    #[test]
    fn test_message_type_absent() {
        let mut message = DhcpMessage::new(MessageType::Discover);
        message.options = [0u8; DHCP_OPTIONS_SIZE];
        message.options[0] = OptionCode::End as u8;

        assert_eq!(message.message_type(), None);
    }

    #[test]
    fn test_message_type_invalid_value() {
        let mut message = DhcpMessage::new(MessageType::Discover);
        message.options[2] = 0x7f;

        assert_eq!(message.message_type(), None);
    }
}
