use proptest::prelude::*;

use dhcpwire::checksum::checksum;
use dhcpwire::{DhcpMessage, MessageType, UdpDatagram};

const DHCP_MAGIC_COOKIE: [u8; 4] = [99, 130, 83, 99];
const DHCP_MESSAGE_SIZE: usize = 548;

fn valid_record() -> Vec<u8> {
    let mut record = vec![0u8; DHCP_MESSAGE_SIZE];
    record[0] = 1;
    record[1] = 1;
    record[2] = 6;
    record[236..240].copy_from_slice(&DHCP_MAGIC_COOKIE);
    record[240] = 255;
    record
}

fn reference_checksum(data: &[u8]) -> u16 {
    let mut sum: u64 = 0;
    for chunk in data.chunks(2) {
        sum += match chunk {
            [high, low] => u64::from(u16::from_be_bytes([*high, *low])),
            [high] => u64::from(u16::from_be_bytes([*high, 0])),
            _ => 0,
        };
    }
    while sum >> 16 != 0 {
        sum = (sum & 0xffff) + (sum >> 16);
    }
    !(sum as u16)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(10000))]

    #[test]
    fn decode_never_panics_on_arbitrary_bytes(data: Vec<u8>) {
        let _ = DhcpMessage::decode(&data);
    }

    #[test]
    fn decode_accepts_any_record_with_valid_cookie(
        record_bytes in prop::collection::vec(any::<u8>(), 548..=548)
    ) {
        let mut record = record_bytes;
        record[236..240].copy_from_slice(&DHCP_MAGIC_COOKIE);
        prop_assert!(DhcpMessage::decode(&record).is_ok());
    }

    #[test]
    fn bad_magic_cookie_always_rejected(
        cookie in any::<[u8; 4]>()
    ) {
        prop_assume!(cookie != DHCP_MAGIC_COOKIE);

        let mut record = valid_record();
        record[236..240].copy_from_slice(&cookie);

        prop_assert!(DhcpMessage::decode(&record).is_err());
    }

    #[test]
    fn decode_encode_roundtrip_is_byte_identical(
        record_bytes in prop::collection::vec(any::<u8>(), 548..=548)
    ) {
        let mut record = record_bytes;
        record[236..240].copy_from_slice(&DHCP_MAGIC_COOKIE);

        let decoded = DhcpMessage::decode(&record).unwrap();
        prop_assert_eq!(&decoded.encode()[..], &record[..]);
    }

    #[test]
    fn oversized_datagrams_read_as_truncated(
        record_bytes in prop::collection::vec(any::<u8>(), 549..700)
    ) {
        let mut record = record_bytes;
        record[236..240].copy_from_slice(&DHCP_MAGIC_COOKIE);

        let truncated = DhcpMessage::decode(&record[..DHCP_MESSAGE_SIZE]).unwrap();
        let oversized = DhcpMessage::decode(&record).unwrap();
        prop_assert_eq!(&truncated.encode()[..], &oversized.encode()[..]);
    }

    #[test]
    fn short_datagrams_read_as_zero_padded(
        record_bytes in prop::collection::vec(any::<u8>(), 548..=548),
        len in 240..548usize
    ) {
        let mut record = record_bytes;
        record[236..240].copy_from_slice(&DHCP_MAGIC_COOKIE);
        let mut padded = record.clone();
        padded[len..].fill(0);

        let from_short = DhcpMessage::decode(&record[..len]).unwrap();
        let from_padded = DhcpMessage::decode(&padded).unwrap();
        prop_assert_eq!(&from_short.encode()[..], &from_padded.encode()[..]);
    }

    #[test]
    fn option_scan_never_panics_on_arbitrary_options(
        options_data in prop::collection::vec(any::<u8>(), 0..=308),
        code in any::<u8>()
    ) {
        let mut record = valid_record();
        record[240..240 + options_data.len()].copy_from_slice(&options_data);

        let message = DhcpMessage::decode(&record).unwrap();
        let _ = message.get_option(code);
        let _ = message.message_type();
    }

    #[test]
    fn checksum_matches_reference_implementation(data: Vec<u8>) {
        prop_assert_eq!(checksum(&data), reference_checksum(&data));
    }

    #[test]
    fn appending_a_zero_byte_never_changes_checksum(data: Vec<u8>) {
        let mut padded = data.clone();
        padded.push(0);
        prop_assert_eq!(checksum(&data), checksum(&padded));
    }

    #[test]
    fn data_with_its_own_checksum_verifies_to_zero(
        data in prop::collection::vec(any::<u8>(), 0..512)
    ) {
        let mut data = data;
        if data.len() % 2 == 1 {
            data.push(0);
        }
        let computed = checksum(&data);
        data.extend_from_slice(&computed.to_be_bytes());

        prop_assert_eq!(checksum(&data), 0);
    }

    #[test]
    fn built_datagrams_always_verify(
        source in any::<[u8; 4]>(),
        dest in any::<[u8; 4]>(),
        source_port in any::<u16>(),
        dest_port in any::<u16>(),
        xid in any::<u32>()
    ) {
        let mut message = DhcpMessage::new(MessageType::Discover);
        message.xid = xid;

        let datagram = UdpDatagram::build(
            &message,
            source.into(),
            source_port,
            dest.into(),
            dest_port,
        );
        let bytes = datagram.as_bytes();

        // The IP header sums to zero when its checksum field is included.
        prop_assert_eq!(checksum(&bytes[..20]), 0);

        // The UDP segment sums to zero under the RFC 768 pseudo-header.
        let mut pseudo = Vec::with_capacity(bytes.len() - 8);
        pseudo.extend_from_slice(&bytes[12..20]);
        pseudo.extend_from_slice(&[0, 17]);
        pseudo.extend_from_slice(&556u16.to_be_bytes());
        pseudo.extend_from_slice(&bytes[20..]);
        prop_assert_eq!(checksum(&pseudo), 0);
    }
}
