//! Internet checksum (RFC 1071).
//!
//! One routine serves both uses on the raw transmit path: the IPv4 header
//! checksum and the UDP checksum computed over the assembled datagram.
//! A region that already contains its own correct checksum sums to zero,
//! which is how receivers verify it.

/// Computes the 16-bit one's-complement Internet checksum of `data`.
///
/// Successive big-endian 16-bit words are summed into a 64-bit
/// accumulator, carries are folded back into the low 16 bits, and the
/// complement of the folded sum is returned. Store the result with
/// [`u16::to_be_bytes`] to get the wire representation.
///
/// The checksum of an empty slice is `0xFFFF`.
pub fn checksum(data: &[u8]) -> u16 {
    // The unfolded word sum of any slice that fits in memory stays
    // below 2^64.
    let mut sum: u64 = 0;

    let mut words = data.chunks_exact(2);
    for word in words.by_ref() {
        sum += u64::from(u16::from_be_bytes([word[0], word[1]]));
    }

    // An odd trailing byte contributes as the high byte of a zero-padded
    // word, matching what receivers compute regardless of host byte order.
    if let Some(&odd) = words.remainder().first() {
        sum += u64::from(odd) << 8;
    }

    while sum >> 16 != 0 {
        sum = (sum & 0xffff) + (sum >> 16);
    }

    !(sum as u16)
}
