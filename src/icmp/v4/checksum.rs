//! Internet checksum (RFC 1071).
//!
//! The 32-bit accumulator holds the sum of at most 32 758 words of 0xFFFF (an
//! ICMP message can not exceed 65 515 bytes inside an IPv4 datagram), so two
//! carry folds always bring it back into 16 bits.

/// Folded one's complement sum of `bytes`, taken as big-endian 16-bit words.
///
/// An odd trailing byte is padded with a zero byte. A packet that carries a
/// correct checksum sums to `0xFFFF`.
#[must_use]
pub fn ones_complement_sum(bytes: &[u8]) -> u16 {
    let mut words = bytes.chunks_exact(2);
    let mut sum: u32 = 0;
    for word in &mut words {
        sum += u32::from(u16::from_be_bytes([word[0], word[1]]));
    }
    if let [last] = words.remainder() {
        sum += u32::from(u16::from_be_bytes([*last, 0]));
    }

    sum = (sum >> 16) + (sum & 0xFFFF);
    sum += sum >> 16;

    #[allow(clippy::cast_possible_truncation)]
    let folded = (sum & 0xFFFF) as u16;
    folded
}

/// Checksum to place in the checksum field of a packet whose checksum field
/// is zeroed.
#[must_use]
pub fn checksum(bytes: &[u8]) -> u16 {
    !ones_complement_sum(bytes)
}
