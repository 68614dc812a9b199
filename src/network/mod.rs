//! Network layer protocols implementation
//!
//! This module contains implementations for network layer protocols:
//! - IPv4: Internet Protocol version 4
//! - ICMP: Internet Control Message Protocol
//!
//! plus the internet checksum shared by both.

pub mod icmp;
pub mod ipv4;

// Re-export commonly used items
pub use icmp::{IcmpBody, IcmpMessage, ICMP_TYPE_ECHO_REPLY, ICMP_TYPE_ECHO_REQUEST};
pub use ipv4::{flags, protocol, Ipv4Header, Ipv4Packet};

/// Calculate Internet checksum
///
/// Algorithm: Sum data in 16-bit chunks, add carry bits to the sum,
/// and return the one's complement of the result.
/// This is used for both IP and ICMP checksums.
pub fn checksum(data: &[u8]) -> u16 {
    // u64 so no realistic input length can overflow before the fold
    let mut sum = 0u64;

    let mut chunks = data.chunks_exact(2);
    for chunk in &mut chunks {
        sum += u16::from_be_bytes([chunk[0], chunk[1]]) as u64;
    }

    // Odd trailing byte is the high half of a zero-padded word
    if let Some(&last_byte) = chunks.remainder().first() {
        sum += (last_byte as u64) << 8;
    }

    fold(sum)
}

/// Add carry bits back in and return the one's complement
fn fold(mut sum: u64) -> u16 {
    while (sum >> 16) > 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    !sum as u16
}

/// Recompute the checksum of `data` with the 16-bit field at `field_offset`
/// read as zero.
///
/// Returns `(stored, computed)`. The data is valid iff the two are equal.
/// `field_offset + 2` must not exceed `data.len()`.
pub(crate) fn recompute(data: &[u8], field_offset: usize) -> (u16, u16) {
    let stored = u16::from_be_bytes([data[field_offset], data[field_offset + 1]]);
    let byte = |idx: usize| -> u64 {
        if idx == field_offset || idx == field_offset + 1 {
            0
        } else {
            data.get(idx).copied().unwrap_or(0) as u64
        }
    };

    let mut sum = 0u64;
    for idx in (0..data.len()).step_by(2) {
        sum += (byte(idx) << 8) | byte(idx + 1);
    }
    (stored, fold(sum))
}

/// Returns true if the checksum field at `field_offset` matches the data.
pub fn verify(data: &[u8], field_offset: usize) -> bool {
    if field_offset + 2 > data.len() {
        return false;
    }
    let (stored, computed) = recompute(data, field_offset);
    stored == computed
}
