//! Internet-style 16-bit checksum used to stamp and verify every message.
//!
//! The buffer is summed as little-endian 16-bit words; an odd trailing byte is
//! added on its own. Carries are folded back into the low 16 bits and the
//! one's complement of the result is the checksum. The checksum field itself
//! (bytes 11-12 of every message) is zero while the sum is computed.

use crate::core::packet::{CHECKSUM_OFFSET, PREFIX_LEN};

/// Compute the checksum of `buf`.
pub fn checksum16(buf: &[u8]) -> u16 {
    let mut words = buf.chunks_exact(2);
    let mut sum: u64 = words
        .by_ref()
        .map(|w| u64::from(u16::from_le_bytes([w[0], w[1]])))
        .sum();

    if let [last] = words.remainder() {
        sum += u64::from(*last);
    }

    // Two folds suffice for protocol-sized messages; loop for arbitrary input
    while sum >> 16 != 0 {
        sum = (sum >> 16) + (sum & 0xFFFF);
    }

    !(sum as u16)
}

/// Zero the checksum field, compute over the whole buffer and store the result.
///
/// Returns the stored value. Buffers shorter than the message prefix are left
/// untouched and yield `None`.
pub fn stamp(buf: &mut [u8]) -> Option<u16> {
    if buf.len() < PREFIX_LEN {
        return None;
    }

    buf[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2].fill(0);
    let sum = checksum16(buf);
    buf[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2].copy_from_slice(&sum.to_le_bytes());
    Some(sum)
}

/// Read the checksum field of a received buffer.
pub fn received(buf: &[u8]) -> Option<u16> {
    buf.get(CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
}

/// Recompute the checksum of a received buffer with its checksum field zeroed.
///
/// The field is zeroed in place for the computation and restored afterwards,
/// so the buffer leaves this function byte-identical. Returns
/// `(received, computed)`.
pub fn recompute(buf: &mut [u8]) -> Option<(u16, u16)> {
    let cached = received(buf)?;

    buf[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2].fill(0);
    let computed = checksum16(buf);
    buf[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2].copy_from_slice(&cached.to_le_bytes());

    Some((cached, computed))
}

/// Check a received buffer against its embedded checksum.
///
/// Anything shorter than the message prefix cannot carry a checksum and
/// never verifies.
pub fn verify(buf: &mut [u8]) -> bool {
    matches!(recompute(buf), Some((received, computed)) if received == computed)
}
