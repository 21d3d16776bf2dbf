//! Wire layout shared by every message: the 11-byte header, the checksum
//! field that follows it, and the fixed-capacity text fields.
//!
//! ```text
//! offset  size  field
//!      0     1  MsgType   (ASCII)
//!      1     2  MsgLen    (u16, little-endian, whole message)
//!      3     8  Timestamp (u64, little-endian, ns since Unix epoch)
//!     11     2  Checksum  (u16, little-endian)
//!     13     -  payload
//! ```
//!
//! Fields are read one at a time from a slice whose length has already been
//! checked; nothing here aliases a byte buffer as a typed record.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{ProtocolError, Result};

/// Size of MsgType + MsgLen + Timestamp.
pub const HEADER_LEN: usize = 11;

/// Byte offset of the checksum field.
pub const CHECKSUM_OFFSET: usize = HEADER_LEN;

/// Header plus checksum: the common prefix of every message.
pub const PREFIX_LEN: usize = HEADER_LEN + 2;

/// Capacity of the User field of a login request.
pub const USER_LEN: usize = 64;
/// Capacity of the Password field of a login request.
pub const PASSWORD_LEN: usize = 32;
/// Capacity of Name, Email and Repo in a submission request.
pub const SUBMISSION_FIELD_LEN: usize = 64;
/// Capacity of every Reason field.
pub const REASON_LEN: usize = 32;
/// Capacity of the submission Token field.
pub const TOKEN_LEN: usize = 32;

/// Encoded size of a login request.
pub const LOGIN_REQUEST_LEN: usize = PREFIX_LEN + USER_LEN + PASSWORD_LEN;
/// Encoded size of a submission request.
pub const SUBMISSION_REQUEST_LEN: usize = PREFIX_LEN + 3 * SUBMISSION_FIELD_LEN;
/// Encoded size of a logout request.
pub const LOGOUT_REQUEST_LEN: usize = PREFIX_LEN;
/// Encoded size of a login response.
pub const LOGIN_RESPONSE_LEN: usize = PREFIX_LEN + 1 + REASON_LEN;
/// Encoded size of a submission response.
pub const SUBMISSION_RESPONSE_LEN: usize = PREFIX_LEN + TOKEN_LEN;
/// Encoded size of a logout response or termination notice.
pub const LOGOUT_RESPONSE_LEN: usize = PREFIX_LEN + REASON_LEN;

/// Largest message the protocol defines.
pub const MAX_MESSAGE_LEN: usize = SUBMISSION_REQUEST_LEN;

/// Message type discriminators.
pub mod msg_type {
    pub const LOGIN: u8 = b'L';
    pub const LOGIN_RESPONSE: u8 = b'E';
    pub const SUBMISSION: u8 = b'S';
    pub const SUBMISSION_RESPONSE: u8 = b'R';
    pub const LOGOUT: u8 = b'O';
    /// Logout response, and the server-initiated termination notice.
    pub const TERMINATION: u8 = b'G';
}

/// Login response code meaning the credentials were accepted.
pub const CODE_ACCEPTED: u8 = b'Y';

/// The common header of every message, composed into each message variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub msg_type: u8,
    pub msg_len: u16,
    pub timestamp: u64,
    pub checksum: u16,
}

impl Header {
    /// A header for a message about to be encoded; the checksum is filled in
    /// when the finished buffer is stamped.
    pub fn new(msg_type: u8, msg_len: usize, timestamp: u64) -> Self {
        Self {
            msg_type,
            msg_len: msg_len as u16,
            timestamp,
            checksum: 0,
        }
    }

    /// Write the 13-byte prefix with a zero checksum.
    pub fn put(&self, dst: &mut BytesMut) {
        dst.put_u8(self.msg_type);
        dst.put_u16_le(self.msg_len);
        dst.put_u64_le(self.timestamp);
        dst.put_u16_le(0);
    }

    /// Read the 13-byte prefix from the front of `src`.
    pub fn parse(src: &mut &[u8]) -> Result<Self> {
        if src.remaining() < PREFIX_LEN {
            return Err(ProtocolError::InvalidHeader);
        }

        Ok(Self {
            msg_type: src.get_u8(),
            msg_len: src.get_u16_le(),
            timestamp: src.get_u64_le(),
            checksum: src.get_u16_le(),
        })
    }

    /// Peek the declared MsgLen without consuming anything.
    pub fn peek_len(src: &[u8]) -> Option<usize> {
        src.get(1..3)
            .map(|b| usize::from(u16::from_le_bytes([b[0], b[1]])))
    }
}

/// Write `value` into a `capacity`-byte, NUL-padded field.
///
/// At most `capacity - 1` bytes of the value are kept so the field always
/// ends in a terminator.
pub fn put_text(dst: &mut BytesMut, value: &str, capacity: usize) {
    let bytes = value.as_bytes();
    let end = bytes
        .iter()
        .take(capacity.saturating_sub(1))
        .position(|&b| b == 0)
        .unwrap_or_else(|| bytes.len().min(capacity.saturating_sub(1)));

    dst.put_slice(&bytes[..end]);
    dst.put_bytes(0, capacity - end);
}

/// Read a `capacity`-byte, NUL-padded field, stopping at the first NUL.
pub fn get_text(src: &mut &[u8], capacity: usize) -> Result<String> {
    if src.remaining() < capacity {
        return Err(ProtocolError::LengthMismatch {
            expected: capacity,
            actual: src.remaining(),
        });
    }

    let field = &src[..capacity];
    let end = field.iter().position(|&b| b == 0).unwrap_or(capacity);
    let text = String::from_utf8_lossy(&field[..end]).into_owned();
    src.advance(capacity);
    Ok(text)
}
