//! # Error Types
//!
//! Error handling for the submission protocol client.
//!
//! Every exchange returns a [`Result`] whose error names exactly which kind of
//! failure occurred, so callers never have to guess from a bare `false`.
//!
//! ## Error Categories
//! - **Transport**: send/receive failures, retried by the session up to its budget
//! - **Connection**: the peer closed the stream; fatal, never retried
//! - **Integrity**: checksum mismatches; absorbed by the session, never surfaced
//! - **Shape**: length or header mismatches; retried like transport failures
//! - **Session**: server termination notices, refusals, out-of-order exchanges
//!
//! ## Example Usage
//! ```rust
//! use submission_protocol::error::{ProtocolError, Result};
//!
//! fn check_len(buf: &[u8]) -> Result<()> {
//!     if buf.len() != 46 {
//!         return Err(ProtocolError::LengthMismatch {
//!             expected: 46,
//!             actual: buf.len(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_len(&[0u8; 108]).is_err());
//! ```

use std::io;
use thiserror::Error;

pub use crate::protocol::message::Exchange;

/// Error message constants to keep error paths allocation-free where possible.
pub mod constants {
    /// Connection errors
    pub const ERR_CONNECTION_CLOSED: &str = "Connection closed by peer";
    pub const ERR_CONNECT_TIMEOUT: &str = "Timed out connecting to server";
    pub const ERR_RECV_TIMEOUT: &str = "Timed out waiting for a response";
    pub const ERR_NO_ADDRESS: &str = "Host did not resolve to any address";

    /// Framing errors
    pub const ERR_FRAME_TOO_LARGE: &str = "Frame exceeds the receive limit";

    /// Time errors
    pub const ERR_SYSTEM_TIME: &str = "System time error: clock is before the Unix epoch";
}

/// ProtocolError is the primary error type for all protocol operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Timeout occurred")]
    Timeout,

    #[error("Checksum mismatch: received {received:#06x}, computed {computed:#06x}")]
    ChecksumMismatch { received: u16, computed: u16 },

    #[error("Length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Invalid message header")]
    InvalidHeader,

    #[error("Unexpected message type: {0:#04x}")]
    UnexpectedMessage(u8),

    #[error("Session terminated by server: {0}")]
    ServerTerminated(String),

    #[error("{exchange} rejected by server: {reason}")]
    Rejected { exchange: Exchange, reason: String },

    #[error("Cannot start {exchange} while session is {state}")]
    InvalidState { exchange: Exchange, state: String },

    #[error("{exchange} failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        exchange: Exchange,
        attempts: u32,
        last_error: String,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Custom error: {0}")]
    Custom(String),
}

impl ProtocolError {
    /// Whether the session may resend the request after this error.
    ///
    /// Transport and shape failures are retried; a closed connection, a
    /// termination notice and every session-level refusal are final.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProtocolError::Io(_)
                | ProtocolError::TransportError(_)
                | ProtocolError::Timeout
                | ProtocolError::LengthMismatch { .. }
                | ProtocolError::InvalidHeader
                | ProtocolError::UnexpectedMessage(_)
        )
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
