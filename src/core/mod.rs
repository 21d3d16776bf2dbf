//! # Core Protocol Components
//!
//! Low-level wire handling: the shared message prefix, the checksum engine,
//! and stream framing.
//!
//! ## Components
//! - **Packet**: header layout, field sizes and fixed-capacity text fields
//! - **Checksum**: one's-complement 16-bit sum used to stamp and verify messages
//! - **Codec**: Tokio codec that frames messages by their MsgLen field
//!
//! ## Wire Format
//! ```text
//! [MsgType(1)] [MsgLen(2)] [Timestamp(8)] [Checksum(2)] [Payload(N)]
//! ```
//!
//! All multi-byte integers are little-endian.

pub mod checksum;
pub mod codec;
pub mod packet;
