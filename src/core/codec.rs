//! Stream framing for the protocol.
//!
//! Messages carry no delimiter; the MsgLen field in bytes 1-2 of every header
//! says how long the message is. [`FrameCodec`] waits until that many bytes
//! have arrived and hands the whole message out untouched. Checksum
//! verification and decoding happen above this layer.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use crate::core::packet::{Header, MAX_MESSAGE_LEN, PREFIX_LEN};
use crate::error::{constants, ProtocolError, Result};

/// Cuts whole messages out of a byte stream using the MsgLen field.
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    max_frame_len: usize,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self {
            max_frame_len: MAX_MESSAGE_LEN,
        }
    }

    /// Accept frames up to `max_frame_len` bytes instead of the largest
    /// protocol message.
    pub fn with_max_frame_len(max_frame_len: usize) -> Self {
        Self {
            max_frame_len: max_frame_len.max(PREFIX_LEN),
        }
    }

    pub fn max_frame_len(&self) -> usize {
        self.max_frame_len
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = BytesMut;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        let Some(declared) = Header::peek_len(src) else {
            return Ok(None);
        };

        // A length we can never satisfy means the header itself is damaged;
        // there is no way to find the next message boundary, so drop what
        // has been buffered and resynchronise on the next read.
        if !(PREFIX_LEN..=self.max_frame_len).contains(&declared) {
            warn!(
                declared,
                buffered = src.len(),
                "Discarding bytes with impossible message length"
            );
            src.clear();
            return Ok(None);
        }

        if src.len() < declared {
            src.reserve(declared - src.len());
            return Ok(None);
        }

        Ok(Some(src.split_to(declared)))
    }
}

impl Encoder<Bytes> for FrameCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<()> {
        if item.len() > self.max_frame_len {
            return Err(ProtocolError::TransportError(format!(
                "{}: {} bytes",
                constants::ERR_FRAME_TOO_LARGE,
                item.len()
            )));
        }
        dst.extend_from_slice(&item);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn frame(len: usize, fill: u8) -> Vec<u8> {
        let mut buf = vec![fill; len];
        buf[1..3].copy_from_slice(&(len as u16).to_le_bytes());
        buf
    }

    #[test]
    fn test_waits_for_whole_message() {
        let mut codec = FrameCodec::new();
        let bytes = frame(46, b'E');

        let mut buf = BytesMut::from(&bytes[..20]);
        assert!(matches!(codec.decode(&mut buf), Ok(None)));
        assert_eq!(buf.len(), 20);

        buf.extend_from_slice(&bytes[20..]);
        let out = codec.decode(&mut buf).unwrap().map(|b| b.to_vec());
        assert_eq!(out, Some(bytes));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_splits_concatenated_messages() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&frame(45, b'G'));
        buf.extend_from_slice(&frame(46, b'E'));

        let first = codec.decode(&mut buf).unwrap().map(|b| b.len());
        let second = codec.decode(&mut buf).unwrap().map(|b| b.len());
        assert_eq!(first, Some(45));
        assert_eq!(second, Some(46));
        assert!(matches!(codec.decode(&mut buf), Ok(None)));
    }

    #[test]
    fn test_impossible_length_is_discarded() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::from(&frame(46, 0)[..]);
        buf[1..3].copy_from_slice(&5000u16.to_le_bytes());

        assert!(matches!(codec.decode(&mut buf), Ok(None)));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_encode_rejects_oversized() {
        let mut codec = FrameCodec::with_max_frame_len(64);
        let mut dst = BytesMut::new();
        assert!(codec.encode(Bytes::from(vec![0u8; 65]), &mut dst).is_err());
        assert!(codec.encode(Bytes::from(vec![0u8; 64]), &mut dst).is_ok());
        assert_eq!(dst.len(), 64);
    }
}
