//! # Transport Layer
//!
//! The session never touches sockets directly; it talks to a [`Transport`],
//! which moves whole messages over one persistent connection.
//!
//! ## Implementations
//! - **TCP**: [`tcp::TcpTransport`], a tokio `TcpStream` framed by MsgLen
//!
//! Tests drive the session through scripted in-memory transports that
//! implement the same trait.

pub mod tcp;

use bytes::BytesMut;

use crate::error::Result;

pub use tcp::TcpTransport;

/// One persistent, half-duplex connection to the server.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Write one complete message.
    async fn send(&mut self, bytes: &[u8]) -> Result<()>;

    /// Read the next message, at most `max_len` bytes.
    ///
    /// An empty buffer means the peer closed the connection gracefully.
    async fn recv(&mut self, max_len: usize) -> Result<BytesMut>;

    /// Close the connection. Later receives observe it as closed.
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
