use std::net::SocketAddr;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use futures::{SinkExt, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;
use tokio_util::codec::Framed;
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::core::codec::FrameCodec;
use crate::error::{constants, ProtocolError, Result};
use crate::transport::Transport;

/// TCP connection carrying framed protocol messages
pub struct TcpTransport {
    framed: Framed<TcpStream, FrameCodec>,
    peer: SocketAddr,
    response_timeout: Duration,
}

impl TcpTransport {
    /// Resolve `host` and connect to the first address, preferring IPv4
    #[instrument(skip(config), fields(host = %config.host, port = config.port))]
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let addrs: Vec<SocketAddr> = timeout(
            config.connection_timeout,
            lookup_host((config.host.as_str(), config.port)),
        )
        .await
        .map_err(|_| ProtocolError::TransportError(constants::ERR_CONNECT_TIMEOUT.into()))??
        .collect();

        let peer = addrs
            .iter()
            .find(|a| a.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| ProtocolError::TransportError(constants::ERR_NO_ADDRESS.into()))?;

        let stream = timeout(config.connection_timeout, TcpStream::connect(peer))
            .await
            .map_err(|_| ProtocolError::TransportError(constants::ERR_CONNECT_TIMEOUT.into()))??;
        stream.set_nodelay(true)?;

        debug!(%peer, "Connected");
        Ok(Self::from_stream(stream, peer, config.response_timeout))
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream, peer: SocketAddr, response_timeout: Duration) -> Self {
        Self {
            framed: Framed::new(stream, FrameCodec::new()),
            peer,
            response_timeout,
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl Transport for TcpTransport {
    async fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.framed.send(Bytes::copy_from_slice(bytes)).await
    }

    async fn recv(&mut self, max_len: usize) -> Result<BytesMut> {
        let frame = match timeout(self.response_timeout, self.framed.next()).await {
            Err(_) => {
                debug!(
                    timeout_ms = self.response_timeout.as_millis() as u64,
                    "{}",
                    constants::ERR_RECV_TIMEOUT
                );
                return Err(ProtocolError::Timeout);
            }
            Ok(None) => return Ok(BytesMut::new()),
            Ok(Some(frame)) => frame?,
        };

        if frame.len() > max_len {
            return Err(ProtocolError::TransportError(format!(
                "{}: {} > {max_len}",
                constants::ERR_FRAME_TOO_LARGE,
                frame.len()
            )));
        }
        Ok(frame)
    }

    async fn close(&mut self) -> Result<()> {
        self.framed.get_mut().shutdown().await?;
        Ok(())
    }
}
