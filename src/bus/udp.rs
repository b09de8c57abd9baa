//! UDP post bus
//!
//! Inbound posts arrive as JSON datagrams on the input channel port;
//! enriched posts go out the same way to the output channel port.
//! Malformed datagrams are counted and skipped, they are not transport
//! errors.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

use crate::bus::{PostSink, PostSource};
use crate::error::TransportError;
use crate::types::Post;

/// Large enough for any reasonable post datagram
const RECV_BUFFER_SIZE: usize = 64 * 1024;

/// UDP receiver for inbound post records
pub struct UdpSource {
    socket: UdpSocket,
    buf: Vec<u8>,
    received: u64,
    parse_errors: u64,
}

impl UdpSource {
    /// Bind to the input channel port.
    pub async fn bind(host: &str, port: u16) -> Result<Self> {
        let socket = UdpSocket::bind((host, port))
            .await
            .with_context(|| format!("Failed to bind input channel {}:{}", host, port))?;

        info!("📻 Input channel bound to {}", socket.local_addr()?);

        Ok(Self {
            socket,
            buf: vec![0u8; RECV_BUFFER_SIZE],
            received: 0,
            parse_errors: 0,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// (datagrams received, datagrams that failed to parse)
    pub fn stats(&self) -> (u64, u64) {
        (self.received, self.parse_errors)
    }
}

impl PostSource for UdpSource {
    async fn next_post(&mut self) -> Result<Option<Post>, TransportError> {
        loop {
            let (len, addr) = self
                .socket
                .recv_from(&mut self.buf)
                .await
                .map_err(TransportError::Receive)?;
            self.received += 1;

            match Post::from_bytes(&self.buf[..len]) {
                Ok(post) => {
                    debug!("📨 Received {} bytes from {}", len, addr);
                    return Ok(Some(post));
                }
                Err(e) => {
                    self.parse_errors += 1;
                    warn!("⚠️ Skipping malformed datagram ({} bytes from {}): {}", len, addr, e);
                }
            }
        }
    }
}

/// UDP sender for enriched post records
pub struct UdpSink {
    socket: UdpSocket,
    target_addr: SocketAddr,
    published: u64,
}

impl UdpSink {
    /// Bind an ephemeral local port and aim at the output channel.
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .context("Failed to bind UDP socket for output channel")?;

        let target_addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("Invalid output channel address {}:{}", host, port))?;

        info!(
            "📡 Output channel sender bound to {} → target {}",
            socket.local_addr()?,
            target_addr
        );

        Ok(Self {
            socket,
            target_addr,
            published: 0,
        })
    }

    pub fn published(&self) -> u64 {
        self.published
    }
}

impl PostSink for UdpSink {
    async fn publish(&mut self, post: &Post) -> Result<(), TransportError> {
        let bytes = post.to_bytes().map_err(TransportError::Encode)?;

        self.socket
            .send_to(&bytes, self.target_addr)
            .await
            .map_err(TransportError::Publish)?;
        self.published += 1;

        debug!("📤 Published {} bytes to {}", bytes.len(), self.target_addr);
        Ok(())
    }
}
