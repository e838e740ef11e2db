//! UDP datagram link.
//!
//! Each inbound datagram is one payload and each published string is one
//! datagram to the configured peer.

use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::debug;

use super::Transport;
use crate::error::{Result, TankError};

/// Largest datagram read in one go
pub const MAX_DATAGRAM_SIZE: usize = 512;

/// UDP link to a single peer.
pub struct UdpLink {
    bind_addr: String,
    peer_addr: String,
    name: String,
    socket: Option<UdpSocket>,
}

impl std::fmt::Debug for UdpLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpLink")
            .field("bind_addr", &self.bind_addr)
            .field("peer_addr", &self.peer_addr)
            .field("connected", &self.socket.is_some())
            .finish()
    }
}

impl UdpLink {
    pub fn new(bind_addr: impl Into<String>, peer_addr: impl Into<String>) -> Self {
        let bind_addr = bind_addr.into();
        let peer_addr = peer_addr.into();
        let name = format!("udp {} -> {}", bind_addr, peer_addr);
        Self {
            bind_addr,
            peer_addr,
            name,
            socket: None,
        }
    }

    /// Local address of the bound socket, once connected.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }
}

#[async_trait]
impl Transport for UdpLink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn connect(&mut self) -> Result<()> {
        self.socket = None;

        let socket = UdpSocket::bind(&self.bind_addr).await.map_err(|e| {
            TankError::Transport(format!("Failed to bind {}: {}", self.bind_addr, e))
        })?;
        socket.connect(&self.peer_addr).await.map_err(|e| {
            TankError::Transport(format!("Failed to reach {}: {}", self.peer_addr, e))
        })?;

        self.socket = Some(socket);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    async fn recv(&mut self) -> Result<Vec<u8>> {
        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| TankError::Transport("not connected".to_string()))?;

        let mut buf = [0u8; MAX_DATAGRAM_SIZE];
        loop {
            let result = socket.recv(&mut buf).await;
            match result {
                Ok(len) => return Ok(buf[..len].to_vec()),
                // ICMP port unreachable from an earlier send; the peer may come back
                Err(e) if e.kind() == io::ErrorKind::ConnectionRefused => {
                    debug!("Peer {} unreachable", self.peer_addr);
                }
                Err(e) => {
                    self.socket = None;
                    return Err(TankError::Transport(format!("Receive failed: {}", e)));
                }
            }
        }
    }

    async fn publish(&mut self, message: &str) -> Result<()> {
        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| TankError::Transport("not connected".to_string()))?;

        let result = socket.send(message.as_bytes()).await;
        match result {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::ConnectionRefused => {
                Err(TankError::Transport(format!("Peer unreachable: {}", e)))
            }
            Err(e) => {
                self.socket = None;
                Err(TankError::Transport(format!("Send failed: {}", e)))
            }
        }
    }
}
