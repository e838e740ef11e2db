//! # Transport Module
//!
//! Links that carry control frames in and status strings out.
//!
//! This module handles:
//! - The [`Transport`] abstraction used by the control loop
//! - UDP datagram link
//! - Serial link with `'$'` resynchronisation
//! - Blocking (re)connection with a fixed retry delay and ready announcement

pub mod udp;
pub mod serial;

use async_trait::async_trait;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

use crate::error::Result;

/// Default delay between connection attempts
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 5000;

/// Default message published after every successful connect
pub const DEFAULT_READY_MESSAGE: &str = "Tank READY";

/// Bidirectional message link.
///
/// Inbound payloads are delivered unmodified and in order. Publishing is best
/// effort; callers do not retry.
#[async_trait]
pub trait Transport: Send {
    /// Short human-readable description, used in logs.
    fn name(&self) -> &str;

    /// Open (or reopen) the link and subscribe to inbound traffic.
    async fn connect(&mut self) -> Result<()>;

    /// True while the link is usable.
    fn is_connected(&self) -> bool;

    /// Wait for the next inbound payload.
    ///
    /// Must be cancel safe: it is raced against the poll tick. An error means
    /// the link was lost and [`is_connected`](Transport::is_connected) now
    /// returns false.
    async fn recv(&mut self) -> Result<Vec<u8>>;

    /// Send one outbound status string.
    async fn publish(&mut self, message: &str) -> Result<()>;
}

/// Block until `transport` is connected, then announce readiness.
///
/// Retries forever, sleeping `retry_interval` after each failed attempt. The
/// announcement is published on every new connection.
pub async fn establish<T: Transport + ?Sized>(
    transport: &mut T,
    retry_interval: Duration,
    ready_message: &str,
) {
    while !transport.is_connected() {
        info!("Attempting {} connection...", transport.name());

        match transport.connect().await {
            Ok(()) => {
                info!("Connected via {}", transport.name());
                if let Err(e) = transport.publish(ready_message).await {
                    warn!("Failed to announce readiness: {}", e);
                }
            }
            Err(e) => {
                warn!(
                    "Connection failed: {}, trying again in {} ms",
                    e,
                    retry_interval.as_millis()
                );
                sleep(retry_interval).await;
            }
        }
    }
}
