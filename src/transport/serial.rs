//! # Serial Link
//!
//! Control frames over a serial line (e.g. a radio modem or USB bridge).
//!
//! Inbound bytes are buffered and cut into fixed 6-byte frames starting at a
//! `'$'` marker; anything before a marker is discarded. Outbound strings are
//! written newline-terminated.

use async_trait::async_trait;
use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_serial::SerialPortBuilderExt;
use tracing::debug;

use super::Transport;
use crate::error::{Result, TankError};
use crate::frame::protocol::{FRAME_MARKER, FRAME_SIZE};

/// Default serial baud rate
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Byte stream the serial link can run over.
pub trait SerialIo: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> SerialIo for T {}

/// Serial port transport.
pub struct SerialLink {
    device_path: String,
    baud_rate: u32,
    port: Option<Box<dyn SerialIo>>,
    reopenable: bool,
    buffer: BytesMut,
}

impl std::fmt::Debug for SerialLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialLink")
            .field("device_path", &self.device_path)
            .field("baud_rate", &self.baud_rate)
            .field("connected", &self.port.is_some())
            .finish_non_exhaustive()
    }
}

impl SerialLink {
    /// Link to a serial device, opened on [`connect`](Transport::connect).
    pub fn new(device_path: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            device_path: device_path.into(),
            baud_rate,
            port: None,
            reopenable: true,
            buffer: BytesMut::with_capacity(64),
        }
    }

    /// Link over an already open stream. It cannot be reopened once closed.
    pub fn from_stream<S: SerialIo + 'static>(stream: S) -> Self {
        Self {
            device_path: "<stream>".to_string(),
            baud_rate: 0,
            port: Some(Box::new(stream)),
            reopenable: false,
            buffer: BytesMut::with_capacity(64),
        }
    }

    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Open a serial device as 8N1 without flow control
    fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream> {
        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| TankError::Serial(format!("Failed to open {}: {}", path, e)))?;

        Ok(port)
    }
}

/// Take the next complete frame out of `buffer`, dropping bytes before the marker.
pub fn extract_frame(buffer: &mut BytesMut) -> Option<Vec<u8>> {
    match buffer.iter().position(|&b| b == FRAME_MARKER) {
        None => {
            if !buffer.is_empty() {
                debug!("Discarding {} bytes without frame marker", buffer.len());
            }
            buffer.clear();
            None
        }
        Some(start) => {
            if start > 0 {
                debug!("Discarding {} bytes before frame marker", start);
                buffer.advance(start);
            }
            if buffer.len() < FRAME_SIZE {
                return None;
            }
            Some(buffer.split_to(FRAME_SIZE).to_vec())
        }
    }
}

#[async_trait]
impl Transport for SerialLink {
    fn name(&self) -> &str {
        &self.device_path
    }

    async fn connect(&mut self) -> Result<()> {
        if !self.reopenable {
            return Err(TankError::Serial("stream closed".to_string()));
        }

        let port = Self::open_port(&self.device_path, self.baud_rate)?;
        self.port = Some(Box::new(port));
        self.buffer.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    async fn recv(&mut self) -> Result<Vec<u8>> {
        loop {
            if let Some(frame) = extract_frame(&mut self.buffer) {
                return Ok(frame);
            }

            let port = self
                .port
                .as_mut()
                .ok_or_else(|| TankError::Serial("port not open".to_string()))?;

            let result = port.read_buf(&mut self.buffer).await;
            match result {
                Ok(0) => {
                    self.port = None;
                    return Err(TankError::Serial("port closed".to_string()));
                }
                Ok(_) => {}
                Err(e) => {
                    self.port = None;
                    return Err(TankError::Serial(format!("Failed to read: {}", e)));
                }
            }
        }
    }

    async fn publish(&mut self, message: &str) -> Result<()> {
        let port = self
            .port
            .as_mut()
            .ok_or_else(|| TankError::Serial("port not open".to_string()))?;

        let mut line = Vec::with_capacity(message.len() + 1);
        line.extend_from_slice(message.as_bytes());
        line.push(b'\n');

        let result = match port.write_all(&line).await {
            Ok(()) => port.flush().await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            self.port = None;
            return Err(TankError::Serial(format!("Failed to write: {}", e)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    // ==================== Framing Tests ====================

    #[test]
    fn test_extract_complete_frame() {
        let mut buffer = BytesMut::from(&[b'$', 4, 150, 100, 100, 100][..]);
        assert_eq!(
            extract_frame(&mut buffer),
            Some(vec![b'$', 4, 150, 100, 100, 100])
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_extract_partial_frame_waits() {
        let mut buffer = BytesMut::from(&[b'$', 4, 150][..]);
        assert_eq!(extract_frame(&mut buffer), None);
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_extract_skips_leading_noise() {
        let mut buffer = BytesMut::from(&b"noise$\x04dddd!"[..]);
        assert_eq!(extract_frame(&mut buffer), Some(b"$\x04dddd".to_vec()));
        assert_eq!(&buffer[..], b"!");
    }

    #[test]
    fn test_extract_discards_buffer_without_marker() {
        let mut buffer = BytesMut::from(&b"no marker here"[..]);
        assert_eq!(extract_frame(&mut buffer), None);
        assert!(buffer.is_empty());
    }

    // ==================== Link Tests ====================

    #[test]
    fn test_new_link_is_closed() {
        let link = SerialLink::new("/dev/ttyUSB0", DEFAULT_BAUD_RATE);
        assert!(!link.is_connected());
        assert_eq!(link.device_path(), "/dev/ttyUSB0");
        assert_eq!(link.name(), "/dev/ttyUSB0");
    }

    #[tokio::test]
    async fn test_open_invalid_device_fails() {
        let mut link = SerialLink::new("/dev/nonexistent_serial_device_12345", DEFAULT_BAUD_RATE);
        match link.connect().await.unwrap_err() {
            TankError::Serial(msg) => {
                assert!(msg.contains("/dev/nonexistent_serial_device_12345"));
                assert!(msg.contains("Failed to open"));
            }
            other => panic!("Expected Serial error, got: {:?}", other),
        }
        assert!(!link.is_connected());
    }

    #[tokio::test]
    async fn test_recv_frames_across_reads() {
        let stream = Builder::new()
            .read(b"xx$\x04")
            .read(&[150, 100, 100, 100, b'$', 4, 100, 100, 100, 100])
            .build();
        let mut link = SerialLink::from_stream(stream);

        assert_eq!(link.recv().await.unwrap(), vec![b'$', 4, 150, 100, 100, 100]);
        assert_eq!(link.recv().await.unwrap(), vec![b'$', 4, 100, 100, 100, 100]);
    }

    #[tokio::test]
    async fn test_publish_writes_line() {
        let stream = Builder::new().write(b"T;12;RSSI=-47;\n").build();
        let mut link = SerialLink::from_stream(stream);

        link.publish("T;12;RSSI=-47;").await.unwrap();
        assert!(link.is_connected());
    }

    #[tokio::test]
    async fn test_closed_stream_disconnects() {
        let (local, remote) = tokio::io::duplex(64);
        drop(remote);
        let mut link = SerialLink::from_stream(local);

        assert!(link.recv().await.is_err());
        assert!(!link.is_connected());
        assert!(link.connect().await.is_err());
    }
}
