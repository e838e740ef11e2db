//! # Error Types
//!
//! Custom error types for the tank controller using `thiserror`.

use thiserror::Error;

/// Reasons an inbound payload is not a control frame.
///
/// None of these are fatal: the control loop logs them and takes no action
/// for that message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Zero-length payload
    #[error("empty payload")]
    Empty,

    /// First byte is not the frame marker
    #[error("invalid frame marker: 0x{0:02X}")]
    InvalidMarker(u8),

    /// Marker present but the fixed channel offsets run past the buffer
    #[error("frame truncated: {len} bytes, need 6")]
    Truncated { len: usize },
}

/// Main error type for the tank controller
#[derive(Debug, Error)]
pub enum TankError {
    /// Control frame errors
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport link errors
    #[error("Transport error: {0}")]
    Transport(String),

    /// Serial port errors
    #[error("Serial error: {0}")]
    Serial(String),

    /// Actuator driver errors
    #[error("Actuator error: {0}")]
    Actuator(String),
}

/// Result type alias for the tank controller
pub type Result<T> = std::result::Result<T, TankError>;
