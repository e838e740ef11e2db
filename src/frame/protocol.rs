//! # Control Frame Constants and Types
//!
//! A control frame is six bytes:
//!
//! ```text
//! byte 0: '$'        marker
//! byte 1: length     declared channel count, read but never used to bound the read
//! byte 2: ch1 + 100  steering
//! byte 3: ch2 + 100  throttle
//! byte 4: ch3 + 100  auxiliary, unused by the mixer
//! byte 5: ch4 + 100  auxiliary, unused by the mixer
//! ```

/// Frame marker byte (`'$'`)
pub const FRAME_MARKER: u8 = b'$';

/// Total frame size: marker(1) + length(1) + 4 channels
pub const FRAME_SIZE: usize = 6;

/// Offset of the first channel byte
pub const CHANNEL_START: usize = 2;

/// Number of control channels
pub const NUM_CHANNELS: usize = 4;

/// Raw byte value that decodes to a neutral channel
pub const CHANNEL_OFFSET: i32 = 100;

/// Minimum channel value consumed by the mixer
pub const CHANNEL_VALUE_MIN: i32 = -100;

/// Maximum channel value consumed by the mixer
pub const CHANNEL_VALUE_MAX: i32 = 100;

/// Neutral channel value (stick centred)
pub const CHANNEL_VALUE_NEUTRAL: i32 = 0;

/// Channel indices for semantic access.
pub mod channels {
    /// Steering (ch1)
    pub const STEERING: usize = 0;
    /// Throttle (ch2)
    pub const THROTTLE: usize = 1;
    /// Auxiliary (ch3)
    pub const AUX1: usize = 2;
    /// Auxiliary (ch4)
    pub const AUX2: usize = 3;
}

/// A decoded control frame.
///
/// Channel values are `raw - 100`. Raw bytes above 200 are not rejected and
/// decode to values above 100; the mixer clamps what it consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlFrame {
    /// Marker byte, always [`FRAME_MARKER`] for a decoded frame
    pub marker: u8,

    /// Declared length byte as received
    pub length: u8,

    /// Decoded channel values
    pub channels: [i32; NUM_CHANNELS],
}

impl ControlFrame {
    /// Steering axis (ch1)
    pub fn steering(&self) -> i32 {
        self.channels[channels::STEERING]
    }

    /// Throttle axis (ch2)
    pub fn throttle(&self) -> i32 {
        self.channels[channels::THROTTLE]
    }

    /// True when both driving axes are centered, i.e. a stop command.
    pub fn is_neutral(&self) -> bool {
        self.steering() == CHANNEL_VALUE_NEUTRAL && self.throttle() == CHANNEL_VALUE_NEUTRAL
    }
}
