//! # Control Frame Decoder
//!
//! Validates the marker and extracts the four channel values.

use super::protocol::*;
use crate::error::FrameError;

/// Decode a control frame
///
/// The declared length byte is read and kept, but channels are always taken
/// from the fixed offsets 2..=5 whatever it says. A payload with a valid
/// marker that is shorter than [`FRAME_SIZE`] is rejected rather than read
/// past its end.
///
/// # Arguments
///
/// * `payload` - Raw inbound message bytes
///
/// # Errors
///
/// Returns error if:
/// - Payload is empty
/// - First byte is not `'$'`
/// - Payload is too short for the fixed channel offsets
///
/// # Examples
///
/// ```
/// use tank_controller::frame::decoder::decode_frame;
///
/// let frame = decode_frame(&[b'$', 4, 150, 100, 100, 100])?;
/// assert_eq!(frame.steering(), 50);
/// assert_eq!(frame.throttle(), 0);
/// # Ok::<(), tank_controller::error::FrameError>(())
/// ```
pub fn decode_frame(payload: &[u8]) -> Result<ControlFrame, FrameError> {
    let Some(&marker) = payload.first() else {
        return Err(FrameError::Empty);
    };

    if marker != FRAME_MARKER {
        return Err(FrameError::InvalidMarker(marker));
    }

    if payload.len() < FRAME_SIZE {
        return Err(FrameError::Truncated { len: payload.len() });
    }

    let mut channels = [CHANNEL_VALUE_NEUTRAL; NUM_CHANNELS];
    for (i, channel) in channels.iter_mut().enumerate() {
        *channel = payload[CHANNEL_START + i] as i32 - CHANNEL_OFFSET;
    }

    Ok(ControlFrame {
        marker,
        length: payload[1],
        channels,
    })
}
