//! # Control Frame Encoder
//!
//! Builds control frames from signed channel values.

use super::protocol::*;

/// Encode four channel values into a complete control frame
///
/// Each channel is clamped to -100..=100 before the offset is applied, so the
/// result always decodes back to in-range values.
///
/// # Examples
///
/// ```
/// use tank_controller::frame::encoder::encode_frame;
///
/// let frame = encode_frame([0, 100, 0, 0]);
/// assert_eq!(frame, [b'$', 4, 100, 200, 100, 100]);
/// ```
pub fn encode_frame(channels: [i32; NUM_CHANNELS]) -> [u8; FRAME_SIZE] {
    let mut frame = [0u8; FRAME_SIZE];
    frame[0] = FRAME_MARKER;
    frame[1] = NUM_CHANNELS as u8;

    for (i, &value) in channels.iter().enumerate() {
        let clamped = value.clamp(CHANNEL_VALUE_MIN, CHANNEL_VALUE_MAX);
        frame[CHANNEL_START + i] = (clamped + CHANNEL_OFFSET) as u8;
    }

    frame
}
