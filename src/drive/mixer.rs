//! # Channel Mixer Module
//!
//! Differential mix for a two-wheel drive built from continuous-rotation
//! servos mounted back to back.
//!
//! ## Algorithm
//!
//! | Step | Left (servo 1) | Right (servo 2) |
//! |------|----------------|-----------------|
//! | mix | throttle - steering | throttle + steering |
//! | clamp | -100..=100 | -100..=100 |
//! | remap | -100..100 -> 110..70 | -100..100 -> 70..110 |
//! | trim | + trim_left | + trim_right |
//!
//! The left range is inverted because the servos face opposite directions.
//! A servo position of 90 is stop; the trim corrects each servo's real center.
//!
//! ## Usage
//!
//! ```
//! use tank_controller::drive::mixer::ChannelMixer;
//!
//! let mixer = ChannelMixer::new(0, 0);
//! let cmd = mixer.mix(0, 100); // full ahead
//! assert_eq!(cmd.left, 70);
//! assert_eq!(cmd.right, 110);
//! ```

use crate::frame::protocol::{CHANNEL_VALUE_MAX, CHANNEL_VALUE_MIN};

/// Servo position at full deflection toward the low end.
pub const POSITION_LOW: i32 = 70;

/// Servo position at full deflection toward the high end.
pub const POSITION_HIGH: i32 = 110;

/// Untrimmed stop position.
pub const POSITION_CENTER: i32 = 90;

/// Default trim applied to both servos.
pub const DEFAULT_TRIM: i32 = 3;

/// Trimmed target positions for both servos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixedCommand {
    /// Servo 1 position
    pub left: i32,
    /// Servo 2 position
    pub right: i32,
}

/// Linear integer remap of `value` from `in_min..in_max` onto `out_min..out_max`.
///
/// Division truncates toward zero. `out_min > out_max` gives an inverted
/// mapping. No clamping is done here.
///
/// # Examples
///
/// ```
/// use tank_controller::drive::mixer::remap;
///
/// assert_eq!(remap(0, -100, 100, 110, 70), 90);
/// assert_eq!(remap(-100, -100, 100, 110, 70), 110);
/// ```
#[inline]
pub fn remap(value: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    (value - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Maps steering/throttle to two trimmed servo positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelMixer {
    trim_left: i32,
    trim_right: i32,
}

impl Default for ChannelMixer {
    fn default() -> Self {
        Self::new(DEFAULT_TRIM, DEFAULT_TRIM)
    }
}

impl ChannelMixer {
    /// Creates a mixer with the given per-servo trim.
    #[must_use]
    pub fn new(trim_left: i32, trim_right: i32) -> Self {
        Self {
            trim_left,
            trim_right,
        }
    }

    /// Trim added to the left servo position.
    #[must_use]
    pub fn trim_left(&self) -> i32 {
        self.trim_left
    }

    /// Trim added to the right servo position.
    #[must_use]
    pub fn trim_right(&self) -> i32 {
        self.trim_right
    }

    /// Mixes steering and throttle into servo positions.
    ///
    /// # Arguments
    ///
    /// * `steering` - ch1, negative left, positive right
    /// * `throttle` - ch2, negative reverse, positive forward
    #[must_use]
    pub fn mix(&self, steering: i32, throttle: i32) -> MixedCommand {
        let m1 = (throttle - steering).clamp(CHANNEL_VALUE_MIN, CHANNEL_VALUE_MAX);
        let m2 = (throttle + steering).clamp(CHANNEL_VALUE_MIN, CHANNEL_VALUE_MAX);

        MixedCommand {
            left: remap(m1, CHANNEL_VALUE_MIN, CHANNEL_VALUE_MAX, POSITION_HIGH, POSITION_LOW)
                + self.trim_left,
            right: remap(m2, CHANNEL_VALUE_MIN, CHANNEL_VALUE_MAX, POSITION_LOW, POSITION_HIGH)
                + self.trim_right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Remap Tests ====================

    #[test]
    fn test_remap_midpoints() {
        assert_eq!(remap(0, -100, 100, 110, 70), POSITION_CENTER);
        assert_eq!(remap(0, -100, 100, 70, 110), POSITION_CENTER);
    }

    #[test]
    fn test_remap_endpoints() {
        assert_eq!(remap(-100, -100, 100, 110, 70), 110);
        assert_eq!(remap(100, -100, 100, 110, 70), 70);
        assert_eq!(remap(-100, -100, 100, 70, 110), 70);
        assert_eq!(remap(100, -100, 100, 70, 110), 110);
    }

    #[test]
    fn test_remap_truncates_toward_zero() {
        // (101 * -40) / 200 = -20.2 -> -20
        assert_eq!(remap(1, -100, 100, 110, 70), 90);
        // (101 * 40) / 200 = 20.2 -> 20
        assert_eq!(remap(1, -100, 100, 70, 110), 90);
        // (150 * 40) / 200 = 30
        assert_eq!(remap(50, -100, 100, 70, 110), 100);
        // (5 * -40) / 200 = -1
        assert_eq!(remap(-95, -100, 100, 110, 70), 109);
    }

    #[test]
    fn test_remap_monotonic() {
        let mut prev_inverted = i32::MAX;
        let mut prev = i32::MIN;
        for x in -100..=100 {
            let inverted = remap(x, -100, 100, 110, 70);
            let normal = remap(x, -100, 100, 70, 110);
            assert!(inverted <= prev_inverted);
            assert!(normal >= prev);
            prev_inverted = inverted;
            prev = normal;
        }
    }

    // ==================== Mixer Tests ====================

    #[test]
    fn test_default_trim() {
        let mixer = ChannelMixer::default();
        assert_eq!(mixer.trim_left(), 3);
        assert_eq!(mixer.trim_right(), 3);
    }

    #[test]
    fn test_mix_neutral_is_trimmed_center() {
        let cmd = ChannelMixer::default().mix(0, 0);
        assert_eq!(cmd, MixedCommand { left: 93, right: 93 });
    }

    #[test]
    fn test_mix_full_right_turn_boundary() {
        // m1 = -100 -> 110, m2 = 100 -> 110
        let cmd = ChannelMixer::new(0, 0).mix(100, 0);
        assert_eq!(cmd, MixedCommand { left: 110, right: 110 });

        let cmd = ChannelMixer::default().mix(100, 0);
        assert_eq!(cmd, MixedCommand { left: 113, right: 113 });
    }

    #[test]
    fn test_mix_full_left_turn() {
        let cmd = ChannelMixer::new(0, 0).mix(-100, 0);
        assert_eq!(cmd, MixedCommand { left: 70, right: 70 });
    }

    #[test]
    fn test_mix_full_reverse() {
        let cmd = ChannelMixer::new(0, 0).mix(0, -100);
        assert_eq!(cmd, MixedCommand { left: 110, right: 70 });
    }

    #[test]
    fn test_mix_clamps_combined_authority() {
        // throttle + steering = 150 must clamp to 100 before remap
        let cmd = ChannelMixer::new(0, 0).mix(50, 100);
        assert_eq!(cmd.right, 110);
        // throttle - steering = 50
        assert_eq!(cmd.left, 80);

        let saturated = ChannelMixer::new(0, 0).mix(100, 100);
        assert_eq!(saturated, MixedCommand { left: 90, right: 110 });
    }

    #[test]
    fn test_mix_clamps_out_of_range_channels() {
        // Undecoded extremes (raw 255 -> 155) behave like 100
        let mixer = ChannelMixer::new(0, 0);
        assert_eq!(mixer.mix(0, 155), mixer.mix(0, 100));
    }

    #[test]
    fn test_mix_matches_formula_over_grid() {
        let mixer = ChannelMixer::new(2, -1);
        for steering in (-100..=100).step_by(25) {
            for throttle in (-100..=100).step_by(25) {
                let m1 = (throttle - steering).clamp(-100, 100);
                let m2 = (throttle + steering).clamp(-100, 100);
                let cmd = mixer.mix(steering, throttle);
                assert_eq!(cmd.left, remap(m1, -100, 100, 110, 70) + 2);
                assert_eq!(cmd.right, remap(m2, -100, 100, 70, 110) - 1);
                assert!((POSITION_LOW + 2..=POSITION_HIGH + 2).contains(&cmd.left));
                assert!((POSITION_LOW - 1..=POSITION_HIGH - 1).contains(&cmd.right));
            }
        }
    }
}
