//! # Actuator Arbiter
//!
//! Decides per frame whether the servos are powered and applies the mixed
//! positions.
//!
//! ## State Machine
//!
//! Each servo is either **Detached** (initial, unpowered, no drift) or
//! **Attached**. A neutral frame (steering and throttle both 0) detaches both
//! servos and writes nothing. Any other frame attaches whichever servo is not
//! yet attached and then writes the mixed position to both.
//!
//! Driver `attach`/`detach` are only called on an actual transition; writes
//! happen on every non-neutral frame.

use tracing::debug;

use super::actuator::Actuator;
use super::mixer::{ChannelMixer, MixedCommand};
use crate::error::Result;
use crate::frame::protocol::ControlFrame;

/// Arbiter-side view of one servo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActuatorState {
    /// Servo is powered
    pub attached: bool,
    /// Last position written, `None` before the first write
    pub position: Option<i32>,
}

/// What the arbiter did with a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterOutcome {
    /// Neutral frame, servos detached
    Stopped,
    /// Servos attached and driven to these positions
    Driven(MixedCommand),
}

/// Servo pair plus the state the arbiter keeps for them.
#[derive(Debug)]
pub struct ActuatorArbiter<A: Actuator> {
    mixer: ChannelMixer,
    left: A,
    right: A,
    left_state: ActuatorState,
    right_state: ActuatorState,
}

impl<A: Actuator> ActuatorArbiter<A> {
    /// Creates an arbiter with both servos detached.
    pub fn new(mixer: ChannelMixer, left: A, right: A) -> Self {
        Self {
            mixer,
            left,
            right,
            left_state: ActuatorState::default(),
            right_state: ActuatorState::default(),
        }
    }

    pub fn mixer(&self) -> &ChannelMixer {
        &self.mixer
    }

    pub fn left_state(&self) -> ActuatorState {
        self.left_state
    }

    pub fn right_state(&self) -> ActuatorState {
        self.right_state
    }

    /// Driver handles, mainly for inspection.
    pub fn actuators(&self) -> (&A, &A) {
        (&self.left, &self.right)
    }

    /// Applies one decoded frame to the servos.
    ///
    /// # Errors
    ///
    /// Returns the first driver error. State is only updated for calls that
    /// succeeded.
    pub fn apply(&mut self, frame: &ControlFrame) -> Result<ArbiterOutcome> {
        if frame.is_neutral() {
            release(&mut self.left, &mut self.left_state)?;
            release(&mut self.right, &mut self.right_state)?;
            return Ok(ArbiterOutcome::Stopped);
        }

        engage(&mut self.left, &mut self.left_state)?;
        engage(&mut self.right, &mut self.right_state)?;

        let cmd = self.mixer.mix(frame.steering(), frame.throttle());
        self.left.write(cmd.left)?;
        self.left_state.position = Some(cmd.left);
        self.right.write(cmd.right)?;
        self.right_state.position = Some(cmd.right);

        debug!(
            "{} {} -> {} {}",
            frame.steering(),
            frame.throttle(),
            cmd.left,
            cmd.right
        );

        Ok(ArbiterOutcome::Driven(cmd))
    }
}

fn engage<A: Actuator>(actuator: &mut A, state: &mut ActuatorState) -> Result<()> {
    if !state.attached {
        actuator.attach()?;
        state.attached = true;
    }
    Ok(())
}

fn release<A: Actuator>(actuator: &mut A, state: &mut ActuatorState) -> Result<()> {
    if state.attached {
        actuator.detach()?;
        state.attached = false;
    }
    Ok(())
}
