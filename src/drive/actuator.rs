//! Actuator driver abstraction
//!
//! Pulse generation is left to the driver; the core only powers a servo up
//! (attach), down (detach), or commands a position.

use tracing::{debug, info};

use crate::error::Result;

/// Opaque servo driver.
#[cfg_attr(test, mockall::automock)]
pub trait Actuator: Send {
    /// Power the servo and start driving pulses.
    fn attach(&mut self) -> Result<()>;

    /// Stop driving pulses so the servo idles unpowered.
    fn detach(&mut self) -> Result<()>;

    /// Command a servo position in degrees.
    fn write(&mut self, position: i32) -> Result<()>;
}

/// Host-side servo that only records and logs what it is told.
#[derive(Debug, Clone)]
pub struct SimulatedServo {
    name: String,
    attached: bool,
    position: Option<i32>,
}

impl SimulatedServo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attached: false,
            position: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Last commanded position, if any.
    pub fn position(&self) -> Option<i32> {
        self.position
    }
}

impl Actuator for SimulatedServo {
    fn attach(&mut self) -> Result<()> {
        self.attached = true;
        info!("Servo {} attached", self.name);
        Ok(())
    }

    fn detach(&mut self) -> Result<()> {
        self.attached = false;
        info!("Servo {} detached", self.name);
        Ok(())
    }

    fn write(&mut self, position: i32) -> Result<()> {
        self.position = Some(position);
        debug!("Servo {} -> {}", self.name, position);
        Ok(())
    }
}
