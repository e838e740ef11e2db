//! # Control Frame Module
//!
//! Wire format of the remote-control frames that steer the tank.
//!
//! This module handles:
//! - Frame constants and the decoded [`ControlFrame`](protocol::ControlFrame) type
//! - Marker validation and fixed-offset channel extraction
//! - Building frames for tooling and tests

pub mod protocol;
pub mod decoder;
pub mod encoder;
