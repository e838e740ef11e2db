//! # Drive Module
//!
//! Turns decoded control frames into servo commands.
//!
//! This module handles:
//! - Differential ("tank") mixing of steering and throttle
//! - Per-servo trim
//! - Attach/detach arbitration so idle servos are unpowered
//! - The actuator driver abstraction

pub mod mixer;
pub mod actuator;
pub mod arbiter;
