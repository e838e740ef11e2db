//! # Tank Controller Library
//!
//! Control core for a remotely driven two-wheeled tank.
//!
//! This library decodes `'$'`-framed remote-control messages, mixes steering
//! and throttle into two servo positions, powers the servos only while they
//! are needed, and reports periodic telemetry over the same link.

pub mod config;
pub mod error;
pub mod frame;
pub mod drive;
pub mod telemetry;
pub mod transport;
pub mod vehicle;
pub mod control;
