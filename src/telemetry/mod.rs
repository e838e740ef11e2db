//! # Telemetry Module
//!
//! Periodic status reports for the operator.
//!
//! This module handles:
//! - Deciding when a report is due (fixed period)
//! - Formatting samples as `T;<uptime>;RSSI=<dbm>;`
//! - Reading the wireless signal level
//! - Optionally recording samples to rotating JSONL files

pub mod emitter;
pub mod signal;
pub mod recorder;
