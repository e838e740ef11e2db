//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::drive::mixer::DEFAULT_TRIM;
use crate::error::Result;
use crate::telemetry::emitter::DEFAULT_PERIOD_MS;
use crate::transport::serial::DEFAULT_BAUD_RATE;
use crate::transport::{DEFAULT_READY_MESSAGE, DEFAULT_RETRY_INTERVAL_MS};

/// Largest trim that keeps every mixed position inside 0..=180
pub const MAX_TRIM: i32 = 70;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub transport: TransportConfig,
    #[serde(default)]
    pub udp: UdpConfig,
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub servo: ServoConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which link carries control frames
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Udp,
    Serial,
}

/// Transport configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TransportConfig {
    #[serde(default = "default_transport_kind")]
    pub kind: TransportKind,

    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,

    #[serde(default = "default_ready_message")]
    pub ready_message: String,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// UDP link configuration
#[derive(Debug, Deserialize, Clone)]
pub struct UdpConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_peer_addr")]
    pub peer_addr: String,
}

/// Serial link configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

/// Servo trim configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServoConfig {
    #[serde(default = "default_trim")]
    pub trim_left: i32,

    #[serde(default = "default_trim")]
    pub trim_right: i32,
}

/// Telemetry configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_period_ms")]
    pub period_ms: u64,

    /// Wireless interface to read RSSI from; empty reports a fixed 0 dBm
    #[serde(default = "default_signal_interface")]
    pub signal_interface: String,

    #[serde(default)]
    pub record: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily log files; empty logs to stdout only
    #[serde(default)]
    pub dir: String,
}

// Default value functions
fn default_transport_kind() -> TransportKind { TransportKind::Udp }
fn default_reconnect_interval_ms() -> u64 { DEFAULT_RETRY_INTERVAL_MS }
fn default_ready_message() -> String { DEFAULT_READY_MESSAGE.to_string() }
fn default_poll_interval_ms() -> u64 { 5 }

fn default_bind_addr() -> String { "0.0.0.0:4210".to_string() }
fn default_peer_addr() -> String { "192.168.0.19:4211".to_string() }

fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { DEFAULT_BAUD_RATE }

fn default_trim() -> i32 { DEFAULT_TRIM }

fn default_telemetry_period_ms() -> u64 { DEFAULT_PERIOD_MS }
fn default_signal_interface() -> String { "wlan0".to_string() }
fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }

fn default_log_level() -> String { "info".to_string() }

impl Default for UdpConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            peer_addr: default_peer_addr(),
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
        }
    }
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            trim_left: default_trim(),
            trim_right: default_trim(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            period_ms: default_telemetry_period_ms(),
            signal_interface: default_signal_interface(),
            record: false,
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tank_controller::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.transport.reconnect_interval_ms == 0 || self.transport.reconnect_interval_ms > 60000 {
            return Err(invalid("reconnect_interval_ms must be between 1 and 60000"));
        }

        if self.transport.poll_interval_ms == 0 || self.transport.poll_interval_ms > 1000 {
            return Err(invalid("poll_interval_ms must be between 1 and 1000"));
        }

        if self.transport.ready_message.is_empty() {
            return Err(invalid("ready_message cannot be empty"));
        }

        match self.transport.kind {
            TransportKind::Udp => {
                if self.udp.bind_addr.is_empty() || self.udp.peer_addr.is_empty() {
                    return Err(invalid("udp bind_addr and peer_addr cannot be empty"));
                }
            }
            TransportKind::Serial => {
                if self.serial.port.is_empty() {
                    return Err(invalid("serial port cannot be empty"));
                }

                if ![9600, 19200, 38400, 57600, 115200, 230400, 460800, 921600].contains(&self.serial.baud_rate) {
                    return Err(invalid(
                        "baud_rate must be one of: 9600, 19200, 38400, 57600, 115200, 230400, 460800, 921600",
                    ));
                }
            }
        }

        for (name, value) in [
            ("trim_left", self.servo.trim_left),
            ("trim_right", self.servo.trim_right),
        ] {
            if !(-MAX_TRIM..=MAX_TRIM).contains(&value) {
                return Err(invalid(format!(
                    "{} must be between -{} and {}",
                    name, MAX_TRIM, MAX_TRIM
                )));
            }
        }

        if self.telemetry.period_ms == 0 || self.telemetry.period_ms > 60000 {
            return Err(invalid("telemetry period_ms must be between 1 and 60000"));
        }

        if self.telemetry.record {
            if self.telemetry.log_dir.is_empty() {
                return Err(invalid("telemetry log_dir cannot be empty when recording"));
            }
            if self.telemetry.max_records_per_file == 0 {
                return Err(invalid("max_records_per_file must be greater than 0"));
            }
            if self.telemetry.max_files_to_keep == 0 {
                return Err(invalid("max_files_to_keep must be greater than 0"));
            }
        }

        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(invalid("logging level must be one of: trace, debug, info, warn, error"));
        }

        Ok(())
    }
}

fn invalid(msg: impl std::fmt::Display) -> crate::error::TankError {
    crate::error::TankError::Config(toml::de::Error::custom(msg))
}
