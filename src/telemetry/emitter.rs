//! # Telemetry Emitter
//!
//! Fires at most once per period, measured from the last emission rather than
//! from wall-clock boundaries, so a busy loop iteration delays a report
//! instead of dropping it.

use std::fmt;
use tokio::time::{Duration, Instant};

/// Default telemetry period
pub const DEFAULT_PERIOD_MS: u64 = 200;

/// One status report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetrySample {
    /// Whole seconds since start
    pub uptime_seconds: u64,
    /// Link signal level in dBm
    pub signal_strength_dbm: i32,
}

impl fmt::Display for TelemetrySample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "T;{};RSSI={};",
            self.uptime_seconds, self.signal_strength_dbm
        )
    }
}

/// Period gate for telemetry.
///
/// # Examples
///
/// ```
/// use tank_controller::telemetry::emitter::TelemetryEmitter;
/// use tokio::time::{Duration, Instant};
///
/// let start = Instant::now();
/// let mut emitter = TelemetryEmitter::new(Duration::from_millis(200), start);
///
/// assert!(emitter.poll(start + Duration::from_millis(100)).is_none());
/// assert!(emitter.poll(start + Duration::from_millis(200)).is_some());
/// ```
#[derive(Debug, Clone)]
pub struct TelemetryEmitter {
    period: Duration,
    started_at: Instant,
    last_emission: Instant,
}

impl TelemetryEmitter {
    /// Creates an emitter. The first report is due one period after `started_at`.
    pub fn new(period: Duration, started_at: Instant) -> Self {
        Self {
            period,
            started_at,
            last_emission: started_at,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time since `started_at`.
    pub fn uptime(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }

    /// Returns the uptime if a report is due at `now`, and marks it emitted.
    pub fn poll(&mut self, now: Instant) -> Option<Duration> {
        if now.saturating_duration_since(self.last_emission) < self.period {
            return None;
        }
        self.last_emission = now;
        Some(self.uptime(now))
    }

    /// Builds a sample for the given uptime and signal level.
    pub fn sample(uptime: Duration, signal_strength_dbm: i32) -> TelemetrySample {
        TelemetrySample {
            uptime_seconds: uptime.as_secs(),
            signal_strength_dbm,
        }
    }
}
