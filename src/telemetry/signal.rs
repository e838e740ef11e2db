//! Signal strength sources for telemetry.
//!
//! On Linux the wireless link level is read from `/proc/net/wireless`:
//!
//! ```text
//! Inter-| sta-|   Quality        |   Discarded packets               | Missed | WE
//!  face | tus | link level noise |  nwid  crypt   frag  retry   misc | beacon | 22
//!  wlan0: 0000   54.  -56.  -256        0      0      0      0      0        0
//! ```

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default location of the kernel wireless statistics
pub const PROC_NET_WIRELESS: &str = "/proc/net/wireless";

/// Level reported when the interface has no reading.
pub const NO_SIGNAL_DBM: i32 = 0;

/// How long a `/proc/net/wireless` reading is reused
pub const DEFAULT_REFRESH: Duration = Duration::from_secs(1);

/// Source of the current link signal level.
pub trait SignalStrength: Send {
    /// Current level in dBm.
    fn signal_strength_dbm(&mut self) -> i32;
}

/// Constant signal level, for links without a radio.
#[derive(Debug, Clone, Copy)]
pub struct FixedSignal(pub i32);

impl SignalStrength for FixedSignal {
    fn signal_strength_dbm(&mut self) -> i32 {
        self.0
    }
}

/// Reads the level column of one interface from `/proc/net/wireless`.
///
/// The read is a small blocking procfs read done inline on the control loop.
/// A reading is reused until the refresh period has passed.
#[derive(Debug, Clone)]
pub struct WirelessSignal {
    interface: String,
    path: PathBuf,
    refresh: Duration,
    cached: Option<(Instant, i32)>,
}

impl WirelessSignal {
    pub fn new(interface: impl Into<String>) -> Self {
        Self::with_path(interface, PROC_NET_WIRELESS)
    }

    pub fn with_path(interface: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            interface: interface.into(),
            path: path.into(),
            refresh: DEFAULT_REFRESH,
            cached: None,
        }
    }

    pub fn with_refresh(mut self, refresh: Duration) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }
}

impl WirelessSignal {
    fn read_level(&self) -> i32 {
        match fs::read_to_string(&self.path) {
            Ok(contents) => parse_wireless_level(&contents, &self.interface).unwrap_or_else(|| {
                debug!("No wireless level for {}", self.interface);
                NO_SIGNAL_DBM
            }),
            Err(e) => {
                debug!("Failed to read {}: {}", self.path.display(), e);
                NO_SIGNAL_DBM
            }
        }
    }
}

impl SignalStrength for WirelessSignal {
    fn signal_strength_dbm(&mut self) -> i32 {
        if let Some((read_at, level)) = self.cached {
            if read_at.elapsed() < self.refresh {
                return level;
            }
        }

        let level = self.read_level();
        self.cached = Some((Instant::now(), level));
        level
    }
}

/// Extracts the signal level (dBm) for `interface` from `/proc/net/wireless` text.
pub fn parse_wireless_level(contents: &str, interface: &str) -> Option<i32> {
    contents.lines().find_map(|line| {
        let (name, rest) = line.trim_start().split_once(':')?;
        if name != interface {
            return None;
        }
        // status, link, level, noise, ...
        let level = rest.split_whitespace().nth(2)?;
        let level = level.trim_end_matches('.').parse::<f32>().ok()?;
        Some(level as i32)
    })
}
