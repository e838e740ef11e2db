//! # Tank Controller
//!
//! Drives a two-wheeled tank from `'$'`-framed control messages and reports
//! telemetry back over the same link.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Load configuration (first argument, default `config/default.toml`)
//!    - Set up logging with tracing subscriber
//!    - Build the UDP or serial link, the servos and the telemetry source
//!
//! 2. **Main Loop**
//!    - Connect (retrying every `reconnect_interval_ms`) and announce readiness
//!    - Decode each inbound frame, mix, and drive the servos
//!    - Publish `T;<uptime>;RSSI=<dbm>;` every telemetry period
//!
//! 3. **Shutdown** on Ctrl+C
//!
//! # Examples
//!
//! ```bash
//! cargo run --release -- config/default.toml
//! ```

use anyhow::{Context, Result};
use tokio::time::{Duration, Instant};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use tank_controller::config::{Config, LoggingConfig, TransportKind};
use tank_controller::control::{self, LoopSettings};
use tank_controller::drive::actuator::SimulatedServo;
use tank_controller::drive::arbiter::ActuatorArbiter;
use tank_controller::drive::mixer::ChannelMixer;
use tank_controller::telemetry::emitter::TelemetryEmitter;
use tank_controller::telemetry::recorder::TelemetryRecorder;
use tank_controller::telemetry::signal::{FixedSignal, SignalStrength, WirelessSignal, NO_SIGNAL_DBM};
use tank_controller::transport::serial::SerialLink;
use tank_controller::transport::udp::UdpLink;
use tank_controller::transport::Transport;
use tank_controller::vehicle::Vehicle;

/// Configuration file used when no path is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Log file name prefix inside `logging.dir`
const LOG_FILE_PREFIX: &str = "tank-controller.log";

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    let _log_guard = init_logging(&config.logging);

    info!("Tank Controller v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut transport = build_transport(&config);
    let mut vehicle = build_vehicle(&config)?;

    let settings = LoopSettings {
        poll_interval: Duration::from_millis(config.transport.poll_interval_ms),
        retry_interval: Duration::from_millis(config.transport.reconnect_interval_ms),
        ready_message: config.transport.ready_message.clone(),
    };

    info!("Press Ctrl+C to exit");

    tokio::select! {
        result = control::run(transport.as_mut(), &mut vehicle, &settings) => {
            result.context("Control loop stopped")?;
        }

        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
    }

    let arbiter = vehicle.arbiter();
    info!(
        "Final servo state: left {:?}, right {:?}",
        arbiter.left_state(),
        arbiter.right_state()
    );

    Ok(())
}

/// Install the tracing subscriber. `RUST_LOG` overrides the configured level.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.dir.is_empty() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(&config.dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

fn build_transport(config: &Config) -> Box<dyn Transport> {
    match config.transport.kind {
        TransportKind::Udp => Box::new(UdpLink::new(
            config.udp.bind_addr.clone(),
            config.udp.peer_addr.clone(),
        )),
        TransportKind::Serial => Box::new(SerialLink::new(
            config.serial.port.clone(),
            config.serial.baud_rate,
        )),
    }
}

fn build_vehicle(config: &Config) -> Result<Vehicle<SimulatedServo>> {
    let mixer = ChannelMixer::new(config.servo.trim_left, config.servo.trim_right);
    info!(
        "Servo trim: left {}, right {}",
        mixer.trim_left(),
        mixer.trim_right()
    );
    let arbiter = ActuatorArbiter::new(
        mixer,
        SimulatedServo::new("left"),
        SimulatedServo::new("right"),
    );

    let emitter = TelemetryEmitter::new(
        Duration::from_millis(config.telemetry.period_ms),
        Instant::now(),
    );

    let signal: Box<dyn SignalStrength> = if config.telemetry.signal_interface.is_empty() {
        Box::new(FixedSignal(NO_SIGNAL_DBM))
    } else {
        Box::new(WirelessSignal::new(config.telemetry.signal_interface.clone()))
    };

    let mut vehicle = Vehicle::new(arbiter, emitter, signal);

    if config.telemetry.record {
        let recorder = TelemetryRecorder::new(
            &config.telemetry.log_dir,
            config.telemetry.max_records_per_file,
            config.telemetry.max_files_to_keep,
        )
        .with_context(|| format!("Failed to prepare {}", config.telemetry.log_dir))?;
        vehicle = vehicle.with_recorder(recorder);
    }

    Ok(vehicle)
}
