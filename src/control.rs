//! # Control Loop
//!
//! Single cooperative loop: wait for either the next inbound payload or the
//! poll tick, handle it to completion, repeat. Link (re)establishment blocks
//! the whole loop, frames and telemetry included.

use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::drive::actuator::Actuator;
use crate::error::Result;
use crate::transport::{establish, Transport};
use crate::vehicle::Vehicle;

/// Loop timing and announcement settings
#[derive(Debug, Clone)]
pub struct LoopSettings {
    /// How often the telemetry gate is checked
    pub poll_interval: Duration,
    /// Delay between failed connection attempts
    pub retry_interval: Duration,
    /// Published after every successful connect
    pub ready_message: String,
}

/// Run the control loop until an actuator fails.
///
/// Malformed frames are skipped, transport errors trigger reconnection, and
/// telemetry that cannot be sent is dropped. Servos keep their last command
/// while the link is down.
///
/// # Errors
///
/// Returns an error only if an actuator driver fails.
pub async fn run<T, A>(transport: &mut T, vehicle: &mut Vehicle<A>, settings: &LoopSettings) -> Result<()>
where
    T: Transport + ?Sized,
    A: Actuator,
{
    let mut poll = interval(settings.poll_interval);
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        "Control loop running (poll every {} ms)",
        settings.poll_interval.as_millis()
    );

    loop {
        if !transport.is_connected() {
            establish(transport, settings.retry_interval, &settings.ready_message).await;
        }

        tokio::select! {
            inbound = transport.recv() => match inbound {
                Ok(payload) => {
                    vehicle.handle_payload(&payload)?;
                }
                Err(e) => {
                    warn!("Link lost: {}", e);
                }
            },

            _ = poll.tick() => {
                if let Some(sample) = vehicle.poll_telemetry(Instant::now()) {
                    let message = sample.to_string();
                    if let Err(e) = transport.publish(&message).await {
                        debug!("Telemetry dropped: {}", e);
                    }
                }
            }
        }
    }
}
