//! # Vehicle
//!
//! Everything the control loop mutates: the servo arbiter, the telemetry
//! gate, the signal source and the optional recorder.

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::drive::actuator::Actuator;
use crate::drive::arbiter::{ActuatorArbiter, ArbiterOutcome};
use crate::error::Result;
use crate::frame::decoder::decode_frame;
use crate::telemetry::emitter::{TelemetryEmitter, TelemetrySample};
use crate::telemetry::recorder::TelemetryRecorder;
use crate::telemetry::signal::SignalStrength;

pub struct Vehicle<A: Actuator> {
    arbiter: ActuatorArbiter<A>,
    emitter: TelemetryEmitter,
    signal: Box<dyn SignalStrength>,
    recorder: Option<TelemetryRecorder>,
}

impl<A: Actuator> Vehicle<A> {
    pub fn new(
        arbiter: ActuatorArbiter<A>,
        emitter: TelemetryEmitter,
        signal: Box<dyn SignalStrength>,
    ) -> Self {
        Self {
            arbiter,
            emitter,
            signal,
            recorder: None,
        }
    }

    /// Also write every emitted sample to `recorder`.
    pub fn with_recorder(mut self, recorder: TelemetryRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn arbiter(&self) -> &ActuatorArbiter<A> {
        &self.arbiter
    }

    /// Decode one inbound payload and drive the servos with it.
    ///
    /// Returns `Ok(None)` when the payload is not a control frame; nothing is
    /// changed in that case.
    ///
    /// # Errors
    ///
    /// Only actuator driver failures are returned.
    pub fn handle_payload(&mut self, payload: &[u8]) -> Result<Option<ArbiterOutcome>> {
        debug!("Message arrived [{}]", String::from_utf8_lossy(payload));

        let frame = match decode_frame(payload) {
            Ok(frame) => frame,
            Err(e) => {
                debug!("Ignoring message: {}", e);
                return Ok(None);
            }
        };

        self.arbiter.apply(&frame).map(Some)
    }

    /// Produce a telemetry sample if one is due at `now`.
    pub fn poll_telemetry(&mut self, now: Instant) -> Option<TelemetrySample> {
        let uptime = self.emitter.poll(now)?;
        let sample = TelemetryEmitter::sample(uptime, self.signal.signal_strength_dbm());

        if let Some(recorder) = self.recorder.as_mut() {
            if let Err(e) = recorder.record(&sample) {
                warn!("Failed to record telemetry: {}", e);
            }
        }

        Some(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::actuator::mocks::{RecordingActuator, ServoCall};
    use crate::drive::arbiter::ActuatorState;
    use crate::drive::mixer::{ChannelMixer, MixedCommand};
    use crate::frame::encoder::encode_frame;
    use crate::telemetry::signal::FixedSignal;
    use tokio::time::Duration;

    fn vehicle(start: Instant) -> (Vehicle<RecordingActuator>, RecordingActuator) {
        let left = RecordingActuator::new();
        let arbiter = ActuatorArbiter::new(
            ChannelMixer::default(),
            left.clone(),
            RecordingActuator::new(),
        );
        let emitter = TelemetryEmitter::new(Duration::from_millis(200), start);
        (Vehicle::new(arbiter, emitter, Box::new(FixedSignal(-47))), left)
    }

    #[test]
    fn test_valid_frame_drives_servos() {
        let (mut vehicle, left) = vehicle(Instant::now());

        let outcome = vehicle.handle_payload(&encode_frame([100, 0, 0, 0])).unwrap();
        assert_eq!(
            outcome,
            Some(ArbiterOutcome::Driven(MixedCommand { left: 113, right: 113 }))
        );
        assert_eq!(left.get_calls(), vec![ServoCall::Attach, ServoCall::Write(113)]);
    }

    #[test]
    fn test_malformed_payloads_change_nothing() {
        let (mut vehicle, left) = vehicle(Instant::now());
        vehicle.handle_payload(&encode_frame([0, 50, 0, 0])).unwrap();
        let before = vehicle.arbiter().left_state();

        assert_eq!(vehicle.handle_payload(&[]).unwrap(), None);
        assert_eq!(vehicle.handle_payload(b"#\x04dddd").unwrap(), None);
        assert_eq!(vehicle.handle_payload(b"$\x04").unwrap(), None);

        assert_eq!(vehicle.arbiter().left_state(), before);
        assert_eq!(left.get_calls().len(), 2);
    }

    #[test]
    fn test_stop_payload() {
        let (mut vehicle, _left) = vehicle(Instant::now());
        let outcome = vehicle.handle_payload(&[b'$', 4, 100, 100, 100, 100]).unwrap();
        assert_eq!(outcome, Some(ArbiterOutcome::Stopped));
        assert_eq!(vehicle.arbiter().left_state(), ActuatorState::default());
    }

    #[test]
    fn test_poll_telemetry() {
        let start = Instant::now();
        let (mut vehicle, _left) = vehicle(start);

        assert!(vehicle.poll_telemetry(start + Duration::from_millis(150)).is_none());

        let sample = vehicle
            .poll_telemetry(start + Duration::from_millis(12_000))
            .unwrap();
        assert_eq!(sample.to_string(), "T;12;RSSI=-47;");
    }

    #[test]
    fn test_poll_telemetry_records_samples() {
        let dir = tempfile::TempDir::new().unwrap();
        let start = Instant::now();
        let (vehicle, _left) = vehicle(start);
        let recorder = TelemetryRecorder::new(dir.path(), 100, 2).unwrap();
        let mut vehicle = vehicle.with_recorder(recorder);

        vehicle.poll_telemetry(start + Duration::from_millis(200)).unwrap();
        vehicle.poll_telemetry(start + Duration::from_millis(400)).unwrap();

        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
        let path = files[0].as_ref().unwrap().path();
        assert_eq!(std::fs::read_to_string(path).unwrap().lines().count(), 2);
    }
}
