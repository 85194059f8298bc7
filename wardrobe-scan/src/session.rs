use tracing::{debug, info};
use uuid::Uuid;

use crate::classify::BodyShape;
use crate::client::{ScanMeasurements, ScanOutcome};
use crate::error::{CaptureError, ScanError};
use crate::measurements::MeasurementSet;

pub const STATUS_READY: &str = "Stand back to start...";
pub const STATUS_ALIGNING: &str = "Aligning... Stand back.";
pub const STATUS_ANALYZING: &str = "Analyzing...";
pub const STATUS_CONNECTING: &str = "Connecting...";
pub const STATUS_COMPLETE: &str = "Scan complete";
pub const STATUS_CANCELLED: &str = "Scan cancelled";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Calibrating,
    Capturing,
    AwaitingResult,
    Success,
    Cancelled,
}

impl ScanState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanState::Success | ScanState::Cancelled)
    }

    /// Calibrating, capturing or awaiting a result.
    pub fn is_active(&self) -> bool {
        !self.is_terminal() && *self != ScanState::Idle
    }
}

#[derive(Debug)]
pub enum ScanEvent {
    Start { height_cm: f64 },
    /// Timer tick; opens a new attempt.
    Tick,
    FrameCaptured,
    CaptureFailed(CaptureError),
    Outcome(ScanOutcome),
    Cancel,
}

impl ScanEvent {
    fn name(&self) -> &'static str {
        match self {
            ScanEvent::Start { .. } => "start",
            ScanEvent::Tick => "tick",
            ScanEvent::FrameCaptured => "frame_captured",
            ScanEvent::CaptureFailed(_) => "capture_failed",
            ScanEvent::Outcome(_) => "outcome",
            ScanEvent::Cancel => "cancel",
        }
    }
}

/// Point-in-time view of a session, published to observers after every transition.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSnapshot {
    pub session: Uuid,
    pub state: ScanState,
    pub status: String,
    pub attempt_in_flight: bool,
    pub attempts: u32,
    pub measurements: Option<MeasurementSet>,
    pub body_shape: Option<BodyShape>,
}

/// State of one user-initiated scan.
///
/// All mutation goes through [`ScanSession::apply`]. Once the session reaches
/// `Success` or `Cancelled` it never changes again.
#[derive(Debug)]
pub struct ScanSession {
    id: Uuid,
    state: ScanState,
    status: String,
    height_cm: f64,
    attempt_in_flight: bool,
    cancelled: bool,
    attempts: u32,
    measurements: Option<MeasurementSet>,
    body_shape: Option<BodyShape>,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: ScanState::Idle,
            status: STATUS_READY.to_owned(),
            height_cm: 0.0,
            attempt_in_flight: false,
            cancelled: false,
            attempts: 0,
            measurements: None,
            body_shape: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn height_cm(&self) -> f64 {
        self.height_cm
    }

    pub fn attempt_in_flight(&self) -> bool {
        self.attempt_in_flight
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn measurements(&self) -> Option<&MeasurementSet> {
        self.measurements.as_ref()
    }

    pub fn body_shape(&self) -> Option<BodyShape> {
        self.body_shape
    }

    pub fn snapshot(&self) -> ScanSnapshot {
        ScanSnapshot {
            session: self.id,
            state: self.state,
            status: self.status.clone(),
            attempt_in_flight: self.attempt_in_flight,
            attempts: self.attempts,
            measurements: self.measurements,
            body_shape: self.body_shape,
        }
    }

    /// Applies one event and returns the resulting state.
    pub fn apply(&mut self, event: ScanEvent) -> Result<ScanState, ScanError> {
        if self.state.is_terminal() {
            return match event {
                ScanEvent::Cancel => Ok(self.state),
                _ => Err(ScanError::SessionClosed(self.state)),
            };
        }

        let name = event.name();
        match (self.state, event) {
            (_, ScanEvent::Cancel) => {
                self.state = ScanState::Cancelled;
                self.cancelled = true;
                self.status = STATUS_CANCELLED.to_owned();
                info!(session = %self.id, attempts = self.attempts, "scan cancelled");
            }
            (ScanState::Idle, ScanEvent::Start { height_cm }) => {
                if !(height_cm > 0.0 && height_cm.is_finite()) {
                    return Err(ScanError::InvalidCalibrationHeight(height_cm));
                }
                self.height_cm = height_cm;
                self.state = ScanState::Calibrating;
                self.status = STATUS_ALIGNING.to_owned();
                info!(session = %self.id, height_cm, "scan started");
            }
            (ScanState::Calibrating | ScanState::Capturing, ScanEvent::Tick) => {
                if self.attempt_in_flight {
                    return Err(ScanError::AttemptInFlight);
                }
                self.state = ScanState::Capturing;
                self.status = STATUS_ANALYZING.to_owned();
                self.attempt_in_flight = true;
                self.attempts += 1;
            }
            (ScanState::AwaitingResult, ScanEvent::Tick) => {
                return Err(ScanError::AttemptInFlight);
            }
            (ScanState::Capturing, ScanEvent::FrameCaptured) if self.attempt_in_flight => {
                self.state = ScanState::AwaitingResult;
            }
            (ScanState::Capturing, ScanEvent::CaptureFailed(cause)) if self.attempt_in_flight => {
                debug!(session = %self.id, error = %cause, "capture failed");
                self.attempt_in_flight = false;
                self.status = STATUS_CONNECTING.to_owned();
            }
            (ScanState::AwaitingResult, ScanEvent::Outcome(outcome)) => {
                self.attempt_in_flight = false;
                match outcome {
                    ScanOutcome::Success(scan) => self.commit(scan),
                    ScanOutcome::Retry { message } => {
                        self.state = ScanState::Capturing;
                        self.status = message;
                    }
                    ScanOutcome::Fault { cause } => {
                        debug!(session = %self.id, error = %cause, "scan fault, retrying");
                        self.state = ScanState::Capturing;
                        self.status = STATUS_CONNECTING.to_owned();
                    }
                }
            }
            (state, _) => {
                return Err(ScanError::InvalidTransition { state, event: name });
            }
        }

        Ok(self.state)
    }

    fn commit(&mut self, scan: ScanMeasurements) {
        let measurements = MeasurementSet {
            height_cm: self.height_cm,
            weight_kg: 0.0,
            shoulders: scan.shoulders,
            chest: scan.chest,
            waist: scan.waist,
            hips: scan.hips,
        };
        let shape = measurements.body_shape();

        if let Some(reported) = scan.reported_body_type.as_deref() {
            if reported != shape.label() {
                debug!(session = %self.id, reported, computed = %shape, "service label differs");
            }
        }

        self.measurements = Some(measurements);
        self.body_shape = Some(shape);
        self.state = ScanState::Success;
        self.status = STATUS_COMPLETE.to_owned();
        info!(session = %self.id, attempts = self.attempts, body_shape = %shape, "scan complete");
    }
}
