use thiserror::Error;

use crate::session::ScanState;

/// Errors raised while driving a scan session or handing off its result.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("calibration height must be a positive number of centimetres, got {0}")]
    InvalidCalibrationHeight(f64),

    #[error("capture interval must be greater than zero")]
    InvalidInterval,

    #[error("a scan session is already active")]
    SessionActive,

    #[error("a scan attempt is already in flight")]
    AttemptInFlight,

    #[error("event {event} is not valid in state {state:?}")]
    InvalidTransition { state: ScanState, event: &'static str },

    #[error("scan session has already ended in state {0:?}")]
    SessionClosed(ScanState),

    #[error("failed to hand off body profile: {0}")]
    Persistence(String),
}

/// Cause carried by a `Fault` outcome. Every variant is retried on the next tick.
#[derive(Debug, Error)]
pub enum ScanFault {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("scan service answered {status} with an unreadable body")]
    Status { status: u16 },

    #[error("malformed scan response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("scan response reported success but `{field}` is missing or not numeric")]
    Incomplete { field: &'static str },

    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no frames available in {0}")]
    NoFrames(String),

    #[error("capture device unavailable: {0}")]
    Unavailable(String),
}
