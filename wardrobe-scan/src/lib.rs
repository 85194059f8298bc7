pub mod capture;
pub mod classify;
pub mod client;
pub mod controller;
pub mod error;
pub mod measurements;
pub mod message;
pub mod profile;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod utils;

pub use classify::{BodyShape, classify};
pub use client::{HttpScanClient, ScanClient, ScanMeasurements, ScanOutcome};
pub use controller::ScanController;
pub use error::{CaptureError, ScanError, ScanFault};
pub use measurements::{MeasurementForm, MeasurementSet, parse_measure};
pub use session::{ScanSession, ScanSnapshot, ScanState};
