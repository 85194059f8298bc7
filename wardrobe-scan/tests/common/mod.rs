#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use wardrobe_scan::capture::CaptureSource;
use wardrobe_scan::client::{ScanClient, ScanMeasurements, ScanOutcome};
use wardrobe_scan::error::{CaptureError, ScanError, ScanFault};
use wardrobe_scan::profile::{BodyProfile, ProfileSink};

pub fn measurements(shoulders: f64, chest: f64, waist: f64, hips: f64) -> ScanMeasurements {
    ScanMeasurements {
        shoulders,
        chest,
        waist,
        hips,
        reported_body_type: None,
    }
}

pub fn retry(message: &str) -> ScanOutcome {
    ScanOutcome::Retry {
        message: message.to_owned(),
    }
}

pub fn fault() -> ScanOutcome {
    ScanFault::Incomplete { field: "hips" }.into()
}

/// Frames that never fail, unless told to fail the first `failures` calls.
#[derive(Default)]
pub struct StubCapture {
    pub calls: AtomicUsize,
    pub failures: usize,
}

impl StubCapture {
    pub fn failing(failures: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failures,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptureSource for StubCapture {
    async fn capture(&self) -> Result<Vec<u8>, CaptureError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(CaptureError::Unavailable("camera busy".into()));
        }
        Ok(vec![0xff, 0xd8, 0xff, call as u8])
    }
}

/// Replays scripted outcomes, then hangs forever once the script runs out.
#[derive(Default)]
pub struct ScriptedClient {
    script: Mutex<VecDeque<ScanOutcome>>,
    calls: AtomicUsize,
    pub heights: Mutex<Vec<f64>>,
}

impl ScriptedClient {
    pub fn new(script: impl IntoIterator<Item = ScanOutcome>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn hanging() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScanClient for ScriptedClient {
    async fn submit(&self, _image: &[u8], height_cm: f64) -> ScanOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.heights.lock().unwrap().push(height_cm);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(outcome) => outcome,
            None => std::future::pending().await,
        }
    }
}

/// Holds every request until the test opens the gate, then succeeds.
#[derive(Default)]
pub struct GatedClient {
    pub gate: Notify,
    calls: AtomicUsize,
    completed: AtomicUsize,
}

impl GatedClient {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScanClient for GatedClient {
    async fn submit(&self, _image: &[u8], _height_cm: f64) -> ScanOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        self.completed.fetch_add(1, Ordering::SeqCst);
        ScanOutcome::Success(measurements(60.0, 55.0, 40.0, 50.0))
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub profiles: Mutex<Vec<BodyProfile>>,
}

impl RecordingSink {
    pub fn stored(&self) -> Vec<BodyProfile> {
        self.profiles.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProfileSink for RecordingSink {
    async fn store(&self, profile: &BodyProfile) -> Result<(), ScanError> {
        self.profiles.lock().unwrap().push(profile.clone());
        Ok(())
    }
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
