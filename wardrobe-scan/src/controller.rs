use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::capture::CaptureSource;
use crate::classify::BodyShape;
use crate::client::ScanClient;
use crate::error::ScanError;
use crate::measurements::MeasurementForm;
use crate::profile::{BodyProfile, ProfileSink};
use crate::scheduler::{CaptureScheduler, ScanHandle};
use crate::session::{ScanSession, ScanState};

/// Screen-level owner of scanning: at most one live session, live
/// classification of manual edits, and hand-off of finalized profiles.
pub struct ScanController {
    scheduler: CaptureScheduler,
    sink: Arc<dyn ProfileSink>,
    active: Option<ScanHandle>,
}

impl ScanController {
    pub fn new(
        client: Arc<dyn ScanClient>,
        capture: Arc<dyn CaptureSource>,
        sink: Arc<dyn ProfileSink>,
    ) -> Self {
        Self {
            scheduler: CaptureScheduler::new(client, capture),
            sink,
            active: None,
        }
    }

    pub fn with_interval(mut self, period: Duration) -> Self {
        self.scheduler = self.scheduler.with_interval(period);
        self
    }

    pub fn active(&self) -> Option<&ScanHandle> {
        self.active.as_ref().filter(|handle| handle.is_active())
    }

    pub async fn start_scan(&mut self, height_cm: f64) -> Result<&ScanHandle, ScanError> {
        if self.active().is_some() {
            return Err(ScanError::SessionActive);
        }

        let handle = self.scheduler.start(ScanSession::new(), height_cm).await?;
        Ok(self.active.insert(handle))
    }

    pub async fn cancel_scan(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.stop().await;
        }
    }

    /// Waits for the current session to end and hands a successful result to
    /// the sink. Returns `None` when there is no session or it was cancelled.
    pub async fn finish_scan(&mut self) -> Result<Option<BodyProfile>, ScanError> {
        let snapshot = match self.active.as_ref() {
            Some(handle) => handle.finished().await,
            None => return Ok(None),
        };
        self.active = None;

        let measurements = match (snapshot.state, snapshot.measurements) {
            (ScanState::Success, Some(measurements)) => measurements,
            (state, _) => {
                debug!(session = %snapshot.session, ?state, "scan ended without a result");
                return Ok(None);
            }
        };

        let profile = BodyProfile::new(measurements);
        self.sink.store(&profile).await?;
        info!(session = %snapshot.session, body_type = %profile.body_type, "scan profile handed off");
        Ok(Some(profile))
    }

    /// Live label for the measurement fields as currently typed.
    pub fn preview(&self, form: &MeasurementForm) -> BodyShape {
        form.to_measurements().body_shape()
    }

    /// Coerces manual edits and hands the resulting profile to the sink.
    pub async fn save(&self, form: &MeasurementForm) -> Result<BodyProfile, ScanError> {
        let profile = BodyProfile::new(form.to_measurements());
        self.sink.store(&profile).await?;
        info!(body_type = %profile.body_type, "manual profile handed off");
        Ok(profile)
    }
}
