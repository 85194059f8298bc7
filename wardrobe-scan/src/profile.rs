use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::classify::BodyShape;
use crate::error::ScanError;
use crate::measurements::MeasurementSet;

/// Finalized measurements and label, ready for the profile store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyProfile {
    #[serde(flatten)]
    pub measurements: MeasurementSet,
    pub body_type: BodyShape,
    pub last_updated: DateTime<Utc>,
}

impl BodyProfile {
    pub fn new(measurements: MeasurementSet) -> Self {
        Self {
            body_type: measurements.body_shape(),
            measurements,
            last_updated: Utc::now(),
        }
    }
}

/// Receives finalized profiles. Storage itself lives outside this crate.
#[async_trait]
pub trait ProfileSink: Send + Sync {
    async fn store(&self, profile: &BodyProfile) -> Result<(), ScanError>;
}

/// Writes each profile as one JSON line on stdout.
pub struct JsonLineSink;

#[async_trait]
impl ProfileSink for JsonLineSink {
    async fn store(&self, profile: &BodyProfile) -> Result<(), ScanError> {
        let mut line =
            serde_json::to_vec(profile).map_err(|e| ScanError::Persistence(e.to_string()))?;
        line.push(b'\n');

        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(&line)
            .await
            .map_err(|e| ScanError::Persistence(e.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|e| ScanError::Persistence(e.to_string()))
    }
}
