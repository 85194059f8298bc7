use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::ScanFault;
use crate::message::{ScanRequest, ScanResponse};

pub const DEFAULT_RETRY_MESSAGE: &str = "Adjust position...";

/// Measurements extracted by the scan service from one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanMeasurements {
    pub shoulders: f64,
    pub chest: f64,
    pub waist: f64,
    pub hips: f64,
    /// Label the service computed, if any. Only kept for diagnostics.
    pub reported_body_type: Option<String>,
}

/// Verdict of a single scan round trip.
#[derive(Debug)]
pub enum ScanOutcome {
    Success(ScanMeasurements),
    /// Frame was understood but rejected; `message` is guidance for the user.
    Retry { message: String },
    Fault { cause: ScanFault },
}

impl ScanOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            ScanOutcome::Success(_) => "success",
            ScanOutcome::Retry { .. } => "retry",
            ScanOutcome::Fault { .. } => "fault",
        }
    }
}

impl From<ScanFault> for ScanOutcome {
    fn from(cause: ScanFault) -> Self {
        ScanOutcome::Fault { cause }
    }
}

/// One attempt, one round trip. Retrying is the scheduler's job.
#[async_trait]
pub trait ScanClient: Send + Sync {
    async fn submit(&self, image: &[u8], height_cm: f64) -> ScanOutcome;
}

pub struct HttpScanClient {
    http: reqwest::Client,
    url: String,
}

impl HttpScanClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn round_trip(&self, image: &[u8], height_cm: f64) -> Result<ScanOutcome, ScanFault> {
        let request = ScanRequest {
            image: STANDARD.encode(image),
            height: height_cm,
        };
        let body = serde_json::to_vec(&request)?;

        let response = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!(%status, bytes = text.len(), "scan service replied");

        let parsed = match serde_json::from_str::<ScanResponse>(&text) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(ScanFault::Status {
                    status: status.as_u16(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        interpret(parsed)
    }
}

#[async_trait]
impl ScanClient for HttpScanClient {
    #[instrument(name = "scan_submit", skip(self, image), fields(url = %self.url(), bytes = image.len()))]
    async fn submit(&self, image: &[u8], height_cm: f64) -> ScanOutcome {
        match self.round_trip(image, height_cm).await {
            Ok(outcome) => outcome,
            Err(cause) => {
                warn!(error = %cause, "scan attempt faulted");
                cause.into()
            }
        }
    }
}

/// Classifies a parsed response into a verdict.
pub fn interpret(response: ScanResponse) -> Result<ScanOutcome, ScanFault> {
    if !response.success {
        let message = response
            .message
            .map(|m| m.trim().to_owned())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_RETRY_MESSAGE.to_owned());
        return Ok(ScanOutcome::Retry { message });
    }

    Ok(ScanOutcome::Success(ScanMeasurements {
        shoulders: numeric("shoulders", response.shoulders.as_ref())?,
        chest: numeric("chest", response.chest.as_ref())?,
        waist: numeric("waist", response.waist.as_ref())?,
        hips: numeric("hips", response.hips.as_ref())?,
        reported_body_type: response.body_type.filter(|t| !t.trim().is_empty()),
    }))
}

fn numeric(field: &'static str, value: Option<&Value>) -> Result<f64, ScanFault> {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    number
        .filter(|v| v.is_finite())
        .ok_or(ScanFault::Incomplete { field })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: Value) -> ScanResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn failure_flag_becomes_retry_with_guidance() {
        let outcome = interpret(response(json!({
            "success": false,
            "message": "Feet not visible"
        })))
        .unwrap();

        assert_eq!(outcome.kind(), "retry");
        match outcome {
            ScanOutcome::Retry { message } => assert_eq!(message, "Feet not visible"),
            other => panic!("expected retry, got {other:?}"),
        }
    }

    #[test]
    fn failure_without_message_uses_default_guidance() {
        let outcome = interpret(response(json!({ "success": false, "message": "  " }))).unwrap();
        assert!(matches!(outcome, ScanOutcome::Retry { message } if message == DEFAULT_RETRY_MESSAGE));
    }

    #[test]
    fn success_coerces_numeric_strings() {
        let outcome = interpret(response(json!({
            "success": true,
            "shoulders": 46.2,
            "chest": "98",
            "waist": 81,
            "hips": " 95.5 ",
            "bodyType": "Rectangle"
        })))
        .unwrap();
        assert_eq!(outcome.kind(), "success");

        let ScanOutcome::Success(m) = outcome else {
            panic!("expected success");
        };
        assert_eq!(m.shoulders, 46.2);
        assert_eq!(m.chest, 98.0);
        assert_eq!(m.waist, 81.0);
        assert_eq!(m.hips, 95.5);
        assert_eq!(m.reported_body_type.as_deref(), Some("Rectangle"));
    }

    #[test]
    fn success_without_body_type_is_tolerated() {
        let outcome = interpret(response(json!({
            "success": true,
            "shoulders": 46, "chest": 98, "waist": 81, "hips": 95
        })))
        .unwrap();
        assert!(matches!(outcome, ScanOutcome::Success(m) if m.reported_body_type.is_none()));
    }

    #[test]
    fn partial_success_is_rejected() {
        let err = interpret(response(json!({
            "success": true,
            "shoulders": 46, "chest": 98, "waist": null, "hips": 95
        })))
        .unwrap_err();
        assert!(matches!(err, ScanFault::Incomplete { field: "waist" }));

        let err = interpret(response(json!({
            "success": true,
            "shoulders": "wide", "chest": 98, "waist": 80, "hips": 95
        })))
        .unwrap_err();
        assert!(matches!(err, ScanFault::Incomplete { field: "shoulders" }));
        assert_eq!(ScanOutcome::from(err).kind(), "fault");
    }
}
