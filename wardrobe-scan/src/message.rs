use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /scan`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScanRequest {
    /// Standard base64 of the captured frame.
    pub image: String,
    pub height: f64,
}

/// Body returned by the scan service. Measurement fields are kept loose
/// because the service sends numbers or numeric strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    pub success: bool,
    #[serde(default)]
    pub shoulders: Option<Value>,
    #[serde(default)]
    pub chest: Option<Value>,
    #[serde(default)]
    pub waist: Option<Value>,
    #[serde(default)]
    pub hips: Option<Value>,
    #[serde(default)]
    pub body_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
