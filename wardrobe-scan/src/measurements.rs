use serde::{Deserialize, Serialize};

use crate::classify::{BodyShape, classify};

/// Body dimensions in centimetres (weight in kilograms).
///
/// Fields never hold NaN: text input goes through [`parse_measure`] and scan
/// results are validated by the client before they get here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasurementSet {
    pub height_cm: f64,
    pub weight_kg: f64,
    pub shoulders: f64,
    pub chest: f64,
    pub waist: f64,
    pub hips: f64,
}

impl MeasurementSet {
    /// Hip width used for classification, falling back to chest when hips is unset.
    pub fn hips_or_chest(&self) -> f64 {
        if self.hips > 0.0 { self.hips } else { self.chest }
    }

    pub fn body_shape(&self) -> BodyShape {
        classify(self.shoulders, self.waist, self.hips_or_chest())
    }
}

/// Raw text of the editable measurement fields, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeasurementForm {
    pub height: String,
    pub weight: String,
    pub shoulders: String,
    pub chest: String,
    pub waist: String,
    pub hips: String,
}

impl MeasurementForm {
    pub fn to_measurements(&self) -> MeasurementSet {
        MeasurementSet {
            height_cm: parse_measure(&self.height),
            weight_kg: parse_measure(&self.weight),
            shoulders: parse_measure(&self.shoulders),
            chest: parse_measure(&self.chest),
            waist: parse_measure(&self.waist),
            hips: parse_measure(&self.hips),
        }
    }

    /// Form pre-filled from a committed set, e.g. after a successful scan.
    pub fn from_measurements(set: &MeasurementSet) -> Self {
        let text = |v: f64| if v > 0.0 { v.to_string() } else { String::new() };
        Self {
            height: text(set.height_cm),
            weight: text(set.weight_kg),
            shoulders: text(set.shoulders),
            chest: text(set.chest),
            waist: text(set.waist),
            hips: text(set.hips),
        }
    }
}

/// Parses a measurement field. Blank, non-numeric and non-finite input becomes `0.0`.
pub fn parse_measure(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
