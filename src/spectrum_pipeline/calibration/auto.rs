//! Automatic three-point calibration.
//!
//! The fit itself runs in a remote service that locates the red, green and
//! blue primaries of a white-light spectrum. This module owns the wire
//! contract, validation of what comes back, and the confidence tiers shown
//! to the user.

use serde::{Deserialize, Serialize};

use crate::spectrum_pipeline::calibration::model::CalibrationModel;
use crate::spectrum_pipeline::common::error::{Result, SpectrumError};

const EXCELLENT_CONFIDENCE: f64 = 0.70;
const GOOD_CONFIDENCE: f64 = 0.50;

#[derive(Debug, Clone, Serialize)]
pub struct AutoCalibrationRequest<'a> {
    pub red: &'a [f64],
    pub green: &'a [f64],
    pub blue: &'a [f64],
}

/// Where the service found one primary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferencePeak {
    /// Fractional pixel position
    pub pixel: f64,
    pub wavelength: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferencePeaks {
    #[serde(default)]
    pub red: Option<ReferencePeak>,
    #[serde(default)]
    pub green: Option<ReferencePeak>,
    #[serde(default)]
    pub blue: Option<ReferencePeak>,
}

/// Payload of the fitting service, as sent over the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoCalibrationResponse {
    pub success: bool,
    #[serde(default)]
    pub nm_per_pixel: Option<f64>,
    #[serde(default, alias = "offset")]
    pub wavelength_offset: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub peaks: Option<ReferencePeaks>,
    #[serde(default)]
    pub error: Option<String>,
}

pub trait AutoCalibrator {
    fn fit(&self, request: &AutoCalibrationRequest<'_>) -> Result<AutoCalibrationResponse>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfidenceTier {
    Excellent,
    Good,
    Low,
}

impl ConfidenceTier {
    /// Feedback only; a low score never rejects the model.
    pub fn classify(confidence: f64) -> Self {
        if confidence >= EXCELLENT_CONFIDENCE {
            ConfidenceTier::Excellent
        } else if confidence >= GOOD_CONFIDENCE {
            ConfidenceTier::Good
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ConfidenceTier::Excellent => "Excellent!",
            ConfidenceTier::Good => "Good",
            ConfidenceTier::Low => "Low (consider recalibrating)",
        }
    }
}

/// A validated service fit.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoCalibration {
    pub model: CalibrationModel,
    pub confidence: f64,
    pub tier: ConfidenceTier,
    pub peaks: ReferencePeaks,
}

fn finite_field(value: Option<f64>, name: &str) -> Result<f64> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(SpectrumError::ExternalService(format!("{} is not finite: {}", name, v))),
        None => Err(SpectrumError::ExternalService(format!("response is missing {}", name))),
    }
}

impl TryFrom<AutoCalibrationResponse> for AutoCalibration {
    type Error = SpectrumError;

    fn try_from(response: AutoCalibrationResponse) -> Result<Self> {
        if !response.success {
            return Err(SpectrumError::ExternalService(
                response
                    .error
                    .unwrap_or_else(|| "auto-calibration failed".to_string()),
            ));
        }

        let nm_per_pixel = finite_field(response.nm_per_pixel, "nmPerPixel")?;
        let offset = finite_field(response.wavelength_offset, "wavelengthOffset")?;
        let confidence = finite_field(response.confidence, "confidence")?;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(SpectrumError::ExternalService(format!(
                "confidence {} outside [0, 1]",
                confidence
            )));
        }

        Ok(Self {
            model: CalibrationModel::new(nm_per_pixel, offset),
            confidence,
            tier: ConfidenceTier::classify(confidence),
            peaks: response.peaks.unwrap_or_default(),
        })
    }
}
