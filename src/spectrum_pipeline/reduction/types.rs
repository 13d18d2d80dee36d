//! Reduced spectrum types

use serde::{Deserialize, Serialize};

use crate::spectrum_pipeline::common::error::{Result, SpectrumError};

/// Per-column channel curves of one extracted raster. Sample `i` of every
/// channel belongs to column `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    pub red: Vec<f64>,
    pub green: Vec<f64>,
    pub blue: Vec<f64>,
    /// Luminance-weighted aggregate of the three channels
    pub intensity: Vec<f64>,
    /// Columns were mirrored so that blue reads on the left
    #[serde(default)]
    pub flipped: bool,
}

impl Spectrum {
    pub fn new(red: Vec<f64>, green: Vec<f64>, blue: Vec<f64>, intensity: Vec<f64>) -> Result<Self> {
        let spectrum = Self { red, green, blue, intensity, flipped: false };
        spectrum.validate()?;
        Ok(spectrum)
    }

    pub fn validate(&self) -> Result<()> {
        let n = self.intensity.len();
        if self.red.len() != n || self.green.len() != n || self.blue.len() != n {
            return Err(SpectrumError::MalformedInput(format!(
                "channel lengths differ: red={}, green={}, blue={}, intensity={}",
                self.red.len(),
                self.green.len(),
                self.blue.len(),
                n
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.intensity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intensity.is_empty()
    }
}

/// Payload returned by the remote reduction service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReductionResponse {
    #[serde(default)]
    pub red: Vec<f64>,
    #[serde(default)]
    pub green: Vec<f64>,
    #[serde(default)]
    pub blue: Vec<f64>,
    #[serde(default)]
    pub intensity: Vec<f64>,
    #[serde(default)]
    pub flipped: bool,
    #[serde(default)]
    pub width: Option<usize>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TryFrom<ReductionResponse> for Spectrum {
    type Error = SpectrumError;

    fn try_from(response: ReductionResponse) -> Result<Self> {
        if let Some(message) = response.error {
            return Err(SpectrumError::ExternalService(message));
        }

        let spectrum = Spectrum {
            red: response.red,
            green: response.green,
            blue: response.blue,
            intensity: response.intensity,
            flipped: response.flipped,
        };
        spectrum
            .validate()
            .map_err(|e| SpectrumError::ExternalService(format!("malformed reduction payload: {}", e)))?;

        if let Some(width) = response.width {
            if width != spectrum.len() {
                return Err(SpectrumError::ExternalService(format!(
                    "reduction reported width {} but returned {} samples",
                    width,
                    spectrum.len()
                )));
            }
        }

        Ok(spectrum)
    }
}
