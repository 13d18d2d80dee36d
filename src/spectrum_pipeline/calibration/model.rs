use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::spectrum_pipeline::common::error::{Result, SpectrumError};
use crate::spectrum_pipeline::peaks::strongest_sample;

/// Wavelength of pixel 0 before any offset is applied.
pub const BASE_WAVELENGTH_NM: f64 = 380.0;
/// Red end of the assumed visible range.
pub const VISIBLE_LIMIT_NM: f64 = 750.0;
pub const VISIBLE_SPAN_NM: f64 = VISIBLE_LIMIT_NM - BASE_WAVELENGTH_NM;
/// Sample count the uncalibrated default spreads the visible range over.
pub const DEFAULT_SAMPLE_COUNT: usize = 1000;

/// `wavelength(i) = i * nm_per_pixel + offset + 380`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationModel {
    pub nm_per_pixel: f64,
    pub offset: f64,
}

impl Default for CalibrationModel {
    fn default() -> Self {
        Self {
            nm_per_pixel: VISIBLE_SPAN_NM / DEFAULT_SAMPLE_COUNT as f64,
            offset: 0.0,
        }
    }
}

/// A pixel position with a known wavelength.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    pub pixel: f64,
    pub nm: f64,
}

impl CalibrationModel {
    pub fn new(nm_per_pixel: f64, offset: f64) -> Self {
        Self { nm_per_pixel, offset }
    }

    pub fn wavelength_at(&self, index: usize) -> f64 {
        index as f64 * self.nm_per_pixel + self.offset + BASE_WAVELENGTH_NM
    }

    /// Labels for samples `0..sample_count`.
    pub fn wavelengths(&self, sample_count: usize) -> Vec<f64> {
        (0..sample_count).map(|i| self.wavelength_at(i)).collect()
    }

    /// Visible range spread evenly from the first to the last sample.
    pub fn visible_span(sample_count: usize) -> Self {
        let nm_per_pixel = if sample_count > 1 {
            VISIBLE_SPAN_NM / (sample_count - 1) as f64
        } else {
            0.0
        };
        Self { nm_per_pixel, offset: 0.0 }
    }

    /// One-point calibration: the visible range is assumed to span the whole
    /// spectrum and the sample at `peak_index` is pinned to `known_nm`.
    pub fn from_reference_peak(known_nm: f64, peak_index: usize, sample_count: usize) -> Result<Self> {
        if !known_nm.is_finite() {
            return Err(SpectrumError::MalformedInput(format!(
                "reference wavelength must be a finite number, got {}",
                known_nm
            )));
        }
        if sample_count == 0 {
            return Err(SpectrumError::MalformedInput(
                "cannot calibrate an empty spectrum".to_string(),
            ));
        }
        if peak_index >= sample_count {
            return Err(SpectrumError::MalformedInput(format!(
                "peak index {} outside spectrum of {} samples",
                peak_index, sample_count
            )));
        }

        let nm_per_pixel = VISIBLE_SPAN_NM / sample_count as f64;
        let offset = known_nm - BASE_WAVELENGTH_NM - peak_index as f64 * nm_per_pixel;
        debug!(nm_per_pixel, offset, peak_index, "One-point calibration");
        Ok(Self { nm_per_pixel, offset })
    }

    /// One-point calibration against the strongest intensity sample (first
    /// occurrence on ties). Returns the model and the pinned index.
    pub fn from_intensity_peak(known_nm: f64, intensity: &[f64]) -> Result<(Self, usize)> {
        if !known_nm.is_finite() {
            return Err(SpectrumError::MalformedInput(format!(
                "reference wavelength must be a finite number, got {}",
                known_nm
            )));
        }
        let (peak_index, _) = strongest_sample(intensity).ok_or_else(|| {
            SpectrumError::MalformedInput("spectrum has no usable intensity samples".to_string())
        })?;
        let model = Self::from_reference_peak(known_nm, peak_index, intensity.len())?;
        Ok((model, peak_index))
    }

    /// Least-squares line through `points`. With fewer than two points the
    /// visible span over `sample_count` samples is returned instead.
    pub fn from_points(points: &[CalibrationPoint], sample_count: usize) -> Result<Self> {
        if points.len() < 2 {
            debug!("Fewer than two calibration points, using visible span");
            return Ok(Self::visible_span(sample_count));
        }
        if points.iter().any(|p| !p.pixel.is_finite() || !p.nm.is_finite()) {
            return Err(SpectrumError::MalformedInput(
                "calibration points must be finite".to_string(),
            ));
        }

        let n = points.len() as f64;
        let mean_x = points.iter().map(|p| p.pixel).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.nm).sum::<f64>() / n;
        let (sxy, sxx) = points.iter().fold((0.0, 0.0), |(sxy, sxx), p| {
            let dx = p.pixel - mean_x;
            (sxy + dx * (p.nm - mean_y), sxx + dx * dx)
        });
        if sxx == 0.0 {
            return Err(SpectrumError::MalformedInput(
                "calibration points must cover at least two distinct pixels".to_string(),
            ));
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        Ok(Self {
            nm_per_pixel: slope,
            offset: intercept - BASE_WAVELENGTH_NM,
        })
    }
}
