use crate::spectrum_pipeline::calibration::model::CalibrationModel;
use crate::spectrum_pipeline::common::error::{Result, SpectrumError};
use crate::spectrum_pipeline::peaks::{PeakDetector, PeakSet};
use crate::spectrum_pipeline::reduction::Spectrum;

/// A spectrum with one wavelength label per sample and, once detected, its
/// peaks. Channel data never changes after construction; recalibration only
/// rewrites labels.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibratedSpectrum {
    spectrum: Spectrum,
    wavelengths: Vec<f64>,
    peaks: Option<PeakSet>,
}

impl CalibratedSpectrum {
    pub fn new(spectrum: Spectrum, model: &CalibrationModel) -> Result<Self> {
        spectrum.validate()?;
        let wavelengths = model.wavelengths(spectrum.len());
        Ok(Self { spectrum, wavelengths, peaks: None })
    }

    /// Spectrum whose labels are already known, e.g. read back from CSV.
    pub fn with_wavelengths(spectrum: Spectrum, wavelengths: Vec<f64>) -> Result<Self> {
        spectrum.validate()?;
        if wavelengths.len() != spectrum.len() {
            return Err(SpectrumError::MalformedInput(format!(
                "{} wavelengths for {} samples",
                wavelengths.len(),
                spectrum.len()
            )));
        }
        Ok(Self { spectrum, wavelengths, peaks: None })
    }

    pub fn spectrum(&self) -> &Spectrum {
        &self.spectrum
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn peaks(&self) -> Option<&PeakSet> {
        self.peaks.as_ref()
    }

    pub fn len(&self) -> usize {
        self.spectrum.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spectrum.is_empty()
    }

    /// Relabels samples (and any detected peaks) with `model`.
    pub fn recalibrate(&mut self, model: &CalibrationModel) {
        self.wavelengths = model.wavelengths(self.spectrum.len());
        if let Some(peaks) = self.peaks.as_mut() {
            peaks.relabel(&self.wavelengths);
        }
    }

    /// Runs `detector` and keeps the result.
    pub fn detect_peaks(&mut self, detector: &PeakDetector) -> &PeakSet {
        let peaks = detector.scan(&self.spectrum, &self.wavelengths);
        self.peaks.insert(peaks)
    }

    /// Carried peaks, or a fresh detection when none were kept.
    pub fn peaks_or_detect(&self, detector: &PeakDetector) -> PeakSet {
        match &self.peaks {
            Some(peaks) => peaks.clone(),
            None => detector.scan(&self.spectrum, &self.wavelengths),
        }
    }
}
