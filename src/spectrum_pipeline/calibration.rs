//! Wavelength calibration module
//!
//! Linear pixel-index to wavelength models, built manually from a known
//! reference line, fitted from several known points, or supplied by the
//! remote white-light fitting service.

mod model;
mod auto;
mod calibrated;

#[cfg(test)]
mod tests;

pub use model::{
    BASE_WAVELENGTH_NM, CalibrationModel, CalibrationPoint, DEFAULT_SAMPLE_COUNT, VISIBLE_LIMIT_NM,
    VISIBLE_SPAN_NM,
};
pub use auto::{
    AutoCalibration, AutoCalibrationRequest, AutoCalibrationResponse, AutoCalibrator, ConfidenceTier,
    ReferencePeak, ReferencePeaks,
};
pub use calibrated::CalibratedSpectrum;
