use crate::spectrum_pipeline::common::error::Result;
use crate::spectrum_pipeline::raster::Raster;
use crate::spectrum_pipeline::reduction::types::Spectrum;

/// Turns an extracted raster into parallel channel curves of equal length.
pub trait SpectrumReducer {
    fn reduce(&self, raster: &Raster) -> Result<Spectrum>;
}
