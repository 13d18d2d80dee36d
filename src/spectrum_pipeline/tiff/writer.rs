use std::io::Write;
use crate::spectrum_pipeline::common::error::Result;
use crate::spectrum_pipeline::config::TiffCompression;
use crate::spectrum_pipeline::raster::Raster;

pub trait RasterWriter {
    fn write_raster(&self, raster: &Raster, output: &mut dyn Write, compression: TiffCompression) -> Result<()>;
}
