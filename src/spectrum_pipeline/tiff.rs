//! TIFF writing module
//!
//! Saves extracted rasters, i.e. exactly what was handed to reduction, for
//! inspection.

mod writer;
mod standard_tiff_writer;

pub use writer::RasterWriter;
pub use standard_tiff_writer::TiffRasterWriter;
