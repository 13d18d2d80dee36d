//! Raster input module
//!
//! Owned RGBA rasters, the read-only accessor the geometry extractor works
//! against, and decoding of captured frames into rasters.

mod reader;
mod image_reader;
mod source;
pub mod types;

pub use reader::RasterReader;
pub use image_reader::ImageRasterReader;
pub use source::RasterSource;
pub use types::Raster;
