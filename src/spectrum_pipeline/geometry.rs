//! Geometry extraction module
//!
//! Maps a crop rectangle drawn over the displayed (CSS-scaled, rotated) source
//! onto the source's native pixels and returns the selection as a landscape
//! raster ready for reduction.

mod extractor;
mod transform;
pub mod types;


pub use extractor::GeometryExtractor;
pub use transform::{normalize_degrees, rotate_onto_canvas, rotate_quarter_clockwise, rotated_canvas_size, sample_rect};
pub use types::{CanvasRect, CropRegion, DisplayGeometry, ExtractedRaster, ExtractionRequest};
