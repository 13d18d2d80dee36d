//! Spectrum reduction module
//!
//! Collapses an extracted raster into one sample per column. The production
//! reducer is a remote service; `ColumnSumReducer` reproduces its behaviour
//! locally.

mod reducer;
mod column_sum;
pub mod types;

pub use reducer::SpectrumReducer;
pub use column_sum::ColumnSumReducer;
pub use types::{ReductionResponse, Spectrum};
