//! Spectrum extraction pipeline module
//!
//! Turns a user-selected region of a captured frame into a wavelength-labelled
//! spectrum: geometric extraction, reduction to per-column channel curves,
//! pixel-to-wavelength calibration, peak detection, comparison and export.

pub mod common;
pub mod raster;
pub mod geometry;
pub mod reduction;
pub mod calibration;
pub mod peaks;
pub mod compare;
pub mod csv;
pub mod tiff;
pub mod live;
pub mod config;
pub mod pipeline;

pub use common::{
    SpectrumError,
    Result,
};

pub use raster::{
    Raster,
    RasterSource,
    RasterReader,
    ImageRasterReader,
};

pub use geometry::{
    CropRegion,
    DisplayGeometry,
    ExtractionRequest,
    ExtractedRaster,
    GeometryExtractor,
};

pub use reduction::{
    Spectrum,
    SpectrumReducer,
    ColumnSumReducer,
    ReductionResponse,
};

pub use calibration::{
    CalibrationModel,
    CalibrationPoint,
    AutoCalibrator,
    AutoCalibration,
    AutoCalibrationRequest,
    AutoCalibrationResponse,
    ConfidenceTier,
    CalibratedSpectrum,
};

pub use peaks::{
    Channel,
    Peak,
    PeakSet,
    PeakDetector,
};

pub use compare::{PeakDelta, compare_spectra};

pub use self::tiff::{RasterWriter, TiffRasterWriter};
pub use live::{LiveSession, RequestTicket, CancelHandle};
pub use config::{PipelineConfig, PipelineConfigBuilder, TiffCompression};
pub use pipeline::SpectrumPipeline;
