//! Pipeline configuration types

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::spectrum_pipeline::common::error::{Result, SpectrumError};
use crate::spectrum_pipeline::peaks::DEFAULT_NOISE_THRESHOLD;

/// TIFF compression methods for extracted-raster snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    None,
    /// LZW compression
    Lzw,
    /// Deflate compression - fast level
    DeflateFast,
    /// Deflate compression - balanced
    DeflateBalanced,
    /// Deflate compression - best compression (slower)
    DeflateBest,
}

/// Configuration for the spectrum pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum normalised intensity a peak must exceed
    pub noise_threshold: f64,
    /// Detect peaks on every processed frame
    pub auto_detect_peaks: bool,
    /// Let the local reducer mirror spectra that read red-to-blue
    pub auto_flip: bool,
    /// Whether to validate raster dimensions before extraction
    pub validate_dimensions: bool,
    /// Largest width or height any intermediate raster may have
    pub max_dimension: Option<usize>,
    /// Delay between live-mode iterations
    pub live_interval_ms: u64,
    /// Compression for TIFF snapshots
    pub tiff_compression: TiffCompression,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            noise_threshold: DEFAULT_NOISE_THRESHOLD,
            auto_detect_peaks: true,
            auto_flip: true,
            validate_dimensions: true,
            max_dimension: Some(16384),
            live_interval_ms: 500,
            tiff_compression: TiffCompression::None,
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    pub fn live_interval(&self) -> Duration {
        Duration::from_millis(self.live_interval_ms)
    }

    /// Dimension cap the extractor should enforce.
    pub fn effective_max_dimension(&self) -> Option<usize> {
        if self.validate_dimensions { self.max_dimension } else { None }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SpectrumError::InputReadError(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| SpectrumError::MalformedInput(format!("{}: {}", path.display(), e)))
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SpectrumError::EncodeError(e.to_string()))?;
        std::fs::write(path, json)
            .map_err(|e| SpectrumError::OutputWriteError(format!("{}: {}", path.display(), e)))
    }
}

/// Builder for PipelineConfig
#[derive(Default)]
pub struct PipelineConfigBuilder {
    noise_threshold: Option<f64>,
    auto_detect_peaks: Option<bool>,
    auto_flip: Option<bool>,
    validate_dimensions: Option<bool>,
    max_dimension: Option<Option<usize>>,
    live_interval_ms: Option<u64>,
    tiff_compression: Option<TiffCompression>,
}

impl PipelineConfigBuilder {
    pub fn noise_threshold(mut self, threshold: f64) -> Self {
        self.noise_threshold = Some(threshold);
        self
    }

    pub fn auto_detect_peaks(mut self, enable: bool) -> Self {
        self.auto_detect_peaks = Some(enable);
        self
    }

    pub fn auto_flip(mut self, enable: bool) -> Self {
        self.auto_flip = Some(enable);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn max_dimension(mut self, max: Option<usize>) -> Self {
        self.max_dimension = Some(max);
        self
    }

    pub fn live_interval_ms(mut self, millis: u64) -> Self {
        self.live_interval_ms = Some(millis);
        self
    }

    pub fn tiff_compression(mut self, compression: TiffCompression) -> Self {
        self.tiff_compression = Some(compression);
        self
    }

    pub fn build(self) -> PipelineConfig {
        let default = PipelineConfig::default();
        PipelineConfig {
            noise_threshold: self.noise_threshold.unwrap_or(default.noise_threshold),
            auto_detect_peaks: self.auto_detect_peaks.unwrap_or(default.auto_detect_peaks),
            auto_flip: self.auto_flip.unwrap_or(default.auto_flip),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            max_dimension: self.max_dimension.unwrap_or(default.max_dimension),
            live_interval_ms: self.live_interval_ms.unwrap_or(default.live_interval_ms),
            tiff_compression: self.tiff_compression.unwrap_or(default.tiff_compression),
        }
    }
}
