//! Geometry value types

use crate::spectrum_pipeline::common::error::{Result, SpectrumError};
use crate::spectrum_pipeline::raster::Raster;

/// User-drawn rectangle in display coordinates, relative to the wrapper
/// element that contains the source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRegion {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self> {
        let sized = width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0;
        if !sized || !x.is_finite() || !y.is_finite() {
            return Err(SpectrumError::InvalidCrop { width, height });
        }
        Ok(Self { x, y, width, height })
    }
}

/// How the source element is rendered: its on-screen size and its offset
/// inside the wrapper (centering, letterboxing).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayGeometry {
    pub width: f64,
    pub height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl DisplayGeometry {
    pub fn new(width: f64, height: f64, offset_x: f64, offset_y: f64) -> Result<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(SpectrumError::InvalidGeometry(format!(
                "displayed size must be positive, got {}x{}",
                width, height
            )));
        }
        if !(offset_x.is_finite() && offset_y.is_finite()) {
            return Err(SpectrumError::InvalidGeometry(format!(
                "source offset must be finite, got ({}, {})",
                offset_x, offset_y
            )));
        }
        Ok(Self { width, height, offset_x, offset_y })
    }

    /// Source shown at 1:1 in the top-left corner of the wrapper.
    pub fn native(width: usize, height: usize) -> Self {
        Self {
            width: width as f64,
            height: height as f64,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

/// Everything the extractor needs for one call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionRequest {
    pub region: CropRegion,
    /// Rotation applied to the source before cropping, in degrees.
    pub rotation_degrees: f64,
    pub display: DisplayGeometry,
}

impl ExtractionRequest {
    pub fn new(region: CropRegion, rotation_degrees: f64, display: DisplayGeometry) -> Self {
        Self { region, rotation_degrees, display }
    }

    /// Crop rectangle expressed in pixels of a working canvas of the given size.
    ///
    /// The displayed element shows the whole rotated canvas, so display
    /// coordinates scale independently on each axis.
    pub fn canvas_rect(&self, canvas_width: usize, canvas_height: usize) -> CanvasRect {
        let scale_x = canvas_width as f64 / self.display.width;
        let scale_y = canvas_height as f64 / self.display.height;
        CanvasRect {
            x: (self.region.x - self.display.offset_x) * scale_x,
            y: (self.region.y - self.display.offset_y) * scale_y,
            width: self.region.width * scale_x,
            height: self.region.height * scale_y,
        }
    }
}

/// Rectangle on the rotated working canvas, in fractional pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CanvasRect {
    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }

    /// Whole-pixel output size, never smaller than 1x1.
    pub fn output_size(&self) -> (usize, usize) {
        (
            self.width.round().max(1.0) as usize,
            self.height.round().max(1.0) as usize,
        )
    }
}

/// Result of one extraction, always landscape.
#[derive(Debug, Clone)]
pub struct ExtractedRaster {
    pub raster: Raster,
    /// An extra quarter turn was applied because the selection was portrait.
    pub auto_rotated: bool,
    /// Part of the selection fell outside the canvas and was blank-filled.
    pub clipped: bool,
    pub canvas_rect: CanvasRect,
}
