//! Raster data types

use crate::spectrum_pipeline::common::error::{Result, SpectrumError};

/// Bytes per interleaved RGBA pixel.
pub const CHANNELS: usize = 4;

/// A decoded frame or an extraction result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    /// Width of the raster in pixels
    pub width: usize,
    /// Height of the raster in pixels
    pub height: usize,
    /// Pixel data interleaved [R, G, B, A, R, G, B, A, ...]
    pub data: Vec<u8>,
}

impl Raster {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(CHANNELS))
            .ok_or(SpectrumError::InvalidDimensions(width, height))?;
        if data.len() != expected {
            return Err(SpectrumError::MalformedInput(format!(
                "raster {}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }
        Ok(Self { width, height, data })
    }

    /// Transparent black raster.
    pub fn blank(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * CHANNELS],
        }
    }

    /// Builds a raster by evaluating `f` at every pixel, row by row.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(width * height * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self { width, height, data }
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * CHANNELS;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    pub fn is_landscape(&self) -> bool {
        self.width >= self.height
    }
}
