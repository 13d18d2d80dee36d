//! Frame decoder backed by the `image` crate.
//!
//! Uploaded photographs and saved camera frames arrive as encoded bytes
//! (JPEG, PNG, TIFF, ...). They are decoded once and expanded to RGBA so the
//! geometry extractor can treat every source the same way.

use tracing::debug;

use crate::spectrum_pipeline::common::error::{Result, SpectrumError};
use crate::spectrum_pipeline::raster::reader::RasterReader;
use crate::spectrum_pipeline::raster::types::Raster;

/// Decodes any format the `image` crate recognises from its magic bytes.
pub struct ImageRasterReader;

impl RasterReader for ImageRasterReader {
    fn read_raster(&self, data: &[u8]) -> Result<Raster> {
        debug!("Decoding frame, {} bytes", data.len());

        let decoded = image::load_from_memory(data)
            .map_err(|e| SpectrumError::DecodeError(e.to_string()))?;
        let rgba = decoded.to_rgba8();

        debug!("Decoded frame: {}x{}", rgba.width(), rgba.height());

        if rgba.width() == 0 || rgba.height() == 0 {
            return Err(SpectrumError::InvalidDimensions(
                rgba.width() as usize,
                rgba.height() as usize,
            ));
        }

        let (width, height) = rgba.dimensions();
        Raster::new(width as usize, height as usize, rgba.into_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode_png(image: RgbaImage) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image)
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_decodes_png_into_rgba() {
        let mut image = RgbaImage::new(4, 2);
        image.put_pixel(3, 1, Rgba([10, 20, 30, 255]));
        let raster = ImageRasterReader.read_raster(&encode_png(image)).unwrap();

        assert_eq!((raster.width, raster.height), (4, 2));
        assert_eq!(raster.pixel(3, 1), [10, 20, 30, 255]);
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = ImageRasterReader.read_raster(b"not an image").unwrap_err();
        assert!(matches!(err, SpectrumError::DecodeError(_)));
    }
}
