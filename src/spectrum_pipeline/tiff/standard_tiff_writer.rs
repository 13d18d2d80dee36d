use std::io::Write;
use tracing::debug;
use crate::spectrum_pipeline::common::error::{Result, SpectrumError};
use crate::spectrum_pipeline::config::TiffCompression;
use crate::spectrum_pipeline::raster::Raster;
use crate::spectrum_pipeline::tiff::writer::RasterWriter;

/// RGBA8 TIFF encoder.
pub struct TiffRasterWriter;

impl TiffRasterWriter {
    fn encoder_compression(compression: TiffCompression) -> tiff::encoder::Compression {
        use tiff::encoder::compression::DeflateLevel;
        match compression {
            TiffCompression::None => tiff::encoder::Compression::Uncompressed,
            TiffCompression::Lzw => tiff::encoder::Compression::Lzw,
            TiffCompression::DeflateFast => tiff::encoder::Compression::Deflate(DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => tiff::encoder::Compression::Deflate(DeflateLevel::Balanced),
            TiffCompression::DeflateBest => tiff::encoder::Compression::Deflate(DeflateLevel::Best),
        }
    }
}

impl RasterWriter for TiffRasterWriter {
    fn write_raster(&self, raster: &Raster, output: &mut dyn Write, compression: TiffCompression) -> Result<()> {
        if raster.width == 0 || raster.height == 0 {
            return Err(SpectrumError::InvalidDimensions(raster.width, raster.height));
        }
        debug!("Encoding TIFF raster: {}x{} ({:?})", raster.width, raster.height, compression);

        // the encoder needs Seek, so encode in memory first
        let mut buffer = Vec::new();

        let mut encoder = tiff::encoder::TiffEncoder::new(std::io::Cursor::new(&mut buffer))
            .map_err(|e| SpectrumError::EncodeError(e.to_string()))?
            .with_compression(Self::encoder_compression(compression));

        encoder.write_image::<tiff::encoder::colortype::RGBA8>(
            raster.width as u32,
            raster.height as u32,
            &raster.data,
        ).map_err(|e| SpectrumError::EncodeError(e.to_string()))?;

        output.write_all(&buffer)?;

        debug!("TIFF encoding complete, {} bytes", buffer.len());
        Ok(())
    }
}
