use tracing::{debug, instrument, warn};

use crate::spectrum_pipeline::common::error::{Result, SpectrumError};
use crate::spectrum_pipeline::raster::RasterSource;
use crate::spectrum_pipeline::raster::types::CHANNELS;
use crate::spectrum_pipeline::geometry::transform::{
    normalize_degrees, rotate_onto_canvas, rotate_quarter_clockwise, rotated_canvas_size, sample_rect,
};
use crate::spectrum_pipeline::geometry::types::{ExtractedRaster, ExtractionRequest};

pub struct GeometryExtractor {
    max_dimension: Option<usize>,
}

impl Default for GeometryExtractor {
    fn default() -> Self {
        Self { max_dimension: None }
    }
}

impl GeometryExtractor {
    pub fn new(max_dimension: Option<usize>) -> Self {
        Self { max_dimension }
    }

    fn validate_dimensions(&self, width: usize, height: usize) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(SpectrumError::InvalidDimensions(width, height));
        }

        // the RGBA buffer must be addressable even without a configured cap
        let addressable = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(CHANNELS))
            .is_some_and(|bytes| bytes <= isize::MAX as usize);
        if !addressable {
            warn!("Raster dimensions {}x{} overflow the pixel buffer", width, height);
            return Err(SpectrumError::InvalidDimensions(width, height));
        }

        if let Some(max) = self.max_dimension {
            if width > max || height > max {
                warn!("Raster dimensions {}x{} exceed maximum {}", width, height, max);
                return Err(SpectrumError::InvalidDimensions(width, height));
            }
        }

        Ok(())
    }

    /// Extracts the selection described by `request` from `source`.
    ///
    /// Selections reaching past the rotated canvas are blank-filled rather
    /// than rejected.
    #[instrument(skip(self, source, request), fields(rotation = request.rotation_degrees))]
    pub fn extract<S: RasterSource + ?Sized>(
        &self,
        source: &S,
        request: &ExtractionRequest,
    ) -> Result<ExtractedRaster> {
        self.validate_dimensions(source.width(), source.height())?;
        if !request.rotation_degrees.is_finite() {
            return Err(SpectrumError::InvalidGeometry(format!(
                "rotation must be finite, got {}",
                request.rotation_degrees
            )));
        }

        let degrees = normalize_degrees(request.rotation_degrees);
        let (canvas_w, canvas_h) = if degrees == 0.0 {
            (source.width(), source.height())
        } else {
            rotated_canvas_size(source.width(), source.height(), degrees)
        };
        self.validate_dimensions(canvas_w, canvas_h)?;

        let rect = request.canvas_rect(canvas_w, canvas_h);
        let (out_w, out_h) = rect.output_size();
        self.validate_dimensions(out_w, out_h)?;
        debug!(
            "Crop on {}x{} canvas: ({:.1}, {:.1}) {:.1}x{:.1}",
            canvas_w, canvas_h, rect.x, rect.y, rect.width, rect.height
        );

        let (cropped, clipped) = if degrees == 0.0 {
            sample_rect(source, &rect)
        } else {
            let _span = tracing::info_span!("rotate_canvas", degrees).entered();
            let canvas = rotate_onto_canvas(source, degrees);
            sample_rect(&canvas, &rect)
        };

        if clipped {
            warn!("Crop extends beyond the source; uncovered pixels are blank");
        }

        let auto_rotated = rect.is_portrait();
        let raster = if auto_rotated {
            debug!("Portrait selection, turning to landscape");
            rotate_quarter_clockwise(&cropped)
        } else {
            cropped
        };

        Ok(ExtractedRaster {
            raster,
            auto_rotated,
            clipped,
            canvas_rect: rect,
        })
    }
}
