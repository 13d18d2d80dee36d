use image::RgbaImage;

use crate::spectrum_pipeline::raster::types::Raster;

/// Read-only access to a captured frame in its native pixel space.
pub trait RasterSource {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// RGBA value at `(x, y)`; callers guarantee the coordinate is in bounds.
    fn pixel(&self, x: usize, y: usize) -> [u8; 4];
}

impl RasterSource for Raster {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        Raster::pixel(self, x, y)
    }
}

impl RasterSource for RgbaImage {
    fn width(&self) -> usize {
        self.dimensions().0 as usize
    }

    fn height(&self) -> usize {
        self.dimensions().1 as usize
    }

    fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        self.get_pixel(x as u32, y as u32).0
    }
}
