//! Pure raster transforms used by the extractor.
//!
//! All sampling is nearest-neighbour at pixel centres, so quarter turns and
//! unscaled crops reproduce source pixels exactly.

use crate::spectrum_pipeline::raster::{Raster, RasterSource};
use crate::spectrum_pipeline::geometry::types::CanvasRect;

const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Angle folded into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    degrees.rem_euclid(360.0)
}

/// Axis-aligned bounding box of a `width`x`height` raster rotated by `degrees`.
pub fn rotated_canvas_size(width: usize, height: usize, degrees: f64) -> (usize, usize) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    let (w, h) = (width as f64, height as f64);
    (
        (w * cos + h * sin).round() as usize,
        (w * sin + h * cos).round() as usize,
    )
}

fn sample_nearest<S: RasterSource + ?Sized>(source: &S, sx: f64, sy: f64) -> Option<[u8; 4]> {
    if !(sx >= 0.0 && sy >= 0.0) {
        return None;
    }
    let (x, y) = (sx.floor() as usize, sy.floor() as usize);
    if x >= source.width() || y >= source.height() {
        return None;
    }
    Some(source.pixel(x, y))
}

/// Draws `source` rotated clockwise by `degrees` about its centre onto a
/// canvas just large enough to hold it. Uncovered corners stay transparent.
pub fn rotate_onto_canvas<S: RasterSource + ?Sized>(source: &S, degrees: f64) -> Raster {
    let (canvas_w, canvas_h) = rotated_canvas_size(source.width(), source.height(), degrees);
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (half_sw, half_sh) = (source.width() as f64 / 2.0, source.height() as f64 / 2.0);
    let (half_cw, half_ch) = (canvas_w as f64 / 2.0, canvas_h as f64 / 2.0);

    Raster::from_fn(canvas_w, canvas_h, |x, y| {
        let dx = x as f64 + 0.5 - half_cw;
        let dy = y as f64 + 0.5 - half_ch;
        // inverse rotation, y axis pointing down
        let sx = cos * dx + sin * dy + half_sw;
        let sy = -sin * dx + cos * dy + half_sh;
        sample_nearest(source, sx, sy).unwrap_or(TRANSPARENT)
    })
}

/// Copies `rect` out of `canvas`. The second value reports whether any
/// sample fell outside the canvas (those pixels are transparent).
pub fn sample_rect<S: RasterSource + ?Sized>(canvas: &S, rect: &CanvasRect) -> (Raster, bool) {
    let (out_w, out_h) = rect.output_size();
    let step_x = rect.width / out_w as f64;
    let step_y = rect.height / out_h as f64;
    let mut clipped = false;

    let raster = Raster::from_fn(out_w, out_h, |x, y| {
        let sx = rect.x + (x as f64 + 0.5) * step_x;
        let sy = rect.y + (y as f64 + 0.5) * step_y;
        sample_nearest(canvas, sx, sy).unwrap_or_else(|| {
            clipped = true;
            TRANSPARENT
        })
    });

    (raster, clipped)
}

/// Quarter turn clockwise; width and height swap.
pub fn rotate_quarter_clockwise(raster: &Raster) -> Raster {
    let src_h = raster.height;
    Raster::from_fn(raster.height, raster.width, |x, y| raster.pixel(y, src_h - 1 - x))
}
