//! Local column-sum reducer.
//!
//! Each output sample is the sum of one raster column, per channel, scaled so
//! the strongest column of that channel reads 1.0. Intensity is the sum of
//! BT.601 luminance (`0.299 R + 0.587 G + 0.114 B`), matching a grayscale
//! conversion of the crop. Alpha is ignored; blank-filled pixels are black.

use tracing::debug;

use crate::spectrum_pipeline::common::error::{Result, SpectrumError};
use crate::spectrum_pipeline::raster::Raster;
use crate::spectrum_pipeline::reduction::reducer::SpectrumReducer;
use crate::spectrum_pipeline::reduction::types::Spectrum;

const LUMA_RED: f64 = 0.299;
const LUMA_GREEN: f64 = 0.587;
const LUMA_BLUE: f64 = 0.114;

/// Guards the centre-of-mass division on dark crops.
const MASS_EPSILON: f64 = 1e-5;

pub struct ColumnSumReducer {
    /// Mirror the spectrum when red sits left of blue, so wavelength always
    /// increases left to right.
    pub auto_flip: bool,
}

impl Default for ColumnSumReducer {
    fn default() -> Self {
        Self { auto_flip: true }
    }
}

impl ColumnSumReducer {
    pub fn new(auto_flip: bool) -> Self {
        Self { auto_flip }
    }
}

fn centre_of_mass(curve: &[f64]) -> f64 {
    let (weighted, total) = curve
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(w, t), (i, &v)| (w + i as f64 * v, t + v));
    weighted / (total + MASS_EPSILON)
}

fn normalize(curve: &mut [f64]) {
    let max = curve.iter().copied().fold(0.0, f64::max);
    if max > 0.0 {
        curve.iter_mut().for_each(|v| *v /= max);
    }
}

impl SpectrumReducer for ColumnSumReducer {
    fn reduce(&self, raster: &Raster) -> Result<Spectrum> {
        if raster.width == 0 || raster.height == 0 {
            return Err(SpectrumError::InvalidDimensions(raster.width, raster.height));
        }

        let mut red = vec![0.0; raster.width];
        let mut green = vec![0.0; raster.width];
        let mut blue = vec![0.0; raster.width];
        let mut intensity = vec![0.0; raster.width];

        for y in 0..raster.height {
            for x in 0..raster.width {
                let [r, g, b, _] = raster.pixel(x, y);
                let (r, g, b) = (r as f64, g as f64, b as f64);
                red[x] += r;
                green[x] += g;
                blue[x] += b;
                intensity[x] += LUMA_RED * r + LUMA_GREEN * g + LUMA_BLUE * b;
            }
        }

        let flipped = self.auto_flip && centre_of_mass(&red) < centre_of_mass(&blue);
        if flipped {
            debug!("Red lies left of blue, mirroring columns");
            for curve in [&mut red, &mut green, &mut blue, &mut intensity] {
                curve.reverse();
            }
        }

        for curve in [&mut red, &mut green, &mut blue, &mut intensity] {
            normalize(curve);
        }

        Ok(Spectrum { red, green, blue, intensity, flipped })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Blue on the left, red on the right: the conventional orientation.
    fn rainbow() -> Raster {
        Raster::from_fn(3, 2, |x, _| match x {
            0 => [0, 0, 200, 255],
            1 => [0, 100, 0, 255],
            _ => [50, 0, 0, 255],
        })
    }

    #[test]
    fn test_one_sample_per_column() {
        let spectrum = ColumnSumReducer::default().reduce(&rainbow()).unwrap();
        assert_eq!(spectrum.len(), 3);
        assert!(!spectrum.flipped);
        assert_eq!(spectrum.blue, vec![1.0, 0.0, 0.0]);
        assert_eq!(spectrum.green, vec![0.0, 1.0, 0.0]);
        assert_eq!(spectrum.red, vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_intensity_uses_luminance_weights() {
        let spectrum = ColumnSumReducer::default().reduce(&rainbow()).unwrap();
        // column luma sums: 2*22.8, 2*58.7, 2*14.95
        let expected = [22.8 / 58.7, 1.0, 14.95 / 58.7];
        for (got, want) in spectrum.intensity.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "{} vs {}", got, want);
        }
    }

    #[test]
    fn test_reversed_spectrum_is_flipped() {
        let mirrored = Raster::from_fn(3, 1, |x, _| rainbow().pixel(2 - x, 0));
        let spectrum = ColumnSumReducer::default().reduce(&mirrored).unwrap();

        assert!(spectrum.flipped);
        assert_eq!(spectrum.blue, vec![1.0, 0.0, 0.0]);

        let untouched = ColumnSumReducer::new(false).reduce(&mirrored).unwrap();
        assert!(!untouched.flipped);
        assert_eq!(untouched.blue, vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_black_raster_stays_zero() {
        let spectrum = ColumnSumReducer::default().reduce(&Raster::blank(4, 3)).unwrap();
        assert!(spectrum.intensity.iter().all(|&v| v == 0.0));
        assert!(!spectrum.flipped);
    }
}
