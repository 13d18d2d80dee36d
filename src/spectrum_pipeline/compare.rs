//! Spectrum comparison metrics.

use serde::Serialize;

use crate::spectrum_pipeline::calibration::CalibratedSpectrum;
use crate::spectrum_pipeline::peaks::{Channel, PeakDetector, PeakSet};

/// Peak shift of one colour channel between two spectra.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeakDelta {
    pub channel: Channel,
    pub wavelength_a: f64,
    pub wavelength_b: f64,
    /// `|a - b|` in nm, rounded to two decimals
    pub delta: f64,
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Deltas for red, green and blue. A channel missing a peak on either side
/// is left out.
pub fn peak_deltas(a: &PeakSet, b: &PeakSet) -> Vec<PeakDelta> {
    Channel::COLORS
        .into_iter()
        .filter_map(|channel| {
            let (pa, pb) = (a.get(channel)?, b.get(channel)?);
            Some(PeakDelta {
                channel,
                wavelength_a: pa.wavelength,
                wavelength_b: pb.wavelength,
                delta: round_hundredths((pa.wavelength - pb.wavelength).abs()),
            })
        })
        .collect()
}

/// Compares carried peaks, detecting with `detector` where a spectrum has none.
pub fn compare_spectra(a: &CalibratedSpectrum, b: &CalibratedSpectrum, detector: &PeakDetector) -> Vec<PeakDelta> {
    peak_deltas(&a.peaks_or_detect(detector), &b.peaks_or_detect(detector))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum_pipeline::peaks::Peak;
    use crate::spectrum_pipeline::reduction::Spectrum;

    fn green_line(at_nm: f64) -> CalibratedSpectrum {
        let spectrum = Spectrum::new(
            vec![0.0, 0.0, 0.0],
            vec![0.2, 0.95, 0.1],
            vec![0.0, 0.0, 0.0],
            vec![0.2, 0.95, 0.1],
        )
        .unwrap();
        CalibratedSpectrum::with_wavelengths(spectrum, vec![at_nm - 20.0, at_nm, at_nm + 20.0]).unwrap()
    }

    #[test]
    fn test_green_shift() {
        let deltas = compare_spectra(&green_line(520.0), &green_line(524.0), &PeakDetector::default());

        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].channel, Channel::Green);
        assert_eq!(deltas[0].delta, 4.0);
        assert_eq!(format!("{:.2}", deltas[0].delta), "4.00");
    }

    #[test]
    fn test_delta_is_rounded_and_absolute() {
        let mut a = PeakSet::default();
        let mut b = PeakSet::default();
        a.set(Channel::Red, Some(Peak { index: 3, wavelength: 611.234, intensity: 1.0 }));
        b.set(Channel::Red, Some(Peak { index: 9, wavelength: 650.0, intensity: 0.5 }));

        let deltas = peak_deltas(&a, &b);
        assert_eq!(deltas[0].delta, 38.77);
        assert_eq!(peak_deltas(&b, &a)[0].delta, 38.77);
    }

    #[test]
    fn test_missing_peaks_are_omitted_not_zeroed() {
        let mut a = PeakSet::default();
        let mut b = PeakSet::default();
        let peak = Peak { index: 0, wavelength: 450.0, intensity: 0.9 };
        a.set(Channel::Blue, Some(peak));
        a.set(Channel::Red, Some(peak));
        b.set(Channel::Blue, Some(peak));
        b.set(Channel::Green, Some(peak));
        a.set(Channel::Intensity, Some(peak));
        b.set(Channel::Intensity, Some(peak));

        let deltas = peak_deltas(&a, &b);
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].channel, Channel::Blue);
        assert_eq!(deltas[0].delta, 0.0);
    }

    #[test]
    fn test_carried_peaks_take_precedence() {
        let mut a = green_line(520.0);
        a.detect_peaks(&PeakDetector::new(0.99));
        let deltas = compare_spectra(&a, &green_line(524.0), &PeakDetector::default());
        assert!(deltas.is_empty());
    }
}
