//! CSV export and import of calibrated spectra.
//!
//! Export writes one row per sample under
//! `Wavelength (nm),Intensity,Red,Green,Blue`, optionally followed by a
//! `Detected Peaks` section. Import reads the sample rows back and ignores
//! anything that is not five leading numbers, which also skips the peaks
//! section of an exported file.

use std::fmt::Write as _;
use std::path::Path;

use tracing::{debug, info};

use crate::spectrum_pipeline::calibration::CalibratedSpectrum;
use crate::spectrum_pipeline::common::error::{Result, SpectrumError};
use crate::spectrum_pipeline::peaks::PeakSet;
use crate::spectrum_pipeline::reduction::Spectrum;

pub const SPECTRUM_HEADER: &str = "Wavelength (nm),Intensity,Red,Green,Blue";
pub const PEAKS_TITLE: &str = "Detected Peaks";
pub const PEAKS_HEADER: &str = "Channel,Wavelength (nm),Intensity,Pixel Index";

const FIELDS_PER_ROW: usize = 5;

pub fn export_csv(spectrum: &CalibratedSpectrum, peaks: Option<&PeakSet>) -> String {
    let data = spectrum.spectrum();
    let mut out = String::with_capacity(48 * (spectrum.len() + 1));
    out.push_str(SPECTRUM_HEADER);
    out.push('\n');

    for (i, wavelength) in spectrum.wavelengths().iter().enumerate() {
        // writing into a String cannot fail
        let _ = writeln!(
            out,
            "{},{},{},{},{}",
            wavelength, data.intensity[i], data.red[i], data.green[i], data.blue[i]
        );
    }

    if let Some(peaks) = peaks {
        out.push_str("\n\n");
        out.push_str(PEAKS_TITLE);
        out.push('\n');
        out.push_str(PEAKS_HEADER);
        out.push('\n');
        for (channel, peak) in peaks.iter() {
            let _ = writeln!(out, "{},{},{},{}", channel.label(), peak.wavelength, peak.intensity, peak.index);
        }
    }

    out
}

fn parse_row(line: &str) -> Option<[f64; FIELDS_PER_ROW]> {
    let mut fields = line.split(',');
    let mut row = [0.0; FIELDS_PER_ROW];
    for slot in row.iter_mut() {
        *slot = fields.next()?.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    }
    Some(row)
}

/// Parses exported text back into a spectrum. The first line is always
/// treated as a header.
pub fn parse_csv(text: &str) -> Result<CalibratedSpectrum> {
    let lines: Vec<&str> = text.trim().lines().collect();
    if lines.len() < 2 {
        return Err(SpectrumError::MalformedInput("CSV file is empty or invalid".to_string()));
    }

    let mut wavelengths = Vec::new();
    let mut spectrum = Spectrum {
        red: Vec::new(),
        green: Vec::new(),
        blue: Vec::new(),
        intensity: Vec::new(),
        flipped: false,
    };

    let mut skipped = 0usize;
    for line in &lines[1..] {
        match parse_row(line) {
            Some([wavelength, intensity, red, green, blue]) => {
                wavelengths.push(wavelength);
                spectrum.intensity.push(intensity);
                spectrum.red.push(red);
                spectrum.green.push(green);
                spectrum.blue.push(blue);
            }
            None => skipped += 1,
        }
    }

    if wavelengths.is_empty() {
        return Err(SpectrumError::MalformedInput("No valid data found in CSV".to_string()));
    }
    debug!("Parsed {} samples, skipped {} lines", wavelengths.len(), skipped);

    CalibratedSpectrum::with_wavelengths(spectrum, wavelengths)
}

pub fn read_csv_file<P: AsRef<Path>>(path: P) -> Result<CalibratedSpectrum> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| SpectrumError::InputReadError(format!("{}: {}", path.display(), e)))?;
    parse_csv(&text)
}

pub fn write_csv_file<P: AsRef<Path>>(path: P, spectrum: &CalibratedSpectrum, peaks: Option<&PeakSet>) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, export_csv(spectrum, peaks))
        .map_err(|e| SpectrumError::OutputWriteError(format!("{}: {}", path.display(), e)))?;
    info!(path = %path.display(), samples = spectrum.len(), "Spectrum exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum_pipeline::calibration::CalibrationModel;
    use crate::spectrum_pipeline::peaks::{Channel, PeakDetector};

    #[test]
    fn test_two_sample_scenario() {
        let text = "Wavelength,Intensity,Red,Green,Blue\n500,0.9,0.0,0.9,0.0\n520,0.95,0.0,0.95,0.0\n";
        let mut spectrum = parse_csv(text).unwrap();

        assert_eq!(spectrum.len(), 2);
        let green = *spectrum.detect_peaks(&PeakDetector::default()).get(Channel::Green).unwrap();
        assert_eq!(green.index, 1);
        assert_eq!(green.wavelength, 520.0);
        assert_eq!(green.intensity, 0.95);
    }

    #[test]
    fn test_invalid_rows_are_dropped() {
        let text = "h\n400,0.1,0.2,0.3,0.4\n410,abc,0.2,0.3,0.4\n420,0.1,0.2\n\n430,1,1,1,1,extra\n";
        let spectrum = parse_csv(text).unwrap();
        assert_eq!(spectrum.wavelengths(), &[400.0, 430.0]);
    }

    #[test]
    fn test_infinite_values_are_dropped() {
        let text = "h\n400,0.1,0.2,0.3,0.4\ninf,0.1,0.2,0.3,0.4\n420,infinity,0.2,0.3,0.4\n430,0.5,-inf,0.3,0.4\n440,0.5,0.5,0.5,0.5\n";
        let spectrum = parse_csv(text).unwrap();
        assert_eq!(spectrum.wavelengths(), &[400.0, 440.0]);
        assert!(spectrum.spectrum().intensity.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_empty_inputs() {
        for text in ["", "   \n", "Wavelength (nm),Intensity,Red,Green,Blue\n"] {
            match parse_csv(text) {
                Err(SpectrumError::MalformedInput(msg)) => assert_eq!(msg, "CSV file is empty or invalid"),
                other => panic!("unexpected {:?}", other),
            }
        }
        match parse_csv("header\nnot,numbers,at,all,here\n") {
            Err(SpectrumError::MalformedInput(msg)) => assert_eq!(msg, "No valid data found in CSV"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_export_layout() {
        let spectrum = Spectrum::new(vec![0.0, 1.0], vec![0.5, 0.25], vec![1.0, 0.0], vec![0.75, 0.5]).unwrap();
        let mut calibrated = CalibratedSpectrum::new(spectrum, &CalibrationModel::new(10.0, 0.0)).unwrap();

        assert_eq!(
            export_csv(&calibrated, None),
            "Wavelength (nm),Intensity,Red,Green,Blue\n380,0.75,0,0.5,1\n390,0.5,1,0.25,0\n"
        );

        let peaks = calibrated.detect_peaks(&PeakDetector::default()).clone();
        let text = export_csv(&calibrated, Some(&peaks));
        let tail = text.split("\n\n\n").nth(1).unwrap();
        assert_eq!(
            tail,
            "Detected Peaks\nChannel,Wavelength (nm),Intensity,Pixel Index\n\
             red,390,1,1\ngreen,380,0.5,0\nblue,380,1,0\nintensity,380,0.75,0\n"
        );
    }

    #[test]
    fn test_exported_file_reads_back() {
        let spectrum = Spectrum::new(
            vec![0.1, 0.9, 0.2],
            vec![0.3, 0.4, 0.8],
            vec![0.7, 0.1, 0.0],
            vec![0.4, 0.6, 0.5],
        )
        .unwrap();
        let mut calibrated = CalibratedSpectrum::new(spectrum, &CalibrationModel::default()).unwrap();
        let peaks = calibrated.detect_peaks(&PeakDetector::default()).clone();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spectrum_data.csv");
        write_csv_file(&path, &calibrated, Some(&peaks)).unwrap();
        let restored = read_csv_file(&path).unwrap();

        assert_eq!(restored.spectrum(), calibrated.spectrum());
        assert_eq!(restored.wavelengths(), calibrated.wavelengths());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_csv_file(dir.path().join("absent.csv")),
            Err(SpectrumError::InputReadError(_))
        ));
    }
}
