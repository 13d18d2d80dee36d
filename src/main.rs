use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use spectroscope_rs::logger;
use spectroscope_rs::spectrum_pipeline::{
    CropRegion, DisplayGeometry, ExtractionRequest, PeakDetector, PipelineConfig, SpectrumPipeline,
    TiffRasterWriter, compare_spectra, csv,
    geometry::{normalize_degrees, rotated_canvas_size},
    peaks::DEFAULT_NOISE_THRESHOLD,
};

use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "spectroscope")]
#[command(version, about = "Extract and calibrate optical spectra from captured frames", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a spectrum from a region of an image
    Extract {
        /// Captured frame (PNG, JPEG or TIFF)
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Selection in display coordinates (x,y,width,height)
        #[arg(long, value_name = "X,Y,W,H")]
        crop: String,

        /// Rotation of the source in degrees
        #[arg(long, value_name = "DEG", default_value = "0", allow_hyphen_values = true)]
        rotate: f64,

        /// Displayed size of the source (defaults to the rotated native size)
        #[arg(long, value_name = "W,H")]
        display: Option<String>,

        /// Offset of the source inside its wrapper
        #[arg(long, value_name = "X,Y", allow_hyphen_values = true)]
        offset: Option<String>,

        /// Calibrate against a known reference line at this wavelength
        #[arg(long, value_name = "NM")]
        laser: Option<f64>,

        /// Write the calibrated spectrum as CSV
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,

        /// Write the extracted region as TIFF
        #[arg(long, value_name = "FILE")]
        tiff: Option<PathBuf>,

        /// Pipeline configuration (JSON)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Compare the peaks of two exported spectra
    Compare {
        #[arg(value_name = "A")]
        a: PathBuf,

        #[arg(value_name = "B")]
        b: PathBuf,

        /// Noise threshold for spectra exported without peaks
        #[arg(long, value_name = "FLOAT")]
        threshold: Option<f64>,
    },
}

/// Parses `N` comma-separated numbers, e.g. "10,20,300,40".
fn parse_numbers<const N: usize>(value: &str, what: &str) -> anyhow::Result<[f64; N]> {
    let parts: Vec<&str> = value.split(',').collect();
    if parts.len() != N {
        bail!("{} must have {} comma-separated values, got: {}", what, N, value);
    }

    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .trim()
            .parse::<f64>()
            .with_context(|| format!("invalid {} value: {}", what, part))?;
    }
    Ok(out)
}

fn main() -> anyhow::Result<()> {
    logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract { image, crop, rotate, display, offset, laser, csv: csv_out, tiff, config } => {
            let config = match config {
                Some(path) => PipelineConfig::from_json_file(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => PipelineConfig::default(),
            };
            let mut pipeline = SpectrumPipeline::new(config);

            let [x, y, w, h] = parse_numbers::<4>(&crop, "crop")?;
            let region = CropRegion::new(x, y, w, h)?;
            let [offset_x, offset_y] = match offset {
                Some(offset) => parse_numbers::<2>(&offset, "offset")?,
                None => [0.0, 0.0],
            };

            let source = image::open(&image)
                .with_context(|| format!("opening {}", image.display()))?
                .to_rgba8();
            let display = match display {
                Some(display) => {
                    let [dw, dh] = parse_numbers::<2>(&display, "display")?;
                    DisplayGeometry::new(dw, dh, offset_x, offset_y)?
                }
                None => {
                    let (cw, ch) = rotated_canvas_size(
                        source.width() as usize,
                        source.height() as usize,
                        normalize_degrees(rotate),
                    );
                    DisplayGeometry::new(cw as f64, ch as f64, offset_x, offset_y)?
                }
            };

            let request = ExtractionRequest::new(region, rotate, display);
            let samples = pipeline
                .process(&source, &request)
                .with_context(|| format!("extracting spectrum from {}", image.display()))?
                .len();
            info!("Extracted {} samples", samples);

            if let Some(known_nm) = laser {
                let (model, index) = pipeline.calibrate_manual(known_nm).context("manual calibration")?;
                info!(
                    "Pinned sample {} to {} nm ({:.4} nm/px, offset {:.2})",
                    index, known_nm, model.nm_per_pixel, model.offset
                );
            }

            if let Some(current) = pipeline.current() {
                match current.peaks() {
                    Some(peaks) if !peaks.is_empty() => {
                        for (channel, peak) in peaks.iter() {
                            info!(
                                "{} peak: {:.2} nm at sample {} ({:.3})",
                                channel, peak.wavelength, peak.index, peak.intensity
                            );
                        }
                    }
                    _ => warn!("No peaks above the noise threshold"),
                }

                if let Some(path) = &csv_out {
                    csv::write_csv_file(path, current, current.peaks())
                        .with_context(|| format!("writing {}", path.display()))?;
                }
            }

            if let Some(path) = tiff {
                let mut file = std::fs::File::create(&path)
                    .with_context(|| format!("creating {}", path.display()))?;
                pipeline.write_extracted_tiff(&TiffRasterWriter, &mut file)?;
                info!("Extracted region written to {}", path.display());
            }
        }

        Commands::Compare { a, b, threshold } => {
            let detector = PeakDetector::new(threshold.unwrap_or(DEFAULT_NOISE_THRESHOLD));

            let spectrum_a = csv::read_csv_file(&a).with_context(|| format!("reading {}", a.display()))?;
            let spectrum_b = csv::read_csv_file(&b).with_context(|| format!("reading {}", b.display()))?;

            let deltas = compare_spectra(&spectrum_a, &spectrum_b, &detector);
            if deltas.is_empty() {
                warn!("No channel has a peak in both spectra");
            }
            for delta in &deltas {
                println!(
                    "{}: {:.2} nm vs {:.2} nm, difference {:.2} nm",
                    delta.channel, delta.wavelength_a, delta.wavelength_b, delta.delta
                );
            }
        }
    }

    Ok(())
}
