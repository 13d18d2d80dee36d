use std::io::Write;
use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::spectrum_pipeline::{
    calibration::{AutoCalibration, AutoCalibrationRequest, AutoCalibrator, CalibratedSpectrum, CalibrationModel, CalibrationPoint},
    common::error::{Result, SpectrumError},
    config::PipelineConfig,
    csv,
    geometry::{ExtractedRaster, ExtractionRequest, GeometryExtractor},
    live::{LiveSession, RequestTicket},
    peaks::{PeakDetector, PeakSet},
    raster::{ImageRasterReader, Raster, RasterReader, RasterSource},
    reduction::{ColumnSumReducer, Spectrum, SpectrumReducer},
    tiff::RasterWriter,
};


/// Extraction, reduction and calibration state for one spectroscope view.
///
/// Holds the single active calibration model and the most recent spectrum.
/// Every operation either succeeds completely or leaves both untouched.
pub struct SpectrumPipeline<D: SpectrumReducer> {
    reducer: D,
    extractor: GeometryExtractor,
    detector: PeakDetector,
    config: PipelineConfig,
    model: CalibrationModel,
    current: Option<CalibratedSpectrum>,
    last_extraction: Option<ExtractedRaster>,
}

impl SpectrumPipeline<ColumnSumReducer> {
    pub fn new(config: PipelineConfig) -> Self {
        let reducer = ColumnSumReducer::new(config.auto_flip);
        Self::with_custom(reducer, config)
    }
}

impl Default for SpectrumPipeline<ColumnSumReducer> {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl<D: SpectrumReducer> SpectrumPipeline<D> {
    pub fn with_custom(reducer: D, config: PipelineConfig) -> Self {
        Self {
            reducer,
            extractor: GeometryExtractor::new(config.effective_max_dimension()),
            detector: PeakDetector::new(config.noise_threshold),
            config,
            model: CalibrationModel::default(),
            current: None,
            last_extraction: None,
        }
    }

    /// Extracts the selection, reduces it and labels it with the active model.
    #[instrument(skip(self, source, request), fields(width = source.width(), height = source.height()))]
    pub fn process<S: RasterSource + ?Sized>(
        &mut self,
        source: &S,
        request: &ExtractionRequest,
    ) -> Result<&CalibratedSpectrum> {
        info!("Processing selection");
        let (extracted, spectrum) = self.extract_and_reduce(source, request)?;
        self.commit(extracted, spectrum)
    }

    /// Reduces a raster that is already cropped and landscape.
    #[instrument(skip(self, raster), fields(width = raster.width, height = raster.height))]
    pub fn process_raster(&mut self, raster: &Raster) -> Result<&CalibratedSpectrum> {
        let spectrum = self.reduce_checked(raster)?;
        self.install(spectrum)
    }

    fn extract_and_reduce<S: RasterSource + ?Sized>(
        &self,
        source: &S,
        request: &ExtractionRequest,
    ) -> Result<(ExtractedRaster, Spectrum)> {
        let extracted = {
            let _span = tracing::info_span!("extract").entered();
            self.extractor.extract(source, request)?
        };

        let spectrum = {
            let _span = tracing::info_span!(
                "reduce",
                width = extracted.raster.width,
                height = extracted.raster.height
            )
            .entered();
            self.reduce_checked(&extracted.raster)?
        };

        Ok((extracted, spectrum))
    }

    /// One sample per raster column, or the reducer's answer is unusable.
    fn reduce_checked(&self, raster: &Raster) -> Result<Spectrum> {
        let spectrum = self.reducer.reduce(raster)?;
        if spectrum.len() != raster.width {
            warn!(samples = spectrum.len(), columns = raster.width, "Reducer output does not match extraction");
            return Err(SpectrumError::ExternalService(format!(
                "reducer returned {} samples for a {}-column extraction",
                spectrum.len(),
                raster.width
            )));
        }
        Ok(spectrum)
    }

    fn commit(&mut self, extracted: ExtractedRaster, spectrum: Spectrum) -> Result<&CalibratedSpectrum> {
        let calibrated = self.calibrate_new(spectrum)?;
        self.last_extraction = Some(extracted);
        Ok(self.current.insert(calibrated))
    }

    /// Re-runs extraction on a fresh frame from `capture` every
    /// `live_interval_ms` until `session` is cancelled. Results arriving after
    /// a newer one or after cancellation are dropped; failed ticks are logged
    /// and leave the previous spectrum in place. Returns the number of ticks.
    #[instrument(skip(self, session, request, capture))]
    pub fn run_live<S, F>(&mut self, session: &LiveSession, request: &ExtractionRequest, mut capture: F) -> u64
    where
        S: RasterSource,
        F: FnMut(RequestTicket) -> Result<S>,
    {
        let interval = self.config.live_interval();
        session.run(interval, |ticket| {
            let outcome = capture(ticket).and_then(|frame| self.extract_and_reduce(&frame, request));
            match session.accept(ticket, outcome) {
                Some(Ok((extracted, spectrum))) => {
                    if let Err(e) = self.commit(extracted, spectrum) {
                        warn!(ticket = ticket.sequence(), "Live result rejected: {}", e);
                    }
                }
                Some(Err(e)) => warn!(
                    ticket = ticket.sequence(),
                    recoverable = e.is_recoverable(),
                    "Live tick failed: {}",
                    e
                ),
                None => {}
            }
        })
    }

    #[instrument(skip(self, path, request))]
    pub fn process_file<P: AsRef<Path>>(
        &mut self,
        path: P,
        request: &ExtractionRequest,
    ) -> Result<&CalibratedSpectrum> {
        let path = path.as_ref();
        info!(input = %path.display(), "Processing file");

        let raster = {
            let _span = tracing::info_span!("read_input_file").entered();
            let data = std::fs::read(path)
                .map_err(|e| SpectrumError::InputReadError(format!("{}: {}", path.display(), e)))?;
            ImageRasterReader.read_raster(&data)?
        };

        self.process(&raster, request)
    }

    fn install(&mut self, spectrum: Spectrum) -> Result<&CalibratedSpectrum> {
        let calibrated = self.calibrate_new(spectrum)?;
        Ok(self.current.insert(calibrated))
    }

    fn calibrate_new(&self, spectrum: Spectrum) -> Result<CalibratedSpectrum> {
        let mut calibrated = CalibratedSpectrum::new(spectrum, &self.model)?;
        if self.config.auto_detect_peaks {
            let _span = tracing::info_span!("detect_peaks").entered();
            calibrated.detect_peaks(&self.detector);
        }
        info!(samples = calibrated.len(), flipped = calibrated.spectrum().flipped, "Spectrum ready");
        Ok(calibrated)
    }

    fn current_or_err(&self) -> Result<&CalibratedSpectrum> {
        self.current
            .as_ref()
            .ok_or_else(|| SpectrumError::MalformedInput("no spectrum has been processed".to_string()))
    }

    fn apply_model(&mut self, model: CalibrationModel) {
        debug!(nm_per_pixel = model.nm_per_pixel, offset = model.offset, "Applying calibration");
        self.model = model;
        if let Some(current) = self.current.as_mut() {
            current.recalibrate(&self.model);
        }
    }

    /// One-point calibration: pins the strongest intensity sample of the
    /// current spectrum to `known_nm`. Returns the new model and that index.
    #[instrument(skip(self))]
    pub fn calibrate_manual(&mut self, known_nm: f64) -> Result<(CalibrationModel, usize)> {
        let current = self.current_or_err()?;
        let (model, peak_index) = CalibrationModel::from_intensity_peak(known_nm, &current.spectrum().intensity)?;
        info!(peak_index, known_nm, "Manual calibration applied");
        self.apply_model(model);
        Ok((model, peak_index))
    }

    #[instrument(skip(self, points), fields(points = points.len()))]
    pub fn calibrate_points(&mut self, points: &[CalibrationPoint]) -> Result<CalibrationModel> {
        let sample_count = self.current.as_ref().map_or(0, |c| c.len());
        if points.len() < 2 && sample_count < 2 {
            return Err(SpectrumError::MalformedInput(
                "need two calibration points or a processed spectrum".to_string(),
            ));
        }
        let model = CalibrationModel::from_points(points, sample_count)?;
        info!(nm_per_pixel = model.nm_per_pixel, offset = model.offset, "Point calibration applied");
        self.apply_model(model);
        Ok(model)
    }

    /// Sends the current RGB curves to `calibrator` and adopts its model.
    #[instrument(skip(self, calibrator))]
    pub fn auto_calibrate<C: AutoCalibrator>(&mut self, calibrator: &C) -> Result<AutoCalibration> {
        let calibration = {
            let current = self.current_or_err()?;
            let spectrum = current.spectrum();
            let request = AutoCalibrationRequest {
                red: &spectrum.red,
                green: &spectrum.green,
                blue: &spectrum.blue,
            };
            let response = {
                let _span = tracing::info_span!("auto_calibrate_request", samples = spectrum.len()).entered();
                calibrator.fit(&request)?
            };
            AutoCalibration::try_from(response)?
        };

        info!(
            confidence = calibration.confidence,
            tier = calibration.tier.message(),
            "Auto calibration applied"
        );
        self.apply_model(calibration.model);
        Ok(calibration)
    }

    /// Replaces the active model and relabels the current spectrum.
    pub fn set_model(&mut self, model: CalibrationModel) {
        self.apply_model(model);
    }

    pub fn model(&self) -> &CalibrationModel {
        &self.model
    }

    pub fn current(&self) -> Option<&CalibratedSpectrum> {
        self.current.as_ref()
    }

    pub fn last_extraction(&self) -> Option<&ExtractedRaster> {
        self.last_extraction.as_ref()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn detector(&self) -> &PeakDetector {
        &self.detector
    }

    pub fn detect_peaks(&mut self) -> Result<&PeakSet> {
        let detector = &self.detector;
        let current = self
            .current
            .as_mut()
            .ok_or_else(|| SpectrumError::MalformedInput("no spectrum has been processed".to_string()))?;
        Ok(current.detect_peaks(detector))
    }

    pub fn export_csv(&self) -> Result<String> {
        let current = self.current_or_err()?;
        if current.peaks().is_none() {
            debug!("Exporting without a peaks section");
        }
        Ok(csv::export_csv(current, current.peaks()))
    }

    /// Writes the raster last sent to reduction.
    #[instrument(skip(self, writer, output))]
    pub fn write_extracted_tiff<W: RasterWriter>(&self, writer: &W, output: &mut dyn Write) -> Result<()> {
        let Some(extracted) = self.last_extraction.as_ref() else {
            warn!("No extraction to write");
            return Err(SpectrumError::MalformedInput("no extraction has been performed".to_string()));
        };
        writer.write_raster(&extracted.raster, output, self.config.tiff_compression)
    }
}
