#[cfg(test)]
mod tests {
    use crate::spectrum_pipeline::calibration::{
        AutoCalibration, AutoCalibrationResponse, BASE_WAVELENGTH_NM, CalibratedSpectrum, CalibrationModel,
        CalibrationPoint, ConfidenceTier,
    };
    use crate::spectrum_pipeline::common::error::SpectrumError;
    use crate::spectrum_pipeline::peaks::{Channel, PeakDetector};
    use crate::spectrum_pipeline::reduction::Spectrum;

    const TOLERANCE: f64 = 1e-6;

    #[test]
    fn test_default_model_spans_visible_range() {
        let model = CalibrationModel::default();
        assert!((model.nm_per_pixel - 0.37).abs() < 1e-12);
        assert_eq!(model.wavelength_at(0), BASE_WAVELENGTH_NM);
        assert!((model.wavelength_at(1000) - 750.0).abs() < 1e-9);
    }

    #[test]
    fn test_wavelengths_are_monotonic_for_positive_slope() {
        for model in [CalibrationModel::default(), CalibrationModel::new(0.0, 12.0), CalibrationModel::new(2.5, -40.0)] {
            let labels = model.wavelengths(257);
            assert_eq!(labels.len(), 257);
            assert!(labels.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_reference_peak_round_trip() {
        for (peak, target, n) in [(0, 405.0, 10), (137, 532.0, 640), (639, 650.0, 640), (3, 380.0, 4)] {
            let model = CalibrationModel::from_reference_peak(target, peak, n).unwrap();
            assert!((model.wavelength_at(peak) - target).abs() < TOLERANCE);
            assert!((model.nm_per_pixel - 370.0 / n as f64).abs() < 1e-12);
        }
    }

    #[test]
    fn test_reference_peak_rejects_bad_input() {
        for bad in [f64::NAN, f64::INFINITY] {
            assert!(matches!(
                CalibrationModel::from_reference_peak(bad, 0, 10),
                Err(SpectrumError::MalformedInput(_))
            ));
        }
        assert!(CalibrationModel::from_reference_peak(532.0, 0, 0).is_err());
        assert!(CalibrationModel::from_reference_peak(532.0, 10, 10).is_err());
    }

    #[test]
    fn test_intensity_peak_uses_first_maximum() {
        let (model, index) =
            CalibrationModel::from_intensity_peak(532.0, &[0.1, 0.4, 1.0, 0.2, 1.0]).unwrap();
        assert_eq!(index, 2);
        assert!((model.wavelength_at(2) - 532.0).abs() < TOLERANCE);
        assert!((model.nm_per_pixel - 74.0).abs() < 1e-12);
    }

    #[test]
    fn test_intensity_peak_needs_samples() {
        assert!(CalibrationModel::from_intensity_peak(532.0, &[]).is_err());
        assert!(CalibrationModel::from_intensity_peak(532.0, &[f64::NAN]).is_err());
    }

    #[test]
    fn test_points_fit_line() {
        let points = [
            CalibrationPoint { pixel: 100.0, nm: 450.0 },
            CalibrationPoint { pixel: 300.0, nm: 550.0 },
            CalibrationPoint { pixel: 500.0, nm: 650.0 },
        ];
        let model = CalibrationModel::from_points(&points, 640).unwrap();
        assert!((model.nm_per_pixel - 0.5).abs() < 1e-12);
        assert!((model.offset - 20.0).abs() < 1e-9);
        assert!((model.wavelength_at(300) - 550.0).abs() < 1e-9);
    }

    #[test]
    fn test_points_least_squares_with_noise() {
        let points = [
            CalibrationPoint { pixel: 0.0, nm: 401.0 },
            CalibrationPoint { pixel: 10.0, nm: 409.0 },
            CalibrationPoint { pixel: 20.0, nm: 421.0 },
        ];
        let model = CalibrationModel::from_points(&points, 21).unwrap();
        assert!((model.nm_per_pixel - 1.0).abs() < 1e-12);
        assert!((model.offset + BASE_WAVELENGTH_NM - 400.333_333_333).abs() < 1e-6);
    }

    #[test]
    fn test_too_few_points_fall_back_to_visible_span() {
        let model = CalibrationModel::from_points(&[CalibrationPoint { pixel: 4.0, nm: 532.0 }], 371).unwrap();
        assert_eq!(model, CalibrationModel::visible_span(371));
        assert!((model.wavelength_at(370) - 750.0).abs() < 1e-9);
        assert_eq!(CalibrationModel::visible_span(1).nm_per_pixel, 0.0);
    }

    #[test]
    fn test_degenerate_points_are_rejected() {
        let points = [
            CalibrationPoint { pixel: 5.0, nm: 450.0 },
            CalibrationPoint { pixel: 5.0, nm: 650.0 },
        ];
        assert!(matches!(
            CalibrationModel::from_points(&points, 10),
            Err(SpectrumError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_confidence_tiers() {
        assert_eq!(ConfidenceTier::classify(0.70), ConfidenceTier::Excellent);
        assert_eq!(ConfidenceTier::classify(0.95), ConfidenceTier::Excellent);
        assert_eq!(ConfidenceTier::classify(0.50), ConfidenceTier::Good);
        assert_eq!(ConfidenceTier::classify(0.6999), ConfidenceTier::Good);
        assert_eq!(ConfidenceTier::classify(0.4999), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::classify(0.0), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::Low.message(), "Low (consider recalibrating)");
    }

    #[test]
    fn test_service_payload_becomes_model() {
        let json = r#"{
            "success": true,
            "nmPerPixel": 0.52,
            "wavelengthOffset": -12.5,
            "confidence": 0.42,
            "peaks": {
                "red": {"pixel": 410.2, "wavelength": 610.0},
                "green": {"pixel": 305.7, "wavelength": 545.0},
                "blue": {"pixel": 160.0, "wavelength": 450.0}
            }
        }"#;
        let response: AutoCalibrationResponse = serde_json::from_str(json).unwrap();
        let calibration = AutoCalibration::try_from(response).unwrap();

        assert_eq!(calibration.model, CalibrationModel::new(0.52, -12.5));
        assert_eq!(calibration.tier, ConfidenceTier::Low);
        assert_eq!(calibration.peaks.green.unwrap().wavelength, 545.0);
    }

    #[test]
    fn test_service_offset_alias() {
        let json = r#"{"success": true, "nmPerPixel": 1.0, "offset": 3.0, "confidence": 0.8}"#;
        let response: AutoCalibrationResponse = serde_json::from_str(json).unwrap();
        let calibration = AutoCalibration::try_from(response).unwrap();
        assert_eq!(calibration.model.offset, 3.0);
        assert_eq!(calibration.tier, ConfidenceTier::Excellent);
    }

    #[test]
    fn test_service_failure_message_is_kept() {
        let response = AutoCalibrationResponse {
            success: false,
            error: Some("Could not find three distinct peaks".into()),
            ..Default::default()
        };
        match AutoCalibration::try_from(response) {
            Err(SpectrumError::ExternalService(msg)) => assert_eq!(msg, "Could not find three distinct peaks"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_service_payload_validation() {
        let missing_slope = AutoCalibrationResponse {
            success: true,
            wavelength_offset: Some(0.0),
            confidence: Some(0.9),
            ..Default::default()
        };
        assert!(matches!(
            AutoCalibration::try_from(missing_slope),
            Err(SpectrumError::ExternalService(_))
        ));

        let wild_confidence = AutoCalibrationResponse {
            success: true,
            nm_per_pixel: Some(0.5),
            wavelength_offset: Some(0.0),
            confidence: Some(1.5),
            ..Default::default()
        };
        assert!(AutoCalibration::try_from(wild_confidence).is_err());
    }

    #[test]
    fn test_recalibration_changes_labels_only() {
        let spectrum = Spectrum::new(
            vec![0.0, 0.2, 0.9],
            vec![0.0, 1.0, 0.0],
            vec![0.8, 0.1, 0.0],
            vec![0.3, 1.0, 0.4],
        )
        .unwrap();
        let mut calibrated = CalibratedSpectrum::new(spectrum.clone(), &CalibrationModel::default()).unwrap();
        calibrated.detect_peaks(&PeakDetector::default());

        let model = CalibrationModel::new(100.0, 20.0);
        calibrated.recalibrate(&model);

        assert_eq!(calibrated.spectrum(), &spectrum);
        assert_eq!(calibrated.wavelengths(), &[400.0, 500.0, 600.0]);
        let green = calibrated.peaks().unwrap().get(Channel::Green).unwrap();
        assert_eq!((green.index, green.wavelength), (1, 500.0));
    }

    #[test]
    fn test_with_wavelengths_checks_length() {
        let spectrum = Spectrum::new(vec![0.0], vec![0.0], vec![0.0], vec![0.0]).unwrap();
        assert!(CalibratedSpectrum::with_wavelengths(spectrum, vec![]).is_err());
    }
}
