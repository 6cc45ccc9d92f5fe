//! Unit tests for cadence-audio components

#[cfg(test)]
mod tests {
    use cadence_audio::config::{PeakDetectionOverrides, PeakOptionsOverrides, ReturnsOverrides};
    use cadence_audio::energy::{compute_energy, compute_multiband_energy, energy_average, multiband_energy_average};
    use cadence_audio::*;
    use std::io::Write;

    #[test]
    fn test_analyser_config_default() {
        let config = AnalyserConfig::default();
        assert_eq!(config.fft_size, 512);
        assert_eq!(config.buffer_len(), 256);
        assert!(config.peak_detection.enabled);
        assert_eq!(config.peak_detection.options.threshold, 1.8);
        assert_eq!(config.peak_detection.options.ignore_time, 300.0);
        assert_eq!(config.peak_detection.options.energy_persistence, 2000.0);
        assert_eq!(config.peak_detection.options.peak_persistency, 300.0);
        assert_eq!(config.multiband_peak_detection.options.bands, 8);
        assert_eq!(config.multiband_peak_detection.options.threshold, 1.2);
        assert_eq!(config.multiband_peak_detection.options.energy_persistence, 1200.0);
        assert_eq!(config.returns, ReturnsConfig::all());
        assert!(config.validate().is_ok());
        assert!(config.warnings().is_empty());
    }

    #[test]
    fn test_analyser_config_validation() {
        let mut config = AnalyserConfig::default();

        config.fft_size = 0;
        assert!(config.validate().is_err());

        config.fft_size = 1000;
        assert!(config.validate().is_err());

        config.fft_size = 65536;
        assert!(config.validate().is_err());

        config.fft_size = 2048;
        assert!(config.validate().is_ok());

        config.peak_detection.options.threshold = f64::NAN;
        assert!(config.validate().is_err());

        config.peak_detection.options.threshold = 1.5;
        config.multiband_peak_detection.options.ignore_time = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_band_count_bounded_by_bins() {
        let mut config = AnalyserConfig::default();
        config.multiband_peak_detection.options.bands = 0;
        assert!(matches!(config.validate(), Err(AudioError::Config(_))));

        config.multiband_peak_detection.options.bands = config.buffer_len();
        assert!(config.validate().is_ok());

        config.multiband_peak_detection.options.bands = config.buffer_len() * 2;
        assert!(matches!(config.validate(), Err(AudioError::Config(_))));
        assert!(Analyser::new(config).is_err());

        // a huge power of two from a config file is rejected before anything is allocated
        let result = AnalyserConfig::from_json_str(
            r#"{ "multiband_peak_detection": { "options": { "bands": 1125899906842624 } } }"#,
        );
        assert!(matches!(result, Err(AudioError::Config(_))));
    }

    #[test]
    fn test_overrides_layer_field_by_field() {
        let overrides = AnalyserConfigOverrides {
            peak_detection: Some(PeakDetectionOverrides {
                enabled: None,
                options: Some(PeakOptionsOverrides {
                    threshold: Some(2.5),
                    ..Default::default()
                }),
            }),
            ..Default::default()
        };

        let config = AnalyserConfig::build(&overrides).unwrap();
        assert_eq!(config.peak_detection.options.threshold, 2.5);
        // siblings keep their defaults
        assert!(config.peak_detection.enabled);
        assert_eq!(config.peak_detection.options.ignore_time, 300.0);
        assert_eq!(config.fft_size, 512);
        assert_eq!(config.multiband_peak_detection, AnalyserConfig::default().multiband_peak_detection);
    }

    #[test]
    fn test_overrides_do_not_touch_base() {
        let base = AnalyserConfig::default();
        let overrides = AnalyserConfigOverrides {
            fft_size: Some(1024),
            returns: Some(ReturnsOverrides {
                energy: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };

        let layered = base.with_overrides(&overrides);
        assert_eq!(layered.fft_size, 1024);
        assert!(!layered.returns.energy);
        assert!(layered.returns.peak);
        assert_eq!(base, AnalyserConfig::default());
    }

    #[test]
    fn test_config_from_json() {
        let config = AnalyserConfig::from_json_str(
            r#"{
                "fft_size": 1024,
                "multiband_peak_detection": { "options": { "bands": 4, "easing": "ease_out_quad" } },
                "returns": { "timedomain_data": false }
            }"#,
        )
        .unwrap();

        assert_eq!(config.fft_size, 1024);
        assert_eq!(config.multiband_peak_detection.options.bands, 4);
        assert_eq!(config.multiband_peak_detection.options.easing, Easing::EaseOutQuad);
        assert_eq!(config.multiband_peak_detection.options.threshold, 1.2);
        assert!(!config.returns.timedomain_data);
        assert!(config.returns.frequencies_data);
    }

    #[test]
    fn test_config_json_unknown_field_rejected() {
        let result = AnalyserConfig::from_json_str(r#"{ "peak_detection": { "treshold": 2.0 } }"#);
        assert!(matches!(result, Err(AudioError::Json(_))));
    }

    #[test]
    fn test_config_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "peak_detection": {{ "options": {{ "ignore_time": 150 }} }} }}"#).unwrap();

        let config = AnalyserConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.peak_detection.options.ignore_time, 150.0);

        let missing = AnalyserConfig::from_json_file("/definitely/not/here.json");
        assert!(matches!(missing, Err(AudioError::Io(_))));
    }

    #[test]
    fn test_config_serialization() {
        let config = AnalyserConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: AnalyserConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_config_warnings() {
        let mut config = AnalyserConfig::default();
        config.multiband_peak_detection.options.bands = 6;
        config.returns.multiband_peak_history = false;
        let warnings = config.warnings();
        assert!(warnings.contains(&ConfigWarning::BandsNotPowerOfTwo(6)));
        assert!(warnings.contains(&ConfigWarning::PeakHistoryMismatch {
            peak_history: true,
            multiband_peak_history: false,
        }));

        let mut config = AnalyserConfig::default();
        config.peak_detection.enabled = false;
        config.multiband_peak_detection.enabled = false;
        let warnings = config.warnings();
        assert_eq!(warnings.len(), 4);
        assert!(warnings.contains(&ConfigWarning::PeakWithoutDetection));
        assert!(warnings.contains(&ConfigWarning::MultibandPeakHistoryWithoutDetection));
    }

    #[test]
    fn test_warnings_do_not_abort_construction() {
        let mut config = AnalyserConfig::default();
        config.multiband_peak_detection.options.bands = 3;
        config.peak_detection.enabled = false;

        let analyser = Analyser::new(config).unwrap();
        assert!(!analyser.warnings().is_empty());
    }

    #[test]
    fn test_energy_of_centered_buffer_is_zero() {
        assert_eq!(compute_energy(&[128u8; 256]), 0.0);
    }

    #[test]
    fn test_energy_of_alternating_extremes() {
        let buffer: Vec<u8> = (0..256).map(|i| if i % 2 == 0 { 0 } else { 255 }).collect();
        assert!((compute_energy(&buffer) - 127.5).abs() < 1e-9);
    }

    #[test]
    fn test_energy_average() {
        let mut history = EnergyHistory::new();
        assert_eq!(energy_average(&history), 0.0);
        history.push(10.0, 16.0, 1000.0);
        history.push(20.0, 16.0, 1000.0);
        assert_eq!(energy_average(&history), 15.0);
    }

    #[test]
    fn test_multiband_energy_and_average() {
        let mut frequencies = vec![0u8; 256];
        for value in frequencies[144..].iter_mut() {
            *value = 100;
        }
        let energies = compute_multiband_energy(&frequencies, 4);
        assert_eq!(energies, vec![0.0, 0.0, 0.0, 100.0]);

        let mut history = EnergyHistory::new();
        history.push(energies, 16.0, 1000.0);
        history.push(vec![10.0, 20.0, 30.0, 0.0], 16.0, 1000.0);
        assert_eq!(multiband_energy_average(&history, 4), vec![5.0, 10.0, 15.0, 50.0]);
    }

    #[test]
    fn test_peak_overwrite() {
        let mut peak = Peak::never();
        assert_eq!(peak.timer, None);
        peak.overwrite(&Peak::new(1.0, Some(42.0), 33.0));
        assert_eq!(peak, Peak::new(1.0, Some(42.0), 33.0));
    }

    #[test]
    fn test_audio_error_types() {
        let config_error = AudioError::Config("test".to_string());
        assert!(format!("{}", config_error).contains("test"));

        let history_error = AudioError::History("test".to_string());
        assert!(format!("{}", history_error).contains("test"));

        assert!(format!("{}", AudioError::Cancelled).contains("cancelled"));
    }
}
