//! Edge case tests for cadence-audio

#[cfg(test)]
mod tests {
    use cadence_audio::energy::{band_boundaries, compute_energy, compute_multiband_energy, energy_average};
    use cadence_audio::peak::{decayed_value, detect_peak, exceeds_threshold};
    use cadence_audio::*;

    const BUFFER_LEN: usize = 256;

    fn flat(energy: u8) -> RawSample {
        RawSample::new(vec![128 + energy; BUFFER_LEN], vec![0u8; BUFFER_LEN]).unwrap()
    }

    #[test]
    fn test_empty_buffers() {
        assert_eq!(compute_energy(&[]), 0.0);
        assert_eq!(energy_average(&EnergyHistory::new()), 0.0);
        assert_eq!(compute_multiband_energy(&[], 4), vec![0.0; 4]);
        assert!(band_boundaries(0, 256).is_empty());
    }

    #[test]
    fn test_zero_average_never_triggers() {
        assert!(!exceeds_threshold(50.0, 0.0, 1.8));
        assert!(!exceeds_threshold(0.0, 0.0, 0.0));
        assert!(!exceeds_threshold(50.0, f64::NAN, 1.8));
        assert!(exceeds_threshold(50.0, 10.0, 1.8));
        // strictly greater than the threshold
        assert!(!exceeds_threshold(18.0, 10.0, 1.8));
    }

    #[test]
    fn test_silence_never_peaks() {
        let mut analyser = Analyser::new(AnalyserConfig::default()).unwrap();
        for i in 0..100 {
            let data = analyser.analyse(&RawSample::silent(BUFFER_LEN), 16.0, i as f64 * 16.0).unwrap();
            assert_eq!(data.energy(), Some(0.0));
            assert_eq!(data.energy_average(), Some(0.0));
            assert_eq!(data.peak().unwrap().timer, None);
        }
        assert!(analyser.data().multiband_peak().unwrap().iter().all(|p| p.timer.is_none()));
    }

    #[test]
    fn test_first_sound_after_silence_fires() {
        let mut analyser = Analyser::new(AnalyserConfig::default()).unwrap();
        for i in 0..10 {
            analyser.analyse(&RawSample::silent(BUFFER_LEN), 16.0, i as f64 * 16.0).unwrap();
        }
        let data = analyser.analyse(&flat(20), 16.0, 160.0).unwrap();
        assert_eq!(data.peak().unwrap().timer, Some(160.0));
    }

    #[test]
    fn test_zero_width_bands() {
        // 8 bands over 16 bins: the first band is empty
        let ranges = band_boundaries(8, 16);
        assert!(ranges[0].is_empty());
        let energies = compute_multiband_energy(&[255u8; 16], 8);
        assert_eq!(energies[0], 0.0);
        assert!(energies[1..].iter().all(|&e| e == 255.0));
    }

    #[test]
    fn test_more_bands_than_bins() {
        let ranges = band_boundaries(64, 16);
        assert_eq!(ranges.len(), 64);
        assert_eq!(ranges.iter().map(|r| r.len()).sum::<usize>(), 16);
    }

    #[test]
    fn test_sample_length_mismatch_rejected() {
        let mut analyser = Analyser::new(AnalyserConfig::default()).unwrap();
        let short = RawSample::new(vec![128u8; 128], vec![0u8; 128]).unwrap();
        assert!(matches!(analyser.analyse(&short, 16.0, 0.0), Err(AudioError::Format(_))));
        assert_eq!(analyser.iterations(), 0);

        assert!(RawSample::new(vec![128u8; 10], vec![0u8; 11]).is_err());
    }

    #[test]
    fn test_invalid_times_rejected() {
        let mut analyser = Analyser::new(AnalyserConfig::default()).unwrap();
        let sample = flat(10);
        assert!(analyser.analyse(&sample, -1.0, 0.0).is_err());
        assert!(analyser.analyse(&sample, f64::NAN, 0.0).is_err());
        assert!(analyser.analyse(&sample, 16.0, f64::INFINITY).is_err());
        assert_eq!(analyser.iterations(), 0);
        assert!(analyser.data().energy_history().unwrap().is_empty());
    }

    #[test]
    fn test_zero_delta_is_accepted() {
        let mut analyser = Analyser::new(AnalyserConfig::default()).unwrap();
        for _ in 0..5 {
            analyser.analyse(&flat(10), 0.0, 0.0).unwrap();
        }
        assert_eq!(analyser.data().energy_history().unwrap().len(), 5);
    }

    #[test]
    fn test_zero_window_keeps_latest_only() {
        let mut history = EnergyHistory::new();
        history.push(1.0, 16.0, 0.0);
        history.push(2.0, 16.0, 0.0);
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest(), Some(&2.0));
    }

    #[test]
    fn test_history_shorter_than_window_keeps_everything() {
        let mut history = EnergyHistory::new();
        for i in 0..10 {
            history.push(i as f64, 10.0, 1000.0);
        }
        assert_eq!(history.len(), 10);
        assert_eq!(history.span(), 100.0);
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let mut history = EnergyHistory::new();
        for i in 0..5 {
            history.push(i as f64, 25.0, 100.0);
        }
        // the four newest entries reach the window exactly
        assert_eq!(history.len(), 4);
        assert_eq!(history.values().copied().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_zero_persistency_drops_value_immediately() {
        let options = PeakOptions {
            peak_persistency: 0.0,
            ..PeakOptions::default()
        };
        let mut peak = Peak::never();
        assert!(detect_peak(&mut peak, None, 50.0, 10.0, 100.0, &options));
        assert_eq!(peak.value, 1.0);
        assert!(!detect_peak(&mut peak, None, 10.0, 10.0, 101.0, &options));
        assert_eq!(peak.value, 0.0);
        assert_eq!(decayed_value(100.0, 100.0, 0.0, Easing::Linear), 0.0);
    }

    #[test]
    fn test_fractional_firing_timer_decays_to_exact_zero() {
        let options = PeakOptions {
            peak_persistency: 16.7,
            ..PeakOptions::default()
        };
        let fired_at = 4.813;
        let mut peak = Peak::never();
        assert!(detect_peak(&mut peak, None, 50.0, 10.0, fired_at, &options));
        assert!(!detect_peak(&mut peak, None, 10.0, 10.0, fired_at + 10.0, &options));
        assert!(peak.value > 0.0);
        detect_peak(&mut peak, None, 10.0, 10.0, fired_at + options.peak_persistency, &options);
        assert_eq!(peak.value, 0.0);
    }

    #[test]
    fn test_backwards_timer_does_not_raise_value() {
        let options = PeakOptions::default();
        let mut peak = Peak::never();
        detect_peak(&mut peak, None, 50.0, 10.0, 1000.0, &options);
        detect_peak(&mut peak, None, 10.0, 10.0, 1200.0, &options);
        let decayed = peak.value;

        detect_peak(&mut peak, None, 10.0, 10.0, 1050.0, &options);
        assert_eq!(peak.value, decayed);
    }

    #[test]
    fn test_ignore_time_boundary() {
        let options = PeakOptions::default();
        let mut peak = Peak::never();
        assert!(detect_peak(&mut peak, None, 50.0, 10.0, 0.0, &options));
        // exactly ignore_time later: still ignored
        assert!(!detect_peak(&mut peak, None, 50.0, 10.0, 300.0, &options));
        assert!(detect_peak(&mut peak, None, 50.0, 10.0, 300.5, &options));
    }

    #[test]
    fn test_lookup_on_empty_history() {
        let history = TimedHistory::new();
        assert_eq!(history.lookup(0.0), None);
        assert_eq!(history.time_span(), None);
        assert_eq!(history.lookup_or_silent(10.0, 8), RawSample::silent(8));
    }

    #[test]
    fn test_extreme_fft_sizes() {
        for fft_size in [32, 32768] {
            let mut config = AnalyserConfig::default();
            config.fft_size = fft_size;
            let mut analyser = Analyser::new(config).unwrap();
            let data = analyser
                .analyse(&RawSample::silent(fft_size / 2), 16.0, 0.0)
                .unwrap();
            assert_eq!(data.time_domain_data().unwrap().len(), fft_size / 2);
        }

        for fft_size in [16, 65536, 513] {
            let mut config = AnalyserConfig::default();
            config.fft_size = fft_size;
            assert!(Analyser::new(config).is_err());
        }
    }

    #[test]
    fn test_initial_data_before_first_tick() {
        let analyser = Analyser::new(AnalyserConfig::default()).unwrap();
        let data = analyser.data();
        assert!(data.time_domain_data().unwrap().iter().all(|&v| v == 128));
        assert!(data.frequencies_data().unwrap().iter().all(|&v| v == 0));
        assert_eq!(data.energy(), Some(0.0));
        assert_eq!(data.peak(), Some(&Peak::never()));
        assert_eq!(data.multiband_peak().unwrap().len(), 8);
    }
}
