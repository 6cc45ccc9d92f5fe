//! Configuration for the analyser
//!
//! A configuration is built once from [`AnalyserConfig::default`] and an optional
//! [`AnalyserConfigOverrides`] value, applied field by field, and never mutated
//! by the analyser afterwards.

use crate::easing::Easing;
use crate::error::{AudioError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Largest fft size accepted (matches what browser analyser nodes allow)
pub const MAX_FFT_SIZE: usize = 32768;

/// Smallest fft size accepted
pub const MIN_FFT_SIZE: usize = 32;

/// Full analyser configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyserConfig {
    /// Size of the fourier transform, power of 2. Sample buffers hold `fft_size / 2` values.
    pub fft_size: usize,

    /// Single band peak detection, comparing the current energy with the recent average
    pub peak_detection: PeakDetectionConfig,

    /// Same algorithm run independently on each frequency band
    pub multiband_peak_detection: MultibandPeakDetectionConfig,

    /// Which outputs the analyser must produce
    pub returns: ReturnsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakDetectionConfig {
    pub enabled: bool,
    pub options: PeakOptions,
}

/// Tuning of one peak detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakOptions {
    /// The higher it is, the harder a peak has to hit compared to the recent average
    pub threshold: f64,

    /// Time (ms) after a detection during which no new peak can be detected
    pub ignore_time: f64,

    /// Time window (ms) of energies kept to compute the average
    pub energy_persistence: f64,

    /// Time (ms) a peak takes to go from 1.0 down to 0.0
    pub peak_persistency: f64,

    /// Shape of the peak decay
    pub easing: Easing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultibandPeakDetectionConfig {
    pub enabled: bool,
    pub options: MultibandPeakOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultibandPeakOptions {
    /// Number of bands the spectrum is split into, power of 2, at most `fft_size / 2`
    pub bands: usize,
    pub threshold: f64,
    pub ignore_time: f64,
    pub energy_persistence: f64,
    pub peak_persistency: f64,
    pub easing: Easing,
}

/// Output selection. A chain is only computed when one of its outputs is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReturnsConfig {
    pub timedomain_data: bool,
    pub frequencies_data: bool,
    pub energy: bool,
    pub energy_history: bool,
    pub energy_average: bool,
    pub peak: bool,
    pub peak_history: bool,
    pub multiband_energy: bool,
    pub multiband_energy_history: bool,
    pub multiband_energy_average: bool,
    pub multiband_peak: bool,
    pub multiband_peak_history: bool,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 512,
            peak_detection: PeakDetectionConfig::default(),
            multiband_peak_detection: MultibandPeakDetectionConfig::default(),
            returns: ReturnsConfig::default(),
        }
    }
}

impl Default for PeakDetectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            options: PeakOptions::default(),
        }
    }
}

impl Default for PeakOptions {
    fn default() -> Self {
        Self {
            threshold: 1.8,
            ignore_time: 300.0,
            energy_persistence: 2000.0,
            peak_persistency: 300.0,
            easing: Easing::Linear,
        }
    }
}

impl Default for MultibandPeakDetectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            options: MultibandPeakOptions::default(),
        }
    }
}

impl Default for MultibandPeakOptions {
    fn default() -> Self {
        Self {
            bands: 8,
            // band energies fluctuate less than the full signal
            threshold: 1.2,
            ignore_time: 300.0,
            energy_persistence: 1200.0,
            peak_persistency: 300.0,
            easing: Easing::Linear,
        }
    }
}

impl Default for ReturnsConfig {
    fn default() -> Self {
        Self::all()
    }
}

impl ReturnsConfig {
    /// Every output requested
    pub const fn all() -> Self {
        Self {
            timedomain_data: true,
            frequencies_data: true,
            energy: true,
            energy_history: true,
            energy_average: true,
            peak: true,
            peak_history: true,
            multiband_energy: true,
            multiband_energy_history: true,
            multiband_energy_average: true,
            multiband_peak: true,
            multiband_peak_history: true,
        }
    }

    /// No output requested
    pub const fn none() -> Self {
        Self {
            timedomain_data: false,
            frequencies_data: false,
            energy: false,
            energy_history: false,
            energy_average: false,
            peak: false,
            peak_history: false,
            multiband_energy: false,
            multiband_energy_history: false,
            multiband_energy_average: false,
            multiband_peak: false,
            multiband_peak_history: false,
        }
    }
}

impl MultibandPeakOptions {
    /// Detector tuning shared with the single band algorithm
    pub fn peak_options(&self) -> PeakOptions {
        PeakOptions {
            threshold: self.threshold,
            ignore_time: self.ignore_time,
            energy_persistence: self.energy_persistence,
            peak_persistency: self.peak_persistency,
            easing: self.easing,
        }
    }
}

/// Advisory configuration problems. They never abort construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    #[error("The number of bands for the multiband detection algorithm must be a power of 2 (got {0})")]
    BandsNotPowerOfTwo(usize),

    #[error("returns.peak_history ({peak_history}) and returns.multiband_peak_history ({multiband_peak_history}) should have the same value")]
    PeakHistoryMismatch {
        peak_history: bool,
        multiband_peak_history: bool,
    },

    #[error("The peak can't be computed if the peak detection algorithm is disabled")]
    PeakWithoutDetection,

    #[error("The peak history can't be computed if the peak detection algorithm is disabled")]
    PeakHistoryWithoutDetection,

    #[error("The multiband peak can't be computed if the multiband peak detection algorithm is disabled")]
    MultibandPeakWithoutDetection,

    #[error("The multiband peak history can't be computed if the multiband peak detection algorithm is disabled")]
    MultibandPeakHistoryWithoutDetection,
}

impl AnalyserConfig {
    /// Defaults with `overrides` layered on top, validated
    pub fn build(overrides: &AnalyserConfigOverrides) -> Result<Self> {
        let config = Self::default().with_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Parse overrides from JSON and layer them over the defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let overrides: AnalyserConfigOverrides = serde_json::from_str(json)?;
        Self::build(&overrides)
    }

    /// Read overrides from a JSON file and layer them over the defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Copy of `self` where every field set in `overrides` replaces the current value
    pub fn with_overrides(&self, overrides: &AnalyserConfigOverrides) -> Self {
        let mut config = self.clone();

        if let Some(fft_size) = overrides.fft_size {
            config.fft_size = fft_size;
        }
        if let Some(ref peak) = overrides.peak_detection {
            peak.apply(&mut config.peak_detection);
        }
        if let Some(ref multiband) = overrides.multiband_peak_detection {
            multiband.apply(&mut config.multiband_peak_detection);
        }
        if let Some(ref returns) = overrides.returns {
            returns.apply(&mut config.returns);
        }

        config
    }

    /// Number of values in each sample buffer
    pub fn buffer_len(&self) -> usize {
        self.fft_size / 2
    }

    /// Validate values that would make analysis meaningless
    pub fn validate(&self) -> Result<()> {
        if self.fft_size < MIN_FFT_SIZE {
            return Err(AudioError::Config(format!(
                "fft_size too small: {} (min {})",
                self.fft_size, MIN_FFT_SIZE
            )));
        }

        if self.fft_size > MAX_FFT_SIZE {
            return Err(AudioError::Config(format!(
                "fft_size too large: {} (max {})",
                self.fft_size, MAX_FFT_SIZE
            )));
        }

        if !self.fft_size.is_power_of_two() {
            return Err(AudioError::Config(format!(
                "fft_size must be a power of 2 (got {})",
                self.fft_size
            )));
        }

        // at most one band per frequency bin
        let bands = self.multiband_peak_detection.options.bands;
        if bands == 0 || bands > self.buffer_len() {
            return Err(AudioError::Config(format!(
                "multiband_peak_detection.options.bands must be between 1 and {} (got {})",
                self.buffer_len(),
                bands
            )));
        }

        validate_options("peak_detection", &self.peak_detection.options)?;
        validate_options(
            "multiband_peak_detection",
            &self.multiband_peak_detection.options.peak_options(),
        )?;

        Ok(())
    }

    /// Advisory problems, reported but not fatal
    pub fn warnings(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let returns = &self.returns;
        let multiband = &self.multiband_peak_detection;

        if multiband.enabled && !multiband.options.bands.is_power_of_two() {
            warnings.push(ConfigWarning::BandsNotPowerOfTwo(multiband.options.bands));
        }

        if returns.peak_history != returns.multiband_peak_history {
            warnings.push(ConfigWarning::PeakHistoryMismatch {
                peak_history: returns.peak_history,
                multiband_peak_history: returns.multiband_peak_history,
            });
        }

        if !multiband.enabled {
            if returns.multiband_peak {
                warnings.push(ConfigWarning::MultibandPeakWithoutDetection);
            }
            if returns.multiband_peak_history {
                warnings.push(ConfigWarning::MultibandPeakHistoryWithoutDetection);
            }
        }

        if !self.peak_detection.enabled {
            if returns.peak {
                warnings.push(ConfigWarning::PeakWithoutDetection);
            }
            if returns.peak_history {
                warnings.push(ConfigWarning::PeakHistoryWithoutDetection);
            }
        }

        warnings
    }
}

fn validate_options(section: &str, options: &PeakOptions) -> Result<()> {
    let fields = [
        ("threshold", options.threshold),
        ("ignore_time", options.ignore_time),
        ("energy_persistence", options.energy_persistence),
        ("peak_persistency", options.peak_persistency),
    ];

    for (name, value) in fields {
        if !value.is_finite() || value < 0.0 {
            return Err(AudioError::Config(format!(
                "{}.options.{} must be a finite, non-negative number (got {})",
                section, name, value
            )));
        }
    }

    Ok(())
}

/// Partial configuration. Every `None` keeps the base value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyserConfigOverrides {
    pub fft_size: Option<usize>,
    pub peak_detection: Option<PeakDetectionOverrides>,
    pub multiband_peak_detection: Option<MultibandPeakDetectionOverrides>,
    pub returns: Option<ReturnsOverrides>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PeakDetectionOverrides {
    pub enabled: Option<bool>,
    pub options: Option<PeakOptionsOverrides>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PeakOptionsOverrides {
    pub threshold: Option<f64>,
    pub ignore_time: Option<f64>,
    pub energy_persistence: Option<f64>,
    pub peak_persistency: Option<f64>,
    pub easing: Option<Easing>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MultibandPeakDetectionOverrides {
    pub enabled: Option<bool>,
    pub options: Option<MultibandPeakOptionsOverrides>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MultibandPeakOptionsOverrides {
    pub bands: Option<usize>,
    pub threshold: Option<f64>,
    pub ignore_time: Option<f64>,
    pub energy_persistence: Option<f64>,
    pub peak_persistency: Option<f64>,
    pub easing: Option<Easing>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReturnsOverrides {
    pub timedomain_data: Option<bool>,
    pub frequencies_data: Option<bool>,
    pub energy: Option<bool>,
    pub energy_history: Option<bool>,
    pub energy_average: Option<bool>,
    pub peak: Option<bool>,
    pub peak_history: Option<bool>,
    pub multiband_energy: Option<bool>,
    pub multiband_energy_history: Option<bool>,
    pub multiband_energy_average: Option<bool>,
    pub multiband_peak: Option<bool>,
    pub multiband_peak_history: Option<bool>,
}

fn set<T: Copy>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

impl PeakDetectionOverrides {
    fn apply(&self, target: &mut PeakDetectionConfig) {
        set(&mut target.enabled, self.enabled);
        if let Some(ref options) = self.options {
            set(&mut target.options.threshold, options.threshold);
            set(&mut target.options.ignore_time, options.ignore_time);
            set(&mut target.options.energy_persistence, options.energy_persistence);
            set(&mut target.options.peak_persistency, options.peak_persistency);
            set(&mut target.options.easing, options.easing);
        }
    }
}

impl MultibandPeakDetectionOverrides {
    fn apply(&self, target: &mut MultibandPeakDetectionConfig) {
        set(&mut target.enabled, self.enabled);
        if let Some(ref options) = self.options {
            set(&mut target.options.bands, options.bands);
            set(&mut target.options.threshold, options.threshold);
            set(&mut target.options.ignore_time, options.ignore_time);
            set(&mut target.options.energy_persistence, options.energy_persistence);
            set(&mut target.options.peak_persistency, options.peak_persistency);
            set(&mut target.options.easing, options.easing);
        }
    }
}

impl ReturnsOverrides {
    fn apply(&self, target: &mut ReturnsConfig) {
        set(&mut target.timedomain_data, self.timedomain_data);
        set(&mut target.frequencies_data, self.frequencies_data);
        set(&mut target.energy, self.energy);
        set(&mut target.energy_history, self.energy_history);
        set(&mut target.energy_average, self.energy_average);
        set(&mut target.peak, self.peak);
        set(&mut target.peak_history, self.peak_history);
        set(&mut target.multiband_energy, self.multiband_energy);
        set(&mut target.multiband_energy_history, self.multiband_energy_history);
        set(&mut target.multiband_energy_average, self.multiband_energy_average);
        set(&mut target.multiband_peak, self.multiband_peak);
        set(&mut target.multiband_peak_history, self.multiband_peak_history);
    }
}
