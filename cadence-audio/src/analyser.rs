//! Per-tick analysis pipeline
//!
//! Only the parts of the pipeline needed by the requested outputs are run:
//! energy → energy average → peak, and multiband energy → multiband average →
//! multiband peak. Skipping a stage never changes what the others compute.

use crate::analysed_data::AnalysedData;
use crate::config::{AnalyserConfig, AnalyserConfigOverrides, ConfigWarning};
use crate::energy::{compute_energy, compute_multiband_energy, energy_average, multiband_energy_average};
use crate::error::{AudioError, Result};
use crate::peak::detect_peak;
use crate::sample::RawSample;
use tracing::{debug, warn};

/// Stages run on every tick, derived once from the configuration.
///
/// `returns` flags select the stages, `enabled` flags gate the peak stage of
/// their algorithm: a peak requested for a disabled algorithm is not computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputePlan {
    pub energy: bool,
    pub energy_average: bool,
    pub peak: bool,
    pub peak_history: bool,
    pub multiband_energy: bool,
    pub multiband_energy_average: bool,
    pub multiband_peak: bool,
    pub multiband_peak_history: bool,
}

impl ComputePlan {
    pub fn from_config(config: &AnalyserConfig) -> Self {
        let returns = &config.returns;

        let peak = config.peak_detection.enabled && (returns.peak || returns.peak_history);
        let energy_average = returns.energy_average || peak;
        let energy = returns.energy || returns.energy_history || energy_average;

        let multiband_peak = config.multiband_peak_detection.enabled
            && (returns.multiband_peak || returns.multiband_peak_history);
        let multiband_energy_average = returns.multiband_energy_average || multiband_peak;
        let multiband_energy =
            returns.multiband_energy || returns.multiband_energy_history || multiband_energy_average;

        Self {
            energy,
            energy_average,
            peak,
            peak_history: peak && returns.peak_history,
            multiband_energy,
            multiband_energy_average,
            multiband_peak,
            multiband_peak_history: multiband_peak && returns.multiband_peak_history,
        }
    }
}

/// Energy and beat analyser for one session
pub struct Analyser {
    config: AnalyserConfig,
    plan: ComputePlan,
    warnings: Vec<ConfigWarning>,
    data: AnalysedData,
    iterations: u64,
}

impl Analyser {
    /// Create an analyser. Invalid values are errors, advisory problems are
    /// logged and kept in [`Analyser::warnings`].
    pub fn new(config: AnalyserConfig) -> Result<Self> {
        config.validate()?;

        let warnings = config.warnings();
        for warning in &warnings {
            warn!("Analyser configuration: {}", warning);
        }

        let plan = ComputePlan::from_config(&config);
        debug!("Analyser compute plan: {:?}", plan);

        let data = AnalysedData::new(
            config.buffer_len(),
            config.multiband_peak_detection.options.bands,
            config.returns,
        );

        Ok(Self {
            config,
            plan,
            warnings,
            data,
            iterations: 0,
        })
    }

    /// Defaults with `overrides` layered on top
    pub fn with_overrides(overrides: &AnalyserConfigOverrides) -> Result<Self> {
        Self::new(AnalyserConfig::build(overrides)?)
    }

    /// Analyse one sample.
    ///
    /// `delta_time` is the time (ms) elapsed since the previous call and
    /// `timer` the absolute time (ms) of this one. A rejected sample leaves the
    /// analysed data untouched.
    pub fn analyse(&mut self, sample: &RawSample, delta_time: f64, timer: f64) -> Result<&AnalysedData> {
        let expected = self.config.buffer_len();
        if sample.len() != expected {
            warn!("Rejected sample of {} values (expected {})", sample.len(), expected);
            return Err(AudioError::Format(format!(
                "Sample has {} values, analyser expects {}",
                sample.len(),
                expected
            )));
        }

        if !delta_time.is_finite() || delta_time < 0.0 {
            return Err(AudioError::Format(format!(
                "Delta time must be a finite, non-negative number of ms (got {})",
                delta_time
            )));
        }

        if !timer.is_finite() {
            return Err(AudioError::Format(format!("Timer must be finite (got {})", timer)));
        }

        self.iterations = self.iterations.saturating_add(1);

        let plan = self.plan;
        let data = &mut self.data;
        data.time_domain = sample.time_domain().clone();
        data.frequencies = sample.frequencies().clone();

        if plan.energy {
            let options = &self.config.peak_detection.options;
            let energy = compute_energy(sample.time_domain());
            data.energy = energy;
            data.energy_history.push(energy, delta_time, options.energy_persistence);

            if plan.energy_average {
                data.energy_average = energy_average(&data.energy_history);

                if plan.peak {
                    let history = if plan.peak_history {
                        Some(&mut data.peak_history)
                    } else {
                        None
                    };
                    detect_peak(&mut data.peak, history, energy, data.energy_average, timer, options);
                }
            }
        }

        if plan.multiband_energy {
            let multiband = &self.config.multiband_peak_detection.options;
            let bands = multiband.bands;
            let energies = compute_multiband_energy(sample.frequencies(), bands);
            data.multiband_energy = energies.clone();
            data.multiband_energy_history
                .push(energies, delta_time, multiband.energy_persistence);

            if plan.multiband_energy_average {
                data.multiband_energy_average =
                    multiband_energy_average(&data.multiband_energy_history, bands);

                if plan.multiband_peak {
                    let options = multiband.peak_options();
                    for band in 0..bands {
                        let energy = data.multiband_energy[band];
                        let average = data.multiband_energy_average[band];
                        let history = if plan.multiband_peak_history {
                            Some(&mut data.multiband_peak_history[band])
                        } else {
                            None
                        };
                        detect_peak(&mut data.multiband_peak[band], history, energy, average, timer, &options);
                    }
                }
            }
        }

        Ok(&self.data)
    }

    pub fn data(&self) -> &AnalysedData {
        &self.data
    }

    pub fn config(&self) -> &AnalyserConfig {
        &self.config
    }

    pub fn plan(&self) -> &ComputePlan {
        &self.plan
    }

    /// Advisory problems found in the configuration
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    /// Number of analysed samples
    pub fn iterations(&self) -> u64 {
        self.iterations
    }
}
