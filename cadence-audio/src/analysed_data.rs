//! Snapshot of everything the analyser computed for a session

use crate::config::ReturnsConfig;
use crate::energy::EnergyHistory;
use crate::peak::Peak;
use crate::sample::TIME_DOMAIN_CENTER;
use bytes::Bytes;
use serde_json::{json, Map, Value};

/// Features of one analysis session.
///
/// Owned and mutated by its [`Analyser`](crate::analyser::Analyser). Read
/// accessors return `None` for outputs that were not requested through
/// [`ReturnsConfig`].
#[derive(Debug, Clone)]
pub struct AnalysedData {
    returns: ReturnsConfig,
    buffer_len: usize,
    bands: usize,

    pub(crate) time_domain: Bytes,
    pub(crate) frequencies: Bytes,

    pub(crate) energy: f64,
    pub(crate) energy_history: EnergyHistory<f64>,
    pub(crate) energy_average: f64,
    pub(crate) peak: Peak,
    pub(crate) peak_history: Vec<Peak>,

    pub(crate) multiband_energy: Vec<f64>,
    pub(crate) multiband_energy_history: EnergyHistory<Vec<f64>>,
    pub(crate) multiband_energy_average: Vec<f64>,
    pub(crate) multiband_peak: Vec<Peak>,
    pub(crate) multiband_peak_history: Vec<Vec<Peak>>,
}

impl AnalysedData {
    pub fn new(buffer_len: usize, bands: usize, returns: ReturnsConfig) -> Self {
        Self {
            returns,
            buffer_len,
            bands,
            time_domain: Bytes::from(vec![TIME_DOMAIN_CENTER; buffer_len]),
            frequencies: Bytes::from(vec![0u8; buffer_len]),
            energy: 0.0,
            energy_history: EnergyHistory::new(),
            energy_average: 0.0,
            peak: Peak::never(),
            peak_history: Vec::new(),
            multiband_energy: vec![0.0; bands],
            multiband_energy_history: EnergyHistory::new(),
            multiband_energy_average: vec![0.0; bands],
            multiband_peak: vec![Peak::never(); bands],
            multiband_peak_history: vec![Vec::new(); bands],
        }
    }

    /// Number of values in each sample buffer
    pub fn buffer_len(&self) -> usize {
        self.buffer_len
    }

    /// Number of frequency bands of the multiband outputs
    pub fn bands(&self) -> usize {
        self.bands
    }

    pub fn returns(&self) -> &ReturnsConfig {
        &self.returns
    }

    pub fn time_domain_data(&self) -> Option<&Bytes> {
        self.returns.timedomain_data.then_some(&self.time_domain)
    }

    pub fn frequencies_data(&self) -> Option<&Bytes> {
        self.returns.frequencies_data.then_some(&self.frequencies)
    }

    /// Energy of the last analysed sample
    pub fn energy(&self) -> Option<f64> {
        self.returns.energy.then_some(self.energy)
    }

    pub fn energy_history(&self) -> Option<&EnergyHistory<f64>> {
        self.returns.energy_history.then_some(&self.energy_history)
    }

    /// Mean energy over the persistence window
    pub fn energy_average(&self) -> Option<f64> {
        self.returns.energy_average.then_some(self.energy_average)
    }

    pub fn peak(&self) -> Option<&Peak> {
        self.returns.peak.then_some(&self.peak)
    }

    /// Every peak detected since the session started
    pub fn peak_history(&self) -> Option<&[Peak]> {
        self.returns.peak_history.then_some(self.peak_history.as_slice())
    }

    pub fn multiband_energy(&self) -> Option<&[f64]> {
        self.returns
            .multiband_energy
            .then_some(self.multiband_energy.as_slice())
    }

    pub fn multiband_energy_history(&self) -> Option<&EnergyHistory<Vec<f64>>> {
        self.returns
            .multiband_energy_history
            .then_some(&self.multiband_energy_history)
    }

    pub fn multiband_energy_average(&self) -> Option<&[f64]> {
        self.returns
            .multiband_energy_average
            .then_some(self.multiband_energy_average.as_slice())
    }

    pub fn multiband_peak(&self) -> Option<&[Peak]> {
        self.returns
            .multiband_peak
            .then_some(self.multiband_peak.as_slice())
    }

    /// Detected peaks, one list per band
    pub fn multiband_peak_history(&self) -> Option<&[Vec<Peak>]> {
        self.returns
            .multiband_peak_history
            .then_some(self.multiband_peak_history.as_slice())
    }

    /// JSON object holding exactly the returned outputs
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("buffer_size".to_string(), json!(self.buffer_len));

        if let Some(data) = self.time_domain_data() {
            map.insert("timedomain_data".to_string(), json!(data.as_ref()));
        }
        if let Some(data) = self.frequencies_data() {
            map.insert("frequencies_data".to_string(), json!(data.as_ref()));
        }
        if let Some(energy) = self.energy() {
            map.insert("energy".to_string(), json!(energy));
        }
        if let Some(history) = self.energy_history() {
            map.insert("energy_history".to_string(), json!(history));
        }
        if let Some(average) = self.energy_average() {
            map.insert("energy_average".to_string(), json!(average));
        }
        if let Some(peak) = self.peak() {
            map.insert("peak".to_string(), json!(peak));
        }
        if let Some(history) = self.peak_history() {
            map.insert("peak_history".to_string(), json!(history));
        }
        if let Some(energy) = self.multiband_energy() {
            map.insert("multiband_energy".to_string(), json!(energy));
        }
        if let Some(history) = self.multiband_energy_history() {
            map.insert("multiband_energy_history".to_string(), json!(history));
        }
        if let Some(average) = self.multiband_energy_average() {
            map.insert("multiband_energy_average".to_string(), json!(average));
        }
        if let Some(peak) = self.multiband_peak() {
            map.insert("multiband_peak".to_string(), json!(peak));
        }
        if let Some(history) = self.multiband_peak_history() {
            map.insert("multiband_peak_history".to_string(), json!(history));
        }

        Value::Object(map)
    }
}
