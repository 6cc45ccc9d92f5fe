//! Signal energy, band energy and their rolling averages

use crate::sample::TIME_DOMAIN_CENTER;
use serde::Serialize;
use std::collections::VecDeque;
use std::ops::Range;

/// Mean absolute deviation of the time-domain bytes from the centre value.
///
/// Loudness proxy in `[0, 127.5]`, 0 for an empty buffer.
pub fn compute_energy(time_domain: &[u8]) -> f64 {
    if time_domain.is_empty() {
        return 0.0;
    }

    let center = TIME_DOMAIN_CENTER as f64;
    let total: f64 = time_domain.iter().map(|&v| (v as f64 - center).abs()).sum();
    total / time_domain.len() as f64
}

/// One stored energy measure and the time (ms) elapsed since the previous one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyEntry<T> {
    pub value: T,
    pub delta_time: f64,
}

/// Energies of the last `window` milliseconds, newest last.
///
/// Pruning rule: after a push, the history keeps the shortest run of newest
/// entries whose delta times add up to at least the window. The entry that
/// makes the sum reach the window is kept, everything older is dropped. When
/// the whole history spans less than the window nothing is dropped. The kept
/// span therefore never exceeds the window by more than the oldest kept entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EnergyHistory<T> {
    entries: VecDeque<EnergyEntry<T>>,
}

impl<T> Default for EnergyHistory<T> {
    fn default() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }
}

impl<T> EnergyHistory<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a measure then drop what fell out of the window
    pub fn push(&mut self, value: T, delta_time: f64, window: f64) {
        self.entries.push_back(EnergyEntry { value, delta_time });

        let mut span = 0.0;
        let mut keep = self.entries.len();
        for (count, entry) in self.entries.iter().rev().enumerate() {
            span += entry.delta_time;
            if span >= window {
                keep = count + 1;
                break;
            }
        }

        let excess = self.entries.len() - keep;
        self.entries.drain(..excess);
    }

    pub fn entries(&self) -> impl ExactSizeIterator<Item = &EnergyEntry<T>> + '_ {
        self.entries.iter()
    }

    pub fn values(&self) -> impl ExactSizeIterator<Item = &T> + '_ {
        self.entries.iter().map(|entry| &entry.value)
    }

    pub fn latest(&self) -> Option<&T> {
        self.entries.back().map(|entry| &entry.value)
    }

    /// Sum of the stored delta times
    pub fn span(&self) -> f64 {
        self.entries.iter().map(|entry| entry.delta_time).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Arithmetic mean of the stored energies, 0 for an empty history
pub fn energy_average(history: &EnergyHistory<f64>) -> f64 {
    if history.is_empty() {
        return 0.0;
    }
    history.values().sum::<f64>() / history.len() as f64
}

/// Index ranges of `band_count` bands over `len` frequency bins.
///
/// The band edges follow `x²` so low bands cover fewer bins than high ones:
/// band `b` starts at `floor((b / band_count)² · len)`. Ranges are contiguous,
/// may be empty at the low end, and together cover exactly `0..len`.
pub fn band_boundaries(band_count: usize, len: usize) -> Vec<Range<usize>> {
    if band_count == 0 {
        return Vec::new();
    }

    let edge = |band: usize| -> usize {
        let band = band as u128;
        let count = band_count as u128;
        (band * band * len as u128 / (count * count)) as usize
    };

    (0..band_count).map(|band| edge(band)..edge(band + 1)).collect()
}

/// Mean magnitude of each band, 0 for bands without any bin
pub fn compute_multiband_energy(frequencies: &[u8], band_count: usize) -> Vec<f64> {
    band_boundaries(band_count, frequencies.len())
        .into_iter()
        .map(|range| {
            if range.is_empty() {
                return 0.0;
            }
            let width = range.len() as f64;
            let total: f64 = frequencies[range].iter().map(|&v| v as f64).sum();
            total / width
        })
        .collect()
}

/// Elementwise mean of the stored band energies, zeros for an empty history
pub fn multiband_energy_average(history: &EnergyHistory<Vec<f64>>, band_count: usize) -> Vec<f64> {
    let mut averages = vec![0.0; band_count];
    if history.is_empty() {
        return averages;
    }

    for bands in history.values() {
        for (average, value) in averages.iter_mut().zip(bands.iter()) {
            *average += value;
        }
    }

    let count = history.len() as f64;
    for average in averages.iter_mut() {
        *average /= count;
    }
    averages
}
