//! Peak (beat) value type and the threshold detector driving it

use crate::config::PeakOptions;
use crate::easing::Easing;
use serde::Serialize;
use tracing::debug;

/// A detected transient.
///
/// `value` is 1.0 at the moment of detection and decays towards 0.0,
/// `timer` is the absolute time (ms) of the detection, `None` while no peak
/// was ever detected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Peak {
    pub value: f64,
    pub timer: Option<f64>,
    pub energy: f64,
}

/// Where a peak stands relative to the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeakState {
    /// Never fired
    Unarmed,
    /// Fired less than `ignore_time` ago, detection disabled
    Cooldown,
    /// Eligible to fire
    Armed,
}

impl Peak {
    pub fn new(value: f64, timer: Option<f64>, energy: f64) -> Self {
        Self {
            value,
            timer,
            energy,
        }
    }

    /// A peak that has not been detected yet
    pub fn never() -> Self {
        Self::new(0.0, None, 0.0)
    }

    /// Replace every field with the ones of `other`
    pub fn overwrite(&mut self, other: &Peak) {
        *self = *other;
    }

    pub fn state(&self, now: f64, ignore_time: f64) -> PeakState {
        match self.timer {
            None => PeakState::Unarmed,
            Some(timer) if now - timer <= ignore_time => PeakState::Cooldown,
            Some(_) => PeakState::Armed,
        }
    }
}

impl Default for Peak {
    fn default() -> Self {
        Self::never()
    }
}

/// `energy / average > threshold`, where an average of 0 (or a ratio that is
/// not finite) never triggers.
pub fn exceeds_threshold(energy: f64, average: f64, threshold: f64) -> bool {
    if !(average > 0.0) {
        return false;
    }
    let ratio = energy / average;
    ratio.is_finite() && ratio > threshold
}

/// Value of a peak fired at `timer`, observed at `now`.
///
/// Always measured from the firing time, and exactly 0 from
/// `timer + persistency` on. A zero persistency means the peak is gone right
/// after firing.
pub fn decayed_value(timer: f64, now: f64, persistency: f64, easing: Easing) -> f64 {
    // compared as a sum: `now - timer` may fall a rounding step short of `persistency`
    if !(persistency > 0.0) || now >= timer + persistency {
        return 0.0;
    }
    easing.apply(1.0 - (now - timer) / persistency).max(0.0)
}

/// Advance the detector by one tick.
///
/// Fires (value 1.0, timer `now`, recorded in `history` when given) if the peak
/// is not in cooldown and the energy exceeds the threshold, otherwise keeps
/// decaying the current value. Returns whether a peak fired.
pub fn detect_peak(
    peak: &mut Peak,
    history: Option<&mut Vec<Peak>>,
    energy: f64,
    average: f64,
    now: f64,
    options: &PeakOptions,
) -> bool {
    let can_fire = match peak.state(now, options.ignore_time) {
        PeakState::Unarmed | PeakState::Armed => true,
        PeakState::Cooldown => false,
    };

    if can_fire && exceeds_threshold(energy, average, options.threshold) {
        let detected = Peak::new(1.0, Some(now), energy);
        debug!(
            "Peak detected at {:.1}ms (energy {:.3}, average {:.3})",
            now, energy, average
        );
        if let Some(history) = history {
            history.push(detected);
        }
        peak.overwrite(&detected);
        return true;
    }

    if let Some(timer) = peak.timer {
        if peak.value > 0.0 {
            let decayed = decayed_value(timer, now, options.peak_persistency, options.easing);
            // a timer going backwards must not raise the value again
            peak.value = peak.value.min(decayed);
        }
    }

    false
}
