//! Timer-indexed store of raw samples, filled ahead of time by an offline pass
//! and queried by timer while rendering.

use crate::error::{AudioError, Result};
use crate::sample::RawSample;

/// A sample and the absolute time (ms) it was recorded at
#[derive(Debug, Clone, PartialEq)]
pub struct TimedEntry {
    pub timer: f64,
    pub sample: RawSample,
}

/// Append-only history ordered by non-decreasing timers
#[derive(Debug, Clone, Default)]
pub struct TimedHistory {
    entries: Vec<TimedEntry>,
}

impl TimedHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Record `sample` at `timer`.
    ///
    /// Timers must not go backwards; entries are never reordered.
    pub fn append(&mut self, sample: RawSample, timer: f64) -> Result<()> {
        if !timer.is_finite() {
            return Err(AudioError::History(format!("Timer must be finite (got {})", timer)));
        }

        if let Some(last) = self.entries.last() {
            if timer < last.timer {
                return Err(AudioError::History(format!(
                    "Timer {} is lower than the last recorded timer {}",
                    timer, last.timer
                )));
            }
        }

        self.entries.push(TimedEntry { timer, sample });
        Ok(())
    }

    /// Last sample recorded at or before `timer`.
    ///
    /// `None` when the history is empty or every entry is later than `timer`.
    pub fn lookup(&self, timer: f64) -> Option<&RawSample> {
        self.lookup_entry(timer).map(|entry| &entry.sample)
    }

    pub fn lookup_entry(&self, timer: f64) -> Option<&TimedEntry> {
        // entries are sorted, so this is the index of the first entry after `timer`
        let after = self.entries.partition_point(|entry| entry.timer <= timer);
        after.checked_sub(1).map(|index| &self.entries[index])
    }

    /// Same as [`lookup`](Self::lookup), with a silent sample of `len` values
    /// standing in for a missing entry
    pub fn lookup_or_silent(&self, timer: f64, len: usize) -> RawSample {
        self.lookup(timer)
            .cloned()
            .unwrap_or_else(|| RawSample::silent(len))
    }

    /// Timers of the first and last entries
    pub fn time_span(&self) -> Option<(f64, f64)> {
        match (self.entries.first(), self.entries.last()) {
            (Some(first), Some(last)) => Some((first.timer, last.timer)),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TimedEntry> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
