//! Source replaying a precomputed history, for rendering slower than real time

use crate::error::{AudioError, Result};
use crate::precompute::PrecomputeHandle;
use crate::sample::RawSample;
use crate::source::AudioSource;
use crate::timed_history::TimedHistory;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Answers any timer from a [`TimedHistory`]. Missing entries (before the
/// first recorded timer) come back as a silent sample.
pub struct PrecomputedSource {
    job: Option<PrecomputeHandle>,
    history: Option<Arc<TimedHistory>>,
    buffer_len: usize,
}

impl PrecomputedSource {
    /// Source whose `load` waits for `job` to finish
    pub fn new(job: PrecomputeHandle, buffer_len: usize) -> Self {
        Self {
            job: Some(job),
            history: None,
            buffer_len,
        }
    }

    /// Source over an already filled history
    pub fn from_history(history: Arc<TimedHistory>, buffer_len: usize) -> Self {
        Self {
            job: None,
            history: Some(history),
            buffer_len,
        }
    }

    pub fn history(&self) -> Option<&Arc<TimedHistory>> {
        self.history.as_ref()
    }
}

#[async_trait]
impl AudioSource for PrecomputedSource {
    async fn load(&mut self) -> Result<()> {
        if let Some(job) = self.job.take() {
            info!("Waiting for the precompute job");
            let history = job.wait().await?;
            info!("Audio was processed ({} frames)", history.len());
            self.history = Some(history);
        }

        if self.history.is_none() {
            return Err(AudioError::Source("No precomputed history to load".to_string()));
        }
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        // frames are pulled by timer, there is nothing to start
        debug!("Precomputed source does not play audio");
        Ok(())
    }

    fn raw_sample(&mut self, timer: f64) -> Result<RawSample> {
        let history = self.history.as_ref().ok_or_else(|| {
            AudioError::Source("Precomputed source used before being loaded".to_string())
        })?;

        let sample = history.lookup_or_silent(timer, self.buffer_len);
        if sample.len() != self.buffer_len {
            return Err(AudioError::Format(format!(
                "Precomputed sample has {} values, expected {}",
                sample.len(),
                self.buffer_len
            )));
        }
        Ok(sample)
    }

    fn buffer_len(&self) -> usize {
        self.buffer_len
    }

    fn supports_capture(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "precomputed"
    }
}
