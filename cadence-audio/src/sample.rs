//! Raw sample pair handed to the analyser on every tick

use crate::error::{AudioError, Result};
use bytes::Bytes;

/// Centre value of unsigned time-domain bytes
pub const TIME_DOMAIN_CENTER: u8 = 128;

/// One snapshot of the audio signal: time-domain bytes (centred at 128) and
/// frequency magnitudes (0-255), both `fft_size / 2` long.
///
/// The buffers are reference counted, cloning a sample is cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSample {
    time_domain: Bytes,
    frequencies: Bytes,
}

impl RawSample {
    /// Build a sample, both buffers must have the same length
    pub fn new(time_domain: impl Into<Bytes>, frequencies: impl Into<Bytes>) -> Result<Self> {
        let time_domain = time_domain.into();
        let frequencies = frequencies.into();

        if time_domain.len() != frequencies.len() {
            return Err(AudioError::Format(format!(
                "time domain ({} values) and frequency ({} values) buffers differ in length",
                time_domain.len(),
                frequencies.len()
            )));
        }

        Ok(Self {
            time_domain,
            frequencies,
        })
    }

    /// Buffers already known to have the same length
    pub(crate) fn from_parts(time_domain: Bytes, frequencies: Bytes) -> Self {
        debug_assert_eq!(time_domain.len(), frequencies.len());
        Self {
            time_domain,
            frequencies,
        }
    }

    /// Zero signal: flat time domain at the centre value, empty spectrum
    pub fn silent(len: usize) -> Self {
        Self {
            time_domain: Bytes::from(vec![TIME_DOMAIN_CENTER; len]),
            frequencies: Bytes::from(vec![0u8; len]),
        }
    }

    pub fn time_domain(&self) -> &Bytes {
        &self.time_domain
    }

    pub fn frequencies(&self) -> &Bytes {
        &self.frequencies
    }

    /// Number of values in each buffer
    pub fn len(&self) -> usize {
        self.time_domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_domain.is_empty()
    }
}
