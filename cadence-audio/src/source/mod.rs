//! Audio sources: anything able to hand a [`RawSample`] to the analyser on demand

pub mod pcm;
pub mod precomputed;

use crate::error::Result;
use crate::sample::RawSample;
use async_trait::async_trait;

pub use pcm::PcmSource;
pub use precomputed::PrecomputedSource;

/// Capability the analysis pipeline needs from a sound source
#[async_trait]
pub trait AudioSource: Send {
    /// Prepare the source (fetch, decode, precompute...). Resolves once ready.
    async fn load(&mut self) -> Result<()>;

    /// Start producing audio
    fn play(&mut self) -> Result<()>;

    /// Sample of the signal at `timer` (ms). Live sources may ignore the timer.
    fn raw_sample(&mut self, timer: f64) -> Result<RawSample>;

    /// Number of values in each produced buffer
    fn buffer_len(&self) -> usize;

    /// Whether `raw_sample` answers arbitrary timers, as needed when frames
    /// are rendered slower than real time
    fn supports_capture(&self) -> bool {
        false
    }

    fn name(&self) -> &str;
}
