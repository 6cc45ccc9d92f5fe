//! Session wiring a source to an analyser

use crate::analysed_data::AnalysedData;
use crate::analyser::Analyser;
use crate::config::AnalyserConfig;
use crate::error::{AudioError, Result};
use crate::sample::RawSample;
use crate::source::AudioSource;
use tracing::{info, warn};

/// Source and analyser for one session.
///
/// In capture mode the source is not started and every call is answered at
/// the timer the caller asks for, so frames can be rendered at any pace.
pub struct AudioSession<S: AudioSource> {
    source: S,
    analyser: Analyser,
    capture: bool,
    initialized: bool,
}

impl<S: AudioSource> AudioSession<S> {
    pub fn new(source: S, config: AnalyserConfig, capture: bool) -> Result<Self> {
        if source.buffer_len() != config.buffer_len() {
            return Err(AudioError::Config(format!(
                "Source '{}' produces {} values per buffer, analyser expects {}",
                source.name(),
                source.buffer_len(),
                config.buffer_len()
            )));
        }

        if capture && !source.supports_capture() {
            warn!(
                "Audio won't work properly in capture mode: source '{}' can't be read at arbitrary timers",
                source.name()
            );
        }

        Ok(Self {
            source,
            analyser: Analyser::new(config)?,
            capture,
            initialized: false,
        })
    }

    /// Load the source, then start it unless capturing
    pub async fn init(&mut self) -> Result<()> {
        self.source.load().await?;
        if !self.capture {
            self.source.play()?;
        }
        self.initialized = true;
        info!("Audio session ready (source '{}', capture: {})", self.source.name(), self.capture);
        Ok(())
    }

    /// Raw sample at `timer` (ms)
    pub fn audio_data(&mut self, timer: f64) -> Result<RawSample> {
        self.ensure_initialized()?;
        self.source.raw_sample(timer)
    }

    /// Fetch the sample at `timer` and analyse it
    pub fn analysed(&mut self, delta_time: f64, timer: f64) -> Result<&AnalysedData> {
        let sample = self.audio_data(timer)?;
        self.analyser.analyse(&sample, delta_time, timer)
    }

    pub fn play(&mut self) -> Result<()> {
        self.ensure_initialized()?;
        self.source.play()
    }

    pub fn analyser(&self) -> &Analyser {
        &self.analyser
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn is_capture(&self) -> bool {
        self.capture
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(AudioError::Source("Audio session used before init".to_string()))
        }
    }
}
