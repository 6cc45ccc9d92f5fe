//! In-memory PCM source
//!
//! Turns mono `f32` PCM into the byte buffers an analyser node produces:
//! Blackman window, FFT, magnitudes smoothed over time, converted to dB and
//! mapped from `[MIN_DECIBELS, MAX_DECIBELS]` onto `0..=255`.

use crate::error::{AudioError, Result};
use crate::precompute::{spawn_precompute, PrecomputeHandle};
use crate::sample::RawSample;
use crate::source::AudioSource;
use crate::timed_history::TimedEntry;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, Stream};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;
use tracing::{debug, info};

pub const MIN_DECIBELS: f32 = -100.0;
pub const MAX_DECIBELS: f32 = -30.0;
pub const SMOOTHING_TIME_CONSTANT: f32 = 0.8;

/// Spectrum state carried from one frame to the next
#[derive(Clone)]
struct SpectrumAnalyser {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    smoothed: Vec<f32>,
}

impl SpectrumAnalyser {
    fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        let n = fft_size as f32;
        let window = (0..fft_size)
            .map(|i| {
                let x = i as f32 / n;
                0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
            })
            .collect();

        Self {
            fft,
            window,
            smoothed: vec![0.0; fft_size / 2],
        }
    }

    /// Analyse `frame` (exactly one fft size long)
    fn process(&mut self, frame: &[f32]) -> RawSample {
        let fft_size = self.window.len();
        let bins = fft_size / 2;

        let time_domain: Vec<u8> = frame[..bins]
            .iter()
            .map(|&x| (128.0 * (x + 1.0)).floor().clamp(0.0, 255.0) as u8)
            .collect();

        let mut buffer: Vec<Complex<f32>> = frame
            .iter()
            .zip(self.window.iter())
            .map(|(&x, &w)| Complex::new(x * w, 0.0))
            .collect();
        self.fft.process(&mut buffer);

        let range = MAX_DECIBELS - MIN_DECIBELS;
        let frequencies: Vec<u8> = buffer[..bins]
            .iter()
            .zip(self.smoothed.iter_mut())
            .map(|(bin, smoothed)| {
                let magnitude = bin.norm() / fft_size as f32;
                *smoothed = SMOOTHING_TIME_CONSTANT * *smoothed
                    + (1.0 - SMOOTHING_TIME_CONSTANT) * magnitude;
                if !smoothed.is_finite() {
                    *smoothed = 0.0;
                }

                let db = 20.0 * smoothed.log10();
                if !db.is_finite() {
                    return 0;
                }
                (255.0 / range * (db - MIN_DECIBELS)).floor().clamp(0.0, 255.0) as u8
            })
            .collect();

        RawSample::from_parts(Bytes::from(time_domain), Bytes::from(frequencies))
    }
}

/// Mono PCM held in memory, played back by timer
pub struct PcmSource {
    samples: Arc<[f32]>,
    sample_rate: u32,
    fft_size: usize,
    analyser: SpectrumAnalyser,
    loaded: bool,
    playing: bool,
}

impl PcmSource {
    pub fn new(samples: impl Into<Arc<[f32]>>, sample_rate: u32, fft_size: usize) -> Result<Self> {
        if sample_rate == 0 {
            return Err(AudioError::Config("Sample rate must be greater than 0".to_string()));
        }

        if fft_size < 2 || !fft_size.is_power_of_two() {
            return Err(AudioError::Config(format!(
                "fft_size must be a power of 2 (got {})",
                fft_size
            )));
        }

        Ok(Self {
            samples: samples.into(),
            sample_rate,
            fft_size,
            analyser: SpectrumAnalyser::new(fft_size),
            loaded: false,
            playing: false,
        })
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length of the audio in ms
    pub fn duration_ms(&self) -> f64 {
        self.samples.len() as f64 * 1000.0 / self.sample_rate as f64
    }

    /// One frame per `fft_size` samples, stamped with the time of its first
    /// sample. The stream has its own spectrum state, the source is untouched.
    pub fn offline_frames(&self) -> impl Stream<Item = Result<TimedEntry>> + Send + 'static {
        let samples = self.samples.clone();
        let sample_rate = self.sample_rate as f64;
        let fft_size = self.fft_size;
        let analyser = SpectrumAnalyser::new(fft_size);

        stream::unfold((0usize, analyser), move |(start, mut analyser)| {
            let samples = samples.clone();
            async move {
                if start >= samples.len() {
                    return None;
                }
                let frame = window_at(&samples, start, fft_size);
                let entry = TimedEntry {
                    timer: start as f64 * 1000.0 / sample_rate,
                    sample: analyser.process(&frame),
                };
                Some((Ok(entry), (start + fft_size, analyser)))
            }
        })
    }

    /// Run [`offline_frames`](Self::offline_frames) through a precompute job
    pub fn precompute(&self) -> PrecomputeHandle {
        info!(
            "Precomputing {:.0}ms of audio in frames of {} samples",
            self.duration_ms(),
            self.fft_size
        );
        spawn_precompute(self.offline_frames())
    }
}

/// `fft_size` samples from `start`, zero padded past the end of the audio
fn window_at(samples: &[f32], start: usize, fft_size: usize) -> Vec<f32> {
    let mut frame = vec![0.0; fft_size];
    if start < samples.len() {
        let end = (start + fft_size).min(samples.len());
        frame[..end - start].copy_from_slice(&samples[start..end]);
    }
    frame
}

#[async_trait]
impl AudioSource for PcmSource {
    async fn load(&mut self) -> Result<()> {
        if self.samples.is_empty() {
            return Err(AudioError::Source("PCM buffer is empty".to_string()));
        }
        self.loaded = true;
        debug!("PCM source loaded ({} samples)", self.samples.len());
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        if !self.loaded {
            return Err(AudioError::Source("PCM source played before being loaded".to_string()));
        }
        self.playing = true;
        Ok(())
    }

    /// Analyses the `fft_size` samples preceding `timer`
    fn raw_sample(&mut self, timer: f64) -> Result<RawSample> {
        if !self.loaded {
            return Err(AudioError::Source("PCM source is not loaded".to_string()));
        }

        let position = if timer.is_finite() && timer > 0.0 {
            (timer * self.sample_rate as f64 / 1000.0) as usize
        } else {
            0
        };

        let frame = if position >= self.fft_size {
            window_at(&self.samples, position - self.fft_size, self.fft_size)
        } else {
            // not enough history yet: silence first, audio last
            let mut frame = vec![0.0; self.fft_size];
            let available = position.min(self.samples.len());
            frame[self.fft_size - position..self.fft_size - position + available]
                .copy_from_slice(&self.samples[..available]);
            frame
        };

        Ok(self.analyser.process(&frame))
    }

    fn buffer_len(&self) -> usize {
        self.fft_size / 2
    }

    fn supports_capture(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "pcm"
    }
}
