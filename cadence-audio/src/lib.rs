//! cadence-audio: energy and beat analysis for audio-reactive applications
//!
//! Provides:
//! - Signal energy and rolling energy average
//! - Threshold peak (beat) detection with cooldown and eased decay
//! - The same detection run per frequency band
//! - A timer-indexed history to replay precomputed analysis while rendering offline
//! - Sources behind a small capability trait, and a session tying one to an analyser

pub mod error;
pub mod config;
pub mod easing;
pub mod sample;
pub mod peak;
pub mod energy;
pub mod analysed_data;
pub mod analyser;
pub mod timed_history;
pub mod precompute;
pub mod source;
pub mod session;

pub use error::{AudioError, Result};
pub use config::{AnalyserConfig, AnalyserConfigOverrides, ConfigWarning, PeakOptions, ReturnsConfig};
pub use easing::Easing;
pub use sample::RawSample;
pub use peak::{Peak, PeakState};
pub use energy::{EnergyEntry, EnergyHistory};
pub use analysed_data::AnalysedData;
pub use analyser::{Analyser, ComputePlan};
pub use timed_history::{TimedEntry, TimedHistory};
pub use precompute::{spawn_precompute, JobState, PrecomputeHandle, PrecomputeStats};
pub use source::{AudioSource, PcmSource, PrecomputedSource};
pub use session::AudioSession;
