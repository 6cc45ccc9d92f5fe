//! Offline precompute job
//!
//! Fills a [`TimedHistory`] from a stream of timed frames on a tokio task.
//! The task owns the history while writing and hands it over exactly once
//! through a oneshot channel, frozen behind an `Arc`.

use crate::error::{AudioError, Result};
use crate::timed_history::{TimedEntry, TimedHistory};
use futures::{Stream, StreamExt};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Frames processed between two yields to the runtime
const FRAMES_PER_YIELD: u64 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running,
    Completed,
    Failed,
    Cancelled,
}

/// Progress of a precompute job
#[derive(Debug, Clone, PartialEq)]
pub struct PrecomputeStats {
    pub frames: u64,
    pub last_timer: Option<f64>,
    pub state: JobState,
}

/// Handle on a running precompute job
pub struct PrecomputeHandle {
    result: oneshot::Receiver<Result<Arc<TimedHistory>>>,
    cancelled: Arc<RwLock<bool>>,
    stats: Arc<RwLock<PrecomputeStats>>,
    task: JoinHandle<()>,
}

/// Spawn a job appending every frame of `frames` to a new history.
///
/// Must be called from within a tokio runtime.
pub fn spawn_precompute<S>(frames: S) -> PrecomputeHandle
where
    S: Stream<Item = Result<TimedEntry>> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let cancelled = Arc::new(RwLock::new(false));
    let stats = Arc::new(RwLock::new(PrecomputeStats {
        frames: 0,
        last_timer: None,
        state: JobState::Running,
    }));

    let task_cancelled = cancelled.clone();
    let task_stats = stats.clone();
    let task = tokio::spawn(async move {
        info!("Precompute job started");
        let outcome = fill_history(frames, &task_cancelled, &task_stats).await;

        {
            let mut stats = task_stats.write();
            stats.state = match &outcome {
                Ok(_) => JobState::Completed,
                Err(AudioError::Cancelled) => JobState::Cancelled,
                Err(_) => JobState::Failed,
            };
        }

        match &outcome {
            Ok(history) => info!("Precompute job finished with {} frames", history.len()),
            Err(e) => warn!("Precompute job stopped: {}", e),
        }

        // the receiver may be gone, nobody is waiting then
        let _ = tx.send(outcome.map(Arc::new));
    });

    PrecomputeHandle {
        result: rx,
        cancelled,
        stats,
        task,
    }
}

async fn fill_history<S>(
    frames: S,
    cancelled: &RwLock<bool>,
    stats: &RwLock<PrecomputeStats>,
) -> Result<TimedHistory>
where
    S: Stream<Item = Result<TimedEntry>>,
{
    let mut frames = Box::pin(frames);
    let mut history = TimedHistory::new();

    while let Some(frame) = frames.next().await {
        if *cancelled.read() {
            return Err(AudioError::Cancelled);
        }

        let frame = frame?;
        let timer = frame.timer;
        history.append(frame.sample, timer)?;

        let processed = {
            let mut stats = stats.write();
            stats.frames = stats.frames.saturating_add(1);
            stats.last_timer = Some(timer);
            stats.frames
        };

        if processed % FRAMES_PER_YIELD == 0 {
            tokio::task::yield_now().await;
        }
    }

    if *cancelled.read() {
        return Err(AudioError::Cancelled);
    }

    Ok(history)
}

impl PrecomputeHandle {
    /// Wait for the job to finish and take the frozen history
    pub async fn wait(self) -> Result<Arc<TimedHistory>> {
        match self.result.await {
            Ok(outcome) => outcome,
            Err(_) => Err(AudioError::Precompute(
                "Precompute job ended without reporting a result".to_string(),
            )),
        }
    }

    /// Ask the job to stop before its next frame. It then completes with
    /// [`AudioError::Cancelled`].
    pub fn cancel(&self) {
        *self.cancelled.write() = true;
    }

    pub fn stats(&self) -> PrecomputeStats {
        self.stats.read().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
