//! Offline precompute example
//! Precomputes audio frames once, then renders slower than real time in capture mode

use cadence_audio::*;
use std::f32::consts::PI;
use std::time::Duration;

const SAMPLE_RATE: u32 = 22050;
const FFT_SIZE: usize = 512;

fn swells() -> Vec<f32> {
    let total = SAMPLE_RATE as usize * 3;
    (0..total)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let swell = if (t % 1.0) < 0.15 { 0.8 } else { 0.04 };
            swell * (2.0 * PI * 330.0 * t).sin()
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("Offline Precompute Example");
    println!("==========================");

    let pcm = PcmSource::new(swells(), SAMPLE_RATE, FFT_SIZE)?;
    let duration = pcm.duration_ms();
    let job = pcm.precompute();
    println!("Precompute job started, {:?}", job.stats().state);

    let config = AnalyserConfig::default();
    let source = PrecomputedSource::new(job, config.buffer_len());
    let mut session = AudioSession::new(source, config, true)?;
    session.init().await?;

    if let Some(history) = session.source().history() {
        println!("{} frames ready, spanning {:?}", history.len(), history.time_span());
    }

    // 30fps capture: every frame is analysed at its own timer, however long rendering takes
    let frame_ms = 1000.0 / 30.0;
    let mut timer = 0.0;
    while timer < duration {
        let data = session.analysed(frame_ms, timer)?;
        if let Some(peak) = data.peak() {
            if peak.timer == Some(timer) {
                println!("  frame at {:>7.1}ms: peak (energy {:.2})", timer, peak.energy);
            }
        }
        // stand-in for an expensive render
        tokio::time::sleep(Duration::from_millis(1)).await;
        timer += frame_ms;
    }

    let data = session.analyser().data();
    println!("\nFinal state:");
    println!("{}", serde_json::to_string_pretty(&serde_json::json!({
        "iterations": session.analyser().iterations(),
        "peak": data.peak(),
        "peak_count": data.peak_history().map(|h| h.len()),
    }))?);

    Ok(())
}
