//! Real-time analysis example
//! Feeds a synthetic drum loop through the analyser tick by tick, as a render loop would

use cadence_audio::*;
use std::f32::consts::PI;

const SAMPLE_RATE: u32 = 44100;
const FFT_SIZE: usize = 1024;
const FRAME_MS: f64 = 1000.0 / 60.0;

/// Four seconds of a quiet pad with a kick every 500ms
fn drum_loop() -> Vec<f32> {
    let total = SAMPLE_RATE as usize * 4;
    let beat = SAMPLE_RATE as usize / 2;
    (0..total)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let pad = 0.05 * (2.0 * PI * 220.0 * t).sin();
            let since_beat = (i % beat) as f32 / SAMPLE_RATE as f32;
            let kick = 0.9 * (-since_beat * 30.0).exp() * (2.0 * PI * 60.0 * since_beat).sin();
            pad + kick
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("Real-time Analysis Example");
    println!("==========================");

    let config = AnalyserConfig::from_json_str(&format!(
        r#"{{ "fft_size": {}, "multiband_peak_detection": {{ "options": {{ "bands": 4 }} }} }}"#,
        FFT_SIZE
    ))?;

    let source = PcmSource::new(drum_loop(), SAMPLE_RATE, FFT_SIZE)?;
    let duration = source.duration_ms();
    let mut session = AudioSession::new(source, config, false)?;
    session.init().await?;

    let mut timer = 0.0;
    let mut beats = 0;
    while timer < duration {
        let data = session.analysed(FRAME_MS, timer)?;
        if let Some(peak) = data.peak() {
            if peak.timer == Some(timer) {
                beats += 1;
                println!(
                    "  beat at {:>7.1}ms  energy {:>6.2}  average {:>6.2}",
                    timer,
                    peak.energy,
                    data.energy_average().unwrap_or_default()
                );
            }
        }
        timer += FRAME_MS;
    }

    println!("\nDetected {} beats over {:.0}ms", beats, duration);
    if let Some(history) = session.analyser().data().multiband_peak_history() {
        for (band, peaks) in history.iter().enumerate() {
            println!("  band {}: {} peaks", band, peaks.len());
        }
    }

    Ok(())
}
