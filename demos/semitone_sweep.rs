//! Sweep a synthesized tone through a few musical intervals.
//!
//! Run with: `cargo run --example semitone_sweep`

use pitchband::{FftSize, PitchShifter, ShifterConfig};

const SAMPLE_RATE: f64 = 44100.0;
const TONE_HZ: f64 = 440.0;
const FRAMES: usize = 32768;

fn sine(frames: usize) -> Vec<f32> {
    (0..frames)
        .map(|i| {
            let phase = 2.0 * std::f64::consts::PI * TONE_HZ * i as f64 / SAMPLE_RATE;
            phase.sin() as f32 * 0.5
        })
        .collect()
}

fn rms(signal: &[f32]) -> f32 {
    (signal.iter().map(|x| x * x).sum::<f32>() / signal.len().max(1) as f32).sqrt()
}

fn main() -> Result<(), pitchband::Error> {
    tracing_subscriber::fmt::init();

    let config = ShifterConfig::new(SAMPLE_RATE, 1).fft_size(FftSize::Medium);
    let mut shifter = PitchShifter::with_config(config)?;
    let input = sine(FRAMES);
    let mut output = vec![0.0f32; FRAMES + 4 * shifter.latency_frames()];

    println!(
        "{} Hz tone, {} frames at {} Hz, latency {} frames ({:.1} ms)",
        TONE_HZ,
        FRAMES,
        SAMPLE_RATE,
        shifter.latency_frames(),
        shifter.latency_seconds() * 1000.0
    );

    for semitones in [-12.0, -7.0, 0.0, 4.0, 7.0, 12.0] {
        shifter.reset();
        shifter.set_pitch_semitones(semitones);

        let mut produced = shifter.process(&input, &mut output)?;
        produced += shifter.flush(&mut output[produced..])?;

        let target = TONE_HZ * 2f64.powf(semitones / 12.0);
        println!(
            "{semitones:+6.1} st -> {produced} frames out, rms {:.3}, target {target:7.1} Hz",
            rms(&output[..produced])
        );
    }

    Ok(())
}
