//! Shared signal generators and measurements for integration tests.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Generate a mono sine wave.
pub fn generate_sine(freq: f64, sample_rate: f64, frames: usize, amplitude: f32) -> Vec<f32> {
    (0..frames)
        .map(|i| {
            let phase = 2.0 * std::f64::consts::PI * freq * i as f64 / sample_rate;
            phase.sin() as f32 * amplitude
        })
        .collect()
}

/// Interleave equal-length channel lanes.
pub fn interleave(lanes: &[Vec<f32>]) -> Vec<f32> {
    let channels = lanes.len();
    let frames = lanes[0].len();
    let mut out = vec![0.0f32; channels * frames];
    for (ch, lane) in lanes.iter().enumerate() {
        for (i, &sample) in lane.iter().enumerate() {
            out[i * channels + ch] = sample;
        }
    }
    out
}

/// Extract one channel from an interleaved buffer.
pub fn deinterleave_channel(buf: &[f32], channels: usize, channel: usize) -> Vec<f32> {
    buf.iter().skip(channel).step_by(channels).copied().collect()
}

/// Root mean square of a signal.
pub fn rms(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    (signal.iter().map(|x| x * x).sum::<f32>() / signal.len() as f32).sqrt()
}

/// Largest absolute sample value.
pub fn peak(signal: &[f32]) -> f32 {
    signal.iter().fold(0.0f32, |m, x| m.max(x.abs()))
}

/// Estimate the dominant frequency of a signal by FFT peak picking.
///
/// Resolution is `sample_rate / signal.len()`; feed it a few thousand frames
/// for sub-percent accuracy on midrange tones.
pub fn dominant_frequency(signal: &[f32], sample_rate: f64) -> f64 {
    let len = signal.len();
    let mut buf: Vec<Complex<f32>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();

    let mut planner = FftPlanner::new();
    planner.plan_fft_forward(len).process(&mut buf);

    let (peak_bin, _) = buf[..len / 2]
        .iter()
        .enumerate()
        .map(|(i, c)| (i, c.norm()))
        .fold((0, 0.0f32), |best, cur| if cur.1 > best.1 { cur } else { best });

    peak_bin as f64 * sample_rate / len as f64
}

/// True when no sample exceeds the threshold.
pub fn is_silent(signal: &[f32], threshold: f32) -> bool {
    peak(signal) <= threshold
}
