//! Streaming phase-vocoder processor.
//!
//! STFT analysis/synthesis with 75% overlap. Input is pushed into an
//! internal FIFO, complete analysis frames are consumed by [`PhaseVocoder::run`],
//! and finished output accumulates until popped. Output sample counts are
//! therefore decoupled from input sample counts: nothing is emitted until a
//! full window has been buffered, and a single `run` may emit several hops.
//!
//! Pitch shifting moves each analysis bin's energy to `round(k * ratio)` and
//! scales its measured instantaneous frequency by the same ratio, so shifted
//! partials land on the right frequency instead of smearing around the
//! original bin. Time stretching scales the synthesis hop relative to the
//! analysis hop.

use std::f32::consts::TAU;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::types::FftSize;

/// Lower bound on the stretch factor and pitch ratio.
pub const MIN_RATIO: f32 = 0.25;
/// Upper bound on the stretch factor and pitch ratio.
pub const MAX_RATIO: f32 = 4.0;

/// Mono streaming pitch-shift/time-stretch processor.
///
/// One instance handles one channel; multichannel callers run one processor
/// per channel and feed them in lockstep. All processing state lives here —
/// calling [`reset`](Self::reset) returns the processor to its
/// just-constructed state without touching its configuration.
pub struct PhaseVocoder {
    fft_size: usize,
    hop: usize,

    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,

    window: Vec<f32>,
    /// Nominal per-bin phase advance over one analysis hop.
    expected_advance: Vec<f32>,

    spectrum: Vec<Complex<f32>>,
    last_phase: Vec<f32>,
    phase_acc: Vec<f32>,
    analysis_mag: Vec<f32>,
    analysis_freq: Vec<f32>,
    synthesis_mag: Vec<f32>,
    synthesis_freq: Vec<f32>,

    /// Pending input samples, oldest first. The front `fft_size` samples form
    /// the next analysis frame; each processed frame drains one hop.
    input: Vec<f32>,
    /// Overlap-add accumulator. `[0, ready)` is finished output; the tail is
    /// still being summed into by upcoming frames.
    output: Vec<f32>,
    ready: usize,
}

impl PhaseVocoder {
    /// Create a processor for one audio channel.
    ///
    /// The window geometry is sample-rate independent; callers that need
    /// latency in wall-clock terms use [`FftSize::latency_seconds`].
    pub fn new(fft_size: FftSize) -> Self {
        let size = fft_size.size();
        let hop = fft_size.hop();
        let bins = size / 2 + 1;

        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);

        let window: Vec<f32> = (0..size)
            .map(|i| 0.5 * (1.0 - (TAU * i as f32 / size as f32).cos()))
            .collect();

        let expected_advance: Vec<f32> = (0..bins)
            .map(|k| TAU * k as f32 * hop as f32 / size as f32)
            .collect();

        Self {
            fft_size: size,
            hop,
            forward,
            inverse,
            window,
            expected_advance,
            spectrum: vec![Complex::new(0.0, 0.0); size],
            last_phase: vec![0.0; bins],
            phase_acc: vec![0.0; bins],
            analysis_mag: vec![0.0; bins],
            analysis_freq: vec![0.0; bins],
            synthesis_mag: vec![0.0; bins],
            synthesis_freq: vec![0.0; bins],
            input: Vec::with_capacity(size * 4),
            output: Vec::with_capacity(size * 4),
            ready: 0,
        }
    }

    /// Window length in samples.
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Processing latency in samples: one full analysis window.
    pub fn latency_frames(&self) -> usize {
        self.fft_size
    }

    /// Queue input samples for analysis.
    pub fn push_input(&mut self, samples: &[f32]) {
        self.input.extend_from_slice(samples);
    }

    /// Number of queued input samples not yet consumed.
    pub fn input_frames(&self) -> usize {
        self.input.len()
    }

    /// Number of finished output samples waiting to be popped.
    pub fn output_frames(&self) -> usize {
        self.ready
    }

    /// Move finished output into `out`, oldest first.
    ///
    /// Returns the number of samples written, at most
    /// `min(out.len(), self.output_frames())`.
    pub fn pop_output(&mut self, out: &mut [f32]) -> usize {
        let count = out.len().min(self.ready);
        out[..count].copy_from_slice(&self.output[..count]);
        self.output.drain(..count);
        self.ready -= count;
        count
    }

    /// Drop all buffered audio and phase state, keeping the configuration.
    pub fn reset(&mut self) {
        self.last_phase.fill(0.0);
        self.phase_acc.fill(0.0);
        self.input.clear();
        self.output.clear();
        self.ready = 0;
    }

    /// Process every complete analysis frame currently buffered.
    ///
    /// `stretch` scales output duration (2.0 = twice as long), `pitch_ratio`
    /// scales frequency (2.0 = up one octave). Both are clamped to
    /// [`MIN_RATIO`, `MAX_RATIO`]. A call without a full window buffered is
    /// a no-op.
    pub fn run(&mut self, stretch: f32, pitch_ratio: f32) {
        let stretch = stretch.clamp(MIN_RATIO, MAX_RATIO);
        let ratio = pitch_ratio.clamp(MIN_RATIO, MAX_RATIO);
        let synthesis_hop = ((self.hop as f32 * stretch).round() as usize).max(1);

        while self.input.len() >= self.fft_size {
            self.run_frame(synthesis_hop, ratio);
        }
    }

    fn run_frame(&mut self, synthesis_hop: usize, ratio: f32) {
        let size = self.fft_size;
        let bins = size / 2 + 1;

        // Analysis: window the frame and measure per-bin instantaneous
        // frequency from the phase advance since the previous frame.
        for i in 0..size {
            self.spectrum[i] = Complex::new(self.input[i] * self.window[i], 0.0);
        }
        self.input.drain(..self.hop);
        self.forward.process(&mut self.spectrum);

        for k in 0..bins {
            let phase = self.spectrum[k].arg();
            let deviation = wrap_phase(phase - self.last_phase[k] - self.expected_advance[k]);
            self.last_phase[k] = phase;
            self.analysis_mag[k] = self.spectrum[k].norm();
            self.analysis_freq[k] = self.expected_advance[k] + deviation;
        }

        // Pitch: relocate energy and scale the measured frequencies.
        self.synthesis_mag.fill(0.0);
        self.synthesis_freq.fill(0.0);
        for k in 0..bins {
            let target = (k as f32 * ratio).round() as usize;
            if target < bins {
                self.synthesis_mag[target] += self.analysis_mag[k];
                self.synthesis_freq[target] = self.analysis_freq[k] * ratio;
            }
        }

        // Synthesis: accumulate phase at the synthesis hop and rebuild the
        // spectrum with conjugate symmetry for a real-valued frame.
        let hop_ratio = synthesis_hop as f32 / self.hop as f32;
        for k in 0..bins {
            self.phase_acc[k] = wrap_phase(self.phase_acc[k] + self.synthesis_freq[k] * hop_ratio);
            self.spectrum[k] = Complex::from_polar(self.synthesis_mag[k], self.phase_acc[k]);
        }
        for k in 1..bins - 1 {
            self.spectrum[size - k] = self.spectrum[k].conj();
        }
        self.inverse.process(&mut self.spectrum);

        // Overlap-add. 1/size undoes the unnormalized inverse FFT;
        // 8*hop/(3*size) undoes the Hann² overlap gain, giving unity
        // passthrough at ratio 1.0.
        let norm = 8.0 * synthesis_hop as f32 / (3.0 * size as f32 * size as f32);
        if self.output.len() < self.ready + size {
            self.output.resize(self.ready + size, 0.0);
        }
        for i in 0..size {
            self.output[self.ready + i] += self.spectrum[i].re * self.window[i] * norm;
        }
        self.ready += synthesis_hop;
    }
}

/// Wrap a phase value into [-π, π].
#[inline]
fn wrap_phase(phase: f32) -> f32 {
    phase - TAU * (phase / TAU).round()
}
