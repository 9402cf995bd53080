//! The host-facing pitch-shifting handle.

use tracing::{debug, trace};

use pitchband_dsp::PhaseVocoder;

use crate::config::ShifterConfig;
use crate::error::{Error, Result};

/// Lowest accepted pitch shift in semitones (two octaves down).
pub const MIN_SEMITONES: f64 = -24.0;
/// Highest accepted pitch shift in semitones (two octaves up).
pub const MAX_SEMITONES: f64 = 24.0;

/// Streaming pitch shifter bound to one sample rate and channel count.
///
/// Audio goes in and comes out as interleaved `f32` frames. Output frame
/// counts are decoupled from input frame counts: the engine buffers one full
/// analysis window before anything is emitted, and ready output that does not
/// fit the caller's buffer stays queued for the next call.
///
/// The handle owns no spectral state of its own — every frame is forwarded
/// to one [`PhaseVocoder`] per channel, run in lockstep. What lives here is
/// the glue: validation, interleaved/planar conversion, and the
/// minimum-process-frames gate.
///
/// Single-owner, single-threaded access; the handle is `Send` but not meant
/// to be shared.
pub struct PitchShifter {
    config: ShifterConfig,
    semitones: f64,
    min_process_frames: usize,
    engines: Vec<PhaseVocoder>,
    /// Interleaved input held back until the minimum-frames gate opens.
    pending: Vec<f32>,
    /// Planar scratch, one channel at a time.
    lane: Vec<f32>,
}

impl PitchShifter {
    /// Create a shifter bound to `sample_rate` and `channels`.
    ///
    /// Uses the default FFT preset; see [`PitchShifter::with_config`] to pick
    /// another.
    pub fn new(sample_rate: f64, channels: usize) -> Result<Self> {
        Self::with_config(ShifterConfig::new(sample_rate, channels))
    }

    /// Create a shifter from an explicit configuration.
    pub fn with_config(config: ShifterConfig) -> Result<Self> {
        config.validate()?;
        let engines = Self::build_engines(&config);
        debug!(
            sample_rate = config.sample_rate,
            channels = config.channels,
            fft = config.fft_size.size(),
            "pitch shifter created"
        );
        Ok(Self {
            config,
            semitones: 0.0,
            min_process_frames: 1,
            engines,
            pending: Vec::new(),
            lane: Vec::new(),
        })
    }

    fn build_engines(config: &ShifterConfig) -> Vec<PhaseVocoder> {
        (0..config.channels)
            .map(|_| PhaseVocoder::new(config.fft_size))
            .collect()
    }

    /// Re-bind the handle to a new sample rate and channel count.
    ///
    /// Buffered input and ready output are discarded; the pitch shift and
    /// minimum-frames settings persist.
    pub fn configure(&mut self, sample_rate: f64, channels: usize) -> Result<()> {
        let config = ShifterConfig {
            sample_rate,
            channels,
            fft_size: self.config.fft_size,
        };
        config.validate()?;
        if !self.pending.is_empty() || self.engines.iter().any(|e| e.output_frames() > 0) {
            debug!("reconfigure discards in-flight audio");
        }
        self.config = config;
        self.engines = Self::build_engines(&self.config);
        self.pending.clear();
        debug!(
            sample_rate = config.sample_rate,
            channels = config.channels,
            "pitch shifter reconfigured"
        );
        Ok(())
    }

    /// Set the pitch shift in semitones, clamped to
    /// [`MIN_SEMITONES`, `MAX_SEMITONES`]. Applies to frames processed after
    /// this call; already-buffered output is unaffected.
    pub fn set_pitch_semitones(&mut self, semitones: f64) {
        self.semitones = semitones.clamp(MIN_SEMITONES, MAX_SEMITONES);
        trace!(semitones = self.semitones, "pitch updated");
    }

    /// Set the minimum number of frames forwarded to the engine at once.
    ///
    /// Input accumulates until at least this many frames are pending, then
    /// the whole backlog is forwarded. `1` (the default) disables gating.
    pub fn set_minimum_process_frames(&mut self, frames: usize) -> Result<()> {
        if frames == 0 {
            return Err(Error::InvalidMinimumFrames);
        }
        self.min_process_frames = frames;
        trace!(frames, "minimum process frames updated");
        Ok(())
    }

    /// Configured sample rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.config.sample_rate
    }

    /// Configured channel count.
    pub fn channels(&self) -> usize {
        self.config.channels
    }

    /// Current pitch shift in semitones.
    pub fn pitch_semitones(&self) -> f64 {
        self.semitones
    }

    /// Current minimum-process-frames setting.
    pub fn minimum_process_frames(&self) -> usize {
        self.min_process_frames
    }

    /// The active configuration.
    pub fn config(&self) -> &ShifterConfig {
        &self.config
    }

    /// Processing latency in frames: one engine analysis window.
    pub fn latency_frames(&self) -> usize {
        self.engines.first().map_or(0, |e| e.latency_frames())
    }

    /// Processing latency in seconds at the configured sample rate.
    pub fn latency_seconds(&self) -> f64 {
        self.config.fft_size.latency_seconds(self.config.sample_rate)
    }

    /// Feed interleaved input frames and collect interleaved output frames.
    ///
    /// Consumes all of `input` (buffering it internally as needed), writes at
    /// most `output.len() / channels` frames, and returns the number of
    /// frames written. Both slice lengths must be whole numbers of frames for
    /// the configured channel count.
    ///
    /// An empty `input` is valid and simply drains ready output, which makes
    /// `process(&[], out)` a non-padding variant of [`PitchShifter::flush`].
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) -> Result<usize> {
        let channels = self.config.channels;
        Self::check_layout(input.len(), channels)?;
        Self::check_layout(output.len(), channels)?;

        self.pending.extend_from_slice(input);
        if self.pending.len() / channels >= self.min_process_frames {
            self.forward_pending();
        }

        Ok(self.drain_output(output))
    }

    /// Pad the stream with one window of silence and collect what comes out.
    ///
    /// Audio held in the engine's analysis overlap only appears once enough
    /// subsequent input pushes it through; at end of stream that input never
    /// arrives. `flush` substitutes silence so the tail can be collected.
    /// Returns the number of frames written.
    pub fn flush(&mut self, output: &mut [f32]) -> Result<usize> {
        let channels = self.config.channels;
        Self::check_layout(output.len(), channels)?;

        let pad = self.latency_frames() * channels;
        self.pending.resize(self.pending.len() + pad, 0.0);
        self.forward_pending();

        Ok(self.drain_output(output))
    }

    /// Discard all buffered audio and engine state.
    ///
    /// Configuration, pitch shift, and minimum process frames persist: a
    /// reset handle behaves exactly like a freshly constructed one with the
    /// same settings.
    pub fn reset(&mut self) {
        for engine in &mut self.engines {
            engine.reset();
        }
        self.pending.clear();
        debug!("pitch shifter reset");
    }

    fn check_layout(len: usize, channels: usize) -> Result<()> {
        if len % channels != 0 {
            return Err(Error::BufferLayout { len, channels });
        }
        Ok(())
    }

    fn pitch_ratio(&self) -> f32 {
        2.0_f64.powf(self.semitones / 12.0) as f32
    }

    /// Deinterleave the backlog into each engine and run them.
    fn forward_pending(&mut self) {
        let channels = self.config.channels;
        let ratio = self.pitch_ratio();

        for (ch, engine) in self.engines.iter_mut().enumerate() {
            self.lane.clear();
            self.lane
                .extend(self.pending.iter().skip(ch).step_by(channels).copied());
            engine.push_input(&self.lane);
            engine.run(1.0, ratio);
        }
        self.pending.clear();
    }

    /// Interleave ready engine output into `output`, up to its capacity.
    fn drain_output(&mut self, output: &mut [f32]) -> usize {
        let channels = self.config.channels;
        let capacity = output.len() / channels;
        // Engines are fed in lockstep, so available counts match; min() keeps
        // the frames aligned even if they ever diverged.
        let available = self
            .engines
            .iter()
            .map(|e| e.output_frames())
            .min()
            .unwrap_or(0);
        let frames = capacity.min(available);
        if frames == 0 {
            return 0;
        }

        for (ch, engine) in self.engines.iter_mut().enumerate() {
            self.lane.resize(frames, 0.0);
            let popped = engine.pop_output(&mut self.lane[..frames]);
            debug_assert_eq!(popped, frames);
            for (i, &sample) in self.lane[..frames].iter().enumerate() {
                output[i * channels + ch] = sample;
            }
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_construction() {
        assert!(PitchShifter::new(0.0, 2).is_err());
        assert!(PitchShifter::new(-1.0, 2).is_err());
        assert!(PitchShifter::new(f64::NAN, 2).is_err());
        assert!(PitchShifter::new(44100.0, 0).is_err());
    }

    #[test]
    fn accessors_reflect_configuration() {
        let shifter = PitchShifter::new(48000.0, 4).unwrap();
        assert_eq!(shifter.sample_rate(), 48000.0);
        assert_eq!(shifter.channels(), 4);
        assert_eq!(shifter.pitch_semitones(), 0.0);
        assert_eq!(shifter.minimum_process_frames(), 1);
        assert!(shifter.latency_frames() > 0);
        assert_eq!(
            shifter.latency_seconds(),
            shifter.latency_frames() as f64 / 48000.0
        );
    }

    #[test]
    fn pitch_is_clamped_to_two_octaves() {
        let mut shifter = PitchShifter::new(44100.0, 1).unwrap();

        shifter.set_pitch_semitones(36.0);
        assert_eq!(shifter.pitch_semitones(), MAX_SEMITONES);

        shifter.set_pitch_semitones(-36.0);
        assert_eq!(shifter.pitch_semitones(), MIN_SEMITONES);

        shifter.set_pitch_semitones(-3.5);
        assert_eq!(shifter.pitch_semitones(), -3.5);
    }

    #[test]
    fn zero_minimum_frames_is_an_error() {
        let mut shifter = PitchShifter::new(44100.0, 1).unwrap();
        assert!(matches!(
            shifter.set_minimum_process_frames(0),
            Err(Error::InvalidMinimumFrames)
        ));
        assert!(shifter.set_minimum_process_frames(256).is_ok());
        assert_eq!(shifter.minimum_process_frames(), 256);
    }

    #[test]
    fn layout_errors_on_ragged_buffers() {
        let mut shifter = PitchShifter::new(44100.0, 2).unwrap();
        let mut out = vec![0.0f32; 64];

        // 33 samples is not a whole number of stereo frames.
        let err = shifter.process(&vec![0.0; 33], &mut out).unwrap_err();
        assert!(matches!(err, Error::BufferLayout { len: 33, channels: 2 }));

        let mut ragged_out = vec![0.0f32; 7];
        assert!(shifter.process(&[], &mut ragged_out).is_err());
    }

    #[test]
    fn empty_input_on_fresh_handle_yields_nothing() {
        let mut shifter = PitchShifter::new(44100.0, 2).unwrap();
        let mut out = vec![0.0f32; 256];
        assert_eq!(shifter.process(&[], &mut out).unwrap(), 0);
    }

    #[test]
    fn minimum_frames_gate_holds_back_input() {
        let mut shifter = PitchShifter::with_config(
            ShifterConfig::new(44100.0, 1).fft_size(pitchband_dsp::FftSize::Small),
        )
        .unwrap();
        shifter.set_minimum_process_frames(8192).unwrap();

        // Well over one analysis window, but below the gate: nothing may
        // reach the engine yet.
        let mut out = vec![0.0f32; 4096];
        let written = shifter.process(&vec![0.1; 4096], &mut out).unwrap();
        assert_eq!(written, 0);

        // Crossing the gate forwards the whole backlog at once.
        let written = shifter.process(&vec![0.1; 4096], &mut out).unwrap();
        assert!(written > 0);
    }

    #[test]
    fn configure_preserves_parameters() {
        let mut shifter = PitchShifter::new(44100.0, 2).unwrap();
        shifter.set_pitch_semitones(5.0);
        shifter.set_minimum_process_frames(64).unwrap();

        shifter.configure(96000.0, 1).unwrap();
        assert_eq!(shifter.sample_rate(), 96000.0);
        assert_eq!(shifter.channels(), 1);
        assert_eq!(shifter.pitch_semitones(), 5.0);
        assert_eq!(shifter.minimum_process_frames(), 64);
    }

    #[test]
    fn configure_rejects_invalid_values() {
        let mut shifter = PitchShifter::new(44100.0, 2).unwrap();
        assert!(shifter.configure(0.0, 2).is_err());
        assert!(shifter.configure(44100.0, 0).is_err());
        // Failed reconfigure leaves the old binding intact.
        assert_eq!(shifter.channels(), 2);
        assert_eq!(shifter.sample_rate(), 44100.0);
    }
}
