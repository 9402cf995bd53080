//! Streaming phase-vocoder engine for pitch shifting and time stretching.
//!
//! This crate is the algorithmic core behind the `pitchband` wrapper: a mono
//! STFT processor with FIFO semantics. The wrapper owns configuration,
//! validation and channel handling; everything spectral lives here.
//!
//! # Example
//!
//! ```
//! use pitchband_dsp::{FftSize, PhaseVocoder};
//!
//! let mut voc = PhaseVocoder::new(FftSize::Small);
//! voc.push_input(&vec![0.0f32; 4096]);
//! voc.run(1.0, 2.0_f32.powf(3.0 / 12.0)); // up three semitones
//!
//! let mut out = vec![0.0f32; voc.output_frames()];
//! voc.pop_output(&mut out);
//! ```

mod types;
mod vocoder;

pub use types::FftSize;
pub use vocoder::{PhaseVocoder, MAX_RATIO, MIN_RATIO};
