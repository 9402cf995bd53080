//! Streaming pitch shifting for interleaved audio.
//!
//! `pitchband` wraps the [`pitchband_dsp`] phase-vocoder engine behind a
//! single host-facing handle. The handle is bound to a sample rate and
//! channel count, takes interleaved `f32` frames, and returns pitch-shifted
//! frames at the same duration. Because the engine buffers a full analysis
//! window before emitting anything, output frame counts are decoupled from
//! input frame counts — callers loop on [`PitchShifter::process`] and take
//! whatever is ready.
//!
//! # Quick Start
//!
//! ```
//! use pitchband::PitchShifter;
//!
//! let mut shifter = PitchShifter::new(44100.0, 2)?;
//! shifter.set_pitch_semitones(4.0); // up a major third
//!
//! let input = vec![0.0f32; 2 * 4096]; // interleaved stereo
//! let mut output = vec![0.0f32; 2 * 4096];
//! let frames = shifter.process(&input, &mut output)?;
//! assert!(frames <= 4096);
//! # Ok::<(), pitchband::Error>(())
//! ```
//!
//! # Modules
//!
//! | Item | Description |
//! |------|-------------|
//! | [`PitchShifter`] | The processing handle: configure, set pitch, process, flush, reset |
//! | [`ShifterConfig`] | Sample rate / channel count / FFT preset, validated |
//! | [`Error`] | Typed errors for invalid configuration and buffer layout |
//! | [`dsp`] | Re-export of the engine crate for direct low-level use |
//!
//! # Feature Flags
//!
//! | Flag | Description |
//! |------|-------------|
//! | `serialization` | `serde` derives on configuration types |

// Error types
pub mod error;
pub use error::{Error, Result};

// Configuration
mod config;
pub use config::ShifterConfig;

// The processing handle
mod shifter;
pub use shifter::{PitchShifter, MAX_SEMITONES, MIN_SEMITONES};

/// Re-export of the engine crate for direct access.
pub use pitchband_dsp as dsp;
pub use pitchband_dsp::FftSize;
