//! Error types.

use thiserror::Error;

/// Error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Sample rate must be finite and positive.
    #[error("invalid sample rate {0} Hz (must be finite and positive)")]
    InvalidSampleRate(f64),

    /// Channel count must be at least one.
    #[error("invalid channel count (must be at least 1)")]
    InvalidChannelCount,

    /// Minimum process frames must be at least one.
    #[error("invalid minimum process frames (must be at least 1)")]
    InvalidMinimumFrames,

    /// Buffer length is not a whole number of frames for the configured
    /// channel count.
    #[error("buffer of {len} samples is not a whole number of {channels}-channel frames")]
    BufferLayout { len: usize, channels: usize },
}

/// Result type.
pub type Result<T> = std::result::Result<T, Error>;
