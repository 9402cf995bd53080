//! Shifter configuration.

use pitchband_dsp::FftSize;

use crate::error::{Error, Result};

/// Configuration of a [`PitchShifter`](crate::PitchShifter).
///
/// A shifter is always bound to a sample rate and channel count; both are
/// validated before any engine is built, so an invalid configuration can
/// never process audio.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ShifterConfig {
    /// Sample rate in Hz. Must be finite and positive.
    pub sample_rate: f64,

    /// Number of interleaved channels. Must be at least 1.
    pub channels: usize,

    /// FFT window preset for the engine (latency/quality trade-off).
    pub fft_size: FftSize,
}

impl ShifterConfig {
    /// Create a configuration with the default FFT size.
    pub fn new(sample_rate: f64, channels: usize) -> Self {
        Self {
            sample_rate,
            channels,
            fft_size: FftSize::default(),
        }
    }

    /// Select a different FFT window preset.
    pub fn fft_size(mut self, fft_size: FftSize) -> Self {
        self.fft_size = fft_size;
        self
    }

    /// Check the configuration, returning the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(Error::InvalidSampleRate(self.sample_rate));
        }
        if self.channels == 0 {
            return Err(Error::InvalidChannelCount);
        }
        Ok(())
    }
}

impl Default for ShifterConfig {
    fn default() -> Self {
        Self::new(44100.0, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ShifterConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_sample_rates() {
        assert!(ShifterConfig::new(0.0, 2).validate().is_err());
        assert!(ShifterConfig::new(-44100.0, 2).validate().is_err());
        assert!(ShifterConfig::new(f64::NAN, 2).validate().is_err());
        assert!(ShifterConfig::new(f64::INFINITY, 2).validate().is_err());
    }

    #[test]
    fn rejects_zero_channels() {
        assert!(matches!(
            ShifterConfig::new(48000.0, 0).validate(),
            Err(Error::InvalidChannelCount)
        ));
    }

    #[test]
    fn builder_sets_fft_size() {
        let config = ShifterConfig::new(48000.0, 1).fft_size(FftSize::Large);
        assert_eq!(config.fft_size, FftSize::Large);
        assert!(config.validate().is_ok());
    }
}
