//! Engine configuration types.

/// FFT size presets trading latency against spectral quality.
///
/// Larger windows resolve closely spaced partials better but delay the
/// output by one full window. At 44.1 kHz:
///
/// - `Small` (1024) ≈ 23 ms — live input
/// - `Medium` (2048) ≈ 46 ms — general purpose, the default
/// - `Large` (4096) ≈ 93 ms — dense harmonic material
/// - `XLarge` (8192) ≈ 186 ms — extreme shifts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum FftSize {
    /// 1024-point window
    Small = 1024,

    /// 2048-point window
    #[default]
    Medium = 2048,

    /// 4096-point window
    Large = 4096,

    /// 8192-point window
    XLarge = 8192,
}

impl FftSize {
    /// Window length in samples.
    pub fn size(&self) -> usize {
        *self as usize
    }

    /// Analysis hop in samples (75% overlap).
    pub fn hop(&self) -> usize {
        self.size() / 4
    }

    /// Processing latency in seconds at the given sample rate.
    pub fn latency_seconds(&self, sample_rate: f64) -> f64 {
        self.size() as f64 / sample_rate
    }
}
