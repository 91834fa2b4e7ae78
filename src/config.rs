//! Estimation configuration
//!
//! One immutable value per call. Nothing here is global: defaults are plain
//! constants copied into the value at construction.

/// Default frequency step in Hz
pub const DEFAULT_FREQ_STEP: f64 = 0.01;

/// Default phase step in radians (1% of a full turn)
pub const DEFAULT_PHASE_STEP: f64 = 0.01 * 2.0 * core::f64::consts::PI;

/// Statistic used for the order-1 level that higher orders cascade against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaseSpectrum {
    /// `mean[(s + r)^2] - mean[s^2] - 0.5` with `r = cos(2π f t + φ)`
    #[default]
    Fundamental,
    /// `mean[s · cos^2(π f t + φ)]`, the within-band statistic of the raw signal
    WithinBand,
}

/// Configuration for the time-domain spectral estimator
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumConfig {
    /// Sampling frequency of the signal (Hz)
    pub sampling_frequency: f64,
    /// Lowest frequency to test; defaults to one cycle per whole second of signal
    pub fmin: Option<f64>,
    /// Upper (exclusive) frequency bound; defaults to `floor(fs/2) - 1`
    pub fmax: Option<f64>,
    /// Precomputed frequency grid, bypasses `fmin`/`fmax`/`freq_step`
    pub frequency_array: Option<Vec<f64>>,
    /// Frequency grid step (Hz)
    pub freq_step: f64,
    /// Phase grid step (radians)
    pub phase_step: f64,
    /// Level-1 statistic
    pub base: BaseSpectrum,
    /// Evaluate frequency bins on the rayon thread pool
    pub parallel: bool,
    /// Log progress through `tracing` when no sink is injected
    pub progress: bool,
}

impl SpectrumConfig {
    pub fn new(sampling_frequency: f64) -> Self {
        Self {
            sampling_frequency,
            fmin: None,
            fmax: None,
            frequency_array: None,
            freq_step: DEFAULT_FREQ_STEP,
            phase_step: DEFAULT_PHASE_STEP,
            base: BaseSpectrum::default(),
            parallel: true,
            progress: false,
        }
    }

    /// Restrict the search to `[fmin, fmax)` with the given steps
    pub fn with_band(mut self, fmin: f64, fmax: f64, freq_step: f64, phase_step: f64) -> Self {
        self.fmin = Some(fmin);
        self.fmax = Some(fmax);
        self.freq_step = freq_step;
        self.phase_step = phase_step;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spectrum_config_defaults() {
        let config = SpectrumConfig::new(1000.0);
        assert_eq!(config.freq_step, 0.01);
        assert!((config.phase_step - 0.0628318530717958).abs() < 1e-12);
        assert_eq!(config.base, BaseSpectrum::Fundamental);
        assert!(config.fmin.is_none() && config.fmax.is_none());
        assert!(config.parallel);
        assert!(!config.progress);
    }

    #[test]
    fn test_with_band() {
        let config = SpectrumConfig::new(1000.0).with_band(40.0, 60.0, 1.0, 0.1);
        assert_eq!(config.fmin, Some(40.0));
        assert_eq!(config.fmax, Some(60.0));
        assert_eq!(config.freq_step, 1.0);
        assert_eq!(config.phase_step, 0.1);
    }
}
