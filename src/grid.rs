//! Frequency and phase search grids
//!
//! **Defaults** (all overridable through [`SpectrumConfig`]):
//! - `fmax = floor(fs/2) - 1`, one unit below Nyquist
//! - `fmin = 1 / floor(N/fs)`, so the slowest candidate completes a full cycle
//!   within the observation window
//! - `freq_step = 0.01` Hz, `phase_step = 0.01 · 2π` rad
//!
//! Both grids are half-open ranges built like `arange(start, stop, step)`:
//! `ceil((stop - start) / step)` points, `start + i·step`, upper bound excluded.

use num::ToPrimitive;
use snafu::ensure;
use tracing::debug;

use crate::config::SpectrumConfig;
use crate::error::{ConfigurationSnafu, SpectrumError};
use crate::precision::{count, lit, two_pi, Sample};

/// Candidate frequencies and phases for one estimation call
#[derive(Debug, Clone, PartialEq)]
pub struct SearchGrid<T> {
    /// Ascending candidate frequencies (Hz)
    pub frequencies: Vec<T>,
    /// Ascending candidate phases in `[0, 2π)`
    pub phases: Vec<T>,
}

/// Largest number of points either search grid may hold
pub const MAX_GRID_POINTS: usize = 1 << 24;

/// Number of points `arange(start, stop, step)` produces: `ceil((stop - start) / step)`.
///
/// `Some(0)` for an empty range, `None` when the count is NaN, infinite or does
/// not fit in `usize`.
pub fn arange_len<T: Sample>(start: T, stop: T, step: T) -> Option<usize> {
    let len = ((stop - start) / step).ceil();
    if len.is_nan() {
        return None;
    }
    if len <= T::zero() {
        return Some(0);
    }
    len.to_usize()
}

/// `len` evenly spaced points `start + i·step`
pub fn arange<T: Sample>(start: T, step: T, len: usize) -> Vec<T> {
    (0..len).map(|i| start + count::<T>(i) * step).collect()
}

/// Half-open grid `[start, stop)`, sized before anything is allocated
fn checked_arange<T: Sample>(name: &str, start: T, stop: T, step: T) -> Result<Vec<T>, SpectrumError> {
    match arange_len(start, stop, step) {
        Some(0) => ConfigurationSnafu {
            reason: format!("empty {} grid for [{}, {}) step {}", name, start, stop, step),
        }
        .fail(),
        Some(len) if len <= MAX_GRID_POINTS => Ok(arange(start, step, len)),
        _ => ConfigurationSnafu {
            reason: format!(
                "{} grid for [{}, {}) step {} exceeds {} points",
                name, start, stop, step, MAX_GRID_POINTS
            ),
        }
        .fail(),
    }
}

impl<T: Sample> SearchGrid<T> {
    /// Build both grids for a signal of `signal_len` samples.
    ///
    /// # Errors
    /// `SpectrumError::Configuration` for a non-positive sampling frequency or
    /// step, `fmin >= fmax`, bounds outside `(0, fs/2]`, or a grid that is empty
    /// or longer than [`MAX_GRID_POINTS`].
    pub fn build(config: &SpectrumConfig, signal_len: usize) -> Result<Self, SpectrumError> {
        let fs = config.sampling_frequency;
        ensure!(
            fs.is_finite() && fs > 0.0,
            ConfigurationSnafu { reason: format!("sampling frequency must be positive, got {}", fs) }
        );

        let phases = phase_grid::<T>(config.phase_step)?;
        let frequencies = match &config.frequency_array {
            Some(array) => supplied_frequency_grid::<T>(array, fs)?,
            None => frequency_grid::<T>(config, signal_len)?,
        };

        debug!(
            frequency_bins = frequencies.len(),
            phase_bins = phases.len(),
            "search grid built"
        );

        Ok(Self { frequencies, phases })
    }

    /// Number of frequency bins
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Objective evaluations needed for one sub-pass over the whole grid
    pub fn evaluations_per_pass(&self) -> u64 {
        self.frequencies.len() as u64 * self.phases.len() as u64
    }
}

fn phase_grid<T: Sample>(phase_step: f64) -> Result<Vec<T>, SpectrumError> {
    ensure!(
        phase_step.is_finite() && phase_step > 0.0,
        ConfigurationSnafu { reason: format!("phase_step must be positive, got {}", phase_step) }
    );

    checked_arange("phase", T::zero(), two_pi::<T>(), lit::<T>(phase_step))
}

fn frequency_grid<T: Sample>(config: &SpectrumConfig, signal_len: usize) -> Result<Vec<T>, SpectrumError> {
    let fs = lit::<T>(config.sampling_frequency);
    let nyquist = fs / lit::<T>(2.0);
    let step = config.freq_step;

    ensure!(
        step.is_finite() && step > 0.0,
        ConfigurationSnafu { reason: format!("freq_step must be positive, got {}", step) }
    );

    let fmax = match config.fmax {
        Some(fmax) => lit::<T>(fmax),
        None => nyquist.floor() - T::one(),
    };

    let fmin = match config.fmin {
        Some(fmin) => lit::<T>(fmin),
        None => {
            let whole_seconds = (count::<T>(signal_len) / fs).floor();
            ensure!(
                whole_seconds > T::zero(),
                ConfigurationSnafu {
                    reason: format!(
                        "signal spans less than one second ({} samples at {} Hz); set fmin explicitly",
                        signal_len, config.sampling_frequency
                    ),
                }
            );
            T::one() / whole_seconds
        }
    };

    ensure!(
        fmin.is_finite() && fmax.is_finite(),
        ConfigurationSnafu { reason: format!("frequency bounds must be finite, got [{}, {})", fmin, fmax) }
    );
    ensure!(
        fmin > T::zero(),
        ConfigurationSnafu { reason: format!("fmin must be positive, got {}", fmin) }
    );
    ensure!(
        fmin < fmax,
        ConfigurationSnafu { reason: format!("fmin ({}) must be below fmax ({})", fmin, fmax) }
    );
    ensure!(
        fmax <= nyquist,
        ConfigurationSnafu { reason: format!("fmax ({}) exceeds Nyquist ({})", fmax, nyquist) }
    );

    checked_arange("frequency", fmin, fmax, lit::<T>(step))
}

fn supplied_frequency_grid<T: Sample>(array: &[f64], fs: f64) -> Result<Vec<T>, SpectrumError> {
    ensure!(
        !array.is_empty(),
        ConfigurationSnafu { reason: "supplied frequency array is empty" }
    );

    let nyquist = fs / 2.0;
    for (i, &f) in array.iter().enumerate() {
        ensure!(
            f.is_finite() && f > 0.0 && f < nyquist,
            ConfigurationSnafu {
                reason: format!("frequency_array[{}] = {} is outside (0, {})", i, f, nyquist),
            }
        );
        if i > 0 {
            ensure!(
                f > array[i - 1],
                ConfigurationSnafu { reason: format!("frequency_array is not strictly ascending at index {}", i) }
            );
        }
    }

    Ok(array.iter().map(|&f| lit::<T>(f)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpectrumError;

    fn band(fmin: f64, fmax: f64, freq_step: f64, phase_step: f64) -> SpectrumConfig {
        SpectrumConfig::new(1000.0).with_band(fmin, fmax, freq_step, phase_step)
    }

    #[test]
    fn test_arange_excludes_stop() {
        assert_eq!(arange_len(40.0f64, 60.0, 1.0), Some(20));
        let values = arange(40.0f64, 1.0, 20);
        assert_eq!(values[0], 40.0);
        assert_eq!(values[19], 59.0);
    }

    #[test]
    fn test_arange_len_edges() {
        // ceil((1.0 - 0.0) / 0.3) = 4 -> 0.0, 0.3, 0.6, 0.9
        assert_eq!(arange_len(0.0f64, 1.0, 0.3), Some(4));
        assert_eq!(arange_len(1.0f64, 0.0, 0.1), Some(0));
        assert_eq!(arange_len(0.0f64, 1.0, 1e-300), None);
        assert_eq!(arange_len(0.0f32, 1.0, 0.0), None);
        assert_eq!(arange_len(0.0f64, f64::NAN, 0.1), None);
    }

    #[test]
    fn test_oversized_grids_rejected() {
        for config in [
            band(15.0, 25.0, 1.0, 1e-18),
            band(15.0, 25.0, 1.0, 1e-300),
            band(1.0, 499.0, 1e-16, 0.1),
            band(1.0, 499.0, 1e-5, 0.1),
        ] {
            let result = SearchGrid::<f64>::build(&config, 2000);
            assert!(
                matches!(result, Err(SpectrumError::Configuration { .. })),
                "accepted {:?}",
                config
            );
        }

        // 1e-300 rounds to zero in single precision
        let result = SearchGrid::<f32>::build(&band(15.0, 25.0, 1.0, 1e-300), 2000);
        assert!(matches!(result, Err(SpectrumError::Configuration { .. })));
    }

    #[test]
    fn test_fine_grid_within_cap() {
        // 2π / 1e-6 ≈ 6.3M phases
        let grid = SearchGrid::<f64>::build(&band(15.0, 16.0, 1.0, 1e-6), 2000).unwrap();
        assert_eq!(grid.phases.len(), 6_283_186);
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn test_grid_sizing() {
        let grid = SearchGrid::<f64>::build(&band(40.0, 60.0, 1.0, 0.1), 2000).unwrap();
        assert_eq!(grid.len(), 20);
        assert_eq!(grid.phases.len(), 63); // ceil(2π / 0.1)
        assert_eq!(grid.evaluations_per_pass(), 20 * 63);
        assert!(grid.phases.iter().all(|&p| (0.0..2.0 * core::f64::consts::PI).contains(&p)));

        for (fmin, fmax, step) in [(1.0, 10.0, 0.25), (5.5, 7.25, 0.1), (0.5, 499.0, 0.7)] {
            let grid = SearchGrid::<f64>::build(&band(fmin, fmax, step, 0.1), 2000).unwrap();
            assert_eq!(Some(grid.len()), arange_len(fmin, fmax, step), "[{}, {}) step {}", fmin, fmax, step);
            assert!(*grid.frequencies.last().unwrap() < fmax);
        }
    }

    #[test]
    fn test_default_bounds() {
        // 2 s at 1 kHz: fmin = 1/2 Hz, fmax = 499 Hz
        let mut config = SpectrumConfig::new(1000.0);
        config.freq_step = 1.0;
        let grid = SearchGrid::<f64>::build(&config, 2000).unwrap();
        assert_eq!(grid.frequencies[0], 0.5);
        assert_eq!(Some(grid.len()), arange_len(0.5, 499.0, 1.0));

        let grid = SearchGrid::<f64>::build(&SpectrumConfig::new(1000.0), 2000).unwrap();
        assert_eq!(grid.phases[0], 0.0);
        assert!((grid.phases[1] - crate::config::DEFAULT_PHASE_STEP).abs() < 1e-15);
    }

    #[test]
    fn test_default_fmin_needs_one_second() {
        let result = SearchGrid::<f64>::build(&SpectrumConfig::new(1000.0), 999);
        assert!(matches!(result, Err(SpectrumError::Configuration { .. })));
    }

    #[test]
    fn test_boundary_rejection() {
        let cases = [
            band(60.0, 60.0, 1.0, 0.1),
            band(70.0, 60.0, 1.0, 0.1),
            band(40.0, 60.0, 0.0, 0.1),
            band(40.0, 60.0, -1.0, 0.1),
            band(40.0, 60.0, 1.0, 0.0),
            band(40.0, 60.0, 1.0, -0.1),
            band(0.0, 60.0, 1.0, 0.1),
            band(40.0, 600.0, 1.0, 0.1),
            band(40.0, 60.0, f64::NAN, 0.1),
        ];
        for config in cases {
            let result = SearchGrid::<f32>::build(&config, 2000);
            assert!(
                matches!(result, Err(SpectrumError::Configuration { .. })),
                "accepted {:?}",
                config
            );
        }
    }

    #[test]
    fn test_sampling_frequency_rejected() {
        let result = SearchGrid::<f64>::build(&SpectrumConfig::new(0.0), 2000);
        assert!(matches!(result, Err(SpectrumError::Configuration { .. })));
    }

    #[test]
    fn test_supplied_frequency_array() {
        let mut config = SpectrumConfig::new(1000.0);
        config.frequency_array = Some(vec![10.0, 20.0, 50.0]);
        let grid = SearchGrid::<f32>::build(&config, 10).unwrap();
        assert_eq!(grid.frequencies, vec![10.0f32, 20.0, 50.0]);

        for bad in [vec![], vec![20.0, 10.0], vec![10.0, 500.0], vec![-1.0, 10.0]] {
            config.frequency_array = Some(bad);
            assert!(SearchGrid::<f64>::build(&config, 2000).is_err());
        }
    }
}
