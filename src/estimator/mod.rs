//! Time-domain spectral estimation
//!
//! Estimates amplitude and phase per candidate frequency by exhaustive
//! synchronous detection: every `(frequency, phase)` pair of the search grid is
//! scored by an objective statistic and the best phase is kept per frequency.
//!
//! **Orders**:
//! - 1 (spectrum): synchronous detection against `cos(2π f t + φ)`
//! - 2..4 (bispectrum, trispectrum, tetraspectrum): within-band and coupling
//!   sub-passes over `signal^k`, with the coupling maximum cascaded against the
//!   order below
//!
//! **Scheduling**: each frequency bin reads only the immutable signal, time and
//! grid, and produces its own peaks. Bins run on the rayon pool (or
//! sequentially) and are gathered in frequency order, so the result does not
//! depend on the schedule.
//!
//! **Module Organization**:
//! - `objective` - statistics for one candidate
//! - `maximizer` - phase scan with first-maximum tie-break
//! - `assemble` - per-order arrays and the amplitude cascade

pub mod assemble;
pub mod maximizer;
pub mod objective;

use core::fmt;
use std::sync::Arc;

use rayon::prelude::*;
use snafu::ensure;
use tracing::{debug, info, instrument};

pub use assemble::{BinSeries, OrderLevel, SpectralEstimate, SubPasses};
pub use maximizer::{maximize, scan_phases, PhasePeak};
pub use objective::{CarrierAngles, Objective};

use assemble::{assemble, BinPeaks, SubPassPeaks};
use crate::cancel::CancelToken;
use crate::config::{BaseSpectrum, SpectrumConfig};
use crate::error::{CancelledSnafu, ConfigurationSnafu, SpectrumError};
use crate::grid::SearchGrid;
use crate::moments::{check_signal, SignalMoments};
use crate::precision::{Precision, Sample};
use crate::progress::{ProgressSink, ProgressTracker, TracingProgress};
use crate::time_base;

/// Highest order of the estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpectralOrder {
    Fundamental = 1,
    Bispectrum = 2,
    Trispectrum = 3,
    Tetraspectrum = 4,
}

impl SpectralOrder {
    pub const ALL: [SpectralOrder; 4] = [
        SpectralOrder::Fundamental,
        SpectralOrder::Bispectrum,
        SpectralOrder::Trispectrum,
        SpectralOrder::Tetraspectrum,
    ];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn as_usize(self) -> usize {
        self as usize
    }

    /// Orders `1..=self`, ascending
    pub fn levels(self) -> impl Iterator<Item = SpectralOrder> {
        Self::ALL.into_iter().take(self.as_usize())
    }

    /// Phase-grid sweeps per frequency bin: one for order 1, two per higher order
    pub fn sub_passes(self) -> u64 {
        1 + 2 * (self.as_u8() as u64 - 1)
    }

    pub fn name(self) -> &'static str {
        match self {
            SpectralOrder::Fundamental => "spectrum",
            SpectralOrder::Bispectrum => "bispectrum",
            SpectralOrder::Trispectrum => "trispectrum",
            SpectralOrder::Tetraspectrum => "tetraspectrum",
        }
    }
}

impl TryFrom<u8> for SpectralOrder {
    type Error = SpectrumError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ensure!(
            (1..=4).contains(&value),
            ConfigurationSnafu { reason: format!("order must be between 1 and 4, got {}", value) }
        );
        Ok(Self::ALL[value as usize - 1])
    }
}

impl fmt::Display for SpectralOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Estimate in whichever width was requested at runtime
#[derive(Debug, Clone, PartialEq)]
pub enum AnyEstimate {
    Single(SpectralEstimate<f32>),
    Double(SpectralEstimate<f64>),
}

impl AnyEstimate {
    pub fn precision(&self) -> Precision {
        match self {
            AnyEstimate::Single(_) => Precision::Single,
            AnyEstimate::Double(_) => Precision::Double,
        }
    }
}

/// Time-domain spectral estimator for orders 1 to 4
///
/// # Example
/// ```
/// use tdhosa::{Estimator, SpectralOrder, SpectrumConfig};
///
/// let fs = 1000.0;
/// let signal: Vec<f64> = (0..2000)
///     .map(|i| (2.0 * std::f64::consts::PI * 50.0 * i as f64 / fs).cos())
///     .collect();
///
/// let config = SpectrumConfig::new(fs).with_band(40.0, 60.0, 1.0, 0.1);
/// let estimate = Estimator::new(config).estimate(SpectralOrder::Fundamental, &signal, None)?;
/// let (_, frequency, _) = estimate.peak(SpectralOrder::Fundamental).unwrap();
/// assert_eq!(frequency, 50.0);
/// # Ok::<(), tdhosa::SpectrumError>(())
/// ```
#[derive(Clone)]
pub struct Estimator {
    config: SpectrumConfig,
    progress: Option<Arc<dyn ProgressSink>>,
    cancel: Option<CancelToken>,
}

impl fmt::Debug for Estimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Estimator")
            .field("config", &self.config)
            .field("progress", &self.progress.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl Estimator {
    pub fn new(config: SpectrumConfig) -> Self {
        Self {
            config,
            progress: None,
            cancel: None,
        }
    }

    /// Report completed evaluations to `sink`
    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Check `token` once per frequency bin
    pub fn with_cancellation(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &SpectrumConfig {
        &self.config
    }

    /// Estimate orders `1..=order` of `signal`.
    ///
    /// # Arguments
    /// * `order` - Highest order to compute
    /// * `signal` - Real samples, at least two, not constant
    /// * `time` - Optional timestamps (same length as `signal`); `i / fs` when absent
    ///
    /// # Errors
    /// Validation errors are raised before any bin is evaluated:
    /// `DegenerateSignal`, then `InputShape`, then `Configuration`.
    /// `Cancelled` if the cancellation token fires mid-scan.
    #[instrument(skip(self, signal, time), fields(order = order.as_u8(), signal_len = signal.len()))]
    pub fn estimate<T: Sample>(
        &self,
        order: SpectralOrder,
        signal: &[T],
        time: Option<&[T]>,
    ) -> Result<SpectralEstimate<T>, SpectrumError> {
        check_signal(signal)?;
        let time = time_base::resolve(time, self.config.sampling_frequency, signal.len())?;
        let grid = SearchGrid::<T>::build(&self.config, signal.len())?;
        let moments = SignalMoments::new(signal, order.as_usize());

        let total = grid.evaluations_per_pass() * order.sub_passes();
        let tracker = ProgressTracker::new(self.progress_sink(), total);

        debug!(
            frequency_bins = grid.len(),
            phase_bins = grid.phases.len(),
            sub_passes = order.sub_passes(),
            total_evaluations = total,
            parallel = self.config.parallel,
            "starting spectral scan"
        );

        let phases = &grid.phases;
        let evaluate = |(index, &frequency): (usize, &T)| {
            self.evaluate_bin(index, frequency, &time, phases, &moments, order, &tracker)
        };

        let bins: Vec<BinPeaks<T>> = if self.config.parallel {
            grid.frequencies
                .par_iter()
                .enumerate()
                .map(evaluate)
                .collect::<Result<_, _>>()?
        } else {
            grid.frequencies
                .iter()
                .enumerate()
                .map(evaluate)
                .collect::<Result<_, _>>()?
        };

        tracker.finish();
        let estimate = assemble(order, grid.frequencies, bins);

        info!(
            order = %order,
            frequency_bins = estimate.len(),
            "spectral estimate complete"
        );

        Ok(estimate)
    }

    /// Order-1 spectrum
    pub fn fundamental<T: Sample>(&self, signal: &[T], time: Option<&[T]>) -> Result<SpectralEstimate<T>, SpectrumError> {
        self.estimate(SpectralOrder::Fundamental, signal, time)
    }

    /// Orders 1 and 2
    pub fn bispectrum<T: Sample>(&self, signal: &[T], time: Option<&[T]>) -> Result<SpectralEstimate<T>, SpectrumError> {
        self.estimate(SpectralOrder::Bispectrum, signal, time)
    }

    /// Orders 1 to 3
    pub fn trispectrum<T: Sample>(&self, signal: &[T], time: Option<&[T]>) -> Result<SpectralEstimate<T>, SpectrumError> {
        self.estimate(SpectralOrder::Trispectrum, signal, time)
    }

    /// Orders 1 to 4
    pub fn tetraspectrum<T: Sample>(&self, signal: &[T], time: Option<&[T]>) -> Result<SpectralEstimate<T>, SpectrumError> {
        self.estimate(SpectralOrder::Tetraspectrum, signal, time)
    }

    /// Estimate with the float width chosen at runtime.
    ///
    /// Samples and timestamps are cast into the requested width before any
    /// computation, so a `Single` call is identical to calling [`Self::estimate`]
    /// with `f32` data.
    pub fn estimate_with_precision(
        &self,
        order: SpectralOrder,
        precision: Precision,
        signal: &[f64],
        time: Option<&[f64]>,
    ) -> Result<AnyEstimate, SpectrumError> {
        match precision {
            Precision::Single => {
                let signal: Vec<f32> = signal.iter().map(|&s| s as f32).collect();
                let time: Option<Vec<f32>> = time.map(|t| t.iter().map(|&x| x as f32).collect());
                self.estimate(order, &signal, time.as_deref()).map(AnyEstimate::Single)
            }
            Precision::Double => self.estimate(order, signal, time).map(AnyEstimate::Double),
        }
    }

    fn progress_sink(&self) -> Option<Arc<dyn ProgressSink>> {
        match (&self.progress, self.config.progress) {
            (Some(sink), _) => Some(Arc::clone(sink)),
            (None, true) => Some(Arc::new(TracingProgress::default())),
            (None, false) => None,
        }
    }

    /// Every sub-pass of every order at one frequency bin
    #[allow(clippy::too_many_arguments)]
    fn evaluate_bin<T: Sample>(
        &self,
        index: usize,
        frequency: T,
        time: &[T],
        phases: &[T],
        moments: &SignalMoments<T>,
        order: SpectralOrder,
        tracker: &ProgressTracker,
    ) -> Result<BinPeaks<T>, SpectrumError> {
        if let Some(token) = &self.cancel {
            ensure!(!token.is_cancelled(), CancelledSnafu { frequency_index: index });
        }

        let sweep = phases.len() as u64;
        let half_rate = order > SpectralOrder::Fundamental || self.config.base == BaseSpectrum::WithinBand;
        let angles = CarrierAngles::new(frequency, time, half_rate);

        let base_objective = match self.config.base {
            BaseSpectrum::Fundamental => Objective::Fundamental {
                signal: moments.signal(),
                mean_square: moments.mean_square(),
            },
            BaseSpectrum::WithinBand => Objective::WithinBand { moment: moments.signal() },
        };
        let base = maximize(&base_objective, angles.for_objective(&base_objective), phases);
        tracker.advance(sweep);

        let mut higher = Vec::with_capacity(order.as_usize() - 1);
        for moment in moments.higher_powers() {
            let within = Objective::WithinBand { moment };
            let spectrum = maximize(&within, angles.for_objective(&within), phases);
            tracker.advance(sweep);

            let coupling_objective = Objective::Coupling { moment };
            let coupling = maximize(&coupling_objective, angles.for_objective(&coupling_objective), phases);
            tracker.advance(sweep);

            higher.push(SubPassPeaks { spectrum, coupling });
        }

        Ok(BinPeaks { base, higher })
    }
}
