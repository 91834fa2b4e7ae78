//! Time-domain higher-order spectral analysis
//!
//! Estimates the amplitude and phase spectrum of a sampled real signal by
//! exhaustive synchronous detection over a frequency × phase grid, and extends
//! the estimate to the bispectrum, trispectrum and tetraspectrum by cascading
//! coupling statistics of `signal^k` against the order below.
//!
//! Entry point: [`Estimator`], configured by a [`SpectrumConfig`] and run for a
//! [`SpectralOrder`].

pub mod cancel;
pub mod config;
pub mod error;
pub mod estimator;
pub mod grid;
pub mod moments;
pub mod precision;
pub mod progress;
pub mod simulation;
pub mod time_base;
pub mod tracing_init;

pub use cancel::CancelToken;
pub use config::{BaseSpectrum, SpectrumConfig, DEFAULT_FREQ_STEP, DEFAULT_PHASE_STEP};
pub use error::SpectrumError;
pub use estimator::{AnyEstimate, Estimator, OrderLevel, SpectralEstimate, SpectralOrder, SubPasses};
pub use precision::{Precision, Sample};
pub use progress::{CountingProgress, ProgressSink, TracingProgress};
