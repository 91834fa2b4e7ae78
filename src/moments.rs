//! Signal power arrays
//!
//! Each order `k` of the estimator correlates against `S_k = signal^k`. The
//! powers are computed once per call, before any frequency bin is scanned.

use snafu::ensure;

use crate::error::{DegenerateSignalSnafu, SpectrumError};
use crate::precision::{count, Sample};

/// Highest signal power any order needs
pub const MAX_POWER: usize = 4;

/// Precomputed `signal^k` arrays and the mean square used by the order-1 statistic
#[derive(Debug, Clone)]
pub struct SignalMoments<T> {
    /// `powers[k - 1][i] = signal[i]^k`
    powers: Vec<Vec<T>>,
    mean_square: T,
}

impl<T: Sample> SignalMoments<T> {
    /// Compute powers `1..=max_power` of `signal`
    pub fn new(signal: &[T], max_power: usize) -> Self {
        let max_power = max_power.clamp(1, MAX_POWER);
        let mut powers = Vec::with_capacity(max_power);
        powers.push(signal.to_vec());
        for k in 2..=max_power {
            let next: Vec<T> = powers[k - 2].iter().zip(signal).map(|(&p, &s)| p * s).collect();
            powers.push(next);
        }

        let mean_square = if max_power >= 2 {
            mean(&powers[1])
        } else {
            mean(&signal.iter().map(|&s| s * s).collect::<Vec<_>>())
        };

        Self { powers, mean_square }
    }

    /// `signal^k`, if it was precomputed
    pub fn power(&self, k: usize) -> Option<&[T]> {
        k.checked_sub(1).and_then(|i| self.powers.get(i)).map(Vec::as_slice)
    }

    /// `signal^2, signal^3, ...` up to the highest precomputed power
    pub fn higher_powers(&self) -> impl Iterator<Item = &[T]> {
        self.powers.iter().skip(1).map(Vec::as_slice)
    }

    /// The signal itself
    pub fn signal(&self) -> &[T] {
        &self.powers[0]
    }

    /// `mean(signal^2)`
    pub fn mean_square(&self) -> T {
        self.mean_square
    }

    pub fn max_power(&self) -> usize {
        self.powers.len()
    }
}

/// Left-to-right sum divided by the length
pub fn mean<T: Sample>(values: &[T]) -> T {
    let sum = values.iter().fold(T::zero(), |acc, &v| acc + v);
    sum / count::<T>(values.len())
}

/// Reject signals the objective statistics are meaningless for.
///
/// # Errors
/// `SpectrumError::DegenerateSignal` when the signal has fewer than two
/// samples, contains a non-finite sample, or is constant.
pub fn check_signal<T: Sample>(signal: &[T]) -> Result<(), SpectrumError> {
    ensure!(
        signal.len() >= 2,
        DegenerateSignalSnafu { reason: format!("need at least 2 samples, got {}", signal.len()) }
    );

    if let Some(index) = signal.iter().position(|s| !s.is_finite()) {
        return DegenerateSignalSnafu { reason: format!("non-finite sample at index {}", index) }.fail();
    }

    let first = signal[0];
    ensure!(
        signal.iter().any(|&s| s != first),
        DegenerateSignalSnafu { reason: format!("constant signal ({} samples of {})", signal.len(), first) }
    );

    Ok(())
}
