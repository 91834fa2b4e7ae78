//! Phase-grid maximization for a single frequency bin
//!
//! Phases are scanned in ascending order and the first maximal value wins, so
//! ties resolve to the smallest phase. Non-finite values never win. While the
//! scan runs, the best value sits at `-inf` and the phase at `-1` (outside
//! `[0, 2π)`); if no finite candidate turns up, both become NaN.

use tracing::trace;

use super::objective::Objective;
use crate::precision::Sample;

/// Maximum of a statistic over the phase grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhasePeak<T> {
    /// Largest finite value of the statistic (NaN if none)
    pub value: T,
    /// Grid phase achieving `value` (NaN if none)
    pub phase: T,
    /// Index into the phase grid, `None` if no finite candidate was seen
    pub index: Option<usize>,
}

impl<T: Sample> PhasePeak<T> {
    /// Scan sentinel: `-inf` value, `-1` phase
    pub fn unset() -> Self {
        Self {
            value: T::neg_infinity(),
            phase: -T::one(),
            index: None,
        }
    }

    /// Result for a bin with no finite candidate
    pub fn unresolved() -> Self {
        Self {
            value: T::nan(),
            phase: T::nan(),
            index: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.index.is_some()
    }
}

/// Maximize `statistic` over `phases`, first maximum wins
pub fn scan_phases<T, F>(phases: &[T], mut statistic: F) -> PhasePeak<T>
where
    T: Sample,
    F: FnMut(T) -> T,
{
    let mut peak = PhasePeak::unset();

    for (j, &phase) in phases.iter().enumerate() {
        let value = statistic(phase);
        if value.is_finite() && value > peak.value {
            peak = PhasePeak {
                value,
                phase,
                index: Some(j),
            };
        }
    }

    if peak.is_resolved() {
        peak
    } else {
        PhasePeak::unresolved()
    }
}

/// Maximize one objective at one frequency bin
pub fn maximize<T: Sample>(objective: &Objective<'_, T>, angles: &[T], phases: &[T]) -> PhasePeak<T> {
    let peak = scan_phases(phases, |phase| objective.evaluate(angles, phase));

    trace!(
        objective = objective.name(),
        value = %peak.value,
        phase = %peak.phase,
        "phase scan"
    );

    peak
}
