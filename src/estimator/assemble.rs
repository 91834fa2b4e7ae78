//! Spectrum assembly
//!
//! Per-bin phase peaks are gathered (in frequency order) into one array per
//! quantity, and each order-k amplitude is cascaded against order k-1:
//!
//! `amplitude_k[i] = coupling_peak_k[i] × amplitude_(k-1)[i]`
//!
//! Phases are not cascaded. A bin is unresolved at order k when either of its
//! sub-passes found no finite candidate, when it is unresolved at order k-1, or
//! when the cascaded product is not finite. Unresolved bins carry NaN amplitude
//! and phase; the raw sub-pass maxima are kept as found.

use tracing::{debug, warn};

use super::maximizer::PhasePeak;
use super::SpectralOrder;
use crate::precision::Sample;

/// Peaks of the two sub-passes of one higher order at one bin
#[derive(Debug, Clone, Copy)]
pub(crate) struct SubPassPeaks<T> {
    pub spectrum: PhasePeak<T>,
    pub coupling: PhasePeak<T>,
}

/// Everything evaluated at one frequency bin
#[derive(Debug, Clone)]
pub(crate) struct BinPeaks<T> {
    /// Level-1 statistic
    pub base: PhasePeak<T>,
    /// `higher[k - 2]` holds the sub-passes of order `k`
    pub higher: Vec<SubPassPeaks<T>>,
}

/// Amplitude/phase pair indexed like the frequency grid
#[derive(Debug, Clone, PartialEq)]
pub struct BinSeries<T> {
    pub amplitude: Vec<T>,
    pub phase: Vec<T>,
}

impl<T: Sample> BinSeries<T> {
    fn gather(peaks: impl Iterator<Item = PhasePeak<T>>) -> Self {
        let (amplitude, phase) = peaks.map(|p| (p.value, p.phase)).unzip();
        Self { amplitude, phase }
    }
}

/// Raw sub-pass maxima of an order >= 2
#[derive(Debug, Clone, PartialEq)]
pub struct SubPasses<T> {
    /// `max_φ mean[S_k · cos^2(π f t + φ)]` and its phase (`phase_spectrum_k`)
    pub spectrum: BinSeries<T>,
    /// `max_φ mean[S_k · cos(2π f t + φ)]` and its phase (`phase_coupling_k`)
    pub coupling: BinSeries<T>,
}

/// Estimate of one order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLevel<T> {
    pub order: SpectralOrder,
    /// Level-1 peak value, or the cascaded coupling amplitude for k >= 2
    pub amplitude: Vec<T>,
    /// Level-1 phase, or `phase_coupling_k` for k >= 2
    pub phase: Vec<T>,
    /// Sub-pass maxima, `None` for order 1
    pub sub_passes: Option<SubPasses<T>>,
    /// Ascending bins with NaN amplitude and phase: a sub-pass had no finite
    /// candidate, the bin is unresolved one order down, or the cascade overflowed
    pub unresolved_bins: Vec<usize>,
}

/// Result of one estimation call
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralEstimate<T> {
    /// Highest order computed
    pub order: SpectralOrder,
    /// Frequency grid the arrays are indexed by
    pub frequencies: Vec<T>,
    /// `levels[k - 1]` is the order-k estimate
    pub levels: Vec<OrderLevel<T>>,
}

impl<T: Sample> SpectralEstimate<T> {
    /// Number of frequency bins
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn level(&self, order: SpectralOrder) -> Option<&OrderLevel<T>> {
        self.levels.get(order.as_usize() - 1)
    }

    /// `(amplitude, phase)` pairs for orders `1..=order`
    pub fn pairs(&self) -> impl Iterator<Item = (&[T], &[T])> {
        self.levels.iter().map(|l| (l.amplitude.as_slice(), l.phase.as_slice()))
    }

    /// Bin index, frequency and amplitude of the largest finite amplitude at `order`
    pub fn peak(&self, order: SpectralOrder) -> Option<(usize, T, T)> {
        let level = self.level(order)?;
        let mut best: Option<(usize, T)> = None;
        for (i, &a) in level.amplitude.iter().enumerate() {
            if a.is_finite() && best.map_or(true, |(_, b)| a > b) {
                best = Some((i, a));
            }
        }
        best.map(|(i, a)| (i, self.frequencies[i], a))
    }
}

/// Gather per-bin peaks into per-order arrays and apply the amplitude cascade
pub(crate) fn assemble<T: Sample>(
    order: SpectralOrder,
    frequencies: Vec<T>,
    bins: Vec<BinPeaks<T>>,
) -> SpectralEstimate<T> {
    let mut levels = Vec::with_capacity(order.as_usize());

    let base = BinSeries::gather(bins.iter().map(|b| b.base));
    let unresolved_bins = unresolved(bins.iter().map(|b| b.base.is_resolved()));
    levels.push(OrderLevel {
        order: SpectralOrder::Fundamental,
        amplitude: base.amplitude,
        phase: base.phase,
        sub_passes: None,
        unresolved_bins,
    });

    for level_order in order.levels().skip(1) {
        let slot = level_order.as_usize() - 2;
        let spectrum = BinSeries::gather(bins.iter().map(|b| b.higher[slot].spectrum));
        let coupling = BinSeries::gather(bins.iter().map(|b| b.higher[slot].coupling));

        let previous = &levels[levels.len() - 1];
        let mut amplitude = Vec::with_capacity(bins.len());
        let mut phase = Vec::with_capacity(bins.len());
        let mut unresolved_bins = Vec::new();
        for (i, bin) in bins.iter().enumerate() {
            let peaks = &bin.higher[slot];
            let cascaded = coupling.amplitude[i] * previous.amplitude[i];
            let resolved = peaks.spectrum.is_resolved()
                && peaks.coupling.is_resolved()
                && previous.unresolved_bins.binary_search(&i).is_err()
                && cascaded.is_finite();
            if resolved {
                amplitude.push(cascaded);
                phase.push(coupling.phase[i]);
            } else {
                amplitude.push(T::nan());
                phase.push(T::nan());
                unresolved_bins.push(i);
            }
        }

        levels.push(OrderLevel {
            order: level_order,
            amplitude,
            phase,
            sub_passes: Some(SubPasses { spectrum, coupling }),
            unresolved_bins,
        });
    }

    for level in &levels {
        if let Some(&first) = level.unresolved_bins.first() {
            warn!(
                order = level.order.as_u8(),
                bins = level.unresolved_bins.len(),
                first_frequency = %frequencies[first],
                "unresolved frequency bin(s), amplitude and phase set to NaN"
            );
        }
    }

    debug!(order = order.as_u8(), bins = frequencies.len(), "spectrum assembled");

    SpectralEstimate {
        order,
        frequencies,
        levels,
    }
}

fn unresolved(resolved: impl Iterator<Item = bool>) -> Vec<usize> {
    resolved
        .enumerate()
        .filter_map(|(i, ok)| (!ok).then_some(i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(value: f64, phase: f64) -> PhasePeak<f64> {
        PhasePeak { value, phase, index: Some(0) }
    }

    fn bin(base: f64, couplings: &[f64]) -> BinPeaks<f64> {
        BinPeaks {
            base: peak(base, 0.1),
            higher: couplings
                .iter()
                .map(|&c| SubPassPeaks { spectrum: peak(c + 1.0, 0.2), coupling: peak(c, 0.3) })
                .collect(),
        }
    }

    #[test]
    fn test_cascade() {
        let bins = vec![bin(2.0, &[0.5, 0.25, 4.0]), bin(-1.0, &[3.0, 2.0, 0.5])];
        let estimate = assemble(SpectralOrder::Tetraspectrum, vec![10.0, 11.0], bins);

        assert_eq!(estimate.levels.len(), 4);
        assert_eq!(estimate.levels[0].amplitude, vec![2.0, -1.0]);
        assert_eq!(estimate.levels[1].amplitude, vec![1.0, -3.0]);
        assert_eq!(estimate.levels[2].amplitude, vec![0.25, -6.0]);
        assert_eq!(estimate.levels[3].amplitude, vec![1.0, -3.0]);

        let level2 = estimate.level(SpectralOrder::Bispectrum).unwrap();
        assert_eq!(level2.phase, vec![0.3, 0.3]);
        let sub = level2.sub_passes.as_ref().unwrap();
        assert_eq!(sub.spectrum.amplitude, vec![1.5, 4.0]);
        assert_eq!(sub.coupling.amplitude, vec![0.5, 3.0]);
        assert_eq!(estimate.pairs().count(), 4);
    }

    #[test]
    fn test_unresolved_bins_recorded() {
        let mut bad = bin(1.0, &[1.0]);
        bad.base = PhasePeak::unresolved();
        let estimate = assemble(SpectralOrder::Bispectrum, vec![1.0, 2.0, 3.0], vec![bin(1.0, &[1.0]), bad, bin(3.0, &[1.0])]);

        assert_eq!(estimate.levels[0].unresolved_bins, vec![1]);
        assert!(estimate.levels[0].amplitude[1].is_nan());
        assert_eq!(estimate.levels[1].unresolved_bins, vec![1]);
        assert!(estimate.levels[1].amplitude[1].is_nan());
        assert!(estimate.levels[1].phase[1].is_nan());
        assert_eq!(estimate.levels[1].amplitude[0], 1.0);
        assert_eq!(estimate.levels[1].amplitude[2], 3.0);
        // raw sub-pass maxima of the bin are still reported
        assert_eq!(estimate.levels[1].sub_passes.as_ref().unwrap().coupling.amplitude[1], 1.0);
        assert_eq!(estimate.peak(SpectralOrder::Fundamental), Some((2, 3.0, 3.0)));
    }

    #[test]
    fn test_unresolved_bin_carries_up_every_order() {
        let mut bad = bin(1.0, &[1.0, 1.0, 1.0]);
        bad.higher[0].coupling = PhasePeak::unresolved();
        let bins = vec![bin(1.0, &[2.0, 2.0, 2.0]), bad];
        let estimate = assemble(SpectralOrder::Tetraspectrum, vec![1.0, 2.0], bins);

        assert!(estimate.levels[0].unresolved_bins.is_empty());
        for level in &estimate.levels[1..] {
            assert_eq!(level.unresolved_bins, vec![1], "order {}", level.order);
            assert!(level.amplitude[1].is_nan());
        }
        assert_eq!(estimate.levels[3].amplitude[0], 8.0);
    }

    #[test]
    fn test_overflowing_cascade_is_unresolved() {
        let bins = vec![bin(1e200, &[1e200, 0.5]), bin(1.0, &[2.0, 0.5])];
        let estimate = assemble(SpectralOrder::Trispectrum, vec![1.0, 2.0], bins);

        assert_eq!(estimate.levels[1].unresolved_bins, vec![0]);
        assert!(estimate.levels[1].amplitude[0].is_nan());
        assert_eq!(estimate.levels[2].unresolved_bins, vec![0]);
        assert_eq!(estimate.levels[2].amplitude[1], 1.0);
    }
}
