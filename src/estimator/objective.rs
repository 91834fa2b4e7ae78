//! Objective statistics for one (frequency, phase) candidate
//!
//! With `r(t) = cos(2π f t + φ)` and `S_k = signal^k`:
//!
//! | Objective | Statistic |
//! |---|---|
//! | `Fundamental` | `mean[(s + r)^2] - mean[s^2] - 0.5` |
//! | `WithinBand` | `mean[S_k · cos^2(π f t + φ)]` |
//! | `Coupling` | `mean[S_k · r]` |
//!
//! Every mean is a left-to-right sum over the time axis divided by `N`.

use crate::precision::{count, lit, two_pi, Sample};

/// Statistic evaluated at each grid point of one sub-pass
#[derive(Debug, Clone, Copy)]
pub enum Objective<'a, T> {
    /// Order-1 synchronous detection statistic
    Fundamental { signal: &'a [T], mean_square: T },
    /// Within-band sub-pass over `S_k`
    WithinBand { moment: &'a [T] },
    /// Coupling sub-pass over `S_k`
    Coupling { moment: &'a [T] },
}

impl<'a, T: Sample> Objective<'a, T> {
    /// Value of the statistic for carrier angles `angles` shifted by `phase`
    ///
    /// `angles` must come from [`CarrierAngles::for_objective`] for the same
    /// objective and have one entry per sample.
    pub fn evaluate(&self, angles: &[T], phase: T) -> T {
        match *self {
            Objective::Fundamental { signal, mean_square } => {
                let sum = signal.iter().zip(angles).fold(T::zero(), |acc, (&s, &theta)| {
                    let x = s + (theta + phase).cos();
                    acc + x * x
                });
                sum / count::<T>(signal.len()) - mean_square - lit::<T>(0.5)
            }
            Objective::WithinBand { moment } => {
                let sum = moment.iter().zip(angles).fold(T::zero(), |acc, (&m, &theta)| {
                    let c = (theta + phase).cos();
                    acc + m * (c * c)
                });
                sum / count::<T>(moment.len())
            }
            Objective::Coupling { moment } => {
                let sum = moment
                    .iter()
                    .zip(angles)
                    .fold(T::zero(), |acc, (&m, &theta)| acc + m * (theta + phase).cos());
                sum / count::<T>(moment.len())
            }
        }
    }

    /// True when the carrier runs at half rate (`π f t`)
    pub fn half_rate(&self) -> bool {
        matches!(self, Objective::WithinBand { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Objective::Fundamental { .. } => "fundamental",
            Objective::WithinBand { .. } => "within-band",
            Objective::Coupling { .. } => "coupling",
        }
    }
}

/// Phase-free carrier angles for one frequency bin, shared by all sub-passes
#[derive(Debug, Clone)]
pub struct CarrierAngles<T> {
    /// `2π f t`
    full: Vec<T>,
    /// `π f t`, only built when a within-band sub-pass needs it
    half: Option<Vec<T>>,
}

impl<T: Sample> CarrierAngles<T> {
    pub fn new(frequency: T, time: &[T], with_half_rate: bool) -> Self {
        let omega = two_pi::<T>() * frequency;
        let full = time.iter().map(|&t| omega * t).collect();
        let half = with_half_rate.then(|| {
            let omega = T::PI() * frequency;
            time.iter().map(|&t| omega * t).collect()
        });
        Self { full, half }
    }

    /// Angles matching the objective's carrier rate
    pub fn for_objective(&self, objective: &Objective<'_, T>) -> &[T] {
        match (&self.half, objective.half_rate()) {
            (Some(half), true) => half,
            _ => &self.full,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_base::synthesize;
    use core::f64::consts::PI;

    fn tone(f: f64, phase: f64, fs: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| (2.0 * PI * f * i as f64 / fs + phase).cos()).collect()
    }

    #[test]
    fn test_fundamental_in_phase() {
        let time: Vec<f64> = synthesize(1000.0, 2000);
        let signal = tone(50.0, 0.0, 1000.0, 2000);
        let mean_square = signal.iter().map(|s| s * s).sum::<f64>() / 2000.0;
        let objective = Objective::Fundamental { signal: &signal, mean_square };
        let angles = CarrierAngles::new(50.0, &time, false);

        // mean[2 s r] + mean[r^2] - 0.5 = 1 + 0.5 - 0.5
        let aligned = objective.evaluate(angles.for_objective(&objective), 0.0);
        assert!((aligned - 1.0).abs() < 1e-9, "aligned = {}", aligned);

        let opposed = objective.evaluate(angles.for_objective(&objective), PI);
        assert!((opposed + 1.0).abs() < 1e-9, "opposed = {}", opposed);

        let quadrature = objective.evaluate(angles.for_objective(&objective), PI / 2.0);
        assert!(quadrature.abs() < 1e-9, "quadrature = {}", quadrature);
    }

    #[test]
    fn test_coupling_on_squared_tone() {
        // cos^2(2π 20 t) = 0.5 + 0.5 cos(2π 40 t)
        let time: Vec<f64> = synthesize(1000.0, 2000);
        let moment: Vec<f64> = tone(20.0, 0.0, 1000.0, 2000).iter().map(|s| s * s).collect();
        let objective = Objective::Coupling { moment: &moment };
        let angles = CarrierAngles::new(40.0, &time, false);
        let value = objective.evaluate(angles.for_objective(&objective), 0.0);
        assert!((value - 0.25).abs() < 1e-9, "value = {}", value);
    }

    #[test]
    fn test_within_band_uses_half_rate() {
        let time: Vec<f64> = synthesize(100.0, 200);
        let moment = vec![1.0f64; 200];
        let objective = Objective::WithinBand { moment: &moment };
        assert!(objective.half_rate());

        let angles = CarrierAngles::new(5.0, &time, true);
        assert_eq!(angles.for_objective(&objective)[1], PI * 5.0 * 0.01);

        // mean[cos^2] over whole cycles is 0.5
        let value = objective.evaluate(angles.for_objective(&objective), 0.3);
        assert!((value - 0.5).abs() < 1e-9, "value = {}", value);
    }
}
