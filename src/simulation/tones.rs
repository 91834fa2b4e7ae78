//! Deterministic test signals
//!
//! Sums of sinusoids and an amplitude-modulated carrier, sampled on the same
//! `i / fs` time base the estimator synthesizes.

use core::f64::consts::PI;

/// One sinusoidal component `gain · cos(2π f t + φ)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    /// Frequency in Hz
    pub frequency: f64,
    /// Phase in radians
    pub phase: f64,
    pub gain: f64,
}

impl Tone {
    pub fn new(frequency: f64, phase: f64, gain: f64) -> Self {
        Self { frequency, phase, gain }
    }
}

/// Sum of `tones` sampled at `t = i / fs` for `i in 0..n`
///
/// # Example
/// ```
/// use tdhosa::simulation::{synthesize, Tone};
///
/// let signal = synthesize(&[Tone::new(12.0, 0.5, 0.8), Tone::new(53.0, 0.25, 0.7)], 1000.0, 5000);
/// assert_eq!(signal.len(), 5000);
/// ```
pub fn synthesize(tones: &[Tone], sampling_frequency: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64 / sampling_frequency;
            tones
                .iter()
                .map(|tone| tone.gain * (2.0 * PI * tone.frequency * t + tone.phase).cos())
                .sum()
        })
        .collect()
}

/// Amplitude-modulated carrier `(1 - cos(2π fm t)) · cos(2π fc t)`
pub fn am_tone(modulation_frequency: f64, carrier_frequency: f64, sampling_frequency: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64 / sampling_frequency;
            (1.0 - (2.0 * PI * modulation_frequency * t).cos()) * (2.0 * PI * carrier_frequency * t).cos()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesize_single_tone() {
        let signal = synthesize(&[Tone::new(1.0, 0.0, 2.0)], 4.0, 4);
        let expected = [2.0, 0.0, -2.0, 0.0];
        for (s, e) in signal.iter().zip(expected) {
            assert!((s - e).abs() < 1e-12);
        }
    }

    #[test]
    fn test_synthesize_empty_is_silence() {
        assert_eq!(synthesize(&[], 100.0, 3), vec![0.0; 3]);
    }

    #[test]
    fn test_am_tone_envelope() {
        let signal = am_tone(1.0, 10.0, 1000.0, 1000);
        assert_eq!(signal[0], 0.0);
        assert!(signal.iter().all(|s| s.abs() <= 2.0));
    }
}
