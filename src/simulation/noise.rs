use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal, NormalError};

/// Root mean square of a signal
pub fn rms_power(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = signal.iter().map(|&x| x * x).sum();
    (sum_squares / signal.len() as f64).sqrt()
}

/// Zero-mean Gaussian white noise with standard deviation `sigma`, seeded
pub fn white_noise(num_samples: usize, sigma: f64, seed: u64) -> Result<Vec<f64>, NormalError> {
    let normal = Normal::new(0.0, sigma)?;
    let mut rng = StdRng::seed_from_u64(seed);
    Ok((0..num_samples).map(|_| normal.sample(&mut rng)).collect())
}

/// Add white noise so that signal power / noise power equals `snr_db`
pub fn add_noise(signal: &mut [f64], snr_db: f64, seed: u64) -> Result<(), NormalError> {
    let signal_power = rms_power(signal).powi(2);
    let noise_power = signal_power / 10f64.powf(snr_db / 10.0);
    let noise = white_noise(signal.len(), noise_power.sqrt(), seed)?;
    for (s, n) in signal.iter_mut().zip(noise) {
        *s += n;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms_power() {
        assert_eq!(rms_power(&[3.0, -3.0]), 3.0);
        assert_eq!(rms_power(&[]), 0.0);
    }

    #[test]
    fn test_white_noise_is_seeded() {
        let a = white_noise(256, 1.0, 7).unwrap();
        let b = white_noise(256, 1.0, 7).unwrap();
        let c = white_noise(256, 1.0, 8).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_white_noise_rejects_bad_sigma() {
        assert!(white_noise(16, f64::NAN, 1).is_err());
    }

    #[test]
    fn test_add_noise_level() {
        let mut signal = vec![1.0; 20_000];
        add_noise(&mut signal, 0.0, 3).unwrap();
        let noise: Vec<f64> = signal.iter().map(|s| s - 1.0).collect();
        // 0 dB: noise power ~ signal power (1.0)
        let power = rms_power(&noise).powi(2);
        assert!((power - 1.0).abs() < 0.05, "noise power = {}", power);
    }
}
