//! Sample timestamps
//!
//! The canonical time base is `time[i] = i / fs`. A caller-supplied time base
//! is accepted as-is once it is shown to line up with the signal.

use std::borrow::Cow;

use snafu::ensure;

use crate::error::{InputShapeSnafu, SpectrumError};
use crate::precision::{count, lit, Sample};

/// Synthesize `n` timestamps `i / fs`
pub fn synthesize<T: Sample>(sampling_frequency: f64, n: usize) -> Vec<T> {
    let fs = lit::<T>(sampling_frequency);
    (0..n).map(|i| count::<T>(i) / fs).collect()
}

/// Use the supplied time base or synthesize one.
///
/// # Errors
/// `SpectrumError::InputShape` when the supplied time base has a different
/// length than the signal, contains non-finite values or is not strictly
/// increasing.
pub fn resolve<'a, T: Sample>(
    time: Option<&'a [T]>,
    sampling_frequency: f64,
    signal_len: usize,
) -> Result<Cow<'a, [T]>, SpectrumError> {
    let Some(time) = time else {
        return Ok(Cow::Owned(synthesize(sampling_frequency, signal_len)));
    };

    ensure!(
        time.len() == signal_len,
        InputShapeSnafu {
            reason: format!("{} timestamps for {} samples", time.len(), signal_len),
        }
    );

    if let Some(index) = time.iter().position(|t| !t.is_finite()) {
        return InputShapeSnafu { reason: format!("non-finite timestamp at index {}", index) }.fail();
    }

    if let Some(index) = time.windows(2).position(|w| w[1] <= w[0]) {
        return InputShapeSnafu {
            reason: format!("timestamps not strictly increasing at index {}", index + 1),
        }
        .fail();
    }

    Ok(Cow::Borrowed(time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesize_reciprocal_rate() {
        let time: Vec<f64> = synthesize(1000.0, 2000);
        assert_eq!(time.len(), 2000);
        assert_eq!(time[0], 0.0);
        assert_eq!(time[1], 1.0 / 1000.0);
        assert_eq!(time[1999], 1999.0 / 1000.0);
    }

    #[test]
    fn test_resolve_borrows_supplied() {
        let supplied = vec![0.0f32, 0.5, 1.0];
        let time = resolve(Some(&supplied), 2.0, 3).unwrap();
        assert!(matches!(time, Cow::Borrowed(_)));
        assert_eq!(&*time, &supplied[..]);
    }

    #[test]
    fn test_resolve_length_mismatch() {
        let supplied = vec![0.0f64, 0.1];
        let result = resolve(Some(&supplied), 10.0, 3);
        assert!(matches!(result, Err(SpectrumError::InputShape { .. })));
    }

    #[test]
    fn test_resolve_rejects_non_monotonic() {
        let supplied = vec![0.0f64, 0.2, 0.1];
        assert!(matches!(resolve(Some(&supplied), 10.0, 3), Err(SpectrumError::InputShape { .. })));

        let supplied = vec![0.0f64, f64::NAN, 0.2];
        assert!(matches!(resolve(Some(&supplied), 10.0, 3), Err(SpectrumError::InputShape { .. })));
    }
}
