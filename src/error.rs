use snafu::Snafu;

/// Errors raised before (or instead of) producing a spectral estimate.
///
/// All validation happens before the first frequency bin is evaluated, so an
/// error never comes with a partially filled spectrum.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SpectrumError {
    /// Invalid grid bounds, steps or sampling frequency
    #[snafu(display("invalid search configuration: {reason}"))]
    Configuration { reason: String },

    /// Supplied time base does not line up with the signal
    #[snafu(display("time base does not match signal: {reason}"))]
    InputShape { reason: String },

    /// Signal is empty, constant or contains non-finite samples
    #[snafu(display("degenerate signal: {reason}"))]
    DegenerateSignal { reason: String },

    /// Cancellation was requested while the frequency grid was being scanned
    #[snafu(display("estimation cancelled at frequency bin {frequency_index}"))]
    Cancelled { frequency_index: usize },
}

impl SpectrumError {
    /// True for errors caused by the caller's parameters rather than the data
    pub fn is_configuration(&self) -> bool {
        matches!(self, SpectrumError::Configuration { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = SpectrumError::Configuration { reason: "fmin >= fmax".to_string() };
        assert_eq!(err.to_string(), "invalid search configuration: fmin >= fmax");
        assert!(err.is_configuration());

        let err = SpectrumError::Cancelled { frequency_index: 7 };
        assert_eq!(err.to_string(), "estimation cancelled at frequency bin 7");
        assert!(!err.is_configuration());
    }
}
