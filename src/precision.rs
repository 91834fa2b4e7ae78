//! Floating-point width selection
//!
//! Every accumulator, grid value and output of one estimation call shares a
//! single float type. The core is generic over [`Sample`]; [`Precision`] picks
//! the width at runtime (CLI, dynamic callers).

use core::fmt::{Debug, Display};
use core::str::FromStr;

use num::traits::FloatConst;
use num::{Float, FromPrimitive};

/// Float type usable by the estimator (`f32` or `f64`)
pub trait Sample: Float + FloatConst + FromPrimitive + Debug + Display + Send + Sync + 'static {}

impl<T> Sample for T where T: Float + FloatConst + FromPrimitive + Debug + Display + Send + Sync + 'static {}

/// Cast an `f64` parameter into the working width.
///
/// Never fails for `f32`/`f64`; out-of-range values saturate to infinity.
#[inline]
pub fn lit<T: Sample>(value: f64) -> T {
    T::from_f64(value).unwrap_or_else(T::nan)
}

/// Cast a count (sample count, grid index) into the working width
#[inline]
pub fn count<T: Sample>(n: usize) -> T {
    T::from_usize(n).unwrap_or_else(T::nan)
}

/// `2π` in the working width
#[inline]
pub fn two_pi<T: Sample>() -> T {
    T::PI() + T::PI()
}

/// Runtime float width selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    /// 32-bit IEEE 754
    Single,
    /// 64-bit IEEE 754
    #[default]
    Double,
}

impl Precision {
    pub fn bits(self) -> u32 {
        match self {
            Precision::Single => 32,
            Precision::Double => 64,
        }
    }
}

impl Display for Precision {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "f{}", self.bits())
    }
}

impl FromStr for Precision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "32" | "f32" | "single" => Ok(Precision::Single),
            "64" | "f64" | "double" => Ok(Precision::Double),
            other => Err(format!("unknown precision '{}', expected 32 or 64", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_parse() {
        assert_eq!("32".parse::<Precision>(), Ok(Precision::Single));
        assert_eq!("F64".parse::<Precision>(), Ok(Precision::Double));
        assert!("16".parse::<Precision>().is_err());
        assert_eq!(Precision::Single.to_string(), "f32");
    }

    #[test]
    fn test_casts() {
        assert_eq!(lit::<f32>(0.5), 0.5f32);
        assert_eq!(count::<f64>(2000), 2000.0);
        assert_eq!(two_pi::<f64>(), 2.0 * core::f64::consts::PI);
    }
}
