use serde::{Deserialize, Serialize};
use std::fmt;

use crate::weight::Weight;

/// Non-negative real weight stored as its natural logarithm.
#[derive(Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct LogWeight(f64);

impl LogWeight {
    pub fn new(log_value: f64) -> Self {
        Self(log_value)
    }
}

impl Default for LogWeight {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Debug for LogWeight {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LogWeight({})", self.0)
    }
}

impl Weight for LogWeight {
    #[inline]
    fn zero() -> Self {
        Self(f64::NEG_INFINITY)
    }

    #[inline]
    fn one() -> Self {
        Self(0.)
    }

    #[inline]
    fn from_log_value(log_value: f64) -> Self {
        Self(log_value)
    }

    #[inline]
    fn log_value(&self) -> f64 {
        self.0
    }

    fn sum(self, other: Self) -> Self {
        let (hi, lo) = if self.0 >= other.0 {
            (self.0, other.0)
        } else {
            (other.0, self.0)
        };
        if hi == f64::NEG_INFINITY || hi == f64::INFINITY {
            return Self(hi);
        }
        Self(hi + (lo - hi).exp().ln_1p())
    }

    #[inline]
    fn product(self, other: Self) -> Self {
        if self.is_zero() || other.is_zero() {
            // Keeps 0 * inf at zero instead of NaN.
            return Self::zero();
        }
        Self(self.0 + other.0)
    }

    #[inline]
    fn inverse(self) -> Self {
        debug_assert!(!self.is_zero(), "Cannot invert a zero weight");
        Self(-self.0)
    }
}
