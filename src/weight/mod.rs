pub use self::log_weight::LogWeight;

use std::fmt::Debug;

/// A commutative semiring used to score paths through an automaton.
///
/// Values are exposed through their natural logarithm, which is how the
/// automaton reports scores (`get_log_value`) and how thresholds are given.
pub trait Weight: Copy + Debug + PartialEq {
    fn zero() -> Self;
    fn one() -> Self;
    fn from_log_value(log_value: f64) -> Self;
    fn log_value(&self) -> f64;

    fn sum(self, other: Self) -> Self;
    fn product(self, other: Self) -> Self;

    /// Multiplicative inverse. Callers must not invert zero.
    fn inverse(self) -> Self;

    fn is_zero(&self) -> bool {
        self.log_value() == f64::NEG_INFINITY
    }

    fn from_value(value: f64) -> Self {
        Self::from_log_value(value.ln())
    }

    fn value(&self) -> f64 {
        self.log_value().exp()
    }

    fn product_of<I>(weights: I) -> Self
    where
        I: IntoIterator<Item = Self>,
        Self: Sized,
    {
        weights.into_iter().fold(Self::one(), Self::product)
    }

    /// Kleene star `1 + w + w^2 + ... = 1 / (1 - w)`, infinite once `w >= 1`.
    fn closure(self) -> Self {
        let log_value = self.log_value();
        if log_value >= 0. {
            Self::from_log_value(f64::INFINITY)
        } else {
            Self::from_log_value(-(-log_value.exp()).ln_1p())
        }
    }
}

pub mod log_weight;
