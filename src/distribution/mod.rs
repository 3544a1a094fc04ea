pub use self::discrete::DiscreteDistribution;

use std::fmt::Debug;

/// A distribution over the element consumed by a transition.
///
/// Equality is structural: the simplifier only shares trie edges whose
/// distributions compare equal.
pub trait ElementDistribution: Clone + Debug + PartialEq {
    type Element;

    fn point_mass(element: Self::Element) -> Self;

    /// Normalized pointwise product.
    fn product(&self, other: &Self) -> Self;

    /// Mixture `weight1 * self + weight2 * other`, renormalized.
    fn weighted_sum(&self, weight1: f64, other: &Self, weight2: f64) -> Self;

    fn log_prob(&self, element: &Self::Element) -> f64;

    /// `ln sum_x p(x) q(x)`.
    fn log_average_of(&self, other: &Self) -> f64;

    /// Uniform over the support of `self`.
    fn partial_uniform(&self) -> Self;
}

pub mod discrete;
