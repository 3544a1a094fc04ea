use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::distribution::ElementDistribution;

/// Finite distribution over an ordered element type.
///
/// Probabilities are kept normalized and zero entries are never stored, so two
/// distributions over the same support with the same masses compare equal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscreteDistribution<E: Ord> {
    #[serde(bound(
        serialize = "E: Serialize",
        deserialize = "E: Deserialize<'de>",
    ))]
    probs: BTreeMap<E, f64>,
}

impl<E> DiscreteDistribution<E>
where
    E: Ord + Clone,
{
    /// Builds a distribution from unnormalized masses.
    pub fn from_masses<I>(masses: I) -> Self
    where
        I: IntoIterator<Item = (E, f64)>,
    {
        let mut probs: BTreeMap<E, f64> = BTreeMap::new();
        for (element, mass) in masses {
            if mass > 0. {
                *probs.entry(element).or_insert(0.) += mass;
            }
        }
        Self::normalized(probs)
    }

    pub fn uniform<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = E>,
    {
        Self::from_masses(elements.into_iter().map(|e| (e, 1.)))
    }

    fn normalized(mut probs: BTreeMap<E, f64>) -> Self {
        let total: f64 = probs.values().sum();
        if total > 0. {
            for prob in probs.values_mut() {
                *prob /= total;
            }
        }
        Self { probs }
    }

    pub fn support(&self) -> impl Iterator<Item = &E> {
        self.probs.keys()
    }

    pub fn is_zero(&self) -> bool {
        self.probs.is_empty()
    }

    pub fn prob(&self, element: &E) -> f64 {
        self.probs.get(element).copied().unwrap_or(0.)
    }
}

impl<E> ElementDistribution for DiscreteDistribution<E>
where
    E: Ord + Clone + Debug,
{
    type Element = E;

    fn point_mass(element: E) -> Self {
        let mut probs = BTreeMap::new();
        probs.insert(element, 1.);
        Self { probs }
    }

    fn product(&self, other: &Self) -> Self {
        let probs = self
            .probs
            .iter()
            .filter_map(|(e, p)| other.probs.get(e).map(|q| (e.clone(), p * q)))
            .filter(|(_, mass)| *mass > 0.)
            .collect();
        Self::normalized(probs)
    }

    fn weighted_sum(&self, weight1: f64, other: &Self, weight2: f64) -> Self {
        let mut probs: BTreeMap<E, f64> = BTreeMap::new();
        for (e, p) in self.probs.iter() {
            *probs.entry(e.clone()).or_insert(0.) += weight1 * p;
        }
        for (e, p) in other.probs.iter() {
            *probs.entry(e.clone()).or_insert(0.) += weight2 * p;
        }
        probs.retain(|_, mass| *mass > 0.);
        Self::normalized(probs)
    }

    fn log_prob(&self, element: &E) -> f64 {
        self.prob(element).ln()
    }

    fn log_average_of(&self, other: &Self) -> f64 {
        self.probs
            .iter()
            .filter_map(|(e, p)| other.probs.get(e).map(|q| p * q))
            .sum::<f64>()
            .ln()
    }

    fn partial_uniform(&self) -> Self {
        Self::uniform(self.probs.keys().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_point_mass() {
        let d = DiscreteDistribution::point_mass('a');
        assert_eq!(d.log_prob(&'a'), 0.);
        assert_eq!(d.log_prob(&'b'), f64::NEG_INFINITY);
        assert_eq!(d, DiscreteDistribution::point_mass('a'));
        assert_ne!(d, DiscreteDistribution::point_mass('b'));
    }

    #[test]
    fn test_weighted_sum() {
        let a = DiscreteDistribution::point_mass('a');
        let b = DiscreteDistribution::point_mass('b');
        let mix = a.weighted_sum(3., &b, 1.);
        assert_close(mix.prob(&'a'), 0.75);
        assert_close(mix.prob(&'b'), 0.25);
    }

    #[test]
    fn test_product() {
        let ab = DiscreteDistribution::uniform(['a', 'b']);
        let bc = DiscreteDistribution::uniform(['b', 'c']);
        let product = ab.product(&bc);
        assert_eq!(product, DiscreteDistribution::point_mass('b'));
        assert_close(ab.log_average_of(&bc), 0.25f64.ln());

        let disjoint = ab.product(&DiscreteDistribution::point_mass('z'));
        assert!(disjoint.is_zero());
    }

    #[test]
    fn test_partial_uniform() {
        let skewed = DiscreteDistribution::from_masses([('x', 9.), ('y', 1.), ('z', 0.)]);
        let uniform = skewed.partial_uniform();
        assert_close(uniform.prob(&'x'), 0.5);
        assert_close(uniform.prob(&'y'), 0.5);
        assert_eq!(uniform.support().count(), 2);
    }
}
