use serde::{Deserialize, Serialize};

use crate::graph::indexing::StateIndex;
use crate::weight::Weight;

/// A weighted transition, optionally consuming one element drawn from a distribution.
///
/// A missing distribution marks an epsilon transition. `group` is an opaque tag that
/// composition stamps on copied transitions; zero means "no group".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition<D, W> {
    #[serde(bound(
        serialize = "D: Serialize, W: Serialize",
        deserialize = "D: Deserialize<'de>, W: Deserialize<'de>",
    ))]
    pub element_distribution: Option<D>,
    pub weight: W,
    pub destination: StateIndex,
    pub group: i32,
}

impl<D, W> Transition<D, W>
where
    W: Weight,
{
    pub fn new(
        element_distribution: Option<D>,
        weight: W,
        destination: StateIndex,
        group: i32,
    ) -> Self {
        Self {
            element_distribution,
            weight,
            destination,
            group,
        }
    }

    pub fn epsilon(weight: W, destination: StateIndex) -> Self {
        Self::new(None, weight, destination, 0)
    }

    pub fn is_epsilon(&self) -> bool {
        self.element_distribution.is_none()
    }

    pub fn with_group(mut self, group: i32) -> Self {
        self.group = group;
        self
    }

    pub fn with_destination(mut self, destination: StateIndex) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_weight(mut self, weight: W) -> Self {
        self.weight = weight;
        self
    }
}
