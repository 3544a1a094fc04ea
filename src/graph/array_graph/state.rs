use serde::{Deserialize, Serialize};

use crate::graph::indexing::TransitionIndex;
use crate::weight::Weight;

/// A frozen state: its outgoing transitions are `[first_transition, last_transition)`
/// in the contiguous transition array.
#[derive(Deserialize, Serialize, Copy, Clone, Debug, PartialEq)]
pub struct StateRecord<W> {
    pub first_transition: TransitionIndex,
    pub last_transition: TransitionIndex,
    #[serde(bound(serialize = "W: Serialize", deserialize = "W: Deserialize<'de>",))]
    pub end_weight: W,
}

impl<W> StateRecord<W>
where
    W: Weight,
{
    pub fn new(
        first_transition: TransitionIndex,
        last_transition: TransitionIndex,
        end_weight: W,
    ) -> Self {
        Self {
            first_transition,
            last_transition,
            end_weight,
        }
    }

    pub fn can_end(&self) -> bool {
        !self.end_weight.is_zero()
    }

    pub fn transition_count(&self) -> usize {
        self.last_transition.index() - self.first_transition.index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weight::LogWeight;
    use bincode::{deserialize, serialize};

    #[test]
    fn test_serialize_deserialize_state() {
        let state = StateRecord::new(
            TransitionIndex::new(2),
            TransitionIndex::new(5),
            LogWeight::from_value(0.5),
        );
        let bytes = serialize(&state).unwrap();
        let new_state: StateRecord<LogWeight> = deserialize(&bytes).unwrap();
        assert_eq!(state, new_state);
        assert_eq!(new_state.transition_count(), 3);
        assert!(new_state.can_end());
    }
}
