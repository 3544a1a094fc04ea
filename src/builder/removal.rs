use tracing::debug;

use crate::builder::Builder;
use crate::distribution::ElementDistribution;
use crate::graph::indexing::{StateIndex, TransitionIndex};
use crate::weight::Weight;

impl<D, W> Builder<D, W>
where
    D: ElementDistribution,
    W: Weight,
{
    /// Tombstones a transition. It stays in the arena until the next compaction.
    pub fn remove_transition(&mut self, index: TransitionIndex) {
        let entry = &mut self.transitions[index.index()];
        if !entry.removed {
            entry.removed = true;
            self.removed_transition_count += 1;
        }
    }

    /// Removes a state, every transition leaving it and every transition entering it.
    ///
    /// States after `state` shift down by one, and all destinations are renumbered so
    /// indices stay dense. Removing the start state leaves the builder without a valid
    /// start until `set_start_state` is called.
    pub fn remove_state(&mut self, state: StateIndex) {
        let removed = state.index();
        let outgoing: Vec<TransitionIndex> = self.transitions(state).map(|(i, _)| i).collect();
        for index in outgoing {
            self.remove_transition(index);
        }
        self.states.remove(removed);

        // Tombstone before renumbering, so no live transition ever names the removed state.
        let mut tombstoned = 0;
        for entry in self.transitions.iter_mut().filter(|e| !e.removed) {
            let destination = entry.transition.destination.index();
            if destination == removed {
                entry.removed = true;
                tombstoned += 1;
            } else if destination > removed {
                entry.transition.destination = StateIndex::new(destination - 1);
            }
        }
        self.removed_transition_count += tombstoned;

        if self.start_state == state {
            self.start_state = StateIndex::end();
        } else if !self.start_state.is_end() && self.start_state.index() > removed {
            self.start_state = StateIndex::new(self.start_state.index() - 1);
        }
        debug!(state = removed, incoming = tombstoned, "Removed state");
    }

    /// Removes every state whose flag in `to_remove` is set, in a single pass.
    ///
    /// Surviving states keep their relative order. Returns the number of removed states.
    pub fn remove_states(&mut self, to_remove: &[bool]) -> usize {
        debug_assert_eq!(to_remove.len(), self.states.len());
        let mut new_indices: Vec<Option<StateIndex>> = Vec::with_capacity(self.states.len());
        let mut next_index = 0;
        for &remove in to_remove.iter() {
            if remove {
                new_indices.push(None);
            } else {
                new_indices.push(Some(StateIndex::new(next_index)));
                next_index += 1;
            }
        }
        let removed_count = self.states.len() - next_index;
        if removed_count == 0 {
            return 0;
        }

        for (index, &remove) in to_remove.iter().enumerate() {
            if remove {
                let outgoing: Vec<TransitionIndex> = self
                    .transitions(StateIndex::new(index))
                    .map(|(i, _)| i)
                    .collect();
                for transition in outgoing {
                    self.remove_transition(transition);
                }
            }
        }

        let mut tombstoned = 0;
        for entry in self.transitions.iter_mut().filter(|e| !e.removed) {
            match new_indices[entry.transition.destination.index()] {
                Some(destination) => entry.transition.destination = destination,
                None => {
                    entry.removed = true;
                    tombstoned += 1;
                }
            }
        }
        self.removed_transition_count += tombstoned;

        let mut index = 0;
        self.states.retain(|_| {
            let keep = !to_remove[index];
            index += 1;
            keep
        });

        self.start_state = new_indices
            .get(self.start_state.index())
            .copied()
            .flatten()
            .unwrap_or_else(StateIndex::end);
        debug!(removed = removed_count, "Removed states");
        removed_count
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::Builder;
    use crate::distribution::{DiscreteDistribution, ElementDistribution};
    use crate::error::AutomatonError;
    use crate::graph::indexing::StateIndex;
    use crate::weight::{LogWeight, Weight};

    type D = DiscreteDistribution<char>;

    // 0 -a-> 1 -b-> 2 -c-> 3, plus 0 -eps-> 2 and a self-loop on 3
    fn generate_builder() -> Builder<D, LogWeight> {
        let mut builder = Builder::new();
        let start = builder.start_state();
        let chain: Vec<char> = "abc".chars().collect();
        let end = builder.add_transitions_for_sequence(start, &chain);
        builder.set_end_weight(end, LogWeight::one());
        builder.add_epsilon_transition(start, LogWeight::from_value(0.5), Some(StateIndex::new(2)));
        builder.add_self_transition(end, Some(D::point_mass('d')), LogWeight::from_value(0.5), 0);
        builder
    }

    #[test]
    fn test_remove_state_renumbers_destinations() {
        let mut builder = generate_builder();
        builder.remove_state(StateIndex::new(1));

        assert_eq!(builder.state_count(), 3);
        // 0 -a-> 1 is gone along with 1 -b-> 2; 0 -eps-> 2 becomes 0 -eps-> 1.
        let automaton = builder.get_automaton().unwrap();
        let from_start = automaton.graph().transitions(StateIndex::new(0));
        assert_eq!(from_start.len(), 1);
        assert!(from_start[0].is_epsilon());
        assert_eq!(from_start[0].destination, StateIndex::new(1));
        for transition in automaton.graph().all_transitions() {
            assert!(transition.destination.index() < automaton.state_count());
        }
        // Self-loop on the old state 3 now loops on state 2.
        let last = automaton.graph().transitions(StateIndex::new(2));
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].destination, StateIndex::new(2));
    }

    #[test]
    fn test_remove_start_state_invalidates_start() {
        let mut builder = generate_builder();
        builder.remove_state(StateIndex::new(0));
        assert!(builder.start_state().is_end());
        assert!(matches!(
            builder.get_automaton(),
            Err(AutomatonError::InvalidStartState { .. })
        ));
        builder.set_start_state(StateIndex::new(0));
        assert_eq!(builder.get_automaton().unwrap().state_count(), 3);
    }

    #[test]
    fn test_remove_state_before_start() {
        let mut builder = generate_builder();
        builder.set_start_state(StateIndex::new(2));
        builder.remove_state(StateIndex::new(0));
        assert_eq!(builder.start_state(), StateIndex::new(1));
    }

    #[test]
    fn test_remove_states() {
        let mut builder = generate_builder();
        let removed = builder.remove_states(&[false, true, false, true]);
        assert_eq!(removed, 2);
        assert_eq!(builder.state_count(), 2);
        // Only 0 -eps-> 2 survives, renumbered to 0 -eps-> 1.
        assert_eq!(builder.transition_count(), 1);
        let automaton = builder.get_automaton().unwrap();
        let transitions = automaton.graph().transitions(StateIndex::new(0));
        assert_eq!(transitions[0].destination, StateIndex::new(1));
        assert!(automaton.graph().transitions(StateIndex::new(1)).is_empty());
    }

    #[test]
    fn test_remove_states_nothing_to_do() {
        let mut builder = generate_builder();
        assert_eq!(builder.remove_states(&[false; 4]), 0);
        assert_eq!(builder.transition_count(), 5);
    }
}
