// An immutable array-based graph: the durable storage of a frozen automaton.

use crate::error::{AutomatonError, Result};
use crate::graph::indexing::StateIndex;
use crate::graph::transition::Transition;
use crate::weight::Weight;

mod serde;
pub mod state;

pub use self::state::StateRecord;

#[derive(Clone, Debug)]
pub struct ArrayGraph<D, W> {
    states: Vec<StateRecord<W>>,
    transitions: Vec<Transition<D, W>>,
}

impl<D, W> ArrayGraph<D, W>
where
    W: Weight,
{
    /// Wraps state and transition arrays, checking that every transition range and
    /// every destination lies inside the arrays.
    pub fn new(states: Vec<StateRecord<W>>, transitions: Vec<Transition<D, W>>) -> Result<Self> {
        validate(&states, &transitions)?;
        Ok(Self {
            states,
            transitions,
        })
    }

    /// Wraps arrays that are valid by construction.
    pub(crate) fn new_unchecked(
        states: Vec<StateRecord<W>>,
        transitions: Vec<Transition<D, W>>,
    ) -> Self {
        debug_assert!(validate(&states, &transitions).is_ok());
        Self {
            states,
            transitions,
        }
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    // We can't use standard indexing because StateIndex is not usize.

    pub fn get_state(&self, state: StateIndex) -> &StateRecord<W> {
        &self.states[state.index()]
    }

    pub fn end_weight(&self, state: StateIndex) -> W {
        self.states[state.index()].end_weight
    }

    /// Outgoing transitions of `state`, as a slice into the shared array.
    pub fn transitions(&self, state: StateIndex) -> &[Transition<D, W>] {
        let record = &self.states[state.index()];
        &self.transitions[record.first_transition.index()..record.last_transition.index()]
    }

    pub fn neighbors(&self, state: StateIndex) -> impl Iterator<Item = StateIndex> + '_ {
        self.transitions(state).iter().map(|t| t.destination)
    }

    pub fn states(&self) -> &[StateRecord<W>] {
        &self.states
    }

    pub fn all_transitions(&self) -> &[Transition<D, W>] {
        &self.transitions
    }

    pub(crate) fn states_mut(&mut self) -> &mut [StateRecord<W>] {
        &mut self.states
    }
}

fn validate<D, W>(states: &[StateRecord<W>], transitions: &[Transition<D, W>]) -> Result<()> {
    let state_count = states.len();
    let transition_count = transitions.len();
    for (index, state) in states.iter().enumerate() {
        let first = state.first_transition.index();
        let last = state.last_transition.index();
        if first > last || last > transition_count {
            return Err(AutomatonError::InvalidTransitionRange {
                state: index,
                first,
                last,
                transition_count,
            });
        }
        for transition in &transitions[first..last] {
            if transition.destination.index() >= state_count {
                return Err(AutomatonError::InvalidDestination {
                    source_state: index,
                    destination: transition.destination.index(),
                    state_count,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::{DiscreteDistribution, ElementDistribution};
    use crate::graph::indexing::TransitionIndex;
    use crate::weight::LogWeight;

    type D = DiscreteDistribution<char>;

    fn generate_graph() -> (Vec<StateRecord<LogWeight>>, Vec<Transition<D, LogWeight>>) {
        let transitions = vec![
            Transition::new(
                Some(D::point_mass('a')),
                LogWeight::one(),
                StateIndex::new(1),
                0,
            ),
            Transition::epsilon(LogWeight::from_value(0.5), StateIndex::new(1)),
        ];
        let states = vec![
            StateRecord::new(
                TransitionIndex::new(0),
                TransitionIndex::new(2),
                LogWeight::zero(),
            ),
            StateRecord::new(
                TransitionIndex::new(2),
                TransitionIndex::new(2),
                LogWeight::one(),
            ),
        ];
        (states, transitions)
    }

    #[test]
    fn test_create_graph() {
        let (states, transitions) = generate_graph();
        let graph = ArrayGraph::new(states, transitions).unwrap();
        assert_eq!(graph.state_count(), 2);
        assert_eq!(graph.transition_count(), 2);
        assert_eq!(graph.transitions(StateIndex::new(0)).len(), 2);
        assert!(graph.transitions(StateIndex::new(1)).is_empty());
        let neighbors: Vec<_> = graph.neighbors(StateIndex::new(0)).collect();
        assert_eq!(neighbors, vec![StateIndex::new(1), StateIndex::new(1)]);
        assert!(graph.get_state(StateIndex::new(1)).can_end());
    }

    #[test]
    fn test_rejects_bad_destination() {
        let (states, mut transitions) = generate_graph();
        transitions[1].destination = StateIndex::new(7);
        let result = ArrayGraph::new(states, transitions);
        assert!(matches!(
            result,
            Err(AutomatonError::InvalidDestination { destination: 7, .. })
        ));
    }

    #[test]
    fn test_rejects_bad_range() {
        let (mut states, transitions) = generate_graph();
        states[1].last_transition = TransitionIndex::new(3);
        let result = ArrayGraph::new(states, transitions);
        assert!(matches!(
            result,
            Err(AutomatonError::InvalidTransitionRange { state: 1, .. })
        ));
    }
}
