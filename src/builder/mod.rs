// Mutable working representation of an automaton.
//
// Every state owns a singly-linked list of transitions threaded through one flat
// arena, so appending a transition is O(1) and never shifts the arena. Removed
// transitions are only flagged; they are physically dropped when the builder is
// compacted into an `Automaton` by `get_automaton`.

use tracing::trace;

use crate::automaton::Automaton;
use crate::distribution::ElementDistribution;
use crate::error::{AutomatonError, Result};
use crate::graph::array_graph::{ArrayGraph, StateRecord};
use crate::graph::indexing::{StateIndex, TransitionIndex};
use crate::graph::transition::Transition;
use crate::weight::Weight;

pub mod append;
pub mod removal;

#[derive(Clone, Debug)]
struct LinkedTransition<D, W> {
    transition: Transition<D, W>,
    next: TransitionIndex,
    removed: bool,
}

#[derive(Clone, Copy, Debug)]
struct BuilderState<W> {
    first_transition: TransitionIndex,
    last_transition: TransitionIndex,
    end_weight: W,
}

#[derive(Clone, Debug)]
pub struct Builder<D, W> {
    states: Vec<BuilderState<W>>,
    transitions: Vec<LinkedTransition<D, W>>,
    start_state: StateIndex,
    removed_transition_count: usize,
}

impl<D, W> Default for Builder<D, W>
where
    D: ElementDistribution,
    W: Weight,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<D, W> Builder<D, W>
where
    D: ElementDistribution,
    W: Weight,
{
    /// Creates a builder holding a single start state.
    pub fn new() -> Self {
        Self::with_capacity(1, 0)
    }

    pub fn with_capacity(n_states: usize, n_transitions: usize) -> Self {
        let mut builder = Self {
            states: Vec::with_capacity(n_states.max(1)),
            transitions: Vec::with_capacity(n_transitions),
            start_state: StateIndex::new(0),
            removed_transition_count: 0,
        };
        builder.add_state();
        builder
    }

    /// Copies every state and transition of `automaton` into a fresh builder.
    pub fn from_automaton(automaton: &Automaton<D, W>) -> Self {
        let graph = automaton.graph();
        let mut builder = Self {
            states: Vec::with_capacity(graph.state_count()),
            transitions: Vec::with_capacity(graph.transition_count()),
            start_state: automaton.start_state(),
            removed_transition_count: 0,
        };
        for record in graph.states() {
            let state = builder.add_state();
            builder.set_end_weight(state, record.end_weight);
        }
        for index in 0..graph.state_count() {
            let state = StateIndex::new(index);
            for transition in graph.transitions(state) {
                builder.link_transition(state, transition.clone());
            }
        }
        builder
    }

    /// Compacts the builder into a frozen automaton, dropping removed transitions.
    ///
    /// The builder is left untouched: the automaton owns fresh copies of its arrays.
    pub fn get_automaton(&self) -> Result<Automaton<D, W>> {
        let state_count = self.states.len();
        if self.start_state.index() >= state_count {
            return Err(AutomatonError::InvalidStartState {
                index: self.start_state.index(),
                state_count,
            });
        }

        let mut states = Vec::with_capacity(state_count);
        let mut transitions = Vec::with_capacity(self.transition_count());
        for (index, state) in self.states.iter().enumerate() {
            let first_transition = TransitionIndex::new(transitions.len());
            for (_, transition) in self.transitions(StateIndex::new(index)) {
                if transition.destination.index() >= state_count {
                    return Err(AutomatonError::InvalidDestination {
                        source_state: index,
                        destination: transition.destination.index(),
                        state_count,
                    });
                }
                transitions.push(transition.clone());
            }
            states.push(StateRecord::new(
                first_transition,
                TransitionIndex::new(transitions.len()),
                state.end_weight,
            ));
        }
        trace!(
            states = state_count,
            transitions = transitions.len(),
            dropped = self.removed_transition_count,
            "Compacted builder"
        );
        Automaton::from_graph(ArrayGraph::new(states, transitions)?, self.start_state)
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Number of live (non-removed) transitions.
    pub fn transition_count(&self) -> usize {
        self.transitions.len() - self.removed_transition_count
    }

    pub fn start_state(&self) -> StateIndex {
        self.start_state
    }

    pub fn set_start_state(&mut self, state: StateIndex) {
        self.start_state = state;
    }

    /// Appends a state with zero end weight and no transitions.
    pub fn add_state(&mut self) -> StateIndex {
        let state = StateIndex::new(self.states.len());
        self.states.push(BuilderState {
            first_transition: TransitionIndex::end(),
            last_transition: TransitionIndex::end(),
            end_weight: W::zero(),
        });
        state
    }

    pub fn end_weight(&self, state: StateIndex) -> W {
        self.states[state.index()].end_weight
    }

    pub fn set_end_weight(&mut self, state: StateIndex, weight: W) {
        self.states[state.index()].end_weight = weight;
    }

    pub fn can_end(&self, state: StateIndex) -> bool {
        !self.end_weight(state).is_zero()
    }

    /// Adds `transition` to `source` and returns its destination.
    pub fn add_transition_record(
        &mut self,
        source: StateIndex,
        transition: Transition<D, W>,
    ) -> StateIndex {
        let destination = transition.destination;
        self.link_transition(source, transition);
        destination
    }

    /// Adds a transition out of `source`. A fresh destination state is created when
    /// `destination` is `None`. Returns the destination.
    pub fn add_transition(
        &mut self,
        source: StateIndex,
        element_distribution: Option<D>,
        weight: W,
        destination: Option<StateIndex>,
        group: i32,
    ) -> StateIndex {
        let destination = match destination {
            Some(destination) => destination,
            None => self.add_state(),
        };
        self.add_transition_record(
            source,
            Transition::new(element_distribution, weight, destination, group),
        )
    }

    pub fn add_epsilon_transition(
        &mut self,
        source: StateIndex,
        weight: W,
        destination: Option<StateIndex>,
    ) -> StateIndex {
        self.add_transition(source, None, weight, destination, 0)
    }

    pub fn add_self_transition(
        &mut self,
        state: StateIndex,
        element_distribution: Option<D>,
        weight: W,
        group: i32,
    ) {
        self.add_transition(state, element_distribution, weight, Some(state), group);
    }

    /// Adds a chain of unit-weight point-mass transitions spelling `sequence`, one fresh
    /// state per position. Returns the last state of the chain.
    pub fn add_transitions_for_sequence(
        &mut self,
        source: StateIndex,
        sequence: &[D::Element],
    ) -> StateIndex
    where
        D::Element: Clone,
    {
        sequence.iter().fold(source, |state, element| {
            self.add_transition(
                state,
                Some(D::point_mass(element.clone())),
                W::one(),
                None,
                0,
            )
        })
    }

    /// Live transitions of `state`, in insertion order.
    pub fn transitions(&self, state: StateIndex) -> Transitions<'_, D, W> {
        Transitions::new(self, self.states[state.index()].first_transition)
    }

    pub fn transition(&self, index: TransitionIndex) -> &Transition<D, W> {
        &self.transitions[index.index()].transition
    }

    pub fn transition_mut(&mut self, index: TransitionIndex) -> &mut Transition<D, W> {
        &mut self.transitions[index.index()].transition
    }

    pub fn has_transitions(&self, state: StateIndex) -> bool {
        self.transitions(state).next().is_some()
    }

    pub fn has_self_loop(&self, state: StateIndex) -> bool {
        self.transitions(state)
            .any(|(_, transition)| transition.destination == state)
    }

    fn link_transition(
        &mut self,
        source: StateIndex,
        transition: Transition<D, W>,
    ) -> TransitionIndex {
        let index = TransitionIndex::new(self.transitions.len());
        self.transitions.push(LinkedTransition {
            transition,
            next: TransitionIndex::end(),
            removed: false,
        });
        let last = self.states[source.index()].last_transition;
        if last.is_end() {
            self.states[source.index()].first_transition = index;
        } else {
            self.transitions[last.index()].next = index;
        }
        self.states[source.index()].last_transition = index;
        index
    }
}

/// Iterator over the live transitions of one builder state.
pub struct Transitions<'a, D, W> {
    builder: &'a Builder<D, W>,
    // the next transition to return, already advanced past removed entries
    next: TransitionIndex,
}

impl<'a, D, W> Transitions<'a, D, W> {
    fn new(builder: &'a Builder<D, W>, first: TransitionIndex) -> Self {
        let mut transitions = Self {
            builder,
            next: first,
        };
        transitions.skip_removed();
        transitions
    }

    fn skip_removed(&mut self) {
        while !self.next.is_end() && self.builder.transitions[self.next.index()].removed {
            self.next = self.builder.transitions[self.next.index()].next;
        }
    }
}

impl<'a, D, W> Iterator for Transitions<'a, D, W> {
    type Item = (TransitionIndex, &'a Transition<D, W>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_end() {
            return None;
        }
        let index = self.next;
        let entry = &self.builder.transitions[index.index()];
        self.next = entry.next;
        self.skip_removed();
        Some((index, &entry.transition))
    }
}
