// A frozen weighted automaton over sequences of elements.
//
// Structure lives in an `ArrayGraph`; every structural change goes through a
// `Builder` and comes back through `Builder::get_automaton`.

use tracing::debug;

use crate::builder::Builder;
use crate::distribution::ElementDistribution;
use crate::error::{AutomatonError, Result};
use crate::graph::array_graph::{ArrayGraph, StateRecord};
use crate::graph::indexing::{StateIndex, TransitionIndex};
use crate::graph::transition::Transition;
use crate::weight::Weight;

pub mod analysis;
mod serde;
pub mod state;

pub use self::state::State;

#[derive(Clone, Debug)]
pub struct Automaton<D, W> {
    graph: ArrayGraph<D, W>,
    start_state: StateIndex,
    // Cached: true iff no transition is epsilon.
    is_epsilon_free: bool,
}

impl<D, W> Automaton<D, W>
where
    D: ElementDistribution,
    W: Weight,
{
    pub fn new(
        states: Vec<StateRecord<W>>,
        transitions: Vec<Transition<D, W>>,
        start_state: StateIndex,
    ) -> Result<Self> {
        Self::from_graph(ArrayGraph::new(states, transitions)?, start_state)
    }

    /// Wraps a validated graph, checking the start state.
    pub fn from_graph(graph: ArrayGraph<D, W>, start_state: StateIndex) -> Result<Self> {
        if start_state.index() >= graph.state_count() {
            return Err(AutomatonError::InvalidStartState {
                index: start_state.index(),
                state_count: graph.state_count(),
            });
        }
        let is_epsilon_free = graph.all_transitions().iter().all(|t| !t.is_epsilon());
        Ok(Self {
            graph,
            start_state,
            is_epsilon_free,
        })
    }

    /// The automaton assigning zero to every sequence: one state, no transitions.
    pub fn zero() -> Self {
        let start = StateRecord::new(TransitionIndex::new(0), TransitionIndex::new(0), W::zero());
        Self {
            graph: ArrayGraph::new_unchecked(vec![start], Vec::new()),
            start_state: StateIndex::new(0),
            is_epsilon_free: true,
        }
    }

    /// The automaton assigning `exp(log_value)` to `sequence` and zero to everything else.
    pub fn constant_on(log_value: f64, sequence: &[D::Element]) -> Self
    where
        D::Element: Clone,
    {
        let length = sequence.len();
        let mut states = Vec::with_capacity(length + 1);
        let mut transitions = Vec::with_capacity(length);
        for (index, element) in sequence.iter().enumerate() {
            transitions.push(Transition::new(
                Some(D::point_mass(element.clone())),
                W::one(),
                StateIndex::new(index + 1),
                0,
            ));
            states.push(StateRecord::new(
                TransitionIndex::new(index),
                TransitionIndex::new(index + 1),
                W::zero(),
            ));
        }
        states.push(StateRecord::new(
            TransitionIndex::new(length),
            TransitionIndex::new(length),
            W::from_log_value(log_value),
        ));
        Self {
            graph: ArrayGraph::new_unchecked(states, transitions),
            start_state: StateIndex::new(0),
            is_epsilon_free: true,
        }
    }

    /// Weighted union: a fresh start state with unit epsilon transitions into copies of
    /// `first` and `second`.
    pub fn sum(first: &Self, second: &Self) -> Result<Self> {
        let mut builder = Builder::with_capacity(
            first.state_count() + second.state_count() + 1,
            first.transition_count() + second.transition_count() + 2,
        );
        let start = builder.start_state();
        for automaton in [first, second] {
            let copied_start = builder.add_automaton(automaton, 0);
            builder.add_epsilon_transition(start, W::one(), Some(copied_start));
        }
        builder.get_automaton()
    }

    pub fn graph(&self) -> &ArrayGraph<D, W> {
        &self.graph
    }

    pub fn state_count(&self) -> usize {
        self.graph.state_count()
    }

    pub fn transition_count(&self) -> usize {
        self.graph.transition_count()
    }

    pub fn start_state(&self) -> StateIndex {
        self.start_state
    }

    pub fn start(&self) -> State<'_, D, W> {
        State::new(self, self.start_state)
    }

    pub fn state(&self, index: StateIndex) -> State<'_, D, W> {
        State::new(self, index)
    }

    pub fn states(&self) -> impl Iterator<Item = State<'_, D, W>> + '_ {
        (0..self.state_count()).map(move |index| State::new(self, StateIndex::new(index)))
    }

    pub fn is_epsilon_free(&self) -> bool {
        self.is_epsilon_free
    }

    pub fn get_value(&self, sequence: &[D::Element]) -> W {
        self.start().get_value(sequence)
    }

    pub fn get_log_value(&self, sequence: &[D::Element]) -> f64 {
        self.start().get_log_value(sequence)
    }

    pub fn is_zero(&self) -> bool {
        self.start().is_zero()
    }

    pub fn has_non_trivial_loops(&self) -> bool {
        self.start().has_non_trivial_loops()
    }

    /// Log of the total weight over all sequences.
    pub fn get_log_normalizer(&self) -> Result<f64> {
        analysis::log_normalizer(&self.graph, self.start_state)
    }

    /// Multiplies the weight of every sequence by `exp(log_scale)`.
    pub fn scale(&mut self, log_scale: f64) {
        let scale = W::from_log_value(log_scale);
        for state in self.graph.states_mut() {
            state.end_weight = state.end_weight.product(scale);
        }
    }

    /// Concatenates `other` onto this automaton, fusing states where that is sound.
    pub fn append(&mut self, other: &Self, group: i32) -> Result<()> {
        let mut builder = Builder::from_automaton(self);
        builder.append(other, group, true);
        *self = builder.get_automaton()?;
        Ok(())
    }

    /// Removes states that are unreachable from the start state or cannot reach an
    /// accepting state. Returns the number of removed states.
    pub fn remove_dead_states(&mut self) -> Result<usize> {
        let live = analysis::live_states(&self.graph, self.start_state);
        if !live[self.start_state.index()] {
            let removed = self.state_count() - 1;
            debug!(removed, "Start state is dead, automaton is zero");
            *self = Self::zero();
            return Ok(removed);
        }
        let dead: Vec<bool> = live.iter().map(|&is_live| !is_live).collect();
        if !dead.iter().any(|&is_dead| is_dead) {
            return Ok(0);
        }
        let mut builder = Builder::from_automaton(self);
        let removed = builder.remove_states(&dead);
        *self = builder.get_automaton()?;
        debug!(removed, states = self.state_count(), "Removed dead states");
        Ok(removed)
    }

    /// Drops every transition whose log weight is below `log_threshold`, then every state
    /// left dead. Returns the number of removed transitions.
    pub fn remove_transitions_with_small_weights(&mut self, log_threshold: f64) -> Result<usize> {
        let mut builder = Builder::from_automaton(self);
        let mut removed = 0;
        for index in 0..builder.state_count() {
            let small: Vec<_> = builder
                .transitions(StateIndex::new(index))
                .filter(|(_, transition)| transition.weight.log_value() < log_threshold)
                .map(|(transition_index, _)| transition_index)
                .collect();
            removed += small.len();
            for transition_index in small {
                builder.remove_transition(transition_index);
            }
        }
        if removed == 0 {
            return Ok(0);
        }
        *self = builder.get_automaton()?;
        self.remove_dead_states()?;
        debug!(removed, log_threshold, "Removed transitions with small weights");
        Ok(removed)
    }
}
