use std::fmt;
use std::ptr;

use crate::automaton::{analysis, Automaton};
use crate::distribution::ElementDistribution;
use crate::epsilon_closure::EpsilonClosure;
use crate::evaluator::Evaluator;
use crate::graph::indexing::StateIndex;
use crate::graph::transition::Transition;
use crate::weight::Weight;

/// A read-only handle to one state of a frozen automaton.
///
/// Two handles are equal when they point at the same index of the same automaton,
/// whatever the states contain.
pub struct State<'a, D, W> {
    automaton: &'a Automaton<D, W>,
    index: StateIndex,
}

impl<'a, D, W> Clone for State<'a, D, W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, D, W> Copy for State<'a, D, W> {}

impl<'a, D, W> PartialEq for State<'a, D, W> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.automaton, other.automaton) && self.index == other.index
    }
}

impl<'a, D, W> Eq for State<'a, D, W> {}

impl<'a, D, W> fmt::Debug for State<'a, D, W> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "State({})", self.index)
    }
}

impl<'a, D, W> State<'a, D, W>
where
    D: ElementDistribution,
    W: Weight,
{
    pub(crate) fn new(automaton: &'a Automaton<D, W>, index: StateIndex) -> Self {
        Self { automaton, index }
    }

    pub fn index(&self) -> StateIndex {
        self.index
    }

    pub fn automaton(&self) -> &'a Automaton<D, W> {
        self.automaton
    }

    pub fn end_weight(&self) -> W {
        self.automaton.graph().end_weight(self.index)
    }

    pub fn can_end(&self) -> bool {
        !self.end_weight().is_zero()
    }

    pub fn transitions(&self) -> &'a [Transition<D, W>] {
        self.automaton.graph().transitions(self.index)
    }

    pub fn transition_count(&self) -> usize {
        self.transitions().len()
    }

    pub fn has_self_loop(&self) -> bool {
        self.transitions().iter().any(|t| t.destination == self.index)
    }

    pub fn get_epsilon_closure(&self) -> EpsilonClosure<W> {
        EpsilonClosure::new(self.automaton, self.index)
    }

    /// Total weight of the accepting paths from this state that spell `sequence`.
    pub fn get_value(&self, sequence: &[D::Element]) -> W {
        Evaluator::new(self.automaton, sequence).get_value(self.index)
    }

    pub fn get_log_value(&self, sequence: &[D::Element]) -> f64 {
        self.get_value(sequence).log_value()
    }

    pub fn is_zero(&self) -> bool {
        analysis::is_zero_from(self.automaton.graph(), self.index)
    }

    pub fn has_non_trivial_loops(&self) -> bool {
        analysis::has_non_trivial_loops_from(self.automaton.graph(), self.index)
    }
}
