use tracing::debug;

use crate::automaton::Automaton;
use crate::builder::Builder;
use crate::distribution::ElementDistribution;
use crate::graph::indexing::StateIndex;
use crate::graph::transition::Transition;
use crate::weight::Weight;

impl<D, W> Builder<D, W>
where
    D: ElementDistribution,
    W: Weight,
{
    /// Copies all states and transitions of `other` into this builder, shifting
    /// destinations past the existing states. A non-zero `group` is stamped on every
    /// copied transition. Returns the copy of `other`'s start state.
    pub fn add_automaton(&mut self, other: &Automaton<D, W>, group: i32) -> StateIndex {
        let offset = self.states.len();
        let graph = other.graph();
        for record in graph.states() {
            let state = self.add_state();
            self.set_end_weight(state, record.end_weight);
        }
        for index in 0..graph.state_count() {
            for transition in graph.transitions(StateIndex::new(index)) {
                let mut copy = transition
                    .clone()
                    .with_destination(StateIndex::new(transition.destination.index() + offset));
                if group != 0 {
                    copy.group = group;
                }
                self.link_transition(StateIndex::new(index + offset), copy);
            }
        }
        StateIndex::new(other.start_state().index() + offset)
    }

    /// Concatenates `other` onto every state of this builder that can end.
    ///
    /// With `avoid_epsilon_transitions`, the copied start state is fused into the old
    /// end states whenever that cannot change the accepted language; otherwise each old
    /// end state hands its end weight to an epsilon transition into the copied start.
    pub fn append(&mut self, other: &Automaton<D, W>, group: i32, avoid_epsilon_transitions: bool) {
        let end_states: Vec<StateIndex> = (0..self.states.len())
            .map(StateIndex::new)
            .filter(|&state| self.can_end(state))
            .collect();
        let second_start = self.add_automaton(other, group);

        if avoid_epsilon_transitions && self.can_fuse_start(other, second_start, &end_states) {
            self.fuse_start(second_start, &end_states);
            debug!(end_states = end_states.len(), "Appended automaton by fusing its start state");
            return;
        }

        for &end_state in end_states.iter() {
            let end_weight = self.end_weight(end_state);
            self.add_transition_record(
                end_state,
                Transition::epsilon(end_weight, second_start).with_group(group),
            );
            self.set_end_weight(end_state, W::zero());
        }
        debug!(end_states = end_states.len(), "Appended automaton through epsilon transitions");
    }

    // Fusing deletes the copied start, so it must not be entered from anywhere but
    // itself. A self-loop on it may only move onto end states that have no transitions
    // of their own, or else it would also repeat before those.
    fn can_fuse_start(
        &self,
        other: &Automaton<D, W>,
        second_start: StateIndex,
        end_states: &[StateIndex],
    ) -> bool {
        let graph = other.graph();
        let other_start = other.start_state();
        let entered_from_elsewhere = (0..graph.state_count())
            .map(StateIndex::new)
            .filter(|&state| state != other_start)
            .any(|state| graph.neighbors(state).any(|next| next == other_start));
        if entered_from_elsewhere {
            return false;
        }
        !self.has_self_loop(second_start)
            || end_states.iter().all(|&state| !self.has_transitions(state))
    }

    fn fuse_start(&mut self, second_start: StateIndex, end_states: &[StateIndex]) {
        let start_transitions: Vec<Transition<D, W>> = self
            .transitions(second_start)
            .map(|(_, transition)| transition.clone())
            .collect();
        let start_end_weight = self.end_weight(second_start);

        for &end_state in end_states.iter() {
            let end_weight = self.end_weight(end_state);
            for transition in start_transitions.iter() {
                let copy = if transition.destination == second_start {
                    transition.clone().with_destination(end_state)
                } else {
                    let weight = transition.weight.product(end_weight);
                    transition.clone().with_weight(weight)
                };
                self.add_transition_record(end_state, copy);
            }
            self.set_end_weight(end_state, end_weight.product(start_end_weight));
        }
        self.remove_state(second_start);
    }
}

#[cfg(test)]
mod tests {
    use crate::automaton::Automaton;
    use crate::builder::Builder;
    use crate::distribution::{DiscreteDistribution, ElementDistribution};
    use crate::graph::indexing::StateIndex;
    use crate::weight::{LogWeight, Weight};

    type D = DiscreteDistribution<char>;
    type CharAutomaton = Automaton<D, LogWeight>;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_append_fuses_chains() {
        let first = CharAutomaton::constant_on(2f64.ln(), &chars("ab"));
        let second = CharAutomaton::constant_on(3f64.ln(), &chars("cd"));
        let mut builder = Builder::from_automaton(&first);
        builder.append(&second, 0, true);
        let automaton = builder.get_automaton().unwrap();

        // a b c d: the copied start state was folded away, no epsilon transitions.
        assert_eq!(automaton.state_count(), 5);
        assert!(automaton.is_epsilon_free());
        assert_close(automaton.get_log_value(&chars("abcd")), 6f64.ln());
        assert_eq!(automaton.get_log_value(&chars("ab")), f64::NEG_INFINITY);
    }

    #[test]
    fn test_append_with_epsilon() {
        let first = CharAutomaton::constant_on(2f64.ln(), &chars("ab"));
        let second = CharAutomaton::constant_on(3f64.ln(), &chars("cd"));
        let mut builder = Builder::from_automaton(&first);
        builder.append(&second, 7, false);
        let automaton = builder.get_automaton().unwrap();

        assert_eq!(automaton.state_count(), 6);
        assert!(!automaton.is_epsilon_free());
        assert_close(automaton.get_log_value(&chars("abcd")), 6f64.ln());
        let epsilon = automaton
            .graph()
            .all_transitions()
            .iter()
            .find(|t| t.is_epsilon())
            .unwrap();
        assert_eq!(epsilon.group, 7);
        assert_close(epsilon.weight.value(), 2.);
    }

    #[test]
    fn test_append_stamps_group() {
        let first = CharAutomaton::constant_on(0., &chars("a"));
        let second = CharAutomaton::constant_on(0., &chars("bc"));
        let mut builder = Builder::from_automaton(&first);
        builder.append(&second, 4, true);
        let automaton = builder.get_automaton().unwrap();
        let groups: Vec<i32> = automaton
            .graph()
            .all_transitions()
            .iter()
            .map(|t| t.group)
            .collect();
        assert_eq!(groups, vec![0, 4, 4]);
    }

    #[test]
    fn test_append_moves_self_loop_onto_sink_end_state() {
        // second = x* y, with the self-loop on its start state.
        let mut second = Builder::<D, LogWeight>::new();
        let start = second.start_state();
        second.add_self_transition(start, Some(D::point_mass('x')), LogWeight::from_value(0.5), 0);
        let end = second.add_transitions_for_sequence(start, &chars("y"));
        second.set_end_weight(end, LogWeight::one());
        let second = second.get_automaton().unwrap();

        let first = CharAutomaton::constant_on(0., &chars("a"));
        let mut builder = Builder::from_automaton(&first);
        builder.append(&second, 0, true);
        let automaton = builder.get_automaton().unwrap();

        assert!(automaton.is_epsilon_free());
        assert_eq!(automaton.state_count(), 3);
        let loops = automaton.graph().transitions(StateIndex::new(1));
        assert!(loops.iter().any(|t| t.destination == StateIndex::new(1)));
        assert_close(automaton.get_log_value(&chars("axxy")), 0.25f64.ln());
        assert_close(automaton.get_log_value(&chars("ay")), 0.);
    }

    #[test]
    fn test_append_keeps_epsilon_when_start_is_reentered() {
        // second = (z)* through a two-state cycle back into its start.
        let mut second = Builder::<D, LogWeight>::new();
        let start = second.start_state();
        second.set_end_weight(start, LogWeight::one());
        let middle = second.add_transition(start, Some(D::point_mass('z')), LogWeight::one(), None, 0);
        second.add_epsilon_transition(middle, LogWeight::from_value(0.5), Some(start));
        let second = second.get_automaton().unwrap();

        let first = CharAutomaton::constant_on(0., &chars("a"));
        let mut builder = Builder::from_automaton(&first);
        builder.append(&second, 0, true);
        let automaton = builder.get_automaton().unwrap();

        assert_eq!(automaton.state_count(), 4);
        assert_close(automaton.get_log_value(&chars("azz")), 0.25f64.ln());
        assert_close(automaton.get_log_value(&chars("a")), 0.);
    }
}
