use std::collections::HashMap;

use crate::automaton::Automaton;
use crate::distribution::ElementDistribution;
use crate::epsilon_closure::EpsilonClosure;
use crate::graph::indexing::StateIndex;
use crate::weight::Weight;

/// Scores one sequence against an automaton.
///
/// Values are memoized per `(state, position)`, so every pair is expanded at most once
/// and the recursion depth never exceeds the sequence length.
pub struct Evaluator<'a, D, W>
where
    D: ElementDistribution,
{
    automaton: &'a Automaton<D, W>,
    sequence: &'a [D::Element],
    values: HashMap<(StateIndex, usize), W>,
    closures: HashMap<StateIndex, EpsilonClosure<W>>,
}

impl<'a, D, W> Evaluator<'a, D, W>
where
    D: ElementDistribution,
    W: Weight,
{
    pub fn new(automaton: &'a Automaton<D, W>, sequence: &'a [D::Element]) -> Self {
        Self {
            automaton,
            sequence,
            values: HashMap::new(),
            closures: HashMap::new(),
        }
    }

    /// Total weight of the accepting paths from `state` spelling the whole sequence.
    pub fn get_value(&mut self, state: StateIndex) -> W {
        self.do_get_value(state, 0)
    }

    fn do_get_value(&mut self, state: StateIndex, position: usize) -> W {
        if let Some(&value) = self.values.get(&(state, position)) {
            return value;
        }

        let closure = self.closure(state);
        let sequence = self.sequence;
        let value = if position == sequence.len() {
            closure.end_weight()
        } else {
            let element = &sequence[position];
            let graph = self.automaton.graph();
            let mut steps = Vec::new();
            for &(member, member_weight) in closure.entries() {
                for transition in graph.transitions(member) {
                    let Some(distribution) = &transition.element_distribution else {
                        continue;
                    };
                    let step = member_weight
                        .product(transition.weight)
                        .product(W::from_log_value(distribution.log_prob(element)));
                    if !step.is_zero() {
                        steps.push((transition.destination, step));
                    }
                }
            }
            steps.into_iter().fold(W::zero(), |total, (destination, step)| {
                total.sum(step.product(self.do_get_value(destination, position + 1)))
            })
        };

        self.values.insert((state, position), value);
        value
    }

    fn closure(&mut self, state: StateIndex) -> EpsilonClosure<W> {
        let automaton = self.automaton;
        self.closures
            .entry(state)
            .or_insert_with(|| EpsilonClosure::new(automaton, state))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use crate::distribution::DiscreteDistribution;
    use crate::weight::LogWeight;

    type D = DiscreteDistribution<char>;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_soft_symbols() {
        // One transition accepting 'a' or 'b' with equal probability.
        let mut builder = Builder::<D, LogWeight>::new();
        let start = builder.start_state();
        let soft = D::from_masses(vec![('a', 1.), ('b', 1.)]);
        let end = builder.add_transition(start, Some(soft), LogWeight::from_value(2.), None, 0);
        builder.set_end_weight(end, LogWeight::one());
        let automaton = builder.get_automaton().unwrap();

        assert_close(automaton.get_log_value(&chars("a")), 0.);
        assert_close(automaton.get_log_value(&chars("b")), 0.);
        assert_eq!(automaton.get_log_value(&chars("c")), f64::NEG_INFINITY);
    }

    #[test]
    fn test_epsilon_paths_are_summed() {
        // start -eps 0.5-> s1 -x-> end and start -x-> end, end weight 1.
        let mut builder = Builder::<D, LogWeight>::new();
        let start = builder.start_state();
        let end = builder.add_state();
        builder.set_end_weight(end, LogWeight::one());
        let s1 = builder.add_epsilon_transition(start, LogWeight::from_value(0.5), None);
        builder.add_transition(s1, Some(D::point_mass('x')), LogWeight::one(), Some(end), 0);
        builder.add_transition(start, Some(D::point_mass('x')), LogWeight::one(), Some(end), 0);
        let automaton = builder.get_automaton().unwrap();

        let sequence = chars("x");
        let mut evaluator = Evaluator::new(&automaton, &sequence);
        assert_close(evaluator.get_value(start).value(), 1.5);
        assert_close(evaluator.get_value(s1).value(), 1.);
    }

    #[test]
    fn test_self_loop_repetitions() {
        let mut builder = Builder::<D, LogWeight>::new();
        let start = builder.start_state();
        builder.add_self_transition(start, Some(D::point_mass('a')), LogWeight::from_value(0.5), 0);
        builder.set_end_weight(start, LogWeight::one());
        let automaton = builder.get_automaton().unwrap();

        assert_close(automaton.get_log_value(&[]), 0.);
        assert_close(automaton.get_log_value(&chars("aaa")), 0.125f64.ln());
    }
}
