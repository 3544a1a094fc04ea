use crate::builder::Builder;
use crate::distribution::ElementDistribution;
use crate::graph::indexing::{StateIndex, TransitionIndex};
use crate::graph::transition::Transition;
use crate::weight::Weight;

fn can_merge<D, W>(first: &Transition<D, W>, second: &Transition<D, W>) -> bool {
    first.destination == second.destination
        && first.group == second.group
        && first.element_distribution.is_some() == second.element_distribution.is_some()
}

impl<D, W> Builder<D, W>
where
    D: ElementDistribution,
    W: Weight,
{
    /// Collapses transitions of one state that share destination, group and kind
    /// (epsilon or labeled). Weights are summed and labels become the weight-proportional
    /// mixture, so every sequence keeps its value. Returns the number of removed transitions.
    pub fn merge_parallel_transitions(&mut self) -> usize {
        let mut merged = 0;
        for index in 0..self.state_count() {
            let state = StateIndex::new(index);
            let mut indices: Vec<Option<TransitionIndex>> =
                self.transitions(state).map(|(i, _)| Some(i)).collect();
            for i in 0..indices.len() {
                let Some(kept) = indices[i] else {
                    continue;
                };
                for j in (i + 1)..indices.len() {
                    let Some(other) = indices[j] else {
                        continue;
                    };
                    if !can_merge(self.transition(kept), self.transition(other)) {
                        continue;
                    }
                    let combined = merge(self.transition(kept), self.transition(other));
                    *self.transition_mut(kept) = combined;
                    self.remove_transition(other);
                    indices[j] = None;
                    merged += 1;
                }
            }
        }
        merged
    }
}

fn merge<D, W>(first: &Transition<D, W>, second: &Transition<D, W>) -> Transition<D, W>
where
    D: ElementDistribution,
    W: Weight,
{
    let weight = first.weight.sum(second.weight);
    let element_distribution = match (&first.element_distribution, &second.element_distribution) {
        (Some(first_distribution), Some(second_distribution)) if !weight.is_zero() => {
            let log_total = weight.log_value();
            Some(first_distribution.weighted_sum(
                (first.weight.log_value() - log_total).exp(),
                second_distribution,
                (second.weight.log_value() - log_total).exp(),
            ))
        }
        _ => first.element_distribution.clone(),
    };
    Transition::new(element_distribution, weight, first.destination, first.group)
}

#[cfg(test)]
mod tests {
    use crate::builder::Builder;
    use crate::distribution::{DiscreteDistribution, ElementDistribution};
    use crate::weight::{LogWeight, Weight};

    type D = DiscreteDistribution<char>;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_merge_labeled_transitions() {
        let mut builder = Builder::<D, LogWeight>::new();
        let start = builder.start_state();
        let end = builder.add_transition(start, Some(D::point_mass('a')), LogWeight::from_value(1.), None, 0);
        builder.add_transition(start, Some(D::point_mass('b')), LogWeight::from_value(3.), Some(end), 0);
        builder.set_end_weight(end, LogWeight::one());

        assert_eq!(builder.merge_parallel_transitions(), 1);
        assert_eq!(builder.transition_count(), 1);
        let automaton = builder.get_automaton().unwrap();
        assert_close(automaton.get_log_value(&['a']), 1f64.ln());
        assert_close(automaton.get_log_value(&['b']), 3f64.ln());
    }

    #[test]
    fn test_merge_epsilon_transitions() {
        let mut builder = Builder::<D, LogWeight>::new();
        let start = builder.start_state();
        let end = builder.add_epsilon_transition(start, LogWeight::from_value(0.25), None);
        builder.add_epsilon_transition(start, LogWeight::from_value(0.5), Some(end));
        builder.set_end_weight(end, LogWeight::one());

        assert_eq!(builder.merge_parallel_transitions(), 1);
        let (_, transition) = builder.transitions(start).next().unwrap();
        assert!(transition.is_epsilon());
        assert_close(transition.weight.value(), 0.75);
    }

    #[test]
    fn test_keeps_different_groups_and_kinds() {
        let mut builder = Builder::<D, LogWeight>::new();
        let start = builder.start_state();
        let end = builder.add_transition(start, Some(D::point_mass('a')), LogWeight::one(), None, 1);
        builder.add_transition(start, Some(D::point_mass('a')), LogWeight::one(), Some(end), 2);
        builder.add_epsilon_transition(start, LogWeight::one(), Some(end));

        assert_eq!(builder.merge_parallel_transitions(), 0);
        assert_eq!(builder.transition_count(), 3);
    }
}
