use crate::builder::Builder;
use crate::distribution::ElementDistribution;
use crate::graph::indexing::StateIndex;
use crate::graph::traversal::post_order;
use crate::weight::Weight;

/// Marks the roots of generalized trees among the states reachable from the start.
///
/// A state is labeled when it is entered by at most one transition, carries at most
/// one self-loop and all of its other successors are labeled too. Unreachable states
/// are never labeled. Expects an automaton without non-trivial loops.
pub fn label_states<D, W>(builder: &Builder<D, W>) -> Vec<bool>
where
    D: ElementDistribution,
    W: Weight,
{
    let state_count = builder.state_count();
    let order = post_order(builder.start_state(), |state| {
        builder
            .transitions(state)
            .map(|(_, t)| t.destination)
            .collect::<Vec<_>>()
    });

    let mut in_degree = vec![0usize; state_count];
    for &state in order.order.iter() {
        for (_, transition) in builder.transitions(state) {
            if transition.destination != state {
                in_degree[transition.destination.index()] += 1;
            }
        }
    }

    // Post-order visits successors first.
    let mut is_tree = vec![false; state_count];
    for &state in order.order.iter() {
        is_tree[state.index()] = in_degree[state.index()] <= 1
            && self_loop_count(builder, state) <= 1
            && builder
                .transitions(state)
                .all(|(_, t)| t.destination == state || is_tree[t.destination.index()]);
    }
    is_tree
}

pub fn self_loop_count<D, W>(builder: &Builder<D, W>, state: StateIndex) -> usize
where
    D: ElementDistribution,
    W: Weight,
{
    builder
        .transitions(state)
        .filter(|(_, t)| t.destination == state)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::DiscreteDistribution;
    use crate::weight::LogWeight;

    type D = DiscreteDistribution<char>;

    #[test]
    fn test_tree_with_self_loop() {
        let mut builder = Builder::<D, LogWeight>::new();
        let start = builder.start_state();
        let a = builder.add_transition(start, Some(D::point_mass('a')), LogWeight::one(), None, 0);
        builder.add_self_transition(a, Some(D::point_mass('x')), LogWeight::from_value(0.5), 0);
        builder.add_transition(start, Some(D::point_mass('b')), LogWeight::one(), None, 0);
        assert_eq!(label_states(&builder), vec![true, true, true]);
    }

    #[test]
    fn test_shared_state_is_not_tree() {
        // 0 -a-> 1 -c-> 3, 0 -b-> 2 -c-> 3, 3 -d-> 4
        let mut builder = Builder::<D, LogWeight>::new();
        let start = builder.start_state();
        let s1 = builder.add_transition(start, Some(D::point_mass('a')), LogWeight::one(), None, 0);
        let s2 = builder.add_transition(start, Some(D::point_mass('b')), LogWeight::one(), None, 0);
        let s3 = builder.add_transition(s1, Some(D::point_mass('c')), LogWeight::one(), None, 0);
        builder.add_transition(s2, Some(D::point_mass('c')), LogWeight::one(), Some(s3), 0);
        builder.add_transition(s3, Some(D::point_mass('d')), LogWeight::one(), None, 0);
        let unreachable = builder.add_state();

        let labels = label_states(&builder);
        assert_eq!(labels, vec![false, false, false, false, true, false]);
        assert!(!labels[unreachable.index()]);
    }

    #[test]
    fn test_two_self_loops_are_not_tree() {
        let mut builder = Builder::<D, LogWeight>::new();
        let start = builder.start_state();
        builder.add_self_transition(start, Some(D::point_mass('x')), LogWeight::from_value(0.5), 0);
        builder.add_self_transition(start, None, LogWeight::from_value(0.5), 0);
        assert_eq!(self_loop_count(&builder, start), 2);
        assert_eq!(label_states(&builder), vec![false]);
    }
}
