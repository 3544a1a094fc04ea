// Whole-graph checks over a frozen automaton. Each traversal keeps its own
// visitation map, so results are consistent within one call.

use std::collections::{HashMap, VecDeque};

use crate::error::{AutomatonError, Result};
use crate::graph::array_graph::ArrayGraph;
use crate::graph::indexing::StateIndex;
use crate::graph::traversal::post_order;
use crate::weight::Weight;

/// True if a cycle spanning more than one transition is reachable from `state`.
pub fn has_non_trivial_loops_from<D, W>(graph: &ArrayGraph<D, W>, state: StateIndex) -> bool
where
    W: Weight,
{
    post_order(state, |s| graph.neighbors(s)).has_cycle
}

/// True if no accepting state is reachable from `state` along non-zero transitions.
pub fn is_zero_from<D, W>(graph: &ArrayGraph<D, W>, state: StateIndex) -> bool
where
    W: Weight,
{
    let mut visited = vec![false; graph.state_count()];
    let mut stack = vec![state];
    visited[state.index()] = true;
    while let Some(current) = stack.pop() {
        if graph.get_state(current).can_end() {
            return false;
        }
        for transition in graph.transitions(current) {
            let next = transition.destination;
            if !transition.weight.is_zero() && !visited[next.index()] {
                visited[next.index()] = true;
                stack.push(next);
            }
        }
    }
    true
}

/// Marks the states that are reachable from `start` and can reach an accepting state.
pub fn live_states<D, W>(graph: &ArrayGraph<D, W>, start: StateIndex) -> Vec<bool>
where
    W: Weight,
{
    let state_count = graph.state_count();
    let mut predecessors: Vec<Vec<StateIndex>> = vec![Vec::new(); state_count];
    for index in 0..state_count {
        let state = StateIndex::new(index);
        for next in graph.neighbors(state) {
            predecessors[next.index()].push(state);
        }
    }

    let mut reachable = vec![false; state_count];
    let mut queue = VecDeque::from([start]);
    reachable[start.index()] = true;
    while let Some(state) = queue.pop_front() {
        for next in graph.neighbors(state) {
            if !reachable[next.index()] {
                reachable[next.index()] = true;
                queue.push_back(next);
            }
        }
    }

    let mut coreachable = vec![false; state_count];
    let mut queue: VecDeque<StateIndex> = (0..state_count)
        .map(StateIndex::new)
        .filter(|&state| graph.get_state(state).can_end())
        .collect();
    for state in queue.iter() {
        coreachable[state.index()] = true;
    }
    while let Some(state) = queue.pop_front() {
        for &previous in predecessors[state.index()].iter() {
            if !coreachable[previous.index()] {
                coreachable[previous.index()] = true;
                queue.push_back(previous);
            }
        }
    }

    reachable
        .iter()
        .zip(coreachable.iter())
        .map(|(&forward, &backward)| forward && backward)
        .collect()
}

/// Log of the total weight of all sequences accepted from `start`.
///
/// Element distributions are taken as normalized, so a labeled transition contributes
/// only its weight. Self-loops contribute the star of their summed weight.
pub fn log_normalizer<D, W>(graph: &ArrayGraph<D, W>, start: StateIndex) -> Result<f64>
where
    W: Weight,
{
    let order = post_order(start, |s| graph.neighbors(s));
    if order.has_cycle {
        return Err(AutomatonError::NonTrivialLoops);
    }
    let mut totals: HashMap<StateIndex, W> = HashMap::with_capacity(order.order.len());
    for &state in order.order.iter() {
        let mut loop_weight = W::zero();
        let mut total = graph.end_weight(state);
        for transition in graph.transitions(state) {
            if transition.destination == state {
                loop_weight = loop_weight.sum(transition.weight);
            } else {
                let rest = totals
                    .get(&transition.destination)
                    .copied()
                    .unwrap_or_else(W::zero);
                total = total.sum(transition.weight.product(rest));
            }
        }
        totals.insert(state, loop_weight.closure().product(total));
    }
    Ok(totals
        .get(&start)
        .map_or(f64::NEG_INFINITY, |total| total.log_value()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use crate::distribution::{DiscreteDistribution, ElementDistribution};
    use crate::weight::LogWeight;

    type D = DiscreteDistribution<char>;

    #[test]
    fn test_is_zero_ignores_zero_weight_paths() {
        let mut builder = Builder::<D, LogWeight>::new();
        let start = builder.start_state();
        let end = builder.add_transition(start, Some(D::point_mass('a')), LogWeight::zero(), None, 0);
        builder.set_end_weight(end, LogWeight::one());
        let automaton = builder.get_automaton().unwrap();
        assert!(is_zero_from(automaton.graph(), automaton.start_state()));
        assert!(!is_zero_from(automaton.graph(), end));
    }

    #[test]
    fn test_live_states() {
        // 0 -> 1 (accepting), 0 -> 2 (dead end), 3 unreachable but accepting.
        let mut builder = Builder::<D, LogWeight>::new();
        let start = builder.start_state();
        let s1 = builder.add_transition(start, Some(D::point_mass('a')), LogWeight::one(), None, 0);
        builder.add_transition(start, Some(D::point_mass('b')), LogWeight::one(), None, 0);
        let s3 = builder.add_state();
        builder.set_end_weight(s1, LogWeight::one());
        builder.set_end_weight(s3, LogWeight::one());
        let automaton = builder.get_automaton().unwrap();
        assert_eq!(
            live_states(automaton.graph(), automaton.start_state()),
            vec![true, true, false, false]
        );
    }

    #[test]
    fn test_log_normalizer_of_diamond() {
        // Two paths of weight 0.5 * 0.5 into a shared accepting state.
        let mut builder = Builder::<D, LogWeight>::new();
        let start = builder.start_state();
        let end = builder.add_state();
        builder.set_end_weight(end, LogWeight::one());
        for c in ['a', 'b'] {
            let middle = builder.add_transition(start, Some(D::point_mass(c)), LogWeight::from_value(0.5), None, 0);
            builder.add_transition(middle, Some(D::point_mass(c)), LogWeight::from_value(0.5), Some(end), 0);
        }
        let automaton = builder.get_automaton().unwrap();
        let log_normalizer = log_normalizer(automaton.graph(), automaton.start_state()).unwrap();
        assert!((log_normalizer - 0.5f64.ln()).abs() < 1e-9);
    }
}
