use std::collections::HashMap;

use crate::automaton::Automaton;
use crate::distribution::ElementDistribution;
use crate::graph::array_graph::ArrayGraph;
use crate::graph::indexing::StateIndex;
use crate::graph::traversal::post_order;
use crate::weight::Weight;

/// The states reachable from one state through epsilon transitions only, each with
/// the total weight of reaching it, plus the total weight of ending from there.
#[derive(Clone, Debug, PartialEq)]
pub struct EpsilonClosure<W> {
    // The source state comes first.
    entries: Vec<(StateIndex, W)>,
    end_weight: W,
}

impl<W> EpsilonClosure<W>
where
    W: Weight,
{
    pub fn new<D>(automaton: &Automaton<D, W>, state: StateIndex) -> Self
    where
        D: ElementDistribution,
    {
        let graph = automaton.graph();
        if automaton.is_epsilon_free() {
            return Self {
                entries: vec![(state, W::one())],
                end_weight: graph.end_weight(state),
            };
        }

        let order = post_order(state, |s| epsilon_successors(graph, s));
        let entries = if order.has_cycle {
            kleene_closure(graph, state, &order.order)
        } else {
            acyclic_closure(graph, order.topological())
        };
        let end_weight = entries
            .iter()
            .fold(W::zero(), |total, &(member, weight)| {
                total.sum(weight.product(graph.end_weight(member)))
            });
        Self {
            entries,
            end_weight,
        }
    }

    pub fn entries(&self) -> &[(StateIndex, W)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total weight of ending the sequence anywhere in the closure.
    pub fn end_weight(&self) -> W {
        self.end_weight
    }

    pub fn weight_of(&self, state: StateIndex) -> W {
        self.entries
            .iter()
            .find(|(member, _)| *member == state)
            .map_or(W::zero(), |&(_, weight)| weight)
    }
}

fn epsilon_successors<D, W>(graph: &ArrayGraph<D, W>, state: StateIndex) -> Vec<StateIndex>
where
    W: Weight,
{
    graph
        .transitions(state)
        .iter()
        .filter(|t| t.is_epsilon() && !t.weight.is_zero())
        .map(|t| t.destination)
        .collect()
}

// Forward propagation in topological order. A state's epsilon self-loops are starred
// once all of its incoming weight has arrived.
fn acyclic_closure<D, W, I>(graph: &ArrayGraph<D, W>, topological: I) -> Vec<(StateIndex, W)>
where
    W: Weight,
    I: Iterator<Item = StateIndex>,
{
    let mut incoming: HashMap<StateIndex, W> = HashMap::new();
    let mut entries = Vec::new();
    for (position, state) in topological.enumerate() {
        let reached = if position == 0 {
            W::one()
        } else {
            incoming.get(&state).copied().unwrap_or_else(W::zero)
        };
        let mut loop_weight = W::zero();
        for transition in graph.transitions(state).iter().filter(|t| t.is_epsilon()) {
            if transition.destination == state {
                loop_weight = loop_weight.sum(transition.weight);
            }
        }
        let weight = reached.product(loop_weight.closure());
        for transition in graph.transitions(state).iter().filter(|t| t.is_epsilon()) {
            if transition.destination != state && !transition.weight.is_zero() {
                let entry = incoming.entry(transition.destination).or_insert_with(W::zero);
                *entry = entry.sum(weight.product(transition.weight));
            }
        }
        entries.push((state, weight));
    }
    entries
}

// All-pairs Kleene closure (Lehmann's algorithm) restricted to the closure members,
// used only when epsilon transitions form a cycle through several states.
fn kleene_closure<D, W>(
    graph: &ArrayGraph<D, W>,
    source: StateIndex,
    members: &[StateIndex],
) -> Vec<(StateIndex, W)>
where
    W: Weight,
{
    let size = members.len();
    let position: HashMap<StateIndex, usize> = members
        .iter()
        .enumerate()
        .map(|(i, &state)| (state, i))
        .collect();
    let mut matrix = vec![vec![W::zero(); size]; size];
    for (i, &state) in members.iter().enumerate() {
        for transition in graph.transitions(state).iter().filter(|t| t.is_epsilon()) {
            if let Some(&j) = position.get(&transition.destination) {
                matrix[i][j] = matrix[i][j].sum(transition.weight);
            }
        }
    }

    for k in 0..size {
        let star = matrix[k][k].closure();
        let previous = matrix.clone();
        for i in 0..size {
            let through = previous[i][k].product(star);
            if through.is_zero() {
                continue;
            }
            for j in 0..size {
                matrix[i][j] = previous[i][j].sum(through.product(previous[k][j]));
            }
        }
    }

    let row = position.get(&source).copied().unwrap_or(0);
    let mut entries = vec![(source, W::one().sum(matrix[row][row]))];
    for (j, &state) in members.iter().enumerate() {
        if j != row && !matrix[row][j].is_zero() {
            entries.push((state, matrix[row][j]));
        }
    }
    entries
}
