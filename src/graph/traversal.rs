use std::collections::HashMap;

use crate::graph::indexing::StateIndex;

/// A state on the stack, that should either be opened or closed.
#[derive(Clone, Copy, Debug)]
pub struct StackOp {
    state: StateIndex,
    open: bool,
}

impl StackOp {
    pub fn open(state: StateIndex) -> Self {
        Self { state, open: true }
    }

    pub fn close(state: StateIndex) -> Self {
        Self { state, open: false }
    }
}

/// Result of a depth-first traversal: states in post-order (every state after all of
/// its successors, when acyclic) and whether a cycle other than a self-loop was seen.
#[derive(Clone, Debug, Default)]
pub struct PostOrder {
    pub order: Vec<StateIndex>,
    pub has_cycle: bool,
}

impl PostOrder {
    /// Reverse post-order, i.e. a topological order when `has_cycle` is false.
    pub fn topological(&self) -> impl Iterator<Item = StateIndex> + '_ {
        self.order.iter().rev().copied()
    }
}

/// DFS implementation of graph traversal, with an explicit stack so that deep automata
/// cannot overflow the call stack. Self-loops returned by `successors` are ignored.
pub fn post_order<F, I>(root: StateIndex, mut successors: F) -> PostOrder
where
    F: FnMut(StateIndex) -> I,
    I: IntoIterator<Item = StateIndex>,
{
    // false = opened (on the current path), true = closed.
    let mut closed: HashMap<StateIndex, bool> = HashMap::new();
    let mut result = PostOrder::default();
    let mut stack = vec![StackOp::open(root)];
    while let Some(op) = stack.pop() {
        if op.open {
            if closed.contains_key(&op.state) {
                continue;
            }
            closed.insert(op.state, false);
            stack.push(StackOp::close(op.state));
            for next_state in successors(op.state) {
                if next_state == op.state {
                    continue;
                }
                match closed.get(&next_state) {
                    Some(false) => result.has_cycle = true,
                    Some(true) => {}
                    None => stack.push(StackOp::open(next_state)),
                }
            }
        } else {
            closed.insert(op.state, true);
            result.order.push(op.state);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(edges: &[(usize, usize)]) -> PostOrder {
        post_order(StateIndex::new(0), |state| {
            edges
                .iter()
                .filter(move |(from, _)| *from == state.index())
                .map(|(_, to)| StateIndex::new(*to))
                .collect::<Vec<_>>()
        })
    }

    #[test]
    fn test_diamond_is_acyclic() {
        let result = run(&[(0, 1), (0, 2), (1, 3), (2, 3)]);
        assert!(!result.has_cycle);
        assert_eq!(result.order.len(), 4);
        let topological: Vec<_> = result.topological().map(|s| s.index()).collect();
        assert_eq!(topological[0], 0);
        assert_eq!(topological[3], 3);
    }

    #[test]
    fn test_self_loops_are_ignored() {
        let result = run(&[(0, 0), (0, 1), (1, 1)]);
        assert!(!result.has_cycle);
    }

    #[test]
    fn test_two_state_cycle() {
        let result = run(&[(0, 1), (1, 0)]);
        assert!(result.has_cycle);
    }
}
