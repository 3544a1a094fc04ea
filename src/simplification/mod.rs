// Simplification rewrites the generalized-tree part of an automaton into a trie.
//
// Parallel transitions are merged first. Then every accepting path through a
// generalized tree is pulled out as a weighted generalized sequence, the rest of the
// automaton is copied verbatim, and the sequences are inserted back so that equal
// prefixes and equal self-loops are shared.

use tracing::{debug, warn};

use crate::automaton::Automaton;
use crate::builder::Builder;
use crate::config::SimplifyConfig;
use crate::distribution::ElementDistribution;
use crate::error::Result;
use crate::graph::indexing::StateIndex;
use crate::weight::Weight;

use self::generalized_sequence::{extract_sequences, GeneralizedElement, GeneralizedSequence};
use self::labels::{label_states, self_loop_count};
use self::trie::add_generalized_sequence;

pub mod generalized_sequence;
pub mod labels;
pub mod merge;
pub mod trie;

type WeightedSequences<D, W> = Vec<(GeneralizedSequence<D, W>, W)>;

impl<D, W> Automaton<D, W>
where
    D: ElementDistribution,
    W: Weight,
{
    /// Simplifies without pruning. See `simplify_with`.
    pub fn simplify(&mut self) -> Result<bool> {
        self.simplify_with(&SimplifyConfig::default())
    }

    /// Rewrites the automaton into an equivalent one whose tree-shaped part is a trie.
    ///
    /// Returns `Ok(false)`, leaving the automaton untouched, when it has loops spanning
    /// more than one transition. With a pruning threshold, sequences whose normalized log
    /// weight falls below it are dropped from the tree-shaped part.
    pub fn simplify_with(&mut self, config: &SimplifyConfig) -> Result<bool> {
        if self.has_non_trivial_loops() {
            debug!("Automaton has non-trivial loops, not simplifying");
            return Ok(false);
        }

        let mut builder = Builder::from_automaton(self);
        let merged = builder.merge_parallel_transitions();
        let is_tree = label_states(&builder);
        let start = builder.start_state();

        let (mut result, first_allowed_state, mut sequences) = if is_tree[start.index()] {
            let mut sequences = Vec::new();
            extract_sequences(&builder, &[], start, None, W::one(), &mut sequences);
            (Builder::new(), 0, sequences)
        } else {
            split_at_start(&builder, &is_tree)
        };

        if let Some(threshold) = config.prune_log_weight_threshold {
            let log_normalizer = self.get_log_normalizer()?;
            prune(&mut sequences, log_normalizer, threshold);
        }

        for (sequence, weight) in sequences.iter() {
            add_generalized_sequence(&mut result, first_allowed_state, sequence, *weight);
        }
        let states_before = self.state_count();
        *self = result.get_automaton()?;
        debug!(
            merged,
            sequences = sequences.len(),
            copied = first_allowed_state,
            states_before,
            states_after = self.state_count(),
            "Simplified automaton"
        );
        Ok(true)
    }
}

// Copies the part of the automaton that is not a generalized tree, with the start state
// first, and extracts the sequences of the trees hanging directly off the start.
fn split_at_start<D, W>(
    builder: &Builder<D, W>,
    is_tree: &[bool],
) -> (Builder<D, W>, usize, WeightedSequences<D, W>)
where
    D: ElementDistribution,
    W: Weight,
{
    let start = builder.start_state();
    // With several self-loops on the start there is no single prefix to re-enter it with.
    let extract = self_loop_count(builder, start) <= 1;
    let prefix: Vec<GeneralizedElement<D, W>> = builder
        .transitions(start)
        .filter(|(_, t)| t.destination == start)
        .map(|(_, t)| GeneralizedElement::from_self_loop(t))
        .collect();
    let is_extracted = |state: StateIndex, destination: StateIndex| {
        extract && state == start && destination != start && is_tree[destination.index()]
    };

    let mut result = Builder::with_capacity(builder.state_count(), builder.transition_count());
    let mut new_indices: Vec<Option<StateIndex>> = vec![None; builder.state_count()];
    new_indices[start.index()] = Some(result.start_state());
    let mut stack = vec![start];
    let mut copied = Vec::new();
    while let Some(state) = stack.pop() {
        copied.push(state);
        for (_, transition) in builder.transitions(state) {
            let destination = transition.destination;
            if is_extracted(state, destination) || new_indices[destination.index()].is_some() {
                continue;
            }
            new_indices[destination.index()] = Some(result.add_state());
            stack.push(destination);
        }
    }
    for &state in copied.iter() {
        let Some(new_state) = new_indices[state.index()] else {
            continue;
        };
        result.set_end_weight(new_state, builder.end_weight(state));
        for (_, transition) in builder.transitions(state) {
            if is_extracted(state, transition.destination) {
                continue;
            }
            if let Some(destination) = new_indices[transition.destination.index()] {
                result.add_transition_record(new_state, transition.clone().with_destination(destination));
            }
        }
    }
    let first_allowed_state = result.state_count();

    let mut sequences = Vec::new();
    for (_, transition) in builder.transitions(start) {
        if is_extracted(start, transition.destination) {
            extract_sequences(
                builder,
                &prefix,
                transition.destination,
                GeneralizedElement::from_transition(transition),
                transition.weight,
                &mut sequences,
            );
        }
    }
    (result, first_allowed_state, sequences)
}

fn prune<D, W>(sequences: &mut WeightedSequences<D, W>, log_normalizer: f64, threshold: f64)
where
    W: Weight,
{
    if !log_normalizer.is_finite() {
        warn!(log_normalizer, "Cannot normalize sequence weights, not pruning");
        return;
    }
    let before = sequences.len();
    sequences.retain(|(_, weight)| weight.log_value() - log_normalizer >= threshold);
    debug!(
        pruned = before - sequences.len(),
        threshold, "Pruned low-weight sequences"
    );
}
