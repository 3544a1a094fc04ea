// Insertion of generalized sequences into a builder that is kept trie-shaped.
//
// Every state created here is reached by exactly one generalized prefix, so adding
// outgoing transitions or end weight to it only ever adds the sequence being inserted.
// A self-loop is the exception: it repeats in front of everything below its state,
// which is why an unmatched self-loop blocks ending or moving on.

use crate::builder::Builder;
use crate::distribution::ElementDistribution;
use crate::graph::indexing::StateIndex;
use crate::simplification::generalized_sequence::GeneralizedElement;
use crate::weight::Weight;

/// Adds `sequence` with `weight` below the start state, sharing every matching prefix.
///
/// Only states at or after `first_allowed_state` may be entered through existing
/// transitions; earlier states belong to a region that must stay untouched. If the
/// start state cannot take the sequence, it is split into two epsilon branches and the
/// sequence goes into the fresh one.
pub fn add_generalized_sequence<D, W>(
    builder: &mut Builder<D, W>,
    first_allowed_state: usize,
    sequence: &[GeneralizedElement<D, W>],
    weight: W,
) where
    D: ElementDistribution,
    W: Weight,
{
    let start = builder.start_state();
    let is_new_state = start.index() >= first_allowed_state
        && !builder.has_transitions(start)
        && !builder.can_end(start);
    let mut inserter = Inserter {
        builder,
        first_allowed_state,
        sequence,
    };
    if inserter.insert(start, is_new_state, false, 0, weight) {
        return;
    }

    let builder = &mut *inserter.builder;
    let new_start = builder.add_state();
    builder.add_epsilon_transition(new_start, W::one(), Some(start));
    builder.set_start_state(new_start);
    let branch = builder.add_epsilon_transition(new_start, W::one(), None);
    let success = inserter.insert(branch, true, false, 0, weight);
    debug_assert!(success, "insertion into a fresh branch cannot fail");
}

struct Inserter<'a, 's, D, W> {
    builder: &'a mut Builder<D, W>,
    first_allowed_state: usize,
    sequence: &'s [GeneralizedElement<D, W>],
}

impl<'a, 's, D, W> Inserter<'a, 's, D, W>
where
    D: ElementDistribution,
    W: Weight,
{
    // Returns false when the sequence cannot be placed below `state` without changing
    // the value of other sequences.
    fn insert(
        &mut self,
        state: StateIndex,
        is_new_state: bool,
        self_loop_matched: bool,
        position: usize,
        weight: W,
    ) -> bool {
        let self_loop = self
            .builder
            .transitions(state)
            .find(|(_, t)| t.destination == state)
            .map(|(_, t)| t.clone());

        let sequence = self.sequence;
        let Some(element) = sequence.get(position) else {
            if self_loop.is_some() && !self_loop_matched {
                return false;
            }
            let end_weight = self.builder.end_weight(state).sum(weight);
            self.builder.set_end_weight(state, end_weight);
            return true;
        };

        match element {
            GeneralizedElement::SelfLoop {
                distribution,
                loop_weight,
                group,
            } => {
                // An unmatched loop here would repeat before whatever follows a detour.
                let can_detour = self_loop.is_none() || self_loop_matched;
                if can_detour && self.try_epsilon_detours(state, position, weight) {
                    return true;
                }
                match self_loop {
                    Some(existing) if !self_loop_matched => {
                        let matches = existing.group == *group
                            && existing.weight == *loop_weight
                            && existing.element_distribution == *distribution;
                        matches && self.insert(state, is_new_state, true, position + 1, weight)
                    }
                    Some(_) => {
                        // This state's loop is spent; the next loop needs its own state.
                        let next = self.builder.add_epsilon_transition(state, W::one(), None);
                        self.insert_new(next, position, weight)
                    }
                    None if is_new_state => {
                        self.builder.add_self_transition(
                            state,
                            distribution.clone(),
                            *loop_weight,
                            *group,
                        );
                        let success = self.insert(state, true, true, position + 1, weight);
                        debug_assert!(success, "insertion below a fresh self-loop cannot fail");
                        true
                    }
                    None => {
                        let next = self.builder.add_epsilon_transition(state, W::one(), None);
                        self.insert_new(next, position, weight)
                    }
                }
            }
            GeneralizedElement::Symbol {
                distribution,
                group,
            } => {
                if self_loop.is_some() && !self_loop_matched {
                    return false;
                }
                if self.try_epsilon_detours(state, position, weight) {
                    return true;
                }

                let candidates: Vec<(StateIndex, W)> = self
                    .builder
                    .transitions(state)
                    .filter(|(_, t)| {
                        t.destination != state
                            && t.group == *group
                            && t.element_distribution.as_ref() == Some(distribution)
                            && self.is_allowed(t.destination)
                            && !t.weight.is_zero()
                    })
                    .map(|(_, t)| (t.destination, t.weight))
                    .collect();
                for (destination, transition_weight) in candidates {
                    let remaining = weight.product(transition_weight.inverse());
                    if self.insert(destination, false, false, position + 1, remaining) {
                        return true;
                    }
                }

                let next = self.builder.add_transition(
                    state,
                    Some(distribution.clone()),
                    W::one(),
                    None,
                    *group,
                );
                self.insert_new(next, position + 1, weight)
            }
        }
    }

    // Continues from the destinations of existing epsilon transitions.
    fn try_epsilon_detours(&mut self, state: StateIndex, position: usize, weight: W) -> bool {
        let detours: Vec<(StateIndex, W)> = self
            .builder
            .transitions(state)
            .filter(|(_, t)| {
                t.is_epsilon()
                    && t.destination != state
                    && self.is_allowed(t.destination)
                    && !t.weight.is_zero()
            })
            .map(|(_, t)| (t.destination, t.weight))
            .collect();
        detours.into_iter().any(|(destination, transition_weight)| {
            let remaining = weight.product(transition_weight.inverse());
            self.insert(destination, false, false, position, remaining)
        })
    }

    fn insert_new(&mut self, state: StateIndex, position: usize, weight: W) -> bool {
        let success = self.insert(state, true, false, position, weight);
        debug_assert!(success, "insertion into a fresh state cannot fail");
        true
    }

    fn is_allowed(&self, state: StateIndex) -> bool {
        state.index() >= self.first_allowed_state
    }
}
