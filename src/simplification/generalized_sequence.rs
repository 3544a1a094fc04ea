use crate::builder::Builder;
use crate::distribution::ElementDistribution;
use crate::graph::indexing::StateIndex;
use crate::graph::transition::Transition;
use crate::weight::Weight;

/// One position of a generalized sequence.
#[derive(Clone, Debug, PartialEq)]
pub enum GeneralizedElement<D, W> {
    /// Consumes one element drawn from `distribution`.
    Symbol { distribution: D, group: i32 },
    /// Repeats zero or more times; `None` is an epsilon self-loop.
    SelfLoop {
        distribution: Option<D>,
        loop_weight: W,
        group: i32,
    },
}

pub type GeneralizedSequence<D, W> = Vec<GeneralizedElement<D, W>>;

impl<D, W> GeneralizedElement<D, W>
where
    D: ElementDistribution,
    W: Weight,
{
    /// The symbol read by a transition, or `None` for an epsilon transition.
    pub fn from_transition(transition: &Transition<D, W>) -> Option<Self> {
        transition
            .element_distribution
            .as_ref()
            .map(|distribution| GeneralizedElement::Symbol {
                distribution: distribution.clone(),
                group: transition.group,
            })
    }

    pub fn from_self_loop(transition: &Transition<D, W>) -> Self {
        GeneralizedElement::SelfLoop {
            distribution: transition.element_distribution.clone(),
            loop_weight: transition.weight,
            group: transition.group,
        }
    }

    pub fn is_self_loop(&self) -> bool {
        matches!(self, GeneralizedElement::SelfLoop { .. })
    }
}

struct Visit<D, W> {
    state: StateIndex,
    // length of the shared buffer when this state is entered
    depth: usize,
    weight: W,
    element: Option<GeneralizedElement<D, W>>,
}

/// Collects every accepting path of the generalized tree hanging below `root` as a
/// weighted generalized sequence, appending them to `output` in depth-first order.
///
/// `root` is entered with `element` after `prefix`, carrying `weight`. A state's
/// self-loop lands in the sequence right where the state is entered. The walk keeps
/// an explicit stack, so tree depth is bounded only by memory.
pub fn extract_sequences<D, W>(
    builder: &Builder<D, W>,
    prefix: &[GeneralizedElement<D, W>],
    root: StateIndex,
    element: Option<GeneralizedElement<D, W>>,
    weight: W,
    output: &mut Vec<(GeneralizedSequence<D, W>, W)>,
) where
    D: ElementDistribution,
    W: Weight,
{
    let mut buffer: GeneralizedSequence<D, W> = prefix.to_vec();
    let mut stack = vec![Visit {
        state: root,
        depth: buffer.len(),
        weight,
        element,
    }];
    while let Some(visit) = stack.pop() {
        buffer.truncate(visit.depth);
        buffer.extend(visit.element);
        let state = visit.state;
        if let Some((_, self_loop)) = builder
            .transitions(state)
            .find(|(_, t)| t.destination == state)
        {
            buffer.push(GeneralizedElement::from_self_loop(self_loop));
        }

        if builder.can_end(state) {
            output.push((buffer.clone(), visit.weight.product(builder.end_weight(state))));
        }

        let depth = buffer.len();
        let children: Vec<Visit<D, W>> = builder
            .transitions(state)
            .filter(|(_, t)| t.destination != state)
            .map(|(_, t)| Visit {
                state: t.destination,
                depth,
                weight: visit.weight.product(t.weight),
                element: GeneralizedElement::from_transition(t),
            })
            .filter(|child| !child.weight.is_zero())
            .collect();
        // Reversed, so the first transition is walked first.
        stack.extend(children.into_iter().rev());
    }
}
