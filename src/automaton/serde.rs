use ::serde::de::{Deserializer, SeqAccess, Visitor};
use ::serde::ser::{SerializeStruct, Serializer};
use ::serde::{Deserialize, Serialize};
use std::marker::PhantomData;

use crate::automaton::Automaton;
use crate::distribution::ElementDistribution;
use crate::graph::array_graph::ArrayGraph;
use crate::graph::indexing::StateIndex;
use crate::weight::Weight;

impl<D, W> Serialize for Automaton<D, W>
where
    D: Serialize,
    W: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct("Automaton", 2)?;
        s.serialize_field("graph", &self.graph)?;
        s.serialize_field("start_state", &self.start_state)?;
        s.end()
    }
}

impl<'de, D, W> Deserialize<'de> for Automaton<D, W>
where
    D: ElementDistribution + Deserialize<'de>,
    W: Weight + Deserialize<'de>,
{
    fn deserialize<De: Deserializer<'de>>(d: De) -> Result<Self, De::Error> {
        d.deserialize_struct(
            "Automaton",
            &["graph", "start_state"],
            AutomatonVisitor::<D, W> {
                marker: PhantomData,
            },
        )
    }
}

pub struct AutomatonVisitor<D, W> {
    pub marker: PhantomData<(D, W)>,
}

impl<'de, D, W> Visitor<'de> for AutomatonVisitor<D, W>
where
    D: ElementDistribution + Deserialize<'de>,
    W: Weight + Deserialize<'de>,
{
    type Value = Automaton<D, W>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("struct Automaton")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let graph: ArrayGraph<D, W> = seq
            .next_element()?
            .ok_or_else(|| ::serde::de::Error::invalid_length(0, &self))?;

        let start_state: StateIndex = seq
            .next_element()?
            .ok_or_else(|| ::serde::de::Error::invalid_length(1, &self))?;

        // The epsilon-free flag is recomputed rather than trusted.
        Automaton::from_graph(graph, start_state).map_err(::serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use crate::automaton::Automaton;
    use crate::distribution::DiscreteDistribution;
    use crate::graph::array_graph::StateRecord;
    use crate::graph::indexing::{StateIndex, TransitionIndex};
    use crate::weight::{LogWeight, Weight};
    use bincode::{deserialize, serialize};

    type CharAutomaton = Automaton<DiscreteDistribution<char>, LogWeight>;

    #[test]
    fn test_serialize_deserialize_automaton() {
        let word: Vec<char> = "cat".chars().collect();
        let automaton = CharAutomaton::constant_on(2f64.ln(), &word);
        let bytes = serialize(&automaton).unwrap();
        let new_automaton: CharAutomaton = deserialize(&bytes).unwrap();

        assert_eq!(new_automaton.start_state(), automaton.start_state());
        assert_eq!(new_automaton.graph().states(), automaton.graph().states());
        assert_eq!(
            new_automaton.graph().all_transitions(),
            automaton.graph().all_transitions()
        );
        assert!(new_automaton.is_epsilon_free());
        assert!((new_automaton.get_log_value(&word) - 2f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn test_deserialize_rejects_bad_start_state() {
        // Hand-encode an automaton whose start state is out of range.
        let states = vec![StateRecord::new(
            TransitionIndex::new(0),
            TransitionIndex::new(0),
            LogWeight::one(),
        )];
        let transitions: Vec<crate::graph::transition::Transition<DiscreteDistribution<char>, LogWeight>> =
            Vec::new();
        let start_state: StateIndex = StateIndex::new(3);
        let bytes = serialize(&((states, transitions), start_state)).unwrap();
        let result: Result<CharAutomaton, _> = deserialize(&bytes);
        assert!(result.is_err());
    }
}
