use ::serde::de::{Deserializer, SeqAccess, Visitor};
use ::serde::ser::{SerializeStruct, Serializer};
use ::serde::{Deserialize, Serialize};
use std::marker::PhantomData;

use crate::graph::array_graph::{ArrayGraph, StateRecord};
use crate::graph::transition::Transition;
use crate::weight::Weight;

impl<D, W> Serialize for ArrayGraph<D, W>
where
    D: Serialize,
    W: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct("ArrayGraph", 2)?;
        s.serialize_field("states", &self.states)?;
        s.serialize_field("transitions", &self.transitions)?;
        s.end()
    }
}

impl<'de, D, W> Deserialize<'de> for ArrayGraph<D, W>
where
    D: Deserialize<'de>,
    W: Weight + Deserialize<'de>,
{
    fn deserialize<De: Deserializer<'de>>(d: De) -> Result<Self, De::Error> {
        d.deserialize_struct(
            "ArrayGraph",
            &["states", "transitions"],
            ArrayGraphVisitor::<D, W> {
                marker: PhantomData,
            },
        )
    }
}

pub struct ArrayGraphVisitor<D, W> {
    pub marker: PhantomData<(D, W)>,
}

impl<'de, D, W> Visitor<'de> for ArrayGraphVisitor<D, W>
where
    D: Deserialize<'de>,
    W: Weight + Deserialize<'de>,
{
    type Value = ArrayGraph<D, W>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("struct ArrayGraph")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let states: Vec<StateRecord<W>> = seq
            .next_element()?
            .ok_or_else(|| ::serde::de::Error::invalid_length(0, &self))?;

        let transitions: Vec<Transition<D, W>> = seq
            .next_element()?
            .ok_or_else(|| ::serde::de::Error::invalid_length(1, &self))?;

        // Corrupt input must not produce a graph with dangling indices.
        ArrayGraph::new(states, transitions).map_err(::serde::de::Error::custom)
    }
}
