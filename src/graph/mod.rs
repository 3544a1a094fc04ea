pub mod array_graph;
pub mod indexing;
pub mod transition;
pub mod traversal;

pub use array_graph::{ArrayGraph, StateRecord};
pub use indexing::{StateIndex, TransitionIndex};
pub use transition::Transition;
