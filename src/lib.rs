extern crate bincode;
extern crate serde;
extern crate serde_json;
extern crate tracing;

pub mod automaton;
pub mod builder;
pub mod config;
pub mod distribution;
pub mod epsilon_closure;
pub mod error;
pub mod evaluator;
pub mod graph;
pub mod io;
pub mod simplification;
pub mod weight;

pub use automaton::{Automaton, State};
pub use builder::Builder;
pub use error::{AutomatonError, Result};

/// Automaton over strings, with characters as elements.
pub type StringAutomaton = Automaton<distribution::DiscreteDistribution<char>, weight::LogWeight>;
