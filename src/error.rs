//! Error types for automaton construction and persistence.

use thiserror::Error;

/// Result type alias for automaton operations.
pub type Result<T> = std::result::Result<T, AutomatonError>;

/// Errors that can occur while building, compacting or loading an automaton.
#[derive(Debug, Error)]
pub enum AutomatonError {
    /// The designated start state is outside `[0, state_count)`.
    #[error("invalid start state {index} (automaton has {state_count} states)")]
    InvalidStartState { index: usize, state_count: usize },

    /// A transition points outside the state array.
    #[error("transition from state {source_state} points to state {destination} (automaton has {state_count} states)")]
    InvalidDestination {
        source_state: usize,
        destination: usize,
        state_count: usize,
    },

    /// A state's transition range does not fit the transition array.
    #[error("state {state} has transition range [{first}, {last}) (automaton has {transition_count} transitions)")]
    InvalidTransitionRange {
        state: usize,
        first: usize,
        last: usize,
        transition_count: usize,
    },

    /// The operation is only defined for automata whose cycles are self-loops.
    #[error("automaton contains loops spanning more than one transition")]
    NonTrivialLoops,

    /// I/O error (file operations).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}
