// See https://docs.rs/petgraph/0.4.13/src/petgraph/graph_impl/mod.rs.html

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

// Int-like type for indexing states and transitions.
// u32 is plenty for automata built in memory and halves the arena footprint.
pub type DefaultIx = u32;

/// Trait for the unsigned integer type used for state and transition indices.
///
/// # Safety
///
/// Marked `unsafe` because: the trait must faithfully preserve
/// and convert index values.
pub unsafe trait IndexType: Copy + Default + Hash + Ord + fmt::Debug + 'static {
    fn new(x: usize) -> Self;
    fn index(&self) -> usize;
    fn max_value() -> Self;
}

unsafe impl IndexType for usize {
    #[inline(always)]
    fn new(x: usize) -> Self {
        x
    }
    #[inline(always)]
    fn index(&self) -> Self {
        *self
    }
    #[inline(always)]
    fn max_value() -> Self {
        usize::MAX
    }
}

unsafe impl IndexType for u32 {
    #[inline(always)]
    fn new(x: usize) -> Self {
        x as u32
    }
    #[inline(always)]
    fn index(&self) -> usize {
        *self as usize
    }
    #[inline(always)]
    fn max_value() -> Self {
        u32::MAX
    }
}

unsafe impl IndexType for u16 {
    #[inline(always)]
    fn new(x: usize) -> Self {
        x as u16
    }
    #[inline(always)]
    fn index(&self) -> usize {
        *self as usize
    }
    #[inline(always)]
    fn max_value() -> Self {
        u16::MAX
    }
}

/// State identifier.
#[derive(Copy, Clone, Default, PartialEq, PartialOrd, Eq, Ord, Hash, Serialize, Deserialize)]
pub struct StateIndex<Ix = DefaultIx>(Ix);

impl<Ix: IndexType> StateIndex<Ix> {
    #[inline]
    pub fn new(x: usize) -> Self {
        StateIndex(IndexType::new(x))
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0.index()
    }

    /// An invalid `StateIndex`, used for a start state that was removed.
    #[inline]
    pub fn end() -> Self {
        StateIndex(IndexType::max_value())
    }

    #[inline]
    pub fn is_end(self) -> bool {
        self == Self::end()
    }
}

impl<Ix: IndexType> From<Ix> for StateIndex<Ix> {
    fn from(ix: Ix) -> Self {
        StateIndex(ix)
    }
}

impl<Ix: fmt::Debug> fmt::Debug for StateIndex<Ix> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "StateIndex({:?})", self.0)
    }
}

impl<Ix: IndexType> fmt::Display for StateIndex<Ix> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Transition identifier.
#[derive(Copy, Clone, Default, PartialEq, PartialOrd, Eq, Ord, Hash, Serialize, Deserialize)]
pub struct TransitionIndex<Ix = DefaultIx>(Ix);

impl<Ix: IndexType> TransitionIndex<Ix> {
    #[inline]
    pub fn new(x: usize) -> Self {
        TransitionIndex(IndexType::new(x))
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0.index()
    }

    /// An invalid `TransitionIndex` used to denote absence of a transition, for example
    /// to end a linked transition list.
    #[inline]
    pub fn end() -> Self {
        TransitionIndex(Ix::max_value())
    }

    #[inline]
    pub fn is_end(self) -> bool {
        self == Self::end()
    }
}

impl<Ix: fmt::Debug> fmt::Debug for TransitionIndex<Ix> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TransitionIndex({:?})", self.0)
    }
}
