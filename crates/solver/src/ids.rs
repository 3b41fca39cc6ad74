use bounded::Index;
use core::convert::TryFrom;

/// Dense identifier of a clause stored in the solver's clause arena.
///
/// Learnt clauses are appended to the same arena as input clauses and
/// receive the next free identifier; nothing is ever removed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ClauseId {
    value: u32,
}

impl ClauseId {
    /// Returns the raw index of the clause.
    #[inline]
    pub fn into_index(self) -> usize {
        self.value as usize
    }
}

impl Index for ClauseId {
    fn from_index(index: usize) -> Self {
        Self {
            value: u32::try_from(index).expect("encountered clause index out of bounds"),
        }
    }

    fn into_index(self) -> usize {
        ClauseId::into_index(self)
    }
}
