#![forbid(unsafe_code)]
#![no_std]

extern crate alloc;

pub mod bounded_array;
pub mod bounded_heap;

pub use self::{
    bounded_array::BoundedArray,
    bounded_heap::BoundedHeap,
};

/// Errors that may occur when operating on a bounded data structure.
#[derive(Debug, PartialEq, Eq)]
pub struct OutOfBoundsAccess;

/// Types with a canonical two-valued representation, convertible to and from
/// `bool`.
///
/// [`crate::bounded_array::BoundedArray`] and the solver's own value types
/// use this rather than requiring `bool` directly so a three-or-more-valued
/// wrapper (e.g. a signed literal polarity) can still plug into APIs shaped
/// around a boolean.
pub trait Bool {
    fn from_bool(value: bool) -> Self;
    fn into_bool(self) -> bool;
}

impl Bool for bool {
    #[inline(always)]
    fn from_bool(value: bool) -> Self {
        value
    }

    #[inline(always)]
    fn into_bool(self) -> bool {
        self
    }
}

/// Index types that may be used as keys for the bounded map.
pub trait Index: Copy + Clone {
    /// Creates a new key from the given index.
    fn from_index(index: usize) -> Self;
    /// Returns the index from the given key.
    fn into_index(self) -> usize;
}

impl Index for usize {
    #[inline]
    fn from_index(index: usize) -> Self {
        index
    }

    #[inline]
    fn into_index(self) -> usize {
        self
    }
}
