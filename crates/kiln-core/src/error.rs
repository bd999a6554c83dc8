//! Container error types.

use std::error::Error;
use std::fmt;

/// A push into a full [`BoundedArray`](crate::BoundedArray) was rejected.
///
/// Carries the rejected element back to the caller so nothing is dropped
/// silently.
#[derive(Clone, PartialEq, Eq)]
pub struct CapacityError<T> {
    element: T,
    capacity: usize,
}

impl<T> CapacityError<T> {
    pub(crate) fn new(element: T, capacity: usize) -> Self {
        Self { element, capacity }
    }

    /// The fixed capacity that was exceeded.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Recover the element that could not be stored.
    pub fn into_element(self) -> T {
        self.element
    }
}

impl<T> fmt::Debug for CapacityError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapacityError")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for CapacityError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bounded array is full (capacity {})", self.capacity)
    }
}

impl<T> Error for CapacityError<T> {}
