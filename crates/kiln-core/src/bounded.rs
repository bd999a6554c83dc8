//! Fixed-capacity inline array with a runtime length.
//!
//! [`BoundedArray`] replaces "array of N plus a count" structs for resources
//! with a hard upper bound. Overflow is reported through
//! [`CapacityError`] instead of writing past the end.

use std::fmt;
use std::ops::Deref;

use crate::error::CapacityError;

/// Inline storage for at most `N` elements.
///
/// Slots beyond `len` hold `T::default()` and are never observable through
/// the public API.
pub struct BoundedArray<T, const N: usize> {
    slots: [T; N],
    len: usize,
}

impl<T: Default, const N: usize> BoundedArray<T, N> {
    /// Create an empty array.
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| T::default()),
            len: 0,
        }
    }

    /// Append `item`, or hand it back inside a [`CapacityError`] if all
    /// `N` slots are taken.
    pub fn try_push(&mut self, item: T) -> Result<(), CapacityError<T>> {
        if self.len == N {
            return Err(CapacityError::new(item, N));
        }
        self.slots[self.len] = item;
        self.len += 1;
        Ok(())
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(std::mem::take(&mut self.slots[self.len]))
    }

    /// Shorten to `len` elements, dropping the rest. No-op if `len` is not
    /// smaller than the current length.
    pub fn truncate(&mut self, len: usize) {
        while self.len > len {
            self.len -= 1;
            self.slots[self.len] = T::default();
        }
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.truncate(0);
    }
}

impl<T, const N: usize> BoundedArray<T, N> {
    /// Number of stored elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no elements are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether all `N` slots are taken.
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// The fixed capacity, `N`.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Element at `index`, or `None` past the runtime length.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Mutable element at `index`, or `None` past the runtime length.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// The live elements.
    pub fn as_slice(&self) -> &[T] {
        &self.slots[..self.len]
    }

    /// The live elements, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.slots[..self.len]
    }
}

impl<T: Default, const N: usize> Default for BoundedArray<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, const N: usize> Clone for BoundedArray<T, N> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            len: self.len,
        }
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for BoundedArray<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T: PartialEq, const N: usize> PartialEq for BoundedArray<T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T, const N: usize> Deref for BoundedArray<T, N> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<'s, T, const N: usize> IntoIterator for &'s BoundedArray<T, N> {
    type Item = &'s T;
    type IntoIter = std::slice::Iter<'s, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}
