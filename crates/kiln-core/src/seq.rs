//! Geometrically-growing owned sequence.
//!
//! [`GrowableSeq`] is the heap-backed companion to the transient arena. Its
//! storage is allocated lazily on first append and grows by at least
//! doubling, so appending `n` elements costs amortised O(1) each. It is used
//! for data whose final length is unknown up front and which must survive
//! arena resets (a pipeline's shader list, its vertex attributes).

use std::fmt;
use std::ops::{Deref, DerefMut};

/// Append-optimised sequence with geometric growth.
///
/// The logical `capacity` is tracked separately from the backing `Vec` so
/// the growth policy is exact: the first allocation reserves
/// `max(needed, min_capacity)` slots, every later one reserves
/// `max(needed, 2 * capacity)`. Capacity only ever shrinks through
/// [`GrowableSeq::free`].
///
/// Storage growth failure is treated as unrecoverable: the process cannot
/// build a correct pipeline from a silently truncated list, so
/// [`append_one`](GrowableSeq::append_one) and
/// [`append_many`](GrowableSeq::append_many) log the failure and panic.
pub struct GrowableSeq<T> {
    items: Vec<T>,
    /// Logical capacity granted by the growth policy.
    capacity: usize,
    /// Capacity reserved by the first allocation.
    min_capacity: usize,
}

impl<T> GrowableSeq<T> {
    /// Default minimum capacity of the first allocation, in elements.
    pub const DEFAULT_MIN_CAPACITY: usize = 64;

    /// Create an empty sequence. No storage is allocated.
    pub fn new() -> Self {
        Self::with_min_capacity(Self::DEFAULT_MIN_CAPACITY)
    }

    /// Create an empty sequence whose first allocation reserves at least
    /// `min_capacity` elements.
    pub fn with_min_capacity(min_capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity: 0,
            min_capacity,
        }
    }

    /// Append a single element.
    pub fn append_one(&mut self, item: T) {
        self.reserve_for(1, "append_one");
        self.items.push(item);
    }

    /// Remove the element at `index` by moving the last element into its
    /// slot. O(1); does not preserve order.
    ///
    /// Returns `None` and leaves the sequence untouched if `index` is out
    /// of bounds.
    pub fn remove_unordered(&mut self, index: usize) -> Option<T> {
        if index >= self.items.len() {
            return None;
        }
        Some(self.items.swap_remove(index))
    }

    /// Release the backing storage and return to the empty state.
    ///
    /// Calling this on an already-empty sequence is a no-op.
    pub fn free(&mut self) {
        self.items = Vec::new();
        self.capacity = 0;
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the sequence holds no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Logical capacity in elements. Zero until the first append.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Minimum capacity of the first allocation.
    pub fn min_capacity(&self) -> usize {
        self.min_capacity
    }

    /// Whether backing storage has been allocated.
    pub fn is_allocated(&self) -> bool {
        self.capacity > 0
    }

    /// View the elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// View the elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    /// Ensure room for `additional` more elements, growing geometrically.
    fn reserve_for(&mut self, additional: usize, operation: &'static str) {
        let len = self.items.len();
        let Some(needed) = len.checked_add(additional) else {
            growth_failed(operation, usize::MAX, "element count overflows usize");
        };
        if needed <= self.capacity {
            return;
        }

        let new_capacity = if self.capacity == 0 {
            needed.max(self.min_capacity)
        } else {
            needed.max(self.capacity.saturating_mul(2))
        };

        if let Err(err) = self.items.try_reserve_exact(new_capacity - len) {
            growth_failed(operation, new_capacity, &err.to_string());
        }
        self.capacity = new_capacity;
    }
}

impl<T: Clone> GrowableSeq<T> {
    /// Append every element of `items`, in order.
    pub fn append_many(&mut self, items: &[T]) {
        if items.is_empty() {
            return;
        }
        self.reserve_for(items.len(), "append_many");
        self.items.extend_from_slice(items);
    }
}

#[cold]
fn growth_failed(operation: &'static str, requested: usize, reason: &str) -> ! {
    tracing::error!(operation, requested, reason, "sequence storage growth failed");
    panic!("GrowableSeq::{operation}: cannot grow storage to {requested} elements: {reason}");
}

impl<T> Default for GrowableSeq<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for GrowableSeq<T> {
    fn clone(&self) -> Self {
        let mut out = Self::with_min_capacity(self.min_capacity);
        out.append_many(&self.items);
        out
    }
}

impl<T: fmt::Debug> fmt::Debug for GrowableSeq<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrowableSeq")
            .field("items", &self.items)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<T: PartialEq> PartialEq for GrowableSeq<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Eq> Eq for GrowableSeq<T> {}

impl<T> Deref for GrowableSeq<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> DerefMut for GrowableSeq<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.items
    }
}

impl<T> Extend<T> for GrowableSeq<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.append_one(item);
        }
    }
}

impl<T> FromIterator<T> for GrowableSeq<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut seq = Self::new();
        seq.extend(iter);
        seq
    }
}

impl<'s, T> IntoIterator for &'s GrowableSeq<T> {
    type Item = &'s T;
    type IntoIter = std::slice::Iter<'s, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_sequence_has_no_storage() {
        let seq: GrowableSeq<u32> = GrowableSeq::new();
        assert!(seq.is_empty());
        assert_eq!(seq.capacity(), 0);
        assert!(!seq.is_allocated());
    }

    #[test]
    fn first_append_reserves_min_capacity() {
        let mut seq = GrowableSeq::new();
        seq.append_one(7u32);
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.capacity(), GrowableSeq::<u32>::DEFAULT_MIN_CAPACITY);
    }

    #[test]
    fn first_append_many_larger_than_min_reserves_exact() {
        let mut seq = GrowableSeq::with_min_capacity(4);
        seq.append_many(&[1u8; 10]);
        assert_eq!(seq.capacity(), 10);
    }

    #[test]
    fn growth_doubles_when_request_is_small() {
        let mut seq = GrowableSeq::with_min_capacity(4);
        seq.append_many(&[0u16; 4]);
        assert_eq!(seq.capacity(), 4);
        seq.append_one(1);
        assert_eq!(seq.capacity(), 8);
    }

    #[test]
    fn growth_jumps_to_request_when_larger_than_double() {
        let mut seq = GrowableSeq::with_min_capacity(4);
        seq.append_one(0u16);
        seq.append_many(&[1u16; 20]);
        assert_eq!(seq.len(), 21);
        assert_eq!(seq.capacity(), 21);
    }

    #[test]
    fn append_many_empty_slice_does_not_allocate() {
        let mut seq: GrowableSeq<u8> = GrowableSeq::new();
        seq.append_many(&[]);
        assert!(!seq.is_allocated());
    }

    #[test]
    fn remove_unordered_moves_last_into_hole() {
        let mut seq: GrowableSeq<_> = [10, 20, 30, 40].into_iter().collect();
        assert_eq!(seq.remove_unordered(1), Some(20));
        assert_eq!(seq.as_slice(), &[10, 40, 30]);
    }

    #[test]
    fn remove_unordered_last_element() {
        let mut seq: GrowableSeq<_> = [1, 2, 3].into_iter().collect();
        assert_eq!(seq.remove_unordered(2), Some(3));
        assert_eq!(seq.as_slice(), &[1, 2]);
    }

    #[test]
    fn remove_unordered_out_of_bounds_is_noop() {
        let mut seq: GrowableSeq<_> = [1, 2].into_iter().collect();
        assert_eq!(seq.remove_unordered(2), None);
        assert_eq!(seq.as_slice(), &[1, 2]);
    }

    #[test]
    fn free_releases_storage_and_is_repeatable() {
        let mut seq: GrowableSeq<_> = (0..100).collect();
        seq.free();
        assert!(seq.is_empty());
        assert_eq!(seq.capacity(), 0);
        seq.free();
        assert_eq!(seq.capacity(), 0);
        seq.append_one(5);
        assert_eq!(seq.as_slice(), &[5]);
    }

    #[test]
    fn clone_preserves_elements_and_min_capacity() {
        let mut seq = GrowableSeq::with_min_capacity(2);
        seq.append_many(&["a", "b", "c"]);
        let copy = seq.clone();
        assert_eq!(copy, seq);
        assert_eq!(copy.min_capacity(), 2);
    }

    #[test]
    fn deref_exposes_slice_methods() {
        let mut seq: GrowableSeq<_> = [3, 1, 2].into_iter().collect();
        seq.sort_unstable();
        assert_eq!(seq.first(), Some(&1));
        assert_eq!(seq.iter().sum::<i32>(), 6);
    }

    #[test]
    #[should_panic(expected = "GrowableSeq::append_one")]
    fn append_one_growth_failure_is_fatal() {
        let mut seq = GrowableSeq::<u64>::with_min_capacity(usize::MAX / 2);
        seq.append_one(1);
    }

    #[test]
    #[should_panic(expected = "GrowableSeq::append_many")]
    fn append_many_growth_failure_is_fatal() {
        let mut seq = GrowableSeq::<u64>::with_min_capacity(usize::MAX / 2);
        seq.append_many(&[1, 2, 3]);
    }

    proptest! {
        #[test]
        fn append_one_preserves_order_and_grows_geometrically(
            values in proptest::collection::vec(any::<u32>(), 0..600),
            min_capacity in 1usize..80,
        ) {
            let mut seq = GrowableSeq::with_min_capacity(min_capacity);
            let mut last_capacity = 0;
            for &v in &values {
                seq.append_one(v);
                let cap = seq.capacity();
                prop_assert!(cap >= seq.len());
                if cap != last_capacity {
                    if last_capacity == 0 {
                        prop_assert_eq!(cap, min_capacity.max(1));
                    } else {
                        prop_assert!(cap >= 2 * last_capacity);
                    }
                }
                prop_assert!(cap >= last_capacity);
                last_capacity = cap;
            }
            prop_assert_eq!(seq.len(), values.len());
            prop_assert_eq!(seq.as_slice(), values.as_slice());
        }

        #[test]
        fn remove_unordered_swaps_in_last(
            values in proptest::collection::vec(any::<i64>(), 1..64),
            pick in any::<prop::sample::Index>(),
        ) {
            let mut seq = GrowableSeq::new();
            seq.append_many(&values);
            let i = pick.index(values.len());
            let removed = seq.remove_unordered(i);
            prop_assert_eq!(removed, Some(values[i]));
            prop_assert_eq!(seq.len(), values.len() - 1);
            if i != values.len() - 1 {
                prop_assert_eq!(seq[i], values[values.len() - 1]);
            }
        }
    }
}
