//! Allocation handles.
//!
//! A push returns a handle instead of a borrow so that several regions can
//! be live at once while the arena keeps serving new pushes. Handles encode
//! the issuing arena, a byte offset and a length; they are resolved back to
//! slices through [`FixedArena`](crate::FixedArena) in O(1).
//!
//! Resolution is bounds-checked against the arena's current `used` mark,
//! so a handle whose region was discarded by a reset or a scratch restore
//! stops resolving. This is a cheap check, not a full generation scheme:
//! once the same bytes are pushed again, an old handle covering them
//! resolves to the new contents.

use std::fmt;
use std::marker::PhantomData;

use kiln_core::ArenaId;

/// Untyped region of arena memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ByteAlloc {
    pub(crate) arena: ArenaId,
    pub(crate) offset: usize,
    pub(crate) len: usize,
}

impl ByteAlloc {
    pub(crate) fn new(arena: ArenaId, offset: usize, len: usize) -> Self {
        Self { arena, offset, len }
    }

    /// Arena that issued this handle.
    pub fn arena(&self) -> ArenaId {
        self.arena
    }

    /// Byte offset from the start of the arena block.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether this is a zero-length region.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Offset one past the last byte.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// Whether two regions share at least one byte.
    pub fn overlaps(&self, other: &ByteAlloc) -> bool {
        self.arena == other.arena
            && !self.is_empty()
            && !other.is_empty()
            && self.offset < other.end()
            && other.offset < self.end()
    }
}

impl fmt::Display for ByteAlloc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ByteAlloc({}, off={}, len={})",
            self.arena, self.offset, self.len
        )
    }
}

/// Typed array of `count` elements of `T` in arena memory.
///
/// The offset is aligned for `T`. `T` is only a marker here; the handle is
/// `Copy` regardless of `T`.
pub struct Alloc<T> {
    pub(crate) bytes: ByteAlloc,
    pub(crate) count: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Alloc<T> {
    pub(crate) fn new(bytes: ByteAlloc, count: usize) -> Self {
        Self {
            bytes,
            count,
            _marker: PhantomData,
        }
    }

    /// Number of `T` elements.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The underlying byte region.
    pub fn as_bytes(&self) -> ByteAlloc {
        self.bytes
    }
}

impl<T> Clone for Alloc<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Alloc<T> {}

impl<T> PartialEq for Alloc<T> {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes && self.count == other.count
    }
}

impl<T> Eq for Alloc<T> {}

impl<T> fmt::Debug for Alloc<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Alloc")
            .field("type", &std::any::type_name::<T>())
            .field("bytes", &self.bytes)
            .field("count", &self.count)
            .finish()
    }
}
