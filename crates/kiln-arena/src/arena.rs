//! Fixed-capacity bump arena.
//!
//! [`FixedArena`] carves zero-initialised regions from one contiguous
//! [`Block`] by advancing a cursor. There is no per-allocation metadata and
//! no individual free: memory comes back all at once through
//! [`FixedArena::reset`] or by closing a scratch region
//! (see [`crate::scratch`]).
//!
//! The capacity bound is strict. A push of `size` bytes succeeds only while
//! `used + size < capacity`, so the last byte of the block is never handed
//! out. Setup code written against this arena may rely on that boundary.

use std::fmt;

use bytemuck::Pod;
use kiln_core::ArenaId;

use crate::block::Block;
use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::handle::{Alloc, ByteAlloc};

/// Single-owner bump allocator over a fixed block.
///
/// An arena is either *live* (it holds a block) or *released* (it holds
/// none, and every push fails). Pushes return handles; resolve them with
/// [`bytes`](FixedArena::bytes) / [`slice`](FixedArena::slice) and their
/// `_mut` forms.
///
/// # Invariants
///
/// - `used <= capacity` at all times.
/// - Every region returned since the last reset or enclosing scratch
///   restore lies in `[0, used)` and no two such regions overlap.
/// - `open_scratches` equals the number of scratch marks issued and not
///   yet closed.
///
/// # Example
///
/// ```
/// use kiln_arena::FixedArena;
///
/// let mut arena = FixedArena::with_capacity(64).unwrap();
/// let a = arena.push(20).unwrap();
/// assert_eq!(arena.used(), 20);
///
/// let mark = arena.begin_scratch();
/// assert!(arena.push(30).is_some());
/// assert!(arena.push(20).is_none()); // 50 + 20 >= 64
/// arena.end_scratch(mark);
///
/// assert_eq!(arena.used(), 20);
/// assert!(arena.push(40).is_some()); // 20 + 40 < 64
/// assert_eq!(arena.bytes(&a).unwrap().len(), 20);
/// ```
#[derive(Debug)]
pub struct FixedArena<'a> {
    /// Backing memory; `None` once released.
    pub(crate) block: Option<Block<'a>>,
    /// Bump cursor in bytes from the start of the block.
    pub(crate) used: usize,
    /// Largest `used` observed since the block was attached.
    high_water: usize,
    /// Number of scratch regions currently open.
    pub(crate) open_scratches: u32,
    /// Identity stamped into handles and scratch marks.
    pub(crate) id: ArenaId,
}

impl FixedArena<'static> {
    /// Allocate a zeroed block of `capacity` bytes owned by the arena.
    ///
    /// This is the only place the arena allocates. Returns
    /// `Err(ArenaError::BackingAllocFailed)` if the block cannot be
    /// obtained.
    pub fn with_capacity(capacity: usize) -> Result<Self, ArenaError> {
        Ok(Self::from_block(Block::zeroed(capacity)?))
    }

    /// Validate `config` and allocate an owned arena from it.
    pub fn from_config(config: &ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Self::with_capacity(config.capacity)
    }
}

impl<'a> FixedArena<'a> {
    /// Bind a new arena to `block` with `used = 0`.
    ///
    /// Accepts caller-owned memory (`&mut [u8]`) or an owned
    /// `Box<[u8]>`. Performs no allocation. Borrowed memory is not cleared
    /// here; every push zeroes the bytes it hands out.
    pub fn from_block(block: impl Into<Block<'a>>) -> Self {
        let block = block.into();
        let id = ArenaId::next();
        tracing::debug!(
            arena = %id,
            capacity = block.len(),
            owned = block.is_owned(),
            "arena initialised"
        );
        Self {
            block: Some(block),
            used: 0,
            high_water: 0,
            open_scratches: 0,
            id,
        }
    }

    /// An arena with no block. Every push fails.
    pub fn empty() -> Self {
        Self {
            block: None,
            used: 0,
            high_water: 0,
            open_scratches: 0,
            id: ArenaId::next(),
        }
    }

    // ── Allocation ──────────────────────────────────────────────

    /// Carve `size` zero-initialised bytes from the arena.
    ///
    /// Returns `None`, leaving the arena unchanged, when
    /// `used + size >= capacity` or when the arena has been released.
    /// Callers must check the result; the arena never grows.
    pub fn push(&mut self, size: usize) -> Option<ByteAlloc> {
        self.bump(size, 1)
    }

    /// Like [`push`](FixedArena::push), returning the region directly.
    pub fn push_bytes(&mut self, size: usize) -> Option<&mut [u8]> {
        let alloc = self.push(size)?;
        self.bytes_mut(&alloc)
    }

    /// Push one zeroed `T`, aligned for `T`.
    pub fn push_struct<T: Pod>(&mut self) -> Option<Alloc<T>> {
        self.push_array(1)
    }

    /// Push `count` zeroed elements of `T`, aligned for `T`.
    ///
    /// The cursor is first padded up to `align_of::<T>()`; the padding
    /// counts toward `used` and toward the strict capacity check. `T` must
    /// not be zero-sized: such arrays can be pushed but never resolve.
    pub fn push_array<T: Pod>(&mut self, count: usize) -> Option<Alloc<T>> {
        let size = std::mem::size_of::<T>().checked_mul(count)?;
        let bytes = self.bump(size, std::mem::align_of::<T>())?;
        Some(Alloc::new(bytes, count))
    }

    /// [`push`](FixedArena::push) with the failure spelled out.
    pub fn try_push(&mut self, size: usize) -> Result<ByteAlloc, ArenaError> {
        self.push(size).ok_or_else(|| self.push_error(size))
    }

    /// [`push_array`](FixedArena::push_array) with the failure spelled out.
    pub fn try_push_array<T: Pod>(&mut self, count: usize) -> Result<Alloc<T>, ArenaError> {
        self.push_array(count).ok_or_else(|| {
            self.push_error(std::mem::size_of::<T>().saturating_mul(count))
        })
    }

    fn bump(&mut self, size: usize, align: usize) -> Option<ByteAlloc> {
        debug_assert!(align.is_power_of_two());
        let capacity = self.capacity();
        let block = self.block.as_mut()?;

        let cursor = block.as_slice().as_ptr().addr().wrapping_add(self.used);
        let padding = cursor.wrapping_neg() & (align - 1);
        let start = self.used.checked_add(padding)?;
        let end = start.checked_add(size)?;
        if end >= capacity {
            tracing::trace!(
                arena = %self.id,
                size,
                padding,
                used = self.used,
                capacity,
                "push rejected"
            );
            return None;
        }

        block.as_mut_slice()[start..end].fill(0);
        self.used = end;
        self.high_water = self.high_water.max(end);
        Some(ByteAlloc::new(self.id, start, size))
    }

    fn push_error(&self, requested: usize) -> ArenaError {
        if self.is_live() {
            ArenaError::CapacityExceeded {
                requested,
                used: self.used,
                capacity: self.capacity(),
            }
        } else {
            ArenaError::Released
        }
    }

    // ── Resolution ──────────────────────────────────────────────

    /// Resolve a byte handle.
    ///
    /// Returns `None` if the handle was issued by another arena or its
    /// region lies beyond `used` (discarded by a reset or scratch restore).
    pub fn bytes(&self, alloc: &ByteAlloc) -> Option<&[u8]> {
        let range = self.live_range(alloc)?;
        Some(&self.block.as_ref()?.as_slice()[range])
    }

    /// Resolve a byte handle mutably. See [`bytes`](FixedArena::bytes).
    pub fn bytes_mut(&mut self, alloc: &ByteAlloc) -> Option<&mut [u8]> {
        let range = self.live_range(alloc)?;
        Some(&mut self.block.as_mut()?.as_mut_slice()[range])
    }

    /// Resolve a typed handle.
    pub fn slice<T: Pod>(&self, alloc: &Alloc<T>) -> Option<&[T]> {
        bytemuck::try_cast_slice(self.bytes(&alloc.bytes)?).ok()
    }

    /// Resolve a typed handle mutably.
    pub fn slice_mut<T: Pod>(&mut self, alloc: &Alloc<T>) -> Option<&mut [T]> {
        bytemuck::try_cast_slice_mut(self.bytes_mut(&alloc.bytes)?).ok()
    }

    /// First element of a typed handle, typically from
    /// [`push_struct`](FixedArena::push_struct).
    pub fn get<T: Pod>(&self, alloc: &Alloc<T>) -> Option<&T> {
        self.slice(alloc)?.first()
    }

    /// First element of a typed handle, mutably.
    pub fn get_mut<T: Pod>(&mut self, alloc: &Alloc<T>) -> Option<&mut T> {
        self.slice_mut(alloc)?.first_mut()
    }

    fn live_range(&self, alloc: &ByteAlloc) -> Option<std::ops::Range<usize>> {
        if alloc.arena != self.id {
            return None;
        }
        let end = alloc.offset.checked_add(alloc.len)?;
        (end <= self.used).then_some(alloc.offset..end)
    }

    // ── Lifecycle ───────────────────────────────────────────────

    /// Discard every allocation. O(1).
    ///
    /// Handles issued before the reset stop resolving until their bytes
    /// are pushed again; after that they resolve to the new contents.
    /// Resetting while a scratch region is open is a protocol violation.
    pub fn reset(&mut self) {
        if self.open_scratches != 0 {
            protocol_violation(
                self.id,
                format_args!("reset with {} scratch regions open", self.open_scratches),
            );
        }
        self.used = 0;
    }

    /// Drop or detach the backing block; the arena becomes empty.
    ///
    /// Owned blocks are freed here, exactly once. Releasing an arena that
    /// has no block is a protocol violation and otherwise a no-op.
    pub fn release(&mut self) {
        let Some(block) = self.block.take() else {
            protocol_violation(self.id, format_args!("released twice"));
            return;
        };
        if self.open_scratches != 0 {
            protocol_violation(
                self.id,
                format_args!("released with {} scratch regions open", self.open_scratches),
            );
        }
        tracing::debug!(
            arena = %self.id,
            capacity = block.len(),
            owned = block.is_owned(),
            high_water = self.high_water,
            "arena released"
        );
        self.used = 0;
        self.high_water = 0;
        self.open_scratches = 0;
    }

    // ── Introspection ───────────────────────────────────────────

    /// Identity stamped into this arena's handles and marks.
    pub fn id(&self) -> ArenaId {
        self.id
    }

    /// Whether the arena still holds a block.
    pub fn is_live(&self) -> bool {
        self.block.is_some()
    }

    /// Bytes currently allocated, including alignment padding.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Total size of the block in bytes; zero once released.
    pub fn capacity(&self) -> usize {
        self.block.as_ref().map_or(0, Block::len)
    }

    /// Bytes not yet handed out. The largest single push that can still
    /// succeed is one less than this.
    pub fn remaining(&self) -> usize {
        self.capacity() - self.used
    }

    /// Largest `used` value seen since the block was attached.
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    /// Number of scratch regions currently open.
    pub fn open_scratches(&self) -> u32 {
        self.open_scratches
    }
}

impl Default for FixedArena<'_> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Report a misuse of the arena protocol.
///
/// Panics in debug builds. Release builds log and let the caller continue
/// with a best-effort state; memory safety is unaffected because every
/// handle is bounds-checked on resolve.
#[cold]
#[track_caller]
pub(crate) fn protocol_violation(arena: ArenaId, message: fmt::Arguments<'_>) {
    tracing::error!(%arena, "arena protocol violation: {message}");
    debug_assert!(false, "{arena}: {message}");
}
