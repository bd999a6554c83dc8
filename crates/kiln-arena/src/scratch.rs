//! Scratch regions: checkpoint and restore over a [`FixedArena`].
//!
//! A scratch region records the arena's `used` mark when it opens and puts
//! it back when it closes, releasing everything pushed in between as one
//! O(1) step. Regions nest with strict LIFO discipline.
//!
//! Two forms are provided:
//!
//! - [`ScratchMark`]: a token from [`FixedArena::begin_scratch`], handed
//!   back to [`FixedArena::end_scratch`]. Marks are not `Copy`, so a closed
//!   mark cannot be reused. Ordering is checked at runtime.
//! - [`Scratch`]: an RAII guard from [`FixedArena::scratch`] that closes on
//!   [`Scratch::end`] or drop. A nested guard mutably borrows the outer one,
//!   so LIFO order is enforced by the borrow checker.

use std::ops::{Deref, DerefMut};

use kiln_core::ArenaId;

use crate::arena::{protocol_violation, FixedArena};
use crate::error::ArenaError;

/// Checkpoint of an arena's `used` mark.
#[must_use = "scratch marks must be closed with FixedArena::end_scratch"]
#[derive(Debug, PartialEq, Eq)]
pub struct ScratchMark {
    arena: ArenaId,
    saved_used: usize,
    /// Number of regions that were already open when this one opened.
    depth: u32,
}

impl ScratchMark {
    /// Arena that issued this mark.
    pub fn arena(&self) -> ArenaId {
        self.arena
    }

    /// The arena's `used` value when the region opened.
    pub fn saved_used(&self) -> usize {
        self.saved_used
    }

    /// Nesting depth; the outermost region has depth 0.
    pub fn depth(&self) -> u32 {
        self.depth
    }
}

impl<'a> FixedArena<'a> {
    /// Open a scratch region. No allocation is performed.
    pub fn begin_scratch(&mut self) -> ScratchMark {
        let mark = ScratchMark {
            arena: self.id,
            saved_used: self.used,
            depth: self.open_scratches,
        };
        self.open_scratches += 1;
        mark
    }

    /// Check that `mark` is the innermost open region of this arena.
    pub fn check_scratch(&self, mark: &ScratchMark) -> Result<(), ArenaError> {
        if mark.arena != self.id {
            return Err(ArenaError::ForeignScratch {
                mark_arena: mark.arena,
                arena: self.id,
            });
        }
        if mark.depth >= self.open_scratches {
            return Err(ArenaError::StaleScratch {
                mark_depth: mark.depth,
                open: self.open_scratches,
            });
        }
        if mark.depth + 1 != self.open_scratches {
            return Err(ArenaError::ScratchOutOfOrder {
                mark_depth: mark.depth,
                open: self.open_scratches,
            });
        }
        Ok(())
    }

    /// Close a scratch region, restoring `used` to its value at
    /// [`begin_scratch`](FixedArena::begin_scratch).
    ///
    /// Closing out of order is a protocol violation. Release builds log it
    /// and close every region opened after `mark` along with it. Foreign
    /// and stale marks are logged and otherwise ignored.
    pub fn end_scratch(&mut self, mark: ScratchMark) {
        match self.check_scratch(&mark) {
            Ok(()) => {}
            Err(err @ ArenaError::ScratchOutOfOrder { .. }) => {
                protocol_violation(self.id, format_args!("{err}"));
            }
            Err(err) => {
                protocol_violation(self.id, format_args!("{err}"));
                return;
            }
        }
        self.used = mark.saved_used.min(self.used);
        self.open_scratches = mark.depth;
    }

    /// Open a scratch region that closes when the returned guard is
    /// dropped or [ended](Scratch::end).
    pub fn scratch(&mut self) -> Scratch<'_, 'a> {
        let mark = self.begin_scratch();
        Scratch {
            arena: self,
            mark: Some(mark),
        }
    }
}

/// RAII scratch region over a [`FixedArena`].
///
/// Dereferences to the arena, so pushes (and nested scratch regions) go
/// through the guard.
///
/// ```
/// use kiln_arena::FixedArena;
///
/// let mut arena = FixedArena::with_capacity(128).unwrap();
/// arena.push(16).unwrap();
/// {
///     let mut outer = arena.scratch();
///     outer.push(32).unwrap();
///     let mut inner = outer.scratch();
///     inner.push(32).unwrap();
///     assert_eq!(inner.used(), 80);
/// }
/// assert_eq!(arena.used(), 16);
/// ```
#[must_use = "dropping a scratch guard closes the region immediately"]
pub struct Scratch<'s, 'a> {
    arena: &'s mut FixedArena<'a>,
    mark: Option<ScratchMark>,
}

impl Scratch<'_, '_> {
    /// The arena's `used` value when this region opened.
    pub fn saved_used(&self) -> usize {
        self.mark.as_ref().map_or(self.arena.used, ScratchMark::saved_used)
    }

    /// Bytes pushed since this region opened.
    pub fn allocated(&self) -> usize {
        self.arena.used.saturating_sub(self.saved_used())
    }

    /// Close the region now.
    pub fn end(mut self) {
        self.close();
    }

    fn close(&mut self) {
        if let Some(mark) = self.mark.take() {
            self.arena.end_scratch(mark);
        }
    }
}

impl<'a> Deref for Scratch<'_, 'a> {
    type Target = FixedArena<'a>;

    fn deref(&self) -> &FixedArena<'a> {
        &*self.arena
    }
}

impl<'a> DerefMut for Scratch<'_, 'a> {
    fn deref_mut(&mut self) -> &mut FixedArena<'a> {
        &mut *self.arena
    }
}

impl Drop for Scratch<'_, '_> {
    fn drop(&mut self) {
        self.close();
    }
}
