//! Backing memory for a [`FixedArena`](crate::FixedArena).
//!
//! The arena never decides how its block is obtained. A [`Block`] is either
//! handed in by the caller (a view over memory the caller owns, e.g. the
//! tail of a larger renderer allocation) or produced once by
//! [`Block::zeroed`] and then owned exclusively by the arena.

use std::fmt;

use crate::error::ArenaError;

/// Contiguous byte block backing an arena.
pub enum Block<'a> {
    /// Heap block allocated by [`Block::zeroed`]; freed when dropped.
    Owned(Box<[u8]>),
    /// Caller-owned memory. The arena holds the only mutable borrow for
    /// `'a`, so it can never outlive the memory it views.
    Borrowed(&'a mut [u8]),
}

impl Block<'static> {
    /// Allocate `size` zero-initialised bytes.
    ///
    /// Returns `Err(ArenaError::BackingAllocFailed)` instead of aborting if
    /// the allocator cannot satisfy the request.
    pub fn zeroed(size: usize) -> Result<Self, ArenaError> {
        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|_| ArenaError::BackingAllocFailed { requested: size })?;
        data.resize(size, 0u8);
        Ok(Block::Owned(data.into_boxed_slice()))
    }
}

impl<'a> Block<'a> {
    /// Length of the block in bytes.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether the block is zero bytes long.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the arena owns this block.
    pub fn is_owned(&self) -> bool {
        matches!(self, Block::Owned(_))
    }

    /// The whole block.
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Block::Owned(data) => data,
            Block::Borrowed(data) => data,
        }
    }

    /// The whole block, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            Block::Owned(data) => data,
            Block::Borrowed(data) => data,
        }
    }
}

impl<'a> From<&'a mut [u8]> for Block<'a> {
    fn from(data: &'a mut [u8]) -> Self {
        Block::Borrowed(data)
    }
}

impl From<Box<[u8]>> for Block<'static> {
    fn from(data: Box<[u8]>) -> Self {
        Block::Owned(data)
    }
}

impl fmt::Debug for Block<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_owned() { "Owned" } else { "Borrowed" };
        write!(f, "Block::{kind}({} bytes)", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_block_is_owned_and_zero() {
        let block = Block::zeroed(128).unwrap();
        assert!(block.is_owned());
        assert_eq!(block.len(), 128);
        assert!(block.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn borrowed_block_views_caller_memory() {
        let mut memory = [7u8; 16];
        {
            let mut block = Block::from(&mut memory[..]);
            assert!(!block.is_owned());
            block.as_mut_slice()[0] = 1;
        }
        assert_eq!(memory[0], 1);
    }

    #[test]
    fn debug_shows_kind_and_size() {
        let block = Block::zeroed(4).unwrap();
        assert_eq!(format!("{block:?}"), "Block::Owned(4 bytes)");
    }
}
