//! Arena-specific error types.

use std::error::Error;
use std::fmt;

use kiln_core::ArenaId;

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The request does not fit under the strict capacity bound.
    CapacityExceeded {
        /// Number of bytes requested, excluding alignment padding.
        requested: usize,
        /// Bytes in use when the request was made.
        used: usize,
        /// Total capacity of the arena in bytes.
        capacity: usize,
    },
    /// The arena has been released and has no backing block.
    Released,
    /// Allocating the owned backing block failed.
    BackingAllocFailed {
        /// Number of bytes requested for the block.
        requested: usize,
    },
    /// Configuration rejected at construction.
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
    /// A scratch mark was presented to an arena that did not issue it.
    ForeignScratch {
        /// Arena that issued the mark.
        mark_arena: ArenaId,
        /// Arena the mark was presented to.
        arena: ArenaId,
    },
    /// A scratch region was closed while a more recently opened one is
    /// still open.
    ScratchOutOfOrder {
        /// Depth of the mark being closed.
        mark_depth: u32,
        /// Number of scratch regions currently open.
        open: u32,
    },
    /// A scratch mark whose region was already closed implicitly, by an
    /// out-of-order close of an enclosing region.
    StaleScratch {
        /// Depth of the stale mark.
        mark_depth: u32,
        /// Number of scratch regions currently open.
        open: u32,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested,
                used,
                capacity,
            } => {
                write!(
                    f,
                    "arena capacity exceeded: requested {requested} bytes with {used} of {capacity} bytes used"
                )
            }
            Self::Released => write!(f, "arena has been released"),
            Self::BackingAllocFailed { requested } => {
                write!(f, "failed to allocate {requested} byte arena block")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
            Self::ForeignScratch { mark_arena, arena } => {
                write!(f, "scratch mark from {mark_arena} presented to {arena}")
            }
            Self::ScratchOutOfOrder { mark_depth, open } => {
                write!(
                    f,
                    "scratch region at depth {mark_depth} closed with {open} regions open"
                )
            }
            Self::StaleScratch { mark_depth, open } => {
                write!(
                    f,
                    "scratch region at depth {mark_depth} already closed ({open} regions open)"
                )
            }
        }
    }
}

impl Error for ArenaError {}
