//! Renderer setup error types.

use std::error::Error;
use std::fmt;

use kiln_arena::ArenaError;

/// Errors that can occur while setting up the renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderError {
    /// Device selection was attempted before a presentation surface exists.
    NoSurface,
    /// A setup step needed a device but none has been selected.
    NoDevice,
    /// A setup step needed the swapchain extent but no swapchain is
    /// configured.
    NoSwapchain,
    /// The transient arena could not hold a temporary array.
    TransientExhausted {
        /// Setup step that was pushing.
        operation: &'static str,
        /// The arena's account of the failure.
        source: ArenaError,
    },
    /// No enumerated device satisfied the requirements.
    NoSuitableDevice {
        /// Number of devices inspected.
        candidates: usize,
    },
    /// More images than the inline slot array can hold.
    TooManyImages {
        /// Number of images offered.
        count: usize,
        /// Slot array capacity.
        max: usize,
    },
    /// Pipeline description rejected during assembly.
    InvalidPipeline {
        /// Human-readable description of the problem.
        reason: String,
    },
    /// Renderer configuration rejected at construction.
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
    /// The caller-provided memory block cannot back an arena.
    MemoryTooSmall {
        /// Size of the block provided.
        provided: usize,
        /// Smallest usable block size.
        minimum: usize,
    },
    /// Building the transient arena failed.
    Arena(ArenaError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSurface => write!(f, "no presentation surface to select a device for"),
            Self::NoDevice => write!(f, "no device selected"),
            Self::NoSwapchain => write!(f, "no swapchain configured"),
            Self::TransientExhausted { operation, source } => {
                write!(f, "transient arena exhausted in {operation}: {source}")
            }
            Self::NoSuitableDevice { candidates } => {
                write!(f, "none of {candidates} devices meets the requirements")
            }
            Self::TooManyImages { count, max } => {
                write!(f, "{count} images offered, at most {max} fit")
            }
            Self::InvalidPipeline { reason } => write!(f, "invalid pipeline: {reason}"),
            Self::InvalidConfig { reason } => write!(f, "invalid renderer config: {reason}"),
            Self::MemoryTooSmall { provided, minimum } => {
                write!(
                    f,
                    "memory block of {provided} bytes is smaller than the {minimum} byte minimum"
                )
            }
            Self::Arena(e) => write!(f, "transient arena: {e}"),
        }
    }
}

impl Error for RenderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::TransientExhausted { source, .. } => Some(source),
            Self::Arena(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArenaError> for RenderError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}
