//! Fixed-capacity transient arena for Kiln renderer setup.
//!
//! Provides a single-owner bump allocator over one contiguous block with
//! O(1) reset and nested scratch (save/restore) regions. Backend setup code
//! uses it as a disposable stack frame: enumerate devices into scratch
//! memory, inspect, decide, and discard everything in one step.
//!
//! # Architecture
//!
//! ```text
//! FixedArena<'a>
//! ├── Block<'a>       owned Box<[u8]> or borrowed &'a mut [u8]
//! ├── used / capacity bump cursor, strict `used + size < capacity`
//! ├── ByteAlloc / Alloc<T>   offset handles, bounds-checked on resolve
//! └── ScratchMark / Scratch  checkpoint of `used`, LIFO by depth
//! ```
//!
//! # Failure model
//!
//! - Exhaustion is an ordinary outcome: pushes return `None` and leave the
//!   arena untouched. `try_*` variants map it to [`ArenaError`].
//! - Protocol violations (out-of-order scratch close, reset with open
//!   scratches, double release) are programming errors. They trip
//!   `debug_assert!` in debug builds and are logged in release builds.
//!
//! The arena is not thread-safe. Give each thread its own instance.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod block;
pub mod config;
pub mod error;
pub mod handle;
pub mod scratch;

// Public re-exports for the primary API surface.
pub use arena::FixedArena;
pub use block::Block;
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use handle::{Alloc, ByteAlloc};
pub use kiln_core::ArenaId;
pub use scratch::{Scratch, ScratchMark};
