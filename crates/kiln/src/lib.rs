//! Kiln: transient memory and setup scaffolding for a real-time renderer.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Kiln sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use kiln::prelude::*;
//!
//! let mut arena = FixedArena::with_capacity(64).unwrap();
//! let header = arena.push(20).unwrap();
//!
//! {
//!     let mut scratch = arena.scratch();
//!     assert!(scratch.push(30).is_some());
//!     assert!(scratch.push(20).is_none()); // 50 + 20 >= 64
//! }
//! assert_eq!(arena.used(), 20);
//! assert_eq!(arena.bytes(&header).unwrap().len(), 20);
//!
//! let mut names: GrowableSeq<&str> = GrowableSeq::new();
//! names.append_many(&["VK_KHR_swapchain", "VK_KHR_maintenance1"]);
//! assert_eq!(names.remove_unordered(0), Some("VK_KHR_swapchain"));
//! assert_eq!(names.as_slice(), ["VK_KHR_maintenance1"]);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`containers`] | `kiln-core` | `GrowableSeq`, `BoundedArray`, arena IDs |
//! | [`arena`] | `kiln-arena` | `FixedArena`, handles, scratch regions |
//! | [`render`] | `kiln-render` | Device selection, pipeline assembly, `RendererState` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Containers and identifiers (`kiln-core`).
pub use kiln_core as containers;

/// Fixed-capacity arena and scratch regions (`kiln-arena`).
///
/// Most users only need [`arena::FixedArena`] and [`arena::Scratch`], both
/// also in the [`prelude`].
pub use kiln_arena as arena;

/// Renderer setup (`kiln-render`).
///
/// [`render::RendererState`] is the context object; [`render::select_device`]
/// and [`render::assemble_stages`] are usable on their own.
pub use kiln_render as render;

/// Common imports for typical Kiln usage.
///
/// ```rust
/// use kiln::prelude::*;
/// ```
pub mod prelude {
    // Containers
    pub use kiln_core::{BoundedArray, GrowableSeq};

    // Arena
    pub use kiln_arena::{Alloc, ArenaConfig, ArenaError, ByteAlloc, FixedArena, Scratch, ScratchMark};

    // Renderer
    pub use kiln_render::{DeviceEnumerator, RenderError, RendererConfig, RendererState};
}
