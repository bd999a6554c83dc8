//! Core containers for the Kiln renderer.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! two heap-side companions of the transient arena:
//!
//! - [`GrowableSeq`]: an append-optimised, geometrically-growing sequence
//!   whose lifetime is independent of any arena. Pipeline construction uses
//!   it to accumulate shader stages and vertex attributes.
//! - [`BoundedArray`]: a fixed-capacity inline array with a runtime length,
//!   used for per-frame resources with a hard upper bound (swapchain images,
//!   frames in flight).
//!
//! It also owns [`ArenaId`], the identity shared by arenas, their handles
//! and their scratch marks.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bounded;
pub mod error;
pub mod id;
pub mod seq;

pub use bounded::BoundedArray;
pub use error::CapacityError;
pub use id::ArenaId;
pub use seq::GrowableSeq;
