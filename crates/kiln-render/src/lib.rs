//! Renderer setup for Kiln, driven by the transient arena.
//!
//! Setup code enumerates devices, queue families, extensions, surface
//! formats and present modes into scratch regions of a
//! [`FixedArena`](kiln_arena::FixedArena), decides, and discards the
//! enumerations in one step. Long-lived results go into
//! [`RendererState`], an explicitly passed context object.
//!
//! The graphics API itself sits behind [`DeviceEnumerator`], so selection
//! logic runs unchanged against a real backend or a test double.
//!
//! # Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`device`] | POD descriptors, [`DeviceEnumerator`], [`DeviceRequirements`] |
//! | [`select`] | Per-device checks and [`select_device`] |
//! | [`pipeline`] | [`PipelineInfo`] and [`assemble_stages`] |
//! | [`swapchain`] | Image count and extent policy, inline image slots |
//! | [`config`] | [`RendererConfig`] |
//! | [`context`] | [`RendererState`] |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod context;
pub mod device;
pub mod error;
pub mod pipeline;
pub mod select;
pub mod swapchain;

pub use config::RendererConfig;
pub use context::RendererState;
pub use device::{
    ColorSpace, DeviceEnumerator, DeviceHandle, DeviceRequirements, Extent2D, ExtensionName,
    Format, PresentMode, QueueFamily, QueueFlags, SurfaceCapabilities, SurfaceFormat,
};
pub use error::RenderError;
pub use pipeline::{assemble_stages, PipelineFlags, PipelineInfo, PipelineSummary, ShaderModule};
pub use select::{select_device, QueueFamilyIndices, SelectedDevice};
pub use swapchain::{ImageHandle, SwapchainImages, SwapchainPlan, FRAMES_IN_FLIGHT, MAX_SWAPCHAIN_IMAGES};
