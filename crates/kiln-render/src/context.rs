//! The renderer context.
//!
//! [`RendererState`] owns everything setup produces: the transient arena,
//! the selected device, the swapchain plan and its image slots, and the
//! final pipeline stage. It is passed explicitly; nothing lives in statics.
//!
//! Setup runs in order: [`select_device`](RendererState::select_device),
//! [`configure_swapchain`](RendererState::configure_swapchain),
//! [`attach_swapchain`](RendererState::attach_swapchain), then
//! [`create_final_stage`](RendererState::create_final_stage). Each step
//! reports [`RenderError::NoDevice`] or [`RenderError::NoSwapchain`] when
//! called too early.

use kiln_arena::{ArenaConfig, FixedArena};
use kiln_core::BoundedArray;

use crate::config::RendererConfig;
use crate::device::{DeviceEnumerator, Extent2D};
use crate::error::RenderError;
use crate::pipeline::{assemble_stages, PipelineInfo, PipelineSummary, ShaderModule};
use crate::select::{select_device, SelectedDevice};
use crate::swapchain::{
    choose_image_count, frame_slots, resolve_extent, FrameSlot, ImageHandle, SwapchainImages,
    SwapchainPlan, FRAMES_IN_FLIGHT,
};

/// Renderer state built up during setup.
#[derive(Debug)]
pub struct RendererState<'a> {
    config: RendererConfig,
    transient: FixedArena<'a>,
    device: Option<SelectedDevice>,
    swapchain: Option<SwapchainPlan>,
    images: SwapchainImages,
    frames: BoundedArray<FrameSlot, FRAMES_IN_FLIGHT>,
    final_stage: Option<PipelineSummary>,
}

impl<'a> RendererState<'a> {
    /// Build the context over a caller-provided memory block, which becomes
    /// the transient arena in its entirety.
    pub fn init(memory: &'a mut [u8], config: RendererConfig) -> Result<Self, RenderError> {
        config.validate()?;
        if memory.len() < ArenaConfig::MIN_CAPACITY {
            return Err(RenderError::MemoryTooSmall {
                provided: memory.len(),
                minimum: ArenaConfig::MIN_CAPACITY,
            });
        }
        Ok(Self::with_arena(FixedArena::from_block(memory), config))
    }

    fn with_arena(transient: FixedArena<'a>, config: RendererConfig) -> Self {
        tracing::info!(
            arena = %transient.id(),
            transient_bytes = transient.capacity(),
            "renderer state initialised"
        );
        Self {
            config,
            transient,
            device: None,
            swapchain: None,
            images: SwapchainImages::default(),
            frames: BoundedArray::new(),
            final_stage: None,
        }
    }

    /// Pick a device that satisfies the configured requirements.
    ///
    /// A successful selection drops the swapchain plan, attached images and
    /// final stage built for any previous device.
    pub fn select_device<E: DeviceEnumerator + ?Sized>(
        &mut self,
        gpu: &E,
    ) -> Result<&SelectedDevice, RenderError> {
        let requirements = self.config.device_requirements();
        let selected = select_device(&mut self.transient, gpu, &requirements)?;
        self.swapchain = None;
        self.images = SwapchainImages::default();
        self.frames.clear();
        self.final_stage = None;
        Ok(self.device.insert(selected))
    }

    /// Size the swapchain for the selected device and `window`.
    ///
    /// Invalidates any attached images and final stage.
    pub fn configure_swapchain<E: DeviceEnumerator + ?Sized>(
        &mut self,
        gpu: &E,
        window: Extent2D,
    ) -> Result<&SwapchainPlan, RenderError> {
        let device = self.device.ok_or(RenderError::NoDevice)?;
        let caps = gpu.surface_capabilities(device.handle);
        let plan = SwapchainPlan {
            extent: resolve_extent(window, &caps),
            image_count: choose_image_count(self.config.preferred_image_count, &caps),
            surface_format: device.surface_format,
            present_mode: device.present_mode,
        };
        tracing::debug!(
            width = plan.extent.width,
            height = plan.extent.height,
            image_count = plan.image_count,
            "swapchain configured"
        );
        self.images = SwapchainImages::default();
        self.final_stage = None;
        Ok(self.swapchain.insert(plan))
    }

    /// Record the images the presentation engine created.
    pub fn attach_swapchain(&mut self, images: &[ImageHandle]) -> Result<(), RenderError> {
        if self.swapchain.is_none() {
            return Err(RenderError::NoSwapchain);
        }
        self.images = SwapchainImages::from_images(images)?;
        Ok(())
    }

    /// Record the per-frame images the final stage renders into.
    pub fn attach_frame_images(&mut self, images: &[ImageHandle]) -> Result<(), RenderError> {
        if self.device.is_none() {
            return Err(RenderError::NoDevice);
        }
        if self.swapchain.is_none() {
            return Err(RenderError::NoSwapchain);
        }
        self.frames = frame_slots(images)?;
        Ok(())
    }

    /// Assemble the full-screen final stage from a vertex and a fragment
    /// shader, sized to the swapchain.
    pub fn create_final_stage(
        &mut self,
        vertex: ShaderModule,
        fragment: ShaderModule,
    ) -> Result<&PipelineSummary, RenderError> {
        if self.device.is_none() {
            return Err(RenderError::NoDevice);
        }
        let extent = self.swapchain.ok_or(RenderError::NoSwapchain)?.extent;

        let mut info = PipelineInfo::new();
        info.add_vertex_shader(vertex);
        info.add_fragment_shader(fragment);
        let summary = assemble_stages(&mut self.transient, &info, extent)?;
        info.free();
        Ok(self.final_stage.insert(summary))
    }

    /// Discard every transient allocation.
    pub fn reset_transient(&mut self) {
        self.transient.reset();
    }

    /// The configuration this context was built with.
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// The transient arena.
    pub fn transient(&self) -> &FixedArena<'a> {
        &self.transient
    }

    /// The transient arena, for setup code outside this crate.
    pub fn transient_mut(&mut self) -> &mut FixedArena<'a> {
        &mut self.transient
    }

    /// Selected device, if any.
    pub fn device(&self) -> Option<&SelectedDevice> {
        self.device.as_ref()
    }

    /// Swapchain plan, if configured.
    pub fn swapchain(&self) -> Option<&SwapchainPlan> {
        self.swapchain.as_ref()
    }

    /// Attached swapchain images.
    pub fn images(&self) -> &SwapchainImages {
        &self.images
    }

    /// Attached frame slots.
    pub fn frames(&self) -> &[FrameSlot] {
        self.frames.as_slice()
    }

    /// Final stage, if created.
    pub fn final_stage(&self) -> Option<&PipelineSummary> {
        self.final_stage.as_ref()
    }
}

impl RendererState<'static> {
    /// Build the context with an owned transient arena of `capacity` bytes.
    pub fn with_owned_memory(capacity: usize, config: RendererConfig) -> Result<Self, RenderError> {
        config.validate()?;
        let transient = FixedArena::from_config(&ArenaConfig::new(capacity))?;
        Ok(Self::with_arena(transient, config))
    }
}
