//! Renderer configuration.

use smallvec::SmallVec;

use crate::device::{ColorSpace, DeviceRequirements, Format, PresentMode, SurfaceFormat};
use crate::error::RenderError;
use crate::swapchain::MAX_SWAPCHAIN_IMAGES;

// ── RendererConfig ─────────────────────────────────────────────────

/// Choices the renderer makes about the device and the swapchain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RendererConfig {
    /// Swapchain image format. Default: `B8G8R8A8_SRGB`, sRGB non-linear.
    pub surface_format: SurfaceFormat,
    /// Presentation mode. Default: mailbox.
    pub present_mode: PresentMode,
    /// Device extensions that must be present. Default: the swapchain
    /// extension.
    pub extensions: SmallVec<[&'static str; 4]>,
    /// Swapchain images to ask for before clamping to surface limits.
    /// Default: 3.
    pub preferred_image_count: u32,
}

impl RendererConfig {
    /// Default surface format.
    pub const DEFAULT_SURFACE_FORMAT: SurfaceFormat =
        SurfaceFormat::new(Format::B8G8R8A8_SRGB, ColorSpace::SRGB_NONLINEAR);

    /// Default present mode.
    pub const DEFAULT_PRESENT_MODE: PresentMode = PresentMode::MAILBOX;

    /// Extension every presenting device needs.
    pub const SWAPCHAIN_EXTENSION: &'static str = "VK_KHR_swapchain";

    /// Default swapchain image count.
    pub const DEFAULT_IMAGE_COUNT: u32 = 3;

    /// Check that the config can be satisfied at all.
    pub fn validate(&self) -> Result<(), RenderError> {
        let max = MAX_SWAPCHAIN_IMAGES as u32;
        if self.preferred_image_count == 0 || self.preferred_image_count > max {
            return Err(RenderError::InvalidConfig {
                reason: format!(
                    "preferred_image_count must be in 1..={max} (got {})",
                    self.preferred_image_count
                ),
            });
        }
        if let Some(bad) = self.extensions.iter().find(|e| e.is_empty() || e.contains('\0')) {
            return Err(RenderError::InvalidConfig {
                reason: format!("malformed extension name {bad:?}"),
            });
        }
        Ok(())
    }

    /// Requirements a device must meet for this config.
    pub fn device_requirements(&self) -> DeviceRequirements {
        let mut req = DeviceRequirements::new(self.surface_format, self.present_mode);
        for &name in &self.extensions {
            req.require_extension(name);
        }
        req
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        let mut extensions = SmallVec::new();
        extensions.push(Self::SWAPCHAIN_EXTENSION);
        Self {
            surface_format: Self::DEFAULT_SURFACE_FORMAT,
            present_mode: Self::DEFAULT_PRESENT_MODE,
            extensions,
            preferred_image_count: Self::DEFAULT_IMAGE_COUNT,
        }
    }
}
