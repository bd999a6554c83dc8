//! Graphics API seam: device descriptors and the enumeration trait.
//!
//! Descriptor types are plain old data so that enumeration results can be
//! written straight into arena scratch memory. Numeric values match the
//! Vulkan constants of the same name.

use std::fmt;

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use indexmap::IndexSet;

/// Opaque physical device handle.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct DeviceHandle(pub u64);

bitflags! {
    /// Capabilities of a queue family.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct QueueFlags: u32 {
        /// Supports graphics operations.
        const GRAPHICS = 0x1;
        /// Supports compute operations.
        const COMPUTE = 0x2;
        /// Supports transfer operations.
        const TRANSFER = 0x4;
    }
}

/// One queue family as reported by a device.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct QueueFamily {
    /// Raw [`QueueFlags`] bits.
    pub flags: u32,
    /// Number of queues in the family.
    pub queue_count: u32,
}

impl QueueFamily {
    /// Family with `flags` and `queue_count` queues.
    pub fn new(flags: QueueFlags, queue_count: u32) -> Self {
        Self {
            flags: flags.bits(),
            queue_count,
        }
    }

    /// Flags as a typed set; unknown bits are dropped.
    pub fn queue_flags(&self) -> QueueFlags {
        QueueFlags::from_bits_truncate(self.flags)
    }

    /// Whether the family can run graphics work.
    pub fn supports_graphics(&self) -> bool {
        self.queue_count > 0 && self.queue_flags().contains(QueueFlags::GRAPHICS)
    }
}

/// Maximum length of an extension name, including the terminating NUL.
pub const MAX_EXTENSION_NAME: usize = 256;

/// NUL-padded device extension name.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct ExtensionName([u8; MAX_EXTENSION_NAME]);

impl ExtensionName {
    /// Encode `name`; `None` if it does not fit with its terminator or
    /// contains a NUL byte.
    pub fn new(name: &str) -> Option<Self> {
        let bytes = name.as_bytes();
        if bytes.len() >= MAX_EXTENSION_NAME || bytes.contains(&0) {
            return None;
        }
        let mut raw = [0u8; MAX_EXTENSION_NAME];
        raw[..bytes.len()].copy_from_slice(bytes);
        Some(Self(raw))
    }

    /// Name bytes up to the first NUL.
    pub fn as_bytes(&self) -> &[u8] {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(self.0.len());
        &self.0[..end]
    }

    /// Name as UTF-8, if it is valid.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_bytes()).ok()
    }

    /// Whether this is `name`.
    pub fn matches(&self, name: &str) -> bool {
        self.as_bytes() == name.as_bytes()
    }
}

impl Default for ExtensionName {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl fmt::Debug for ExtensionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExtensionName({:?})", String::from_utf8_lossy(self.as_bytes()))
    }
}

/// Image format identifier.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Format(pub u32);

impl Format {
    /// Unknown or unset.
    pub const UNDEFINED: Self = Self(0);
    /// Four 8-bit unsigned normalised channels.
    pub const R8G8B8A8_UNORM: Self = Self(37);
    /// Four 8-bit sRGB channels.
    pub const R8G8B8A8_SRGB: Self = Self(43);
    /// Four 8-bit unsigned normalised channels, BGRA order.
    pub const B8G8R8A8_UNORM: Self = Self(44);
    /// Four 8-bit sRGB channels, BGRA order.
    pub const B8G8R8A8_SRGB: Self = Self(50);
    /// Two 32-bit floats.
    pub const R32G32_SFLOAT: Self = Self(103);
    /// Three 32-bit floats.
    pub const R32G32B32_SFLOAT: Self = Self(106);
    /// Four 32-bit floats.
    pub const R32G32B32A32_SFLOAT: Self = Self(109);

    /// Size of one element in bytes, for the formats Kiln knows.
    pub fn byte_size(self) -> Option<u32> {
        match self {
            Self::R8G8B8A8_UNORM
            | Self::R8G8B8A8_SRGB
            | Self::B8G8R8A8_UNORM
            | Self::B8G8R8A8_SRGB => Some(4),
            Self::R32G32_SFLOAT => Some(8),
            Self::R32G32B32_SFLOAT => Some(12),
            Self::R32G32B32A32_SFLOAT => Some(16),
            _ => None,
        }
    }
}

/// Presentation color space identifier.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct ColorSpace(pub u32);

impl ColorSpace {
    /// Non-linear sRGB.
    pub const SRGB_NONLINEAR: Self = Self(0);
}

/// Format and color space pair supported by a surface.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct SurfaceFormat {
    /// Image format.
    pub format: Format,
    /// Color space.
    pub color_space: ColorSpace,
}

impl SurfaceFormat {
    /// Pair `format` with `color_space`.
    pub const fn new(format: Format, color_space: ColorSpace) -> Self {
        Self {
            format,
            color_space,
        }
    }
}

/// Presentation mode identifier.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct PresentMode(pub u32);

impl PresentMode {
    /// Present immediately; may tear.
    pub const IMMEDIATE: Self = Self(0);
    /// Triple-buffered, replacing the queued image.
    pub const MAILBOX: Self = Self(1);
    /// Vsync queue.
    pub const FIFO: Self = Self(2);
    /// Vsync queue that tears when late.
    pub const FIFO_RELAXED: Self = Self(3);
}

/// Two-dimensional size in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Extent2D {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Extent2D {
    /// Extent of `width` by `height`.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Surface limits reported for a device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceCapabilities {
    /// Fewest images a swapchain may have.
    pub min_image_count: u32,
    /// Most images a swapchain may have; zero means no limit.
    pub max_image_count: u32,
    /// Current surface size; `u32::MAX` width means the swapchain decides.
    pub current_extent: Extent2D,
    /// Smallest supported extent.
    pub min_extent: Extent2D,
    /// Largest supported extent.
    pub max_extent: Extent2D,
}

/// Source of device information.
///
/// Every list is read with a count/fill pair: the caller asks for the
/// count, allocates room, and has the enumerator fill it. Fill methods
/// return the number of entries written, which may be less than
/// `out.len()`.
pub trait DeviceEnumerator {
    /// Whether a presentation surface exists.
    fn has_surface(&self) -> bool;

    /// Number of physical devices.
    fn device_count(&self) -> usize;

    /// Write device handles into `out`.
    fn fill_devices(&self, out: &mut [DeviceHandle]) -> usize;

    /// Number of queue families on `device`.
    fn queue_family_count(&self, device: DeviceHandle) -> usize;

    /// Write `device`'s queue families into `out`.
    fn fill_queue_families(&self, device: DeviceHandle, out: &mut [QueueFamily]) -> usize;

    /// Whether queue family `family` of `device` can present to the surface.
    fn supports_present(&self, device: DeviceHandle, family: u32) -> bool;

    /// Number of extensions `device` offers.
    fn extension_count(&self, device: DeviceHandle) -> usize;

    /// Write `device`'s extension names into `out`.
    fn fill_extensions(&self, device: DeviceHandle, out: &mut [ExtensionName]) -> usize;

    /// Number of surface formats `device` supports.
    fn format_count(&self, device: DeviceHandle) -> usize;

    /// Write `device`'s surface formats into `out`.
    fn fill_formats(&self, device: DeviceHandle, out: &mut [SurfaceFormat]) -> usize;

    /// Number of present modes `device` supports.
    fn present_mode_count(&self, device: DeviceHandle) -> usize;

    /// Write `device`'s present modes into `out`.
    fn fill_present_modes(&self, device: DeviceHandle, out: &mut [PresentMode]) -> usize;

    /// Surface limits for `device`.
    fn surface_capabilities(&self, device: DeviceHandle) -> SurfaceCapabilities;
}

/// What a device must offer to be selected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceRequirements {
    extensions: IndexSet<String>,
    /// Required surface format.
    pub surface_format: SurfaceFormat,
    /// Required present mode.
    pub present_mode: PresentMode,
}

impl DeviceRequirements {
    /// Requirements with no extensions.
    pub fn new(surface_format: SurfaceFormat, present_mode: PresentMode) -> Self {
        Self {
            extensions: IndexSet::new(),
            surface_format,
            present_mode,
        }
    }

    /// Add a required extension. Returns `false` if it was already listed.
    pub fn require_extension(&mut self, name: impl Into<String>) -> bool {
        self.extensions.insert(name.into())
    }

    /// Required extensions in the order they were added.
    pub fn extensions(&self) -> &IndexSet<String> {
        &self.extensions
    }
}
