//! Test utilities and mock devices for Kiln development.
//!
//! Provides [`MockGpu`], an in-memory [`DeviceEnumerator`] built from
//! [`MockDevice`] descriptions, plus fixtures for the device shapes the
//! selection tests care about.

#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::cell::Cell;

use kiln_render::{
    ColorSpace, DeviceEnumerator, DeviceHandle, Extent2D, ExtensionName, Format, PresentMode,
    QueueFamily, QueueFlags, RendererConfig, SurfaceCapabilities, SurfaceFormat,
};

/// One simulated physical device.
#[derive(Clone, Debug)]
pub struct MockDevice {
    pub handle: DeviceHandle,
    pub families: Vec<QueueFamily>,
    /// Families that can present to the surface.
    pub present_families: Vec<u32>,
    pub extensions: Vec<ExtensionName>,
    pub formats: Vec<SurfaceFormat>,
    pub present_modes: Vec<PresentMode>,
    pub capabilities: SurfaceCapabilities,
}

impl MockDevice {
    /// A device meeting [`RendererConfig::default`] with one shared
    /// graphics and present family.
    pub fn capable(handle: u64) -> Self {
        Self {
            handle: DeviceHandle(handle),
            families: vec![QueueFamily::new(
                QueueFlags::GRAPHICS | QueueFlags::COMPUTE | QueueFlags::TRANSFER,
                16,
            )],
            present_families: vec![0],
            extensions: names(&[RendererConfig::SWAPCHAIN_EXTENSION, "VK_KHR_maintenance1"]),
            formats: vec![
                SurfaceFormat::new(Format::B8G8R8A8_UNORM, ColorSpace::SRGB_NONLINEAR),
                RendererConfig::DEFAULT_SURFACE_FORMAT,
            ],
            present_modes: vec![PresentMode::FIFO, RendererConfig::DEFAULT_PRESENT_MODE],
            capabilities: SurfaceCapabilities {
                min_image_count: 2,
                max_image_count: 8,
                current_extent: Extent2D::new(1280, 720),
                min_extent: Extent2D::new(1, 1),
                max_extent: Extent2D::new(4096, 4096),
            },
        }
    }

    /// Graphics and presentation on separate families.
    pub fn split_queues(handle: u64) -> Self {
        Self {
            families: vec![
                QueueFamily::new(QueueFlags::GRAPHICS, 1),
                QueueFamily::new(QueueFlags::TRANSFER, 2),
            ],
            present_families: vec![1],
            ..Self::capable(handle)
        }
    }

    /// Everything but the swapchain extension.
    pub fn without_swapchain(handle: u64) -> Self {
        Self {
            extensions: names(&["VK_KHR_maintenance1"]),
            ..Self::capable(handle)
        }
    }

    /// Compute-only device.
    pub fn compute_only(handle: u64) -> Self {
        Self {
            families: vec![QueueFamily::new(QueueFlags::COMPUTE, 4)],
            ..Self::capable(handle)
        }
    }

    /// FIFO is the only present mode.
    pub fn fifo_only(handle: u64) -> Self {
        Self {
            present_modes: vec![PresentMode::FIFO],
            ..Self::capable(handle)
        }
    }

    /// Surface leaves the extent to the swapchain.
    pub fn with_deferred_extent(mut self) -> Self {
        self.capabilities.current_extent = Extent2D::new(u32::MAX, u32::MAX);
        self
    }
}

/// Encode extension names, skipping any that do not fit.
pub fn names(list: &[&str]) -> Vec<ExtensionName> {
    list.iter().filter_map(|n| ExtensionName::new(n)).collect()
}

/// In-memory [`DeviceEnumerator`].
///
/// Counts fill calls so tests can confirm that enumeration went through
/// the arena.
#[derive(Debug, Default)]
pub struct MockGpu {
    pub surface: bool,
    pub devices: Vec<MockDevice>,
    fills: Cell<usize>,
}

impl MockGpu {
    /// A surface and the given devices, in enumeration order.
    pub fn new(devices: Vec<MockDevice>) -> Self {
        Self {
            surface: true,
            devices,
            fills: Cell::new(0),
        }
    }

    /// No surface and no devices.
    pub fn headless() -> Self {
        Self::default()
    }

    /// Number of fill calls served so far.
    pub fn fill_calls(&self) -> usize {
        self.fills.get()
    }

    fn device(&self, handle: DeviceHandle) -> Option<&MockDevice> {
        self.devices.iter().find(|d| d.handle == handle)
    }

    fn fill<T: Copy>(&self, src: &[T], out: &mut [T]) -> usize {
        self.fills.set(self.fills.get() + 1);
        let n = src.len().min(out.len());
        out[..n].copy_from_slice(&src[..n]);
        n
    }
}

impl DeviceEnumerator for MockGpu {
    fn has_surface(&self) -> bool {
        self.surface
    }

    fn device_count(&self) -> usize {
        self.devices.len()
    }

    fn fill_devices(&self, out: &mut [DeviceHandle]) -> usize {
        let handles: Vec<DeviceHandle> = self.devices.iter().map(|d| d.handle).collect();
        self.fill(&handles, out)
    }

    fn queue_family_count(&self, device: DeviceHandle) -> usize {
        self.device(device).map_or(0, |d| d.families.len())
    }

    fn fill_queue_families(&self, device: DeviceHandle, out: &mut [QueueFamily]) -> usize {
        self.device(device).map_or(0, |d| self.fill(&d.families, out))
    }

    fn supports_present(&self, device: DeviceHandle, family: u32) -> bool {
        self.device(device)
            .is_some_and(|d| d.present_families.contains(&family))
    }

    fn extension_count(&self, device: DeviceHandle) -> usize {
        self.device(device).map_or(0, |d| d.extensions.len())
    }

    fn fill_extensions(&self, device: DeviceHandle, out: &mut [ExtensionName]) -> usize {
        self.device(device).map_or(0, |d| self.fill(&d.extensions, out))
    }

    fn format_count(&self, device: DeviceHandle) -> usize {
        self.device(device).map_or(0, |d| d.formats.len())
    }

    fn fill_formats(&self, device: DeviceHandle, out: &mut [SurfaceFormat]) -> usize {
        self.device(device).map_or(0, |d| self.fill(&d.formats, out))
    }

    fn present_mode_count(&self, device: DeviceHandle) -> usize {
        self.device(device).map_or(0, |d| d.present_modes.len())
    }

    fn fill_present_modes(&self, device: DeviceHandle, out: &mut [PresentMode]) -> usize {
        self.device(device).map_or(0, |d| self.fill(&d.present_modes, out))
    }

    fn surface_capabilities(&self, device: DeviceHandle) -> SurfaceCapabilities {
        self.device(device)
            .map(|d| d.capabilities)
            .unwrap_or_default()
    }
}

/// A caller-owned block filled with `byte`, for checking that the arena
/// zeroes what it hands out.
pub fn dirty_block(len: usize, byte: u8) -> Vec<u8> {
    vec![byte; len]
}
