//! Physical device selection over the transient arena.
//!
//! Every enumeration is written into a scratch region and discarded as soon
//! as the check that needed it has answered. Selection as a whole runs in
//! its own scratch region, so the arena's `used` mark is the same before and
//! after, whatever the outcome.

use bytemuck::Pod;
use indexmap::IndexSet;
use kiln_arena::{Alloc, FixedArena};

use crate::device::{
    DeviceEnumerator, DeviceHandle, DeviceRequirements, ExtensionName, PresentMode, QueueFamily,
    SurfaceFormat,
};
use crate::error::RenderError;

/// Queue family indices chosen for a device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    /// Family used for graphics submission.
    pub graphics: u32,
    /// Family used for presentation.
    pub present: u32,
}

impl QueueFamilyIndices {
    /// Whether one family serves both roles.
    pub fn is_shared(&self) -> bool {
        self.graphics == self.present
    }
}

/// Outcome of a successful [`select_device`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectedDevice {
    /// The chosen device.
    pub handle: DeviceHandle,
    /// Position of the device in enumeration order.
    pub index: usize,
    /// Queue families to create queues from.
    pub queues: QueueFamilyIndices,
    /// Surface format the swapchain will use.
    pub surface_format: SurfaceFormat,
    /// Present mode the swapchain will use.
    pub present_mode: PresentMode,
}

/// Push a `count`-element array and let `fill` populate it.
///
/// Returns the handle and the number of entries actually written.
fn enumerate<T: Pod>(
    arena: &mut FixedArena<'_>,
    operation: &'static str,
    count: usize,
    fill: impl FnOnce(&mut [T]) -> usize,
) -> Result<(Alloc<T>, usize), RenderError> {
    let alloc = arena
        .try_push_array::<T>(count)
        .map_err(|source| RenderError::TransientExhausted { operation, source })?;
    let written = fill(arena.slice_mut(&alloc).unwrap_or_default()).min(count);
    Ok((alloc, written))
}

/// Whether `device` offers every extension in `required`.
pub fn check_device_extensions<E: DeviceEnumerator + ?Sized>(
    arena: &mut FixedArena<'_>,
    gpu: &E,
    device: DeviceHandle,
    required: &IndexSet<String>,
) -> Result<bool, RenderError> {
    let mut scratch = arena.scratch();
    let (names, n) = enumerate::<ExtensionName>(
        &mut scratch,
        "check_device_extensions",
        gpu.extension_count(device),
        |out| gpu.fill_extensions(device, out),
    )?;
    let available = scratch.slice(&names).unwrap_or_default();
    let available = &available[..n.min(available.len())];
    Ok(required
        .iter()
        .all(|want| available.iter().any(|name| name.matches(want))))
}

/// Whether `device` supports `wanted` exactly.
pub fn check_formats<E: DeviceEnumerator + ?Sized>(
    arena: &mut FixedArena<'_>,
    gpu: &E,
    device: DeviceHandle,
    wanted: SurfaceFormat,
) -> Result<bool, RenderError> {
    let mut scratch = arena.scratch();
    let (formats, n) = enumerate::<SurfaceFormat>(
        &mut scratch,
        "check_formats",
        gpu.format_count(device),
        |out| gpu.fill_formats(device, out),
    )?;
    let formats = scratch.slice(&formats).unwrap_or_default();
    Ok(formats[..n.min(formats.len())].contains(&wanted))
}

/// Whether `device` supports present mode `wanted`.
pub fn check_present_mode<E: DeviceEnumerator + ?Sized>(
    arena: &mut FixedArena<'_>,
    gpu: &E,
    device: DeviceHandle,
    wanted: PresentMode,
) -> Result<bool, RenderError> {
    let mut scratch = arena.scratch();
    let (modes, n) = enumerate::<PresentMode>(
        &mut scratch,
        "check_present_mode",
        gpu.present_mode_count(device),
        |out| gpu.fill_present_modes(device, out),
    )?;
    let modes = scratch.slice(&modes).unwrap_or_default();
    Ok(modes[..n.min(modes.len())].contains(&wanted))
}

/// Find a graphics family and a presenting family on `device`.
///
/// The first family with each capability is taken; the scan stops once
/// both are known.
pub fn find_queue_families<E: DeviceEnumerator + ?Sized>(
    arena: &mut FixedArena<'_>,
    gpu: &E,
    device: DeviceHandle,
) -> Result<Option<QueueFamilyIndices>, RenderError> {
    let mut scratch = arena.scratch();
    let (families, n) = enumerate::<QueueFamily>(
        &mut scratch,
        "find_queue_families",
        gpu.queue_family_count(device),
        |out| gpu.fill_queue_families(device, out),
    )?;
    let families = scratch.slice(&families).unwrap_or_default();

    let mut graphics = None;
    let mut present = None;
    for (index, family) in (0u32..).zip(&families[..n.min(families.len())]) {
        if graphics.is_none() && family.supports_graphics() {
            graphics = Some(index);
        }
        if present.is_none() && gpu.supports_present(device, index) {
            present = Some(index);
        }
        if graphics.is_some() && present.is_some() {
            break;
        }
    }
    Ok(graphics
        .zip(present)
        .map(|(graphics, present)| QueueFamilyIndices { graphics, present }))
}

/// Pick the first device that meets `requirements`.
///
/// A candidate must have a graphics family, a family that can present, all
/// required extensions, the exact surface format and the present mode.
pub fn select_device<E: DeviceEnumerator + ?Sized>(
    arena: &mut FixedArena<'_>,
    gpu: &E,
    requirements: &DeviceRequirements,
) -> Result<SelectedDevice, RenderError> {
    if !gpu.has_surface() {
        tracing::warn!("device selection requested without a surface");
        return Err(RenderError::NoSurface);
    }

    let mut scratch = arena.scratch();
    let (devices, count) = enumerate::<DeviceHandle>(
        &mut scratch,
        "select_device",
        gpu.device_count(),
        |out| gpu.fill_devices(out),
    )?;

    for index in 0..count {
        let Some(device) = scratch.slice(&devices).and_then(|d| d.get(index)).copied() else {
            break;
        };
        if let Some(queues) = evaluate(&mut scratch, gpu, device, requirements)? {
            tracing::info!(
                device = device.0,
                index,
                graphics_family = queues.graphics,
                present_family = queues.present,
                "device selected"
            );
            return Ok(SelectedDevice {
                handle: device,
                index,
                queues,
                surface_format: requirements.surface_format,
                present_mode: requirements.present_mode,
            });
        }
    }

    tracing::warn!(candidates = count, "no suitable device");
    Err(RenderError::NoSuitableDevice { candidates: count })
}

fn evaluate<E: DeviceEnumerator + ?Sized>(
    arena: &mut FixedArena<'_>,
    gpu: &E,
    device: DeviceHandle,
    requirements: &DeviceRequirements,
) -> Result<Option<QueueFamilyIndices>, RenderError> {
    let Some(queues) = find_queue_families(arena, gpu, device)? else {
        tracing::debug!(device = device.0, "rejected: missing graphics or present queue");
        return Ok(None);
    };
    if !check_device_extensions(arena, gpu, device, requirements.extensions())? {
        tracing::debug!(device = device.0, "rejected: missing extensions");
        return Ok(None);
    }
    if !check_formats(arena, gpu, device, requirements.surface_format)? {
        tracing::debug!(device = device.0, "rejected: surface format unsupported");
        return Ok(None);
    }
    if !check_present_mode(arena, gpu, device, requirements.present_mode)? {
        tracing::debug!(device = device.0, "rejected: present mode unsupported");
        return Ok(None);
    }
    Ok(Some(queues))
}
