//! Swapchain sizing and per-image slots.
//!
//! Image and frame slots live in inline fixed-capacity arrays; the swapchain
//! never needs heap storage for them.

use kiln_core::BoundedArray;

use crate::device::{Extent2D, PresentMode, SurfaceCapabilities, SurfaceFormat};
use crate::error::RenderError;

/// Most images a swapchain may expose.
pub const MAX_SWAPCHAIN_IMAGES: usize = 8;

/// Frames that may be recorded while earlier ones are still on the GPU.
pub const FRAMES_IN_FLIGHT: usize = 3;

/// Opaque image handle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub u64);

/// One swapchain image and its position in the chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImageSlot {
    /// Index the presentation engine uses for this image.
    pub index: u32,
    /// The image.
    pub image: ImageHandle,
}

/// Per-frame render target for the final stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSlot {
    /// Frame index in `0..FRAMES_IN_FLIGHT`.
    pub index: u32,
    /// Off-screen image the frame renders into.
    pub image: ImageHandle,
}

/// Images of a swapchain, in presentation-engine order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SwapchainImages {
    slots: BoundedArray<ImageSlot, MAX_SWAPCHAIN_IMAGES>,
}

impl SwapchainImages {
    /// Slot the images reported by the presentation engine.
    pub fn from_images(images: &[ImageHandle]) -> Result<Self, RenderError> {
        Ok(Self {
            slots: fill_slots(images, |index, image| ImageSlot { index, image })?,
        })
    }

    /// Number of images.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether there are no images.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot for presentation index `index`.
    pub fn get(&self, index: usize) -> Option<&ImageSlot> {
        self.slots.get(index)
    }

    /// All slots.
    pub fn as_slice(&self) -> &[ImageSlot] {
        self.slots.as_slice()
    }
}

/// Slot the per-frame images of the final stage.
pub fn frame_slots(
    images: &[ImageHandle],
) -> Result<BoundedArray<FrameSlot, FRAMES_IN_FLIGHT>, RenderError> {
    fill_slots(images, |index, image| FrameSlot { index, image })
}

fn fill_slots<S: Default, const N: usize>(
    images: &[ImageHandle],
    make: impl Fn(u32, ImageHandle) -> S,
) -> Result<BoundedArray<S, N>, RenderError> {
    let too_many = RenderError::TooManyImages {
        count: images.len(),
        max: N,
    };
    let mut slots = BoundedArray::new();
    for (index, &image) in (0u32..).zip(images) {
        slots.try_push(make(index, image)).map_err(|_| too_many.clone())?;
    }
    Ok(slots)
}

/// Swapchain parameters derived from surface limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapchainPlan {
    /// Image size.
    pub extent: Extent2D,
    /// Number of images to request.
    pub image_count: u32,
    /// Image format and color space.
    pub surface_format: SurfaceFormat,
    /// Presentation mode.
    pub present_mode: PresentMode,
}

/// Number of images to request: `preferred` within the surface limits and
/// never more than [`MAX_SWAPCHAIN_IMAGES`].
pub fn choose_image_count(preferred: u32, caps: &SurfaceCapabilities) -> u32 {
    let max = match caps.max_image_count {
        0 => MAX_SWAPCHAIN_IMAGES as u32,
        n => n.min(MAX_SWAPCHAIN_IMAGES as u32),
    };
    let min = caps.min_image_count.min(max);
    preferred.clamp(min, max)
}

/// Image extent: the surface's current extent, or `window` clamped to the
/// surface limits when the surface leaves the choice to the swapchain.
pub fn resolve_extent(window: Extent2D, caps: &SurfaceCapabilities) -> Extent2D {
    if caps.current_extent.width != u32::MAX {
        return caps.current_extent;
    }
    let clamp = |value: u32, lo: u32, hi: u32| value.max(lo).min(hi.max(lo));
    Extent2D {
        width: clamp(window.width, caps.min_extent.width, caps.max_extent.width),
        height: clamp(window.height, caps.min_extent.height, caps.max_extent.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn caps(min: u32, max: u32) -> SurfaceCapabilities {
        SurfaceCapabilities {
            min_image_count: min,
            max_image_count: max,
            current_extent: Extent2D::new(800, 600),
            min_extent: Extent2D::new(1, 1),
            max_extent: Extent2D::new(4096, 4096),
        }
    }

    #[test]
    fn image_count_prefers_three_within_limits() {
        assert_eq!(choose_image_count(3, &caps(2, 8)), 3);
        assert_eq!(choose_image_count(3, &caps(4, 8)), 4);
        assert_eq!(choose_image_count(3, &caps(1, 2)), 2);
    }

    #[test]
    fn unlimited_max_is_capped_by_slot_array() {
        assert_eq!(choose_image_count(12, &caps(2, 0)), MAX_SWAPCHAIN_IMAGES as u32);
    }

    #[test]
    fn current_extent_wins_when_fixed() {
        assert_eq!(
            resolve_extent(Extent2D::new(10, 10), &caps(2, 3)),
            Extent2D::new(800, 600)
        );
    }

    #[test]
    fn window_extent_is_clamped_when_surface_defers() {
        let mut c = caps(2, 3);
        c.current_extent = Extent2D::new(u32::MAX, u32::MAX);
        assert_eq!(
            resolve_extent(Extent2D::new(9000, 0), &c),
            Extent2D::new(4096, 1)
        );
    }

    #[test]
    fn images_fill_slots_in_order() {
        let images = [ImageHandle(10), ImageHandle(11), ImageHandle(12)];
        let chain = SwapchainImages::from_images(&images).unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(
            chain.get(2),
            Some(&ImageSlot {
                index: 2,
                image: ImageHandle(12)
            })
        );
    }

    #[test]
    fn too_many_images_are_rejected() {
        let images = [ImageHandle(1); MAX_SWAPCHAIN_IMAGES + 1];
        assert_eq!(
            SwapchainImages::from_images(&images),
            Err(RenderError::TooManyImages { count: 9, max: 8 })
        );
        assert!(frame_slots(&[ImageHandle(1); 4]).is_err());
        assert_eq!(frame_slots(&[ImageHandle(1); 3]).unwrap().len(), 3);
    }

    proptest! {
        #[test]
        fn image_count_stays_within_bounds(
            preferred in 0u32..32,
            min in 0u32..16,
            max in 0u32..16,
        ) {
            let count = choose_image_count(preferred, &caps(min, max));
            prop_assert!(count as usize <= MAX_SWAPCHAIN_IMAGES);
            if max != 0 {
                prop_assert!(count <= max);
            }
            if min <= max || max == 0 {
                prop_assert!(count >= min.min(MAX_SWAPCHAIN_IMAGES as u32));
            }
        }
    }
}
