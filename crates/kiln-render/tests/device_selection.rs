//! Device selection against mock enumerators.
//!
//! Every scenario checks that selection leaves the transient arena exactly
//! as it found it.

use kiln_arena::FixedArena;
use kiln_render::{select_device, RenderError, RendererConfig};
use kiln_test_utils::{MockDevice, MockGpu};
use proptest::prelude::*;
use tracing_test::traced_test;

fn run(gpu: &MockGpu) -> (Result<kiln_render::SelectedDevice, RenderError>, FixedArena<'static>) {
    let mut arena = FixedArena::with_capacity(64 * 1024).unwrap();
    arena.push(100).unwrap();
    let result = select_device(&mut arena, gpu, &RendererConfig::default().device_requirements());
    assert_eq!(arena.used(), 100, "selection must restore the arena");
    assert_eq!(arena.open_scratches(), 0);
    (result, arena)
}

#[test]
#[traced_test]
fn first_suitable_device_wins() {
    let gpu = MockGpu::new(vec![
        MockDevice::without_swapchain(1),
        MockDevice::capable(2),
        MockDevice::capable(3),
    ]);
    let (result, _) = run(&gpu);
    let selected = result.unwrap();
    assert_eq!(selected.handle.0, 2);
    assert_eq!(selected.index, 1);
    assert!(logs_contain("device selected"));
    assert!(logs_contain("rejected: missing extensions"));
}

#[test]
fn split_queue_families_are_reported() {
    let gpu = MockGpu::new(vec![MockDevice::split_queues(5)]);
    let (result, _) = run(&gpu);
    let queues = result.unwrap().queues;
    assert_eq!((queues.graphics, queues.present), (0, 1));
    assert!(!queues.is_shared());
}

#[test]
#[traced_test]
fn no_surface_fails_before_enumerating() {
    let gpu = MockGpu::headless();
    let (result, _) = run(&gpu);
    assert_eq!(result, Err(RenderError::NoSurface));
    assert_eq!(gpu.fill_calls(), 0);
    assert!(logs_contain("without a surface"));
}

#[test]
fn no_devices_is_no_suitable_device() {
    let gpu = MockGpu::new(Vec::new());
    let (result, _) = run(&gpu);
    assert_eq!(result, Err(RenderError::NoSuitableDevice { candidates: 0 }));
}

#[test]
#[traced_test]
fn every_rejection_reason_is_logged() {
    let gpu = MockGpu::new(vec![
        MockDevice::compute_only(1),
        MockDevice::without_swapchain(2),
        MockDevice::fifo_only(3),
    ]);
    let (result, _) = run(&gpu);
    assert_eq!(result, Err(RenderError::NoSuitableDevice { candidates: 3 }));
    assert!(logs_contain("missing graphics or present queue"));
    assert!(logs_contain("missing extensions"));
    assert!(logs_contain("present mode unsupported"));
    assert!(logs_contain("no suitable device"));
}

#[test]
fn enumeration_lands_in_the_arena() {
    let gpu = MockGpu::new(vec![MockDevice::capable(1)]);
    let (result, arena) = run(&gpu);
    assert!(result.is_ok());
    // devices, queue families, extensions, formats, present modes
    assert_eq!(gpu.fill_calls(), 5);
    assert!(arena.high_water() > 100 + 2 * 256);
}

#[test]
fn exhaustion_mid_selection_restores_the_arena() {
    let gpu = MockGpu::new(vec![MockDevice::capable(1)]);
    let mut arena = FixedArena::with_capacity(300).unwrap();
    arena.push(10).unwrap();
    let result = select_device(&mut arena, &gpu, &RendererConfig::default().device_requirements());
    match result {
        Err(RenderError::TransientExhausted { operation, .. }) => {
            assert_eq!(operation, "check_device_extensions");
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
    assert_eq!(arena.used(), 10);
}

fn device_of_kind(kind: u8, handle: u64) -> MockDevice {
    match kind {
        0 => MockDevice::capable(handle),
        1 => MockDevice::split_queues(handle),
        2 => MockDevice::without_swapchain(handle),
        3 => MockDevice::compute_only(handle),
        _ => MockDevice::fifo_only(handle),
    }
}

proptest! {
    #[test]
    fn selection_picks_first_suitable(kinds in proptest::collection::vec(0u8..5, 0..8)) {
        let devices: Vec<MockDevice> = (1u64..)
            .zip(&kinds)
            .map(|(handle, &kind)| device_of_kind(kind, handle))
            .collect();
        let expected = devices
            .iter()
            .position(|d| d.families.iter().any(|f| f.supports_graphics())
                && d.extensions.iter().any(|e| e.matches(RendererConfig::SWAPCHAIN_EXTENSION))
                && d.present_modes.contains(&RendererConfig::DEFAULT_PRESENT_MODE));
        let gpu = MockGpu::new(devices);
        let (result, _) = run(&gpu);
        prop_assert_eq!(result.ok().map(|s| s.index), expected);
    }
}
