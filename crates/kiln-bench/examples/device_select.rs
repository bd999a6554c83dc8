//! Renderer setup walkthrough against a mock device list.
//!
//! Demonstrates: caller memory → RendererState → select device → size
//! swapchain → attach images → final stage, with the transient arena's
//! high-water mark reported at the end.

use kiln_render::{Extent2D, ImageHandle, RendererConfig, RendererState, ShaderModule};
use kiln_test_utils::{MockDevice, MockGpu};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Kiln Device Selection Example ===\n");

    let gpu = MockGpu::new(vec![
        MockDevice::compute_only(1),
        MockDevice::without_swapchain(2),
        MockDevice::split_queues(3),
        MockDevice::capable(4),
    ]);

    let mut memory = vec![0u8; 64 * 1024];
    let mut state = match RendererState::init(&mut memory, RendererConfig::default()) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("init failed: {e}");
            return;
        }
    };

    let device = match state.select_device(&gpu) {
        Ok(device) => *device,
        Err(e) => {
            eprintln!("selection failed: {e}");
            return;
        }
    };
    println!(
        "Selected device {} (candidate #{}), graphics family {}, present family {}",
        device.handle.0, device.index, device.queues.graphics, device.queues.present
    );

    let plan = match state.configure_swapchain(&gpu, Extent2D::new(1920, 1080)) {
        Ok(plan) => *plan,
        Err(e) => {
            eprintln!("swapchain sizing failed: {e}");
            return;
        }
    };
    println!(
        "Swapchain: {}x{}, {} images",
        plan.extent.width, plan.extent.height, plan.image_count
    );

    let images: Vec<ImageHandle> = (100..100 + u64::from(plan.image_count))
        .map(ImageHandle)
        .collect();
    if let Err(e) = state.attach_swapchain(&images) {
        eprintln!("attach failed: {e}");
        return;
    }

    match state.create_final_stage(ShaderModule(1), ShaderModule(2)) {
        Ok(stage) => println!(
            "Final stage: {} stages, viewport {}x{}",
            stage.stage_count, stage.viewport.width, stage.viewport.height
        ),
        Err(e) => {
            eprintln!("final stage failed: {e}");
            return;
        }
    }

    let arena = state.transient();
    println!(
        "\nTransient arena: {} / {} bytes in use, high water {} bytes",
        arena.used(),
        arena.capacity(),
        arena.high_water()
    );
}
