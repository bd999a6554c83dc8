//! Criterion benchmarks for device selection and pipeline assembly over
//! the transient arena.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use kiln_arena::FixedArena;
use kiln_render::pipeline::{assemble_stages, PipelineInfo, ShaderModule};
use kiln_render::{select_device, Extent2D, RendererConfig};
use kiln_test_utils::{MockDevice, MockGpu};

/// Benchmark: select the last of eight devices, the other seven rejected.
fn bench_select_device_8(c: &mut Criterion) {
    let mut devices: Vec<MockDevice> = (1..=7).map(MockDevice::fifo_only).collect();
    devices.push(MockDevice::capable(8));
    let gpu = MockGpu::new(devices);
    let requirements = RendererConfig::default().device_requirements();
    let mut arena = FixedArena::with_capacity(64 * 1024).unwrap();

    c.bench_function("select_device_8", |b| {
        b.iter(|| black_box(select_device(&mut arena, &gpu, &requirements).unwrap()));
    });
}

/// Benchmark: assemble a two-stage pipeline.
fn bench_assemble_stages(c: &mut Criterion) {
    let mut info = PipelineInfo::new();
    info.add_vertex_shader(ShaderModule(1));
    info.add_fragment_shader(ShaderModule(2));
    let mut arena = FixedArena::with_capacity(4096).unwrap();

    c.bench_function("assemble_stages_2", |b| {
        b.iter(|| black_box(assemble_stages(&mut arena, &info, Extent2D::new(1920, 1080)).unwrap()));
    });
}

criterion_group!(benches, bench_select_device_8, bench_assemble_stages);
criterion_main!(benches);
