//! Graphics pipeline description and stage assembly.
//!
//! [`PipelineInfo`] collects shaders and vertex attributes in growable
//! sequences. [`assemble_stages`] lays the per-stage descriptors out in a
//! scratch region of the transient arena, validates the stage mix, and
//! resolves the fixed-function defaults that depend on the render extent.

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use kiln_arena::FixedArena;
use kiln_core::GrowableSeq;

use crate::device::{Extent2D, Format};
use crate::error::RenderError;

/// Opaque shader module handle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ShaderModule(pub u64);

/// Pipeline stage a shader runs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    /// Vertex stage.
    Vertex,
    /// Fragment stage.
    Fragment,
}

impl ShaderKind {
    /// Stage bit as the graphics API encodes it.
    pub fn stage_bit(self) -> u32 {
        match self {
            Self::Vertex => 0x01,
            Self::Fragment => 0x10,
        }
    }
}

/// A shader attached to a pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShaderStage {
    /// Stage the shader runs in.
    pub kind: ShaderKind,
    /// Compiled module.
    pub module: ShaderModule,
}

/// One vertex input attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader input location.
    pub location: u32,
    /// Vertex buffer binding.
    pub binding: u32,
    /// Element format.
    pub format: Format,
    /// Byte offset within the vertex.
    pub offset: u32,
}

bitflags! {
    /// Pipeline options that override the extent-derived defaults.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct PipelineFlags: u32 {
        /// Keep the caller's viewport instead of covering the extent.
        const CUSTOM_VIEWPORT = 0x1;
        /// Keep the caller's scissor instead of covering the extent.
        const CUSTOM_SCISSOR = 0x2;
        /// Blend with source alpha.
        const BLEND_ALPHA = 0x4;
    }
}

impl Default for PipelineFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Face culling mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CullMode {
    /// Draw both faces.
    #[default]
    None,
    /// Cull front faces.
    Front,
    /// Cull back faces.
    Back,
}

/// Winding order of front faces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrontFace {
    /// Counter-clockwise triangles face forward.
    #[default]
    CounterClockwise,
    /// Clockwise triangles face forward.
    Clockwise,
}

/// Depth comparison for the depth test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    /// Pass when closer.
    Less,
    /// Pass when closer or equal.
    LessOrEqual,
    /// Pass when farther.
    Greater,
    /// Always pass.
    Always,
}

/// Viewport transform.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Near depth.
    pub min_depth: f32,
    /// Far depth.
    pub max_depth: f32,
}

impl Viewport {
    /// Viewport covering `extent` with the full depth range.
    pub fn covering(extent: Extent2D) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// Scissor rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Scissor {
    /// Top-left corner.
    pub offset: (i32, i32),
    /// Size.
    pub extent: Extent2D,
}

impl Scissor {
    /// Scissor covering `extent`.
    pub fn covering(extent: Extent2D) -> Self {
        Self {
            offset: (0, 0),
            extent,
        }
    }
}

/// Per-stage descriptor as laid out for pipeline creation.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct StageDescriptor {
    /// Stage bit, see [`ShaderKind::stage_bit`].
    pub stage: u32,
    _pad: u32,
    /// Shader module handle.
    pub module: u64,
    /// NUL-padded entry point name.
    pub entry_point: [u8; 8],
}

/// Entry point every stage is created with.
pub const ENTRY_POINT: &str = "main";

impl StageDescriptor {
    fn for_stage(stage: &ShaderStage) -> Self {
        let mut entry_point = [0u8; 8];
        entry_point[..ENTRY_POINT.len()].copy_from_slice(ENTRY_POINT.as_bytes());
        Self {
            stage: stage.kind.stage_bit(),
            _pad: 0,
            module: stage.module.0,
            entry_point,
        }
    }
}

/// Everything needed to build a graphics pipeline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PipelineInfo {
    /// Option overrides.
    pub flags: PipelineFlags,
    shaders: GrowableSeq<ShaderStage>,
    attributes: GrowableSeq<VertexAttribute>,
    /// Caller viewport, used with [`PipelineFlags::CUSTOM_VIEWPORT`].
    pub viewport: Viewport,
    /// Caller scissor, used with [`PipelineFlags::CUSTOM_SCISSOR`].
    pub scissor: Scissor,
    /// Face culling.
    pub cull_mode: CullMode,
    /// Front face winding.
    pub front_face: FrontFace,
    /// Depth test comparison; `None` disables the test.
    pub depth_compare: Option<CompareOp>,
}

impl PipelineInfo {
    /// Empty description with default state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a shader.
    pub fn add_shader(&mut self, kind: ShaderKind, module: ShaderModule) {
        self.shaders.append_one(ShaderStage { kind, module });
    }

    /// Attach a vertex shader.
    pub fn add_vertex_shader(&mut self, module: ShaderModule) {
        self.add_shader(ShaderKind::Vertex, module);
    }

    /// Attach a fragment shader.
    pub fn add_fragment_shader(&mut self, module: ShaderModule) {
        self.add_shader(ShaderKind::Fragment, module);
    }

    /// Append vertex attributes.
    pub fn add_attributes(&mut self, attributes: &[VertexAttribute]) {
        self.attributes.append_many(attributes);
    }

    /// Use `viewport` instead of one covering the extent.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.flags |= PipelineFlags::CUSTOM_VIEWPORT;
    }

    /// Use `scissor` instead of one covering the extent.
    pub fn set_scissor(&mut self, scissor: Scissor) {
        self.scissor = scissor;
        self.flags |= PipelineFlags::CUSTOM_SCISSOR;
    }

    /// Enable the depth test with `op`.
    pub fn set_depth_test(&mut self, op: CompareOp) {
        self.depth_compare = Some(op);
    }

    /// Set culling and winding.
    pub fn cull_face(&mut self, mode: CullMode, front_face: FrontFace) {
        self.cull_mode = mode;
        self.front_face = front_face;
    }

    /// Blend with source alpha.
    pub fn enable_alpha_blend(&mut self) {
        self.flags |= PipelineFlags::BLEND_ALPHA;
    }

    /// Attached shaders in insertion order.
    pub fn shaders(&self) -> &[ShaderStage] {
        &self.shaders
    }

    /// Vertex attributes in insertion order.
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// Drop all shaders and attributes.
    pub fn free(&mut self) {
        self.shaders.free();
        self.attributes.free();
    }
}

/// Result of [`assemble_stages`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipelineSummary {
    /// Number of shader stages.
    pub stage_count: usize,
    /// Number of vertex attributes.
    pub attribute_count: usize,
    /// Bytes per vertex implied by the attributes.
    pub vertex_stride: u32,
    /// Effective viewport.
    pub viewport: Viewport,
    /// Effective scissor.
    pub scissor: Scissor,
    /// Face culling.
    pub cull_mode: CullMode,
    /// Front face winding.
    pub front_face: FrontFace,
    /// Whether the depth test is on.
    pub depth_test: bool,
    /// Whether alpha blending is on.
    pub alpha_blend: bool,
}

/// Lay out the stage descriptors of `info` and resolve its state.
///
/// Requires exactly one vertex stage and at most one fragment stage. The
/// descriptor array lives in a scratch region that is closed before this
/// returns, on success and on failure alike.
pub fn assemble_stages(
    arena: &mut FixedArena<'_>,
    info: &PipelineInfo,
    extent: Extent2D,
) -> Result<PipelineSummary, RenderError> {
    let shaders = info.shaders();
    if shaders.is_empty() {
        return Err(invalid("no shaders added"));
    }

    let mut scratch = arena.scratch();
    let stages = scratch
        .try_push_array::<StageDescriptor>(shaders.len())
        .map_err(|source| RenderError::TransientExhausted {
            operation: "assemble_stages",
            source,
        })?;
    let descriptors = scratch.slice_mut(&stages).unwrap_or_default();
    for (slot, shader) in descriptors.iter_mut().zip(shaders) {
        *slot = StageDescriptor::for_stage(shader);
    }

    let count_of = |kind: ShaderKind| {
        descriptors
            .iter()
            .filter(|d| d.stage == kind.stage_bit())
            .count()
    };
    let vertex = count_of(ShaderKind::Vertex);
    let fragment = count_of(ShaderKind::Fragment);
    if vertex != 1 {
        return Err(invalid(format!("expected one vertex stage, found {vertex}")));
    }
    if fragment > 1 {
        return Err(invalid(format!("expected at most one fragment stage, found {fragment}")));
    }

    let vertex_stride = vertex_stride(info.attributes())?;
    let viewport = if info.flags.contains(PipelineFlags::CUSTOM_VIEWPORT) {
        info.viewport
    } else {
        Viewport::covering(extent)
    };
    let scissor = if info.flags.contains(PipelineFlags::CUSTOM_SCISSOR) {
        info.scissor
    } else {
        Scissor::covering(extent)
    };

    tracing::debug!(
        stages = shaders.len(),
        attributes = info.attributes().len(),
        vertex_stride,
        scratch_bytes = scratch.allocated(),
        "pipeline stages assembled"
    );

    Ok(PipelineSummary {
        stage_count: shaders.len(),
        attribute_count: info.attributes().len(),
        vertex_stride,
        viewport,
        scissor,
        cull_mode: info.cull_mode,
        front_face: info.front_face,
        depth_test: info.depth_compare.is_some(),
        alpha_blend: info.flags.contains(PipelineFlags::BLEND_ALPHA),
    })
}

fn vertex_stride(attributes: &[VertexAttribute]) -> Result<u32, RenderError> {
    attributes.iter().try_fold(0u32, |stride, attr| {
        let size = attr.format.byte_size().ok_or_else(|| {
            invalid(format!(
                "attribute at location {} has unsupported format {}",
                attr.location, attr.format.0
            ))
        })?;
        let end = attr
            .offset
            .checked_add(size)
            .ok_or_else(|| invalid(format!("attribute at location {} overflows", attr.location)))?;
        Ok(stride.max(end))
    })
}

fn invalid(reason: impl Into<String>) -> RenderError {
    RenderError::InvalidPipeline {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extent() -> Extent2D {
        Extent2D::new(1280, 720)
    }

    fn basic_info() -> PipelineInfo {
        let mut info = PipelineInfo::new();
        info.add_vertex_shader(ShaderModule(1));
        info.add_fragment_shader(ShaderModule(2));
        info
    }

    #[test]
    fn defaults_cover_the_extent() {
        let mut arena = FixedArena::with_capacity(1024).unwrap();
        let summary = assemble_stages(&mut arena, &basic_info(), extent()).unwrap();
        assert_eq!(summary.stage_count, 2);
        assert_eq!(summary.viewport, Viewport::covering(extent()));
        assert_eq!(summary.scissor.extent, extent());
        assert!(!summary.depth_test);
        assert!(!summary.alpha_blend);
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn custom_viewport_and_scissor_are_kept() {
        let mut arena = FixedArena::with_capacity(1024).unwrap();
        let mut info = basic_info();
        let viewport = Viewport {
            width: 10.0,
            height: 20.0,
            max_depth: 1.0,
            ..Viewport::default()
        };
        let scissor = Scissor {
            offset: (4, 4),
            extent: Extent2D::new(8, 8),
        };
        info.set_viewport(viewport);
        info.set_scissor(scissor);
        info.enable_alpha_blend();
        info.set_depth_test(CompareOp::Less);
        info.cull_face(CullMode::Back, FrontFace::Clockwise);
        let summary = assemble_stages(&mut arena, &info, extent()).unwrap();
        assert_eq!(summary.cull_mode, CullMode::Back);
        assert_eq!(summary.front_face, FrontFace::Clockwise);
        assert_eq!(summary.viewport, viewport);
        assert_eq!(summary.scissor, scissor);
        assert!(summary.alpha_blend);
        assert!(summary.depth_test);
    }

    #[test]
    fn stride_is_furthest_attribute_end() {
        let mut arena = FixedArena::with_capacity(1024).unwrap();
        let mut info = basic_info();
        info.add_attributes(&[
            VertexAttribute {
                location: 0,
                binding: 0,
                format: Format::R32G32B32_SFLOAT,
                offset: 0,
            },
            VertexAttribute {
                location: 2,
                binding: 0,
                format: Format::R32G32_SFLOAT,
                offset: 24,
            },
            VertexAttribute {
                location: 1,
                binding: 0,
                format: Format::R32G32B32_SFLOAT,
                offset: 12,
            },
        ]);
        let summary = assemble_stages(&mut arena, &info, extent()).unwrap();
        assert_eq!(summary.attribute_count, 3);
        assert_eq!(summary.vertex_stride, 32);
    }

    #[test]
    fn empty_pipeline_is_rejected() {
        let mut arena = FixedArena::with_capacity(1024).unwrap();
        let err = assemble_stages(&mut arena, &PipelineInfo::new(), extent()).unwrap_err();
        assert!(matches!(err, RenderError::InvalidPipeline { .. }));
    }

    #[test]
    fn stage_mix_is_validated_and_scratch_closed() {
        let mut arena = FixedArena::with_capacity(1024).unwrap();
        arena.push(5).unwrap();

        let mut info = PipelineInfo::new();
        info.add_fragment_shader(ShaderModule(2));
        assert!(assemble_stages(&mut arena, &info, extent()).is_err());

        let mut info = basic_info();
        info.add_fragment_shader(ShaderModule(3));
        assert!(assemble_stages(&mut arena, &info, extent()).is_err());

        assert_eq!(arena.used(), 5);
        assert_eq!(arena.open_scratches(), 0);
    }

    #[test]
    fn unknown_attribute_format_is_rejected() {
        let mut arena = FixedArena::with_capacity(1024).unwrap();
        let mut info = basic_info();
        info.add_attributes(&[VertexAttribute {
            location: 0,
            binding: 0,
            format: Format::UNDEFINED,
            offset: 0,
        }]);
        let err = assemble_stages(&mut arena, &info, extent()).unwrap_err();
        assert!(err.to_string().contains("unsupported format"));
    }

    #[test]
    fn exhausted_arena_is_reported() {
        let mut arena = FixedArena::with_capacity(16).unwrap();
        let err = assemble_stages(&mut arena, &basic_info(), extent()).unwrap_err();
        assert!(matches!(
            err,
            RenderError::TransientExhausted {
                operation: "assemble_stages",
                ..
            }
        ));
        assert_eq!(arena.open_scratches(), 0);
    }

    #[test]
    fn descriptor_has_main_entry_point() {
        let d = StageDescriptor::for_stage(&ShaderStage {
            kind: ShaderKind::Fragment,
            module: ShaderModule(9),
        });
        assert_eq!(&d.entry_point[..5], b"main\0");
        assert_eq!(d.stage, 0x10);
        assert_eq!(d.module, 9);
    }
}
