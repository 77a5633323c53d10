//! Compiled raymarch programs, cached per feature tier.

use std::collections::HashMap;
use std::num::NonZeroU64;

use raymarcher_core::FeatureTier;

use crate::engine::{DEPTH_FORMAT, OUTPUT_FORMAT};
use crate::error::{RenderError, RenderResult};
use crate::uniforms::{ParameterMap, ShaderStage, STAGE_UNIFORM_SIZE};

/// Lowest tier with 3D texture sampling in both stages.
pub const MIN_RAYMARCH_TIER: FeatureTier = FeatureTier::Sm4;

/// Binding of the volume texture in group 0.
pub const VOLUME_TEXTURE_BINDING: u32 = 2;
/// Binding of the volume sampler in group 0.
pub const VOLUME_SAMPLER_BINDING: u32 = 3;

/// Size of one cube vertex: a homogeneous `vec4<f32>` position.
const VERTEX_STRIDE: wgpu::BufferAddress = 16;

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32x4,
    offset: 0,
    shader_location: 0,
}];

/// Depth test passes when the incoming depth is nearer or equal.
#[must_use]
pub fn depth_stencil_state() -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::LessEqual,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

/// Color and alpha both blend as `src * src.a + dst * dst.a`.
#[must_use]
pub fn blend_state() -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::DstAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState {
        color: component,
        alpha: component,
    }
}

/// Solid triangle list that culls the cube's outward (front) faces.
///
/// Only back faces rasterize, so each covered pixel is the ray's exit point
/// and the volume still renders with the camera inside the cube.
#[must_use]
pub fn primitive_state() -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: Some(wgpu::Face::Front),
        polygon_mode: wgpu::PolygonMode::Fill,
        ..wgpu::PrimitiveState::default()
    }
}

/// One vertex buffer of `Float32x4` positions.
#[must_use]
pub fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: VERTEX_STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRIBUTES,
    }
}

/// The raymarch pipeline and the parameter layout of each stage.
pub struct RaymarchProgram {
    /// The render pipeline.
    pub pipeline: wgpu::RenderPipeline,
    /// Layout of group 0: two stage uniform blocks, the volume and its sampler.
    pub bind_group_layout: wgpu::BindGroupLayout,
    /// Parameters the vertex stage declares.
    pub vertex_parameters: ParameterMap,
    /// Parameters the pixel stage declares.
    pub pixel_parameters: ParameterMap,
}

impl RaymarchProgram {
    /// The parameter map of a stage.
    #[must_use]
    pub fn parameters(&self, stage: ShaderStage) -> &ParameterMap {
        match stage {
            ShaderStage::Vertex => &self.vertex_parameters,
            ShaderStage::Pixel => &self.pixel_parameters,
        }
    }

    fn compile(device: &wgpu::Device, tier: FeatureTier) -> Self {
        let label = format!("raymarch shader ({})", tier.name());
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/raymarch.wgsl").into()),
        });

        let uniform_entry = |stage: ShaderStage| wgpu::BindGroupLayoutEntry {
            binding: stage.uniform_binding(),
            visibility: stage.visibility(),
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(STAGE_UNIFORM_SIZE as u64),
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Raymarch Bind Group Layout"),
            entries: &[
                uniform_entry(ShaderStage::Vertex),
                uniform_entry(ShaderStage::Pixel),
                // Volume texture
                wgpu::BindGroupLayoutEntry {
                    binding: VOLUME_TEXTURE_BINDING,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D3,
                        multisampled: false,
                    },
                    count: None,
                },
                // Volume sampler
                wgpu::BindGroupLayoutEntry {
                    binding: VOLUME_SAMPLER_BINDING,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Raymarch Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Raymarch Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[vertex_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: OUTPUT_FORMAT,
                    blend: Some(blend_state()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: primitive_state(),
            depth_stencil: Some(depth_stencil_state()),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            bind_group_layout,
            vertex_parameters: ParameterMap::raymarch(ShaderStage::Vertex),
            pixel_parameters: ParameterMap::raymarch(ShaderStage::Pixel),
        }
    }
}

/// Compiles raymarch programs on first use and keeps them per tier.
///
/// Every supported tier builds its pipeline from the same WGSL source; the
/// tier only gates which requests are accepted.
pub struct ShaderCache {
    device_tier: FeatureTier,
    programs: HashMap<FeatureTier, RaymarchProgram>,
}

impl ShaderCache {
    /// Creates an empty cache for a device supporting up to `device_tier`.
    #[must_use]
    pub fn new(device_tier: FeatureTier) -> Self {
        Self {
            device_tier,
            programs: HashMap::new(),
        }
    }

    /// Whether programs can be compiled for `tier`.
    #[must_use]
    pub fn supports(&self, tier: FeatureTier) -> bool {
        tier_supported(tier, self.device_tier)
    }

    /// Returns the program for `tier`, compiling it on first request.
    pub fn get_or_compile(
        &mut self,
        device: &wgpu::Device,
        tier: FeatureTier,
    ) -> RenderResult<&RaymarchProgram> {
        if !self.supports(tier) {
            return Err(RenderError::UnsupportedFeatureTier {
                requested: tier,
                available: self.device_tier,
            });
        }
        Ok(self.programs.entry(tier).or_insert_with(|| {
            log::debug!("compiling raymarch shaders for {}", tier.name());
            RaymarchProgram::compile(device, tier)
        }))
    }

}

fn tier_supported(requested: FeatureTier, available: FeatureTier) -> bool {
    requested >= MIN_RAYMARCH_TIER && requested <= available
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_tiers_are_rejected() {
        assert!(!tier_supported(FeatureTier::Es2, FeatureTier::Sm5));
        assert!(!tier_supported(FeatureTier::Es31, FeatureTier::Sm5));
        assert!(tier_supported(FeatureTier::Sm4, FeatureTier::Sm5));
        assert!(tier_supported(FeatureTier::Sm5, FeatureTier::Sm5));
    }

    #[test]
    fn test_tier_above_device_is_rejected() {
        let cache = ShaderCache::new(FeatureTier::Sm4);
        assert!(cache.supports(FeatureTier::Sm4));
        assert!(!cache.supports(FeatureTier::Sm5));
        assert!(cache.programs.is_empty());
    }

    #[test]
    fn test_depth_passes_on_equal() {
        let state = depth_stencil_state();
        assert_eq!(state.depth_compare, wgpu::CompareFunction::LessEqual);
        assert!(state.depth_write_enabled);
    }

    #[test]
    fn test_blend_weights_by_both_alphas() {
        let blend = blend_state();
        for component in [blend.color, blend.alpha] {
            assert_eq!(component.src_factor, wgpu::BlendFactor::SrcAlpha);
            assert_eq!(component.dst_factor, wgpu::BlendFactor::DstAlpha);
            assert_eq!(component.operation, wgpu::BlendOperation::Add);
        }
    }

    #[test]
    fn test_only_back_faces_rasterize() {
        let primitive = primitive_state();
        assert_eq!(primitive.front_face, wgpu::FrontFace::Ccw);
        assert_eq!(primitive.cull_mode, Some(wgpu::Face::Front));
        assert_eq!(primitive.polygon_mode, wgpu::PolygonMode::Fill);
    }

    #[test]
    fn test_vertex_layout_is_one_vec4() {
        let layout = vertex_layout();
        assert_eq!(layout.array_stride, 16);
        assert_eq!(layout.attributes.len(), 1);
        assert_eq!(layout.attributes[0].format, wgpu::VertexFormat::Float32x4);
    }
}
