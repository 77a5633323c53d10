//! The raymarch draw: back faces of the proxy cube, one pixel program per
//! covered pixel.

use raymarcher_core::{CameraModel, FeatureTier};
use wgpu::util::DeviceExt;

use crate::error::{RenderError, RenderResult};
use crate::render_target::RenderTarget;
use crate::resources::{RenderThreadContext, VolumeBinding};
use crate::shader::{VOLUME_SAMPLER_BINDING, VOLUME_TEXTURE_BINDING};
use crate::uniforms::{stage_parameters, ShaderStage};

/// What a completed draw bound and covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawReport {
    /// Volume the pixel stage sampled.
    pub binding: VolumeBinding,
    /// Tier the programs were compiled for.
    pub feature_tier: FeatureTier,
    /// Indices submitted.
    pub index_count: u32,
}

/// Draws one volume into an output target.
pub struct RaymarchDrawPipeline;

impl RaymarchDrawPipeline {
    /// Records and submits one raymarch draw, then resolves the target.
    ///
    /// Every piece of per-draw state is rebuilt here. A failed precondition
    /// returns before anything is recorded, so the target is left as it was.
    ///
    /// # Panics
    ///
    /// Panics when called off the context's owning thread.
    pub fn draw(
        context: &mut RenderThreadContext,
        camera: &CameraModel,
        target: &RenderTarget,
        feature_tier: FeatureTier,
    ) -> RenderResult<DrawReport> {
        context.affinity.check();

        if !context.initialized {
            return Err(RenderError::NotInitialized);
        }
        let (Some(depth), Some(cube)) = (&context.depth, &context.cube) else {
            return Err(RenderError::NotInitialized);
        };
        let size = target.size();
        if depth.size != size {
            return Err(RenderError::StaleDepthAttachment {
                depth: (depth.size.x, depth.size.y),
                target: (size.x, size.y),
            });
        }

        let program = context
            .shaders
            .get_or_compile(&context.device, feature_tier)?;

        let writes = stage_parameters(camera);
        let uniform_buffer = |stage: ShaderStage| {
            let block = program.parameters(stage).pack(&writes);
            context
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(match stage {
                        ShaderStage::Vertex => "raymarch vertex parameters",
                        ShaderStage::Pixel => "raymarch pixel parameters",
                    }),
                    contents: &block,
                    usage: wgpu::BufferUsages::UNIFORM,
                })
        };
        let vertex_uniforms = uniform_buffer(ShaderStage::Vertex);
        let pixel_uniforms = uniform_buffer(ShaderStage::Pixel);

        let (volume, binding) = match &context.volume {
            Some(volume) => (volume, VolumeBinding::Loaded(volume.id)),
            None => (&context.fallback_volume, VolumeBinding::Fallback),
        };

        let bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Raymarch Bind Group"),
                layout: &program.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: ShaderStage::Vertex.uniform_binding(),
                        resource: vertex_uniforms.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: ShaderStage::Pixel.uniform_binding(),
                        resource: pixel_uniforms.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: VOLUME_TEXTURE_BINDING,
                        resource: wgpu::BindingResource::TextureView(&volume.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: VOLUME_SAMPLER_BINDING,
                        resource: wgpu::BindingResource::Sampler(&context.volume_sampler),
                    },
                ],
            });

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("raymarch encoder"),
            });

        let clear = target.clear_color().as_dvec4();
        let index_count = cube.geometry.index_count();
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Raymarch Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.render_view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear.x,
                            g: clear.y,
                            b: clear.z,
                            a: clear.w,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            #[allow(clippy::cast_precision_loss)]
            render_pass.set_viewport(0.0, 0.0, size.x as f32, size.y as f32, 0.0, 1.0);
            render_pass.set_pipeline(&program.pipeline);
            render_pass.set_bind_group(0, &bind_group, &[]);
            render_pass.set_vertex_buffer(0, cube.vertex_buffer.slice(..));
            render_pass.set_index_buffer(cube.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..index_count, 0, 0..1);
        }

        // resolve into the presentable copy
        encoder.copy_texture_to_texture(
            target.render_texture().as_image_copy(),
            target.resolved_texture().as_image_copy(),
            wgpu::Extent3d {
                width: size.x,
                height: size.y,
                depth_or_array_layers: 1,
            },
        );

        context.queue.submit(std::iter::once(encoder.finish()));

        Ok(DrawReport {
            binding,
            feature_tier,
            index_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::headless_context;
    use glam::Vec4;
    use raymarcher_core::{Camera, SceneView, Transform};
    use std::thread;

    fn camera() -> CameraModel {
        CameraModel::new(
            &SceneView::from_camera(&Camera::new(1.0)),
            &Transform::identity(),
        )
    }

    #[test]
    fn test_draw_before_initialization_fails() {
        let Some(mut context) = headless_context() else {
            return;
        };
        let target = RenderTarget::new(&context.device, 8, 8, Vec4::ZERO);
        let result = RaymarchDrawPipeline::draw(&mut context, &camera(), &target, FeatureTier::Sm4);
        assert!(matches!(result, Err(RenderError::NotInitialized)));
    }

    #[test]
    fn test_draw_off_owner_thread_panics() {
        let Some(mut context) = headless_context() else {
            return;
        };
        let target = RenderTarget::new(&context.device, 8, 8, Vec4::ZERO);
        context.initialize_resources(&target);

        let result = thread::spawn(move || {
            RaymarchDrawPipeline::draw(&mut context, &camera(), &target, FeatureTier::Sm4).is_ok()
        })
        .join();
        assert!(result.is_err());
    }
}
