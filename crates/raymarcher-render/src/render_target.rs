//! Output render targets: what the raymarcher draws into.

use std::sync::Arc;

use glam::{UVec2, Vec4};

use crate::engine::OUTPUT_FORMAT;

struct RenderTargetResource {
    render_texture: wgpu::Texture,
    render_view: wgpu::TextureView,
    resolved_texture: wgpu::Texture,
    size: UVec2,
    clear_color: Vec4,
}

/// A 2D color target plus the resolved copy that consumers sample or read.
///
/// Cheap to clone; clones share the same GPU textures. Its size is fixed at
/// creation, so a resized output is a new target and needs its render
/// resources initialized again.
#[derive(Clone)]
pub struct RenderTarget {
    inner: Arc<RenderTargetResource>,
}

impl RenderTarget {
    /// Allocates both textures.
    ///
    /// Each side is clamped to between one pixel and the device's 2D texture
    /// limit; [`Self::size`] reports the size actually allocated.
    #[must_use]
    pub fn new(device: &wgpu::Device, width: u32, height: u32, clear_color: Vec4) -> Self {
        let max = device.limits().max_texture_dimension_2d;
        let (width, height) = clamp_target_size(width, height, max);
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let render_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("raymarch render texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OUTPUT_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let render_view = render_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let resolved_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("raymarch resolved texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OUTPUT_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        Self {
            inner: Arc::new(RenderTargetResource {
                render_texture,
                render_view,
                resolved_texture,
                size: UVec2::new(width, height),
                clear_color,
            }),
        }
    }

    /// Size in pixels.
    #[must_use]
    pub fn size(&self) -> UVec2 {
        self.inner.size
    }

    /// Clear color applied at the start of every draw.
    #[must_use]
    pub fn clear_color(&self) -> Vec4 {
        self.inner.clear_color
    }

    /// The texture draws render into.
    #[must_use]
    pub fn render_texture(&self) -> &wgpu::Texture {
        &self.inner.render_texture
    }

    /// View of the texture draws render into.
    #[must_use]
    pub fn render_view(&self) -> &wgpu::TextureView {
        &self.inner.render_view
    }

    /// The presentable copy, updated at the end of every draw.
    #[must_use]
    pub fn resolved_texture(&self) -> &wgpu::Texture {
        &self.inner.resolved_texture
    }
}

/// Clamps each side of a requested target to `1..=max`.
fn clamp_target_size(width: u32, height: u32, max: u32) -> (u32, u32) {
    let clamped = (width.clamp(1, max), height.clamp(1, max));
    if clamped != (width, height) {
        log::warn!(
            "render target {width}x{height} clamped to {}x{} (2D texture limit {max})",
            clamped.0,
            clamped.1
        );
    }
    clamped
}

impl std::fmt::Debug for RenderTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderTarget")
            .field("size", &self.inner.size)
            .field("clear_color", &self.inner.clear_color)
            .finish_non_exhaustive()
    }
}
