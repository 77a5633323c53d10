//! Resources owned by the rendering thread.
//!
//! Everything here is created, read and replaced on one thread only. The
//! context remembers that thread and every operation asserts it runs there.

use glam::{UVec2, UVec3};
use raymarcher_core::{CubeGeometry, FeatureTier, ThreadAffinity, VolumeData};
use wgpu::util::DeviceExt;

use crate::engine::{create_black_volume, create_depth_texture, create_volume_texture};
use crate::error::RenderResult;
use crate::render_target::RenderTarget;
use crate::shader::ShaderCache;

/// Identifies one upload. Ids increase with every successful upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VolumeId(pub u64);

/// Which volume a draw sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeBinding {
    /// The uploaded volume with this id.
    Loaded(VolumeId),
    /// The 1x1x1 black volume, because nothing was loaded.
    Fallback,
}

/// A 3D texture on the GPU.
pub struct GpuVolumeTexture {
    /// Upload id.
    pub id: VolumeId,
    /// Dimensions in voxels.
    pub dimensions: UVec3,
    /// The texture.
    pub texture: wgpu::Texture,
    /// A 3D view of the texture.
    pub view: wgpu::TextureView,
}

/// Depth texture matching an output target.
pub struct DepthAttachment {
    /// The texture.
    pub texture: wgpu::Texture,
    /// Its view.
    pub view: wgpu::TextureView,
    /// Size in pixels.
    pub size: UVec2,
}

/// Vertex and index buffers of the proxy cube.
pub struct CubeBuffers {
    /// The constant geometry the buffers were filled from.
    pub geometry: CubeGeometry,
    /// Homogeneous corner positions.
    pub vertex_buffer: wgpu::Buffer,
    /// Triangle list indices.
    pub index_buffer: wgpu::Buffer,
}

impl CubeBuffers {
    fn new(device: &wgpu::Device) -> Self {
        let geometry = CubeGeometry::new();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("raymarch cube vertices"),
            contents: bytemuck::cast_slice(&geometry.vertex_data()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("raymarch cube indices"),
            contents: bytemuck::cast_slice(&geometry.index_data()),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            geometry,
            vertex_buffer,
            index_buffer,
        }
    }
}

/// Snapshot of the rendering thread's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStatus {
    /// Whether the cube and depth attachment exist.
    pub initialized: bool,
    /// Id and dimensions of the current volume.
    pub volume: Option<(VolumeId, UVec3)>,
    /// Size of the depth attachment.
    pub depth_size: Option<UVec2>,
    /// Vertices in the cube buffers.
    pub cube_vertex_count: usize,
    /// Triangles in the cube buffers.
    pub cube_triangle_count: usize,
    /// Draws that reached submission.
    pub draws_completed: u64,
    /// Draws abandoned on a failed precondition.
    pub draws_skipped: u64,
    /// Volume bound by the most recent completed draw.
    pub last_binding: Option<VolumeBinding>,
}

/// Rendering-thread state: device handles, the uploaded volume, the depth
/// attachment, the proxy cube and the shader cache.
pub struct RenderThreadContext {
    pub(crate) affinity: ThreadAffinity,
    pub(crate) device: wgpu::Device,
    pub(crate) queue: wgpu::Queue,
    pub(crate) shaders: ShaderCache,
    pub(crate) volume: Option<GpuVolumeTexture>,
    pub(crate) fallback_volume: GpuVolumeTexture,
    pub(crate) volume_sampler: wgpu::Sampler,
    pub(crate) depth: Option<DepthAttachment>,
    pub(crate) cube: Option<CubeBuffers>,
    pub(crate) initialized: bool,
    next_volume_id: u64,
    pub(crate) draws_completed: u64,
    pub(crate) draws_skipped: u64,
    pub(crate) last_binding: Option<VolumeBinding>,
}

impl RenderThreadContext {
    /// Creates a context owned by the calling thread.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, device_tier: FeatureTier) -> Self {
        let fallback_volume = create_fallback_volume(&device, &queue);

        // trilinear, clamped on every axis
        let volume_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("raymarch volume sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            affinity: ThreadAffinity::current("render thread context"),
            device,
            queue,
            shaders: ShaderCache::new(device_tier),
            volume: None,
            fallback_volume,
            volume_sampler,
            depth: None,
            cube: None,
            initialized: false,
            next_volume_id: 1,
            draws_completed: 0,
            draws_skipped: 0,
            last_binding: None,
        }
    }

    /// Uploads a volume and makes it the current one.
    ///
    /// The voxel buffer is consumed and dropped whether or not the upload
    /// succeeds. On failure the current volume is left in place.
    ///
    /// # Panics
    ///
    /// Panics when called off the owning thread.
    pub fn upload_volume(&mut self, data: VolumeData) -> RenderResult<VolumeId> {
        self.affinity.check();

        let descriptor = data.descriptor();
        let id = VolumeId(self.next_volume_id);
        let label = format!("raw volume #{}", id.0);
        let (texture, view) =
            create_volume_texture(&self.device, &self.queue, descriptor, data.bytes(), &label)?;
        drop(data);

        self.next_volume_id += 1;
        self.volume = Some(GpuVolumeTexture {
            id,
            dimensions: descriptor.dimensions(),
            texture,
            view,
        });
        log::info!(
            "uploaded volume #{} ({}x{}x{})",
            id.0,
            descriptor.width(),
            descriptor.height(),
            descriptor.depth()
        );
        Ok(id)
    }

    /// Builds the proxy cube and a depth attachment sized to `target`.
    ///
    /// Safe to call again: the cube is rebuilt with the same constants and
    /// the depth attachment is replaced at the target's current size.
    ///
    /// # Panics
    ///
    /// Panics when called off the owning thread.
    pub fn initialize_resources(&mut self, target: &RenderTarget) {
        self.affinity.check();

        self.cube = Some(CubeBuffers::new(&self.device));

        let size = target.size();
        let (texture, view) = create_depth_texture(&self.device, size.x, size.y);
        self.depth = Some(DepthAttachment {
            texture,
            view,
            size,
        });

        self.initialized = true;
        log::info!("render resources initialized for {}x{} target", size.x, size.y);
    }

    /// The current volume, if one was uploaded.
    #[must_use]
    pub fn volume(&self) -> Option<&GpuVolumeTexture> {
        self.volume.as_ref()
    }

    /// Whether [`Self::initialize_resources`] has run.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The depth attachment, once initialized.
    #[must_use]
    pub fn depth_attachment(&self) -> Option<&DepthAttachment> {
        self.depth.as_ref()
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn status(&self) -> RenderStatus {
        let geometry = self.cube.as_ref().map(|cube| cube.geometry);
        RenderStatus {
            initialized: self.initialized,
            volume: self.volume.as_ref().map(|v| (v.id, v.dimensions)),
            depth_size: self.depth.as_ref().map(|d| d.size),
            cube_vertex_count: geometry.map_or(0, |g| g.vertices.len()),
            cube_triangle_count: geometry.map_or(0, |g| g.triangles.len()),
            draws_completed: self.draws_completed,
            draws_skipped: self.draws_skipped,
            last_binding: self.last_binding,
        }
    }
}

/// A single black voxel, bound when no volume has been uploaded.
fn create_fallback_volume(device: &wgpu::Device, queue: &wgpu::Queue) -> GpuVolumeTexture {
    let (texture, view) = create_black_volume(device, queue);
    GpuVolumeTexture {
        id: VolumeId(0),
        dimensions: UVec3::ONE,
        texture,
        view,
    }
}

/// A context on the calling thread backed by a fresh headless device, or
/// `None` when no adapter is available.
#[cfg(test)]
pub(crate) fn headless_context() -> Option<RenderThreadContext> {
    let options = raymarcher_core::RaymarcherOptions::default();
    match pollster::block_on(crate::engine::RenderEngine::new_headless(&options)) {
        Ok(engine) => Some(RenderThreadContext::new(
            engine.device,
            engine.queue,
            engine.feature_tier,
        )),
        Err(e) => {
            eprintln!("Skipping GPU test: no GPU adapter available ({e})");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;
    use raymarcher_core::VolumeDescriptor;
    use std::thread;

    fn solid_volume(width: u32, height: u32, depth: u32) -> VolumeData {
        let descriptor = VolumeDescriptor::new(width, height, depth).unwrap();
        let len = descriptor.byte_size() as usize;
        VolumeData::new(descriptor, vec![255; len]).unwrap()
    }

    #[test]
    fn test_owner_thread_uploads_and_initializes() {
        let Some(mut context) = headless_context() else {
            return;
        };
        assert!(!context.is_initialized());
        assert!(context.depth_attachment().is_none());

        let id = context.upload_volume(solid_volume(3, 5, 7)).unwrap();
        assert_eq!(id, VolumeId(1));
        let volume = context.volume().unwrap();
        assert_eq!((volume.id, volume.dimensions), (id, UVec3::new(3, 5, 7)));

        let target = RenderTarget::new(&context.device, 16, 8, Vec4::ZERO);
        context.initialize_resources(&target);
        assert!(context.is_initialized());
        assert_eq!(context.depth_attachment().unwrap().size, UVec2::new(16, 8));
    }

    #[test]
    fn test_oversized_upload_keeps_current_volume() {
        let Some(mut context) = headless_context() else {
            return;
        };
        let limit = context.device.limits().max_texture_dimension_3d;
        context.upload_volume(solid_volume(3, 5, 7)).unwrap();

        let result = context.upload_volume(solid_volume(limit + 1, 1, 1));
        assert!(matches!(result, Err(crate::RenderError::TextureCreationFailed(_))));
        let volume = context.volume().unwrap();
        assert_eq!((volume.id, volume.dimensions), (VolumeId(1), UVec3::new(3, 5, 7)));
    }

    #[test]
    fn test_upload_off_owner_thread_panics() {
        let Some(mut context) = headless_context() else {
            return;
        };
        let data = solid_volume(2, 2, 2);
        let result = thread::spawn(move || context.upload_volume(data).is_ok()).join();
        assert!(result.is_err());
    }

    #[test]
    fn test_initialize_off_owner_thread_panics() {
        let Some(mut context) = headless_context() else {
            return;
        };
        let target = RenderTarget::new(&context.device, 8, 8, Vec4::ZERO);
        let result = thread::spawn(move || context.initialize_resources(&target)).join();
        assert!(result.is_err());
    }
}
