use raymarcher_core::VolumeDescriptor;

use crate::error::{RenderError, RenderResult};

/// Format of the output color target.
pub const OUTPUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
/// Format of the depth attachment.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;
/// Single-channel 8-bit volume format.
pub const VOLUME_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Unorm;

/// Creates a depth texture matching an output target's size.
pub fn create_depth_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("raymarch depth texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

/// Creates a 3D texture for a volume and fills it in one full-extent write.
///
/// Fails without allocating when any dimension exceeds the device's 3D
/// texture limit.
pub fn create_volume_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    descriptor: VolumeDescriptor,
    bytes: &[u8],
    label: &str,
) -> RenderResult<(wgpu::Texture, wgpu::TextureView)> {
    let max = device.limits().max_texture_dimension_3d;
    let dims = descriptor.dimensions();
    if dims.max_element() > max {
        return Err(RenderError::TextureCreationFailed(format!(
            "volume {}x{}x{} exceeds the device's 3D texture limit of {max}",
            dims.x, dims.y, dims.z
        )));
    }

    let size = wgpu::Extent3d {
        width: dims.x,
        height: dims.y,
        depth_or_array_layers: dims.z,
    };
    Ok(allocate_volume(device, queue, size, bytes, label))
}

/// Creates the 1x1x1 black volume bound when nothing has been uploaded.
pub fn create_black_volume(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> (wgpu::Texture, wgpu::TextureView) {
    let size = wgpu::Extent3d {
        width: 1,
        height: 1,
        depth_or_array_layers: 1,
    };
    allocate_volume(device, queue, size, &[0], "black volume")
}

fn allocate_volume(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    size: wgpu::Extent3d,
    bytes: &[u8],
    label: &str,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D3,
        format: VOLUME_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    // one byte per voxel: a row is `width` bytes, a slice is `width * height`
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        bytes,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(size.width),
            rows_per_image: Some(size.height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some(label),
        dimension: Some(wgpu::TextureViewDimension::D3),
        ..Default::default()
    });

    (texture, view)
}
