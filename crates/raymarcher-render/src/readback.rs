//! Reading resolved targets back to the CPU and saving them as images.

use std::path::Path;

use image::{ImageBuffer, Rgba};

use crate::error::{RenderError, RenderResult};
use crate::render_target::RenderTarget;

const BYTES_PER_PIXEL: u32 = 4;

/// Row pitch of a texture-to-buffer copy, padded to wgpu's alignment.
#[must_use]
pub fn aligned_bytes_per_row(width: u32) -> u32 {
    let unaligned = width * BYTES_PER_PIXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unaligned.div_ceil(align) * align
}

/// Copies a target's resolved texture into a buffer and waits for it.
///
/// Returns tightly packed RGBA8 rows, top row first.
pub fn read_target(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    target: &RenderTarget,
) -> RenderResult<Vec<u8>> {
    let size = target.size();
    let bytes_per_row = aligned_bytes_per_row(size.x);

    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("raymarch readback buffer"),
        size: u64::from(bytes_per_row) * u64::from(size.y),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("raymarch readback encoder"),
    });
    encoder.copy_texture_to_buffer(
        target.resolved_texture().as_image_copy(),
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(size.y),
            },
        },
        wgpu::Extent3d {
            width: size.x,
            height: size.y,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));

    let buffer_slice = buffer.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    let _ = device.poll(wgpu::PollType::wait_indefinitely());
    rx.recv()
        .map_err(|_| RenderError::BufferMapFailed)?
        .map_err(|_| RenderError::BufferMapFailed)?;

    // strip row padding
    let data = buffer_slice.get_mapped_range();
    let row_bytes = (size.x * BYTES_PER_PIXEL) as usize;
    let mut pixels = Vec::with_capacity(row_bytes * size.y as usize);
    for row in 0..size.y {
        let start = (row * bytes_per_row) as usize;
        pixels.extend_from_slice(&data[start..start + row_bytes]);
    }

    drop(data);
    buffer.unmap();

    Ok(pixels)
}

/// Saves RGBA8 pixels as PNG or JPEG, chosen by the file extension.
///
/// JPEG drops the alpha channel.
pub fn save_image(path: &Path, data: &[u8], width: u32, height: u32) -> RenderResult<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_raw(width, height, data.to_vec())
        .ok_or(RenderError::InvalidImageData)?;

    match extension.as_str() {
        "png" => img.save_with_format(path, image::ImageFormat::Png)?,
        "jpg" | "jpeg" => {
            let rgb = image::DynamicImage::ImageRgba8(img).to_rgb8();
            rgb.save_with_format(path, image::ImageFormat::Jpeg)?;
        }
        _ => return Err(RenderError::UnsupportedImageFormat(extension)),
    }

    Ok(())
}
