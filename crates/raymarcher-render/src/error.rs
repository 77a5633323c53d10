//! Rendering error types.

use raymarcher_core::FeatureTier;
use thiserror::Error;

/// Errors that can occur during rendering operations.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// No compiled raymarch shaders exist for this tier.
    #[error("feature tier {} is not supported (device supports up to {})", .requested.name(), .available.name())]
    UnsupportedFeatureTier {
        requested: FeatureTier,
        available: FeatureTier,
    },

    /// Texture creation failed.
    #[error("texture creation failed: {0}")]
    TextureCreationFailed(String),

    /// A draw was issued before the proxy cube and depth attachment existed.
    #[error("render resources not initialized")]
    NotInitialized,

    /// The depth attachment no longer matches the output target.
    #[error("depth attachment is {depth:?} but the output target is {target:?}; re-initialize render resources")]
    StaleDepthAttachment { depth: (u32, u32), target: (u32, u32) },

    /// GPU buffer mapping failed.
    #[error("GPU buffer mapping failed")]
    BufferMapFailed,

    /// Pixel data does not match the image dimensions.
    #[error("invalid image data")]
    InvalidImageData,

    /// Captures save as PNG or JPEG only.
    #[error("unsupported image format: {0}")]
    UnsupportedImageFormat(String),

    /// Image encoding or writing failed.
    #[error("image encoding error: {0}")]
    ImageError(#[from] image::ImageError),
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
