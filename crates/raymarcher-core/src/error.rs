//! Error types for raymarcher-rs.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for raymarcher-rs operations.
#[derive(Error, Debug)]
pub enum RaymarchError {
    /// A volume dimension was zero or the voxel count overflowed.
    #[error("invalid volume dimensions {width}x{height}x{depth}")]
    InvalidDimensions { width: u32, height: u32, depth: u32 },

    /// The raw file could not be opened or read.
    #[error("could not read raw volume '{path}': {source}")]
    VolumeRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The raw source holds fewer bytes than the declared dimensions need.
    #[error("raw volume is smaller than expected: expected {expected} bytes, got {actual}")]
    VolumeTooSmall { expected: u64, actual: u64 },

    /// A draw or initialization was requested without an output target.
    #[error("no output render target bound")]
    MissingRenderTarget,

    /// The view context has no active camera to render from.
    #[error("no active camera or viewport could be resolved")]
    NoActiveView,

    /// The rendering thread has shut down and no longer accepts commands.
    #[error("rendering thread is not running")]
    RenderThreadUnavailable,

    /// Rendering error.
    #[error("render error: {0}")]
    RenderError(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for raymarcher-rs operations.
pub type Result<T> = std::result::Result<T, RaymarchError>;
