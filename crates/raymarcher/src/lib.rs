//! raymarcher-rs: single-pass volumetric raymarching with wgpu.
//!
//! A headerless raw volume (one byte per voxel, X fastest, then Y, then Z) is
//! loaded into a 3D texture. Each draw rasterizes the back faces of a proxy
//! cube; every covered pixel marches from the camera through the volume and
//! composites into an output render target.
//!
//! # Quick Start
//!
//! ```no_run
//! use raymarcher::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!
//!     let raymarcher = Raymarcher::new_headless(RaymarcherOptions::default())?;
//!     let target = raymarcher.create_render_target(512, 512);
//!
//!     raymarcher.load_raw_texture_3d("head.raw", 256, 256, 113);
//!     raymarcher.initialize_render_resources(Some(&target));
//!
//!     let camera = Camera::new(1.0).with_position(Vec3::new(0.0, 0.0, 4.0));
//!     let world = WorldContext::new(camera, raymarcher.feature_tier());
//!     raymarcher.draw_raymarch_to_render_target(&world, Some(&target), &Transform::identity());
//!
//!     raymarcher.save_render_target(&target, "head.png")?;
//!     Ok(())
//! }
//! ```
//!
//! # Threads
//!
//! The caller's thread is the game thread. Loading reads the file there and
//! drawing compiles the camera model there; the GPU work is handed to a
//! dedicated rendering thread in FIFO order. Entry points return as soon as
//! their command is enqueued and log any failure instead of returning it.
//! [`Raymarcher::flush_rendering_commands`] waits for the queue to drain.

mod capture;
mod headless;

pub use crate::headless::Raymarcher;

// Re-export core types
pub use raymarcher_core::{
    error::{RaymarchError, Result},
    Camera, CameraModel, CameraModelCompiler, CubeGeometry, FeatureTier, ProjectionMode,
    RaymarcherOptions, SceneView, Transform, ViewContext, VolumeData, VolumeDescriptor,
    VolumeLoader, WorldContext,
};
pub use raymarcher_core::{Mat4, Quat, UVec2, UVec3, Vec3, Vec4};

// Re-export render types
pub use raymarcher_render::{
    RenderStatus, RenderTarget, VolumeBinding, VolumeId, MIN_RAYMARCH_TIER,
};

/// Installs an `env_logger` logger driven by `RUST_LOG`.
///
/// Does nothing if a logger is already installed.
pub fn init_logging() {
    let _ = env_logger::try_init();
}
