//! Core abstractions for raymarcher-rs.
//!
//! This crate holds everything that does not touch the GPU:
//! - [`VolumeLoader`] reading headerless raw volumes
//! - [`CameraModelCompiler`] turning the active view into per-draw uniforms
//! - [`CubeGeometry`], the proxy cube used to seed rays
//! - [`RenderQueue`], the ordered game-thread to rendering-thread hand-off
//! - Configuration options and error types

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod camera;
pub mod camera_model;
pub mod error;
pub mod geometry;
pub mod options;
pub mod task_queue;
pub mod transform;
pub mod view;
pub mod volume;

pub use camera::{Camera, ProjectionMode};
pub use camera_model::{CameraModel, CameraModelCompiler};
pub use error::{RaymarchError, Result};
pub use geometry::{CubeGeometry, CUBE_TRIANGLE_COUNT, CUBE_VERTEX_COUNT};
pub use options::RaymarcherOptions;
pub use task_queue::{CommandHandler, RenderQueue, ThreadAffinity};
pub use transform::Transform;
pub use view::{FeatureTier, SceneView, ViewContext, WorldContext};
pub use volume::{VolumeData, VolumeDescriptor, VolumeLoader};

// Re-export glam types for convenience
pub use glam::{Mat4, Quat, UVec2, UVec3, Vec3, Vec4};
