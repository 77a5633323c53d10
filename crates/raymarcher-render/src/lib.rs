//! Rendering backend for raymarcher-rs.
//!
//! This crate provides the wgpu side of the raymarcher:
//! - Device creation and output render targets
//! - The rendering-thread context: uploaded volume, depth attachment, proxy cube
//! - The raymarch draw pipeline and its per-tier shader cache
//! - Commands the game thread enqueues, and readback of finished targets

// wgpu sizes are u32; pixel math converts between u32, usize and f32 freely
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod command;
pub mod draw;
pub mod engine;
pub mod error;
pub mod readback;
pub mod render_target;
pub mod resources;
pub mod shader;
pub mod uniforms;

pub use command::{RenderCommand, RenderCommandHandler};
pub use draw::{DrawReport, RaymarchDrawPipeline};
pub use engine::{feature_tier_of, RenderEngine};
pub use error::{RenderError, RenderResult};
pub use readback::{read_target, save_image};
pub use render_target::RenderTarget;
pub use resources::{
    CubeBuffers, DepthAttachment, GpuVolumeTexture, RenderStatus, RenderThreadContext,
    VolumeBinding, VolumeId,
};
pub use shader::{RaymarchProgram, ShaderCache, MIN_RAYMARCH_TIER};
pub use uniforms::{stage_parameters, ParameterMap, ParameterValue, ParameterWrite, ShaderStage};
