//! Commands the game thread sends to the rendering thread.

use std::sync::mpsc::Sender;

use raymarcher_core::{CameraModel, CommandHandler, FeatureTier, VolumeData};

use crate::draw::RaymarchDrawPipeline;
use crate::error::RenderResult;
use crate::readback::read_target;
use crate::render_target::RenderTarget;
use crate::resources::{RenderStatus, RenderThreadContext};

/// One unit of rendering-thread work.
pub enum RenderCommand {
    /// Create a 3D texture from the voxels and make it current.
    UploadVolume(VolumeData),
    /// Build the proxy cube and a depth attachment for `target`.
    InitializeResources {
        /// Target whose size the depth attachment follows.
        target: RenderTarget,
    },
    /// Raymarch the current volume into `target`.
    Draw {
        /// Matrices and ray origin compiled on the game thread.
        camera: CameraModel,
        /// Output target.
        target: RenderTarget,
        /// Tier to compile the programs for.
        feature_tier: FeatureTier,
    },
    /// Read `target`'s resolved pixels back.
    Capture {
        /// Target to read.
        target: RenderTarget,
        /// Receives tightly packed RGBA8 rows.
        reply: Sender<RenderResult<Vec<u8>>>,
    },
    /// Reply with a status snapshot once every earlier command has run.
    Fence(Sender<RenderStatus>),
}

impl std::fmt::Debug for RenderCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UploadVolume(data) => f
                .debug_tuple("UploadVolume")
                .field(&data.descriptor())
                .finish(),
            Self::InitializeResources { target } => f
                .debug_struct("InitializeResources")
                .field("target", target)
                .finish(),
            Self::Draw {
                target,
                feature_tier,
                ..
            } => f
                .debug_struct("Draw")
                .field("target", target)
                .field("feature_tier", feature_tier)
                .finish_non_exhaustive(),
            Self::Capture { target, .. } => f
                .debug_struct("Capture")
                .field("target", target)
                .finish_non_exhaustive(),
            Self::Fence(_) => f.write_str("Fence"),
        }
    }
}

/// Runs commands against a [`RenderThreadContext`].
///
/// Failures are logged here and end the command; the next command runs
/// regardless.
pub struct RenderCommandHandler {
    context: RenderThreadContext,
}

impl RenderCommandHandler {
    /// Wraps a context created on the rendering thread.
    #[must_use]
    pub fn new(context: RenderThreadContext) -> Self {
        Self { context }
    }

}

impl CommandHandler<RenderCommand> for RenderCommandHandler {
    fn handle(&mut self, command: RenderCommand) {
        match command {
            RenderCommand::UploadVolume(data) => {
                if let Err(e) = self.context.upload_volume(data) {
                    log::error!("volume upload failed: {e}");
                }
            }
            RenderCommand::InitializeResources { target } => {
                self.context.initialize_resources(&target);
            }
            RenderCommand::Draw {
                camera,
                target,
                feature_tier,
            } => match RaymarchDrawPipeline::draw(&mut self.context, &camera, &target, feature_tier)
            {
                Ok(report) => {
                    self.context.draws_completed += 1;
                    self.context.last_binding = Some(report.binding);
                }
                Err(e) => {
                    self.context.draws_skipped += 1;
                    log::error!("raymarch draw skipped: {e}");
                }
            },
            RenderCommand::Capture { target, reply } => {
                self.context.affinity.check();
                let pixels = read_target(&self.context.device, &self.context.queue, &target);
                if let Err(e) = &pixels {
                    log::error!("render target capture failed: {e}");
                }
                let _ = reply.send(pixels);
            }
            RenderCommand::Fence(reply) => {
                let _ = reply.send(self.context.status());
            }
        }
    }
}
