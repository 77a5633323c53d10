//! The raymarcher entry points, backed by a headless wgpu device.

use std::path::Path;
use std::sync::mpsc;

use pollster::FutureExt;
use raymarcher_core::{
    CameraModelCompiler, FeatureTier, RaymarchError, RaymarcherOptions, RenderQueue, Result,
    Transform, ViewContext, VolumeData, VolumeDescriptor, VolumeLoader,
};
use raymarcher_render::{
    RenderCommand, RenderCommandHandler, RenderEngine, RenderStatus, RenderTarget,
    RenderThreadContext,
};

/// Owns the device and the rendering thread.
///
/// Every method runs on the caller's (game) thread. GPU work is enqueued for
/// the rendering thread and runs in the order it was requested. Dropping the
/// raymarcher finishes every queued command and joins the rendering thread.
pub struct Raymarcher {
    // declared first so the rendering thread is joined before the device drops
    pub(crate) commands: RenderQueue<RenderCommand>,
    pub(crate) engine: RenderEngine,
    options: RaymarcherOptions,
}

impl Raymarcher {
    /// Creates a headless device and starts the rendering thread.
    pub fn new_headless(options: RaymarcherOptions) -> Result<Self> {
        let engine = RenderEngine::new_headless(&options)
            .block_on()
            .map_err(|e| {
                RaymarchError::RenderError(format!("failed to create headless engine: {e}"))
            })?;

        let device = engine.device.clone();
        let queue = engine.queue.clone();
        let device_tier = engine.feature_tier;
        let commands = RenderQueue::spawn("raymarch render thread", move || {
            RenderCommandHandler::new(RenderThreadContext::new(device, queue, device_tier))
        })?;

        log::info!("raymarcher initialized");
        Ok(Self {
            commands,
            engine,
            options,
        })
    }

    /// Highest feature tier the device supports, after any override in the
    /// options.
    #[must_use]
    pub fn feature_tier(&self) -> FeatureTier {
        self.engine.feature_tier
    }

    /// Allocates an output target cleared to the configured clear color.
    #[must_use]
    pub fn create_render_target(&self, width: u32, height: u32) -> RenderTarget {
        self.engine.create_render_target(width, height, &self.options)
    }

    /// Raymarches the current volume into `target` from the context's active
    /// view.
    ///
    /// The camera model is compiled here, on the caller's thread; the draw
    /// itself runs later on the rendering thread. A missing target, a missing
    /// view or a stopped rendering thread is logged and the draw dropped.
    pub fn draw_raymarch_to_render_target(
        &self,
        context: &impl ViewContext,
        target: Option<&RenderTarget>,
        model_transform: &Transform,
    ) {
        if let Err(e) = self.try_draw(context, target, model_transform) {
            log::error!("raymarch draw not issued: {e}");
        }
    }

    fn try_draw(
        &self,
        context: &impl ViewContext,
        target: Option<&RenderTarget>,
        model_transform: &Transform,
    ) -> Result<()> {
        let target = target.ok_or(RaymarchError::MissingRenderTarget)?;
        let camera = CameraModelCompiler::compile(context, model_transform)?;
        self.commands.enqueue(RenderCommand::Draw {
            camera,
            target: target.clone(),
            feature_tier: context.feature_tier(),
        })
    }

    /// Reads a headerless raw volume and uploads it as the current volume.
    ///
    /// Relative paths resolve against the configured content root. The file
    /// is read on the caller's thread; the upload runs on the rendering
    /// thread. A file smaller than `width * height * depth` bytes is rejected
    /// and the current volume kept; a larger one is used up to that size.
    pub fn load_raw_texture_3d(
        &self,
        path: impl AsRef<Path>,
        width: u32,
        height: u32,
        depth: u32,
    ) {
        let path = self.options.resolve_content_path(path);
        match self.try_load(&path, width, height, depth) {
            Ok(()) => log::info!(
                "loaded raw volume '{}' ({width}x{height}x{depth})",
                path.display()
            ),
            Err(e) => log::error!("raw volume load failed: {e}"),
        }
    }

    fn try_load(&self, path: &Path, width: u32, height: u32, depth: u32) -> Result<()> {
        let descriptor = VolumeDescriptor::new(width, height, depth)?;
        let data = VolumeLoader::load_file(path, descriptor)?;
        self.commands.enqueue(RenderCommand::UploadVolume(data))
    }

    /// Uploads voxels already in memory as the current volume.
    pub fn upload_volume(&self, data: VolumeData) {
        if let Err(e) = self.commands.enqueue(RenderCommand::UploadVolume(data)) {
            log::error!("volume upload not issued: {e}");
        }
    }

    /// Builds the proxy cube and a depth attachment sized to `target`.
    ///
    /// Must run before the first draw into `target` and again whenever draws
    /// move to a target of a different size.
    pub fn initialize_render_resources(&self, target: Option<&RenderTarget>) {
        let result = target
            .ok_or(RaymarchError::MissingRenderTarget)
            .and_then(|target| {
                self.commands.enqueue(RenderCommand::InitializeResources {
                    target: target.clone(),
                })
            });
        if let Err(e) = result {
            log::error!("render resource initialization not issued: {e}");
        }
    }

    /// Blocks until every command enqueued so far has run.
    ///
    /// Returns the rendering thread's state at that point.
    pub fn flush_rendering_commands(&self) -> Result<RenderStatus> {
        let (reply, status) = mpsc::channel();
        self.commands.enqueue(RenderCommand::Fence(reply))?;
        status
            .recv()
            .map_err(|_| RaymarchError::RenderThreadUnavailable)
    }
}
