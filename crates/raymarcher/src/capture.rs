//! Reading finished targets back from the rendering thread.

use std::path::Path;
use std::sync::mpsc;

use raymarcher_core::{RaymarchError, Result};
use raymarcher_render::{RenderCommand, RenderTarget};

use crate::headless::Raymarcher;

impl Raymarcher {
    /// Reads `target`'s resolved pixels as tightly packed RGBA8 rows.
    ///
    /// Waits for every draw enqueued before it, so the pixels include them.
    pub fn read_render_target(&self, target: &RenderTarget) -> Result<Vec<u8>> {
        let (reply, pixels) = mpsc::channel();
        self.commands.enqueue(RenderCommand::Capture {
            target: target.clone(),
            reply,
        })?;
        pixels
            .recv()
            .map_err(|_| RaymarchError::RenderThreadUnavailable)?
            .map_err(|e| RaymarchError::RenderError(format!("failed to read render target: {e}")))
    }

    /// Saves `target` as a PNG or JPEG, chosen by the file extension.
    pub fn save_render_target(&self, target: &RenderTarget, path: impl AsRef<Path>) -> Result<()> {
        let size = target.size();
        let pixels = self.read_render_target(target)?;
        raymarcher_render::save_image(path.as_ref(), &pixels, size.x, size.y)
            .map_err(|e| RaymarchError::RenderError(format!("failed to save image: {e}")))?;
        log::info!("saved render target to '{}'", path.as_ref().display());
        Ok(())
    }
}
