//! Per-draw camera state handed from the game thread to the rendering thread.

use glam::{Mat4, Vec3};

use crate::error::{RaymarchError, Result};
use crate::transform::Transform;
use crate::view::{SceneView, ViewContext};

/// Camera uniforms for one draw.
///
/// Built fresh for every draw request and moved to the rendering thread;
/// never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraModel {
    /// Object to world, scale included.
    pub model: Mat4,
    /// World to view.
    pub view: Mat4,
    /// View to clip.
    pub projection: Mat4,
    /// Camera position in the volume's object space.
    pub ray_origin: Vec3,
}

impl CameraModel {
    /// Combines a resolved view with the volume's object transform.
    #[must_use]
    pub fn new(scene_view: &SceneView, transform: &Transform) -> Self {
        Self {
            model: transform.to_matrix(),
            view: scene_view.view,
            projection: scene_view.projection,
            ray_origin: transform.inverse_transform_point(scene_view.eye),
        }
    }
}

/// Resolves the active view on the game thread and compiles it into a
/// [`CameraModel`].
pub struct CameraModelCompiler;

impl CameraModelCompiler {
    /// Compiles the camera model for drawing a volume placed at `transform`.
    ///
    /// Fails with [`RaymarchError::NoActiveView`] when the context has no
    /// active camera.
    pub fn compile(context: &impl ViewContext, transform: &Transform) -> Result<CameraModel> {
        let scene_view = context.active_view().ok_or(RaymarchError::NoActiveView)?;
        Ok(CameraModel::new(&scene_view, transform))
    }
}
