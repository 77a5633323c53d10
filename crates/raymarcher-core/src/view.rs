//! The scene/view collaborator: where the camera matrices come from.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::camera::Camera;

/// GPU capability level, used to select compatible compiled shaders.
///
/// Ordered from least to most capable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FeatureTier {
    /// OpenGL ES 2 class hardware.
    Es2,
    /// OpenGL ES 3.1 / WebGL 2 class hardware.
    Es31,
    /// Shader model 4 class hardware.
    Sm4,
    /// Shader model 5 class hardware (WebGPU compliant).
    Sm5,
}

impl FeatureTier {
    /// Returns display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            FeatureTier::Es2 => "ES2",
            FeatureTier::Es31 => "ES3_1",
            FeatureTier::Sm4 => "SM4",
            FeatureTier::Sm5 => "SM5",
        }
    }
}

/// Matrices and eye position of a resolved view, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneView {
    /// World to view transform.
    pub view: Mat4,
    /// View to clip transform.
    pub projection: Mat4,
    /// Camera position in world space.
    pub eye: Vec3,
}

impl SceneView {
    /// Resolves the current view of a camera.
    #[must_use]
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
            eye: camera.position,
        }
    }
}

/// Host context that can resolve the first active viewport's camera.
pub trait ViewContext {
    /// Returns the current view, or `None` if no camera is active.
    fn active_view(&self) -> Option<SceneView>;

    /// Returns the feature tier the scene renders at.
    fn feature_tier(&self) -> FeatureTier;
}

/// A minimal world: an optional player camera and the scene's feature tier.
#[derive(Debug, Clone)]
pub struct WorldContext {
    /// The first player's camera, if one is active.
    pub camera: Option<Camera>,
    /// The feature tier of the scene.
    pub feature_tier: FeatureTier,
}

impl WorldContext {
    /// Creates a world viewed through `camera`.
    #[must_use]
    pub fn new(camera: Camera, feature_tier: FeatureTier) -> Self {
        Self {
            camera: Some(camera),
            feature_tier,
        }
    }

    /// Creates a world without an active camera.
    #[must_use]
    pub fn without_camera(feature_tier: FeatureTier) -> Self {
        Self {
            camera: None,
            feature_tier,
        }
    }
}

impl ViewContext for WorldContext {
    fn active_view(&self) -> Option<SceneView> {
        self.camera.as_ref().map(SceneView::from_camera)
    }

    fn feature_tier(&self) -> FeatureTier {
        self.feature_tier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_tiers_are_ordered() {
        assert!(FeatureTier::Es2 < FeatureTier::Es31);
        assert!(FeatureTier::Es31 < FeatureTier::Sm4);
        assert!(FeatureTier::Sm4 < FeatureTier::Sm5);
    }

    #[test]
    fn test_world_without_camera_has_no_view() {
        let world = WorldContext::without_camera(FeatureTier::Sm5);
        assert!(world.active_view().is_none());
    }

    #[test]
    fn test_world_view_matches_camera() {
        let camera = Camera::new(1.0).with_position(Vec3::new(0.0, 0.0, 5.0));
        let world = WorldContext::new(camera.clone(), FeatureTier::Sm5);
        let view = world.active_view().unwrap();
        assert_eq!(view.eye, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(view.view, camera.view_matrix());
        assert_eq!(view.projection, camera.projection_matrix());
    }
}
