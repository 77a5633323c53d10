//! Configuration options for the raymarcher.

use std::path::{Path, PathBuf};

use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::view::FeatureTier;

/// Global configuration options for the raymarcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaymarcherOptions {
    /// Directory that relative raw-volume paths resolve against.
    pub content_root: PathBuf,

    /// Clear color of the output target (RGBA). Transparent black by default.
    pub clear_color: Vec4,

    /// Forces a feature tier instead of the one reported by the adapter.
    pub feature_tier: Option<FeatureTier>,
}

impl Default for RaymarcherOptions {
    fn default() -> Self {
        Self {
            content_root: PathBuf::from("Content"),
            clear_color: Vec4::ZERO,
            feature_tier: None,
        }
    }
}

impl RaymarcherOptions {
    /// Reads options from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Sets the content root directory.
    #[must_use]
    pub fn with_content_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.content_root = root.into();
        self
    }

    /// Sets the output clear color.
    #[must_use]
    pub fn with_clear_color(mut self, color: Vec4) -> Self {
        self.clear_color = color;
        self
    }

    /// Forces a feature tier.
    #[must_use]
    pub fn with_feature_tier(mut self, tier: FeatureTier) -> Self {
        self.feature_tier = Some(tier);
        self
    }

    /// Resolves a raw-volume path. Absolute paths are returned unchanged.
    #[must_use]
    pub fn resolve_content_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.content_root.join(path)
        }
    }
}
