//! The wgpu device the raymarcher renders with.

mod textures;

pub use textures::{
    create_black_volume,
    create_depth_texture,
    create_volume_texture,
    DEPTH_FORMAT,
    OUTPUT_FORMAT,
    VOLUME_FORMAT,
};

use raymarcher_core::{FeatureTier, RaymarcherOptions};

use crate::error::{RenderError, RenderResult};
use crate::render_target::RenderTarget;

/// Owns the wgpu instance, adapter, device and queue.
///
/// Lives on the game thread. The rendering thread receives clones of the
/// device and queue.
pub struct RenderEngine {
    /// The wgpu instance.
    pub instance: wgpu::Instance,
    /// The wgpu adapter.
    pub adapter: wgpu::Adapter,
    /// The wgpu device.
    pub device: wgpu::Device,
    /// The wgpu queue.
    pub queue: wgpu::Queue,
    /// Highest feature tier the device supports.
    pub feature_tier: FeatureTier,
}

impl RenderEngine {
    /// Creates a new headless render engine.
    pub async fn new_headless(options: &RaymarcherOptions) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..wgpu::InstanceDescriptor::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("raymarcher device (headless)"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
            })
            .await?;

        let reported = feature_tier_of(&adapter);
        let feature_tier = options.feature_tier.unwrap_or(reported);
        let info = adapter.get_info();
        log::info!(
            "raymarcher using {} ({:?}), feature tier {}",
            info.name,
            info.backend,
            feature_tier.name()
        );

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            feature_tier,
        })
    }

    /// Allocates an output render target.
    #[must_use]
    pub fn create_render_target(
        &self,
        width: u32,
        height: u32,
        options: &RaymarcherOptions,
    ) -> RenderTarget {
        RenderTarget::new(&self.device, width, height, options.clear_color)
    }
}

/// Maps an adapter's downlevel capabilities onto a feature tier.
#[must_use]
pub fn feature_tier_of(adapter: &wgpu::Adapter) -> FeatureTier {
    let downlevel = adapter.get_downlevel_capabilities();
    if downlevel.is_webgpu_compliant() {
        FeatureTier::Sm5
    } else if downlevel
        .flags
        .contains(wgpu::DownlevelFlags::COMPUTE_SHADERS)
    {
        FeatureTier::Sm4
    } else {
        FeatureTier::Es31
    }
}
