//! Scene configuration.
//!
//! A single JSON document with one section per component. Every section is
//! `#[serde(default)]`, so a file only needs the values it changes:
//!
//! ```json
//! { "initial_mode": "universe", "tree": { "count": 8000 } }
//! ```

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::audio::AudioConfig;
use crate::error::ConfigError;
use crate::fields::{BackdropParams, RingParams, SnowParams, SpiralParams, TreeParams};
use crate::gallery::GalleryParams;
use crate::gpu::camera::CameraParams;
use crate::gpu::post_process::PostParams;
use crate::growth::GrowthTimeline;
use crate::hit::TreeHitVolume;
use crate::mode::ViewMode;
use crate::star::StarParams;

/// Window settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Lumitree".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Frame clock settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Longest step a single frame may feed the scene, in seconds.
    pub max_delta: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            max_delta: crate::time::DEFAULT_MAX_DELTA,
        }
    }
}

/// Everything needed to build and present a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub initial_mode: ViewMode,
    /// Reveal front shared by every entrance-animated component.
    pub growth: GrowthTimeline,
    pub tree: TreeParams,
    pub rings: RingParams,
    pub spiral: SpiralParams,
    pub star: StarParams,
    pub gallery: GalleryParams,
    /// Image references, one card each.
    pub photos: Vec<String>,
    pub snow: SnowParams,
    pub backdrop: BackdropParams,
    pub hit_volume: TreeHitVolume,
    /// World position of the tree group.
    pub group_origin: Vec3,
    pub camera: CameraParams,
    pub audio: AudioConfig,
    pub window: WindowConfig,
    pub post: PostParams,
    pub time: TimeConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            initial_mode: ViewMode::Tree,
            growth: GrowthTimeline::SCENE,
            tree: TreeParams::default(),
            rings: RingParams::default(),
            spiral: SpiralParams::default(),
            star: StarParams::default(),
            gallery: GalleryParams::default(),
            photos: (1..=8).map(|i| format!("photos/memory-{:02}.jpg", i)).collect(),
            snow: SnowParams::default(),
            backdrop: BackdropParams::default(),
            hit_volume: TreeHitVolume::default(),
            group_origin: Vec3::new(0.0, -2.0, 0.0),
            camera: CameraParams::default(),
            audio: AudioConfig::default(),
            window: WindowConfig::default(),
            post: PostParams::default(),
            time: TimeConfig::default(),
        }
    }
}

fn require(ok: bool, what: impl FnOnce() -> String) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid(what()))
    }
}

fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
    require(value > 0.0 && value.is_finite(), || {
        format!("{} must be positive, got {}", name, value)
    })
}

fn nonzero(name: &str, value: u32) -> Result<(), ConfigError> {
    require(value > 0, || format!("{} must be at least 1", name))
}

fn fraction(name: &str, value: f32) -> Result<(), ConfigError> {
    require((0.0..=1.0).contains(&value), || {
        format!("{} must be within [0, 1], got {}", name, value)
    })
}

impl SceneConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the scene cannot be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("growth.speed", self.growth.speed)?;
        positive("growth.settle_window", self.growth.settle_window)?;

        nonzero("tree.count", self.tree.count)?;
        nonzero("tree.arms", self.tree.arms)?;
        positive("tree.height", self.tree.height)?;
        positive("tree.mix_rate", self.tree.mix_rate)?;
        fraction("tree.dust_ratio", self.tree.dust_ratio)?;
        fraction("tree.ornament_ratio", self.tree.ornament_ratio)?;
        require(self.tree.universe_inner <= self.tree.universe_outer, || {
            "tree.universe_inner must not exceed tree.universe_outer".to_string()
        })?;

        nonzero("rings.rings", self.rings.rings)?;
        nonzero("rings.per_ring", self.rings.per_ring)?;
        positive("rings.mix_rate", self.rings.mix_rate)?;

        nonzero("spiral.count", self.spiral.count)?;
        positive("spiral.mix_rate", self.spiral.mix_rate)?;

        positive("star.pop_rate", self.star.pop_rate)?;
        positive("star.mix_rate", self.star.mix_rate)?;

        positive("gallery.tree_rate", self.gallery.tree_rate)?;
        positive("gallery.universe_rate", self.gallery.universe_rate)?;
        positive("gallery.scale_rate", self.gallery.scale_rate)?;
        positive("gallery.drift_rate", self.gallery.drift_rate)?;

        nonzero("snow.count", self.snow.count)?;
        require(self.snow.floor < self.snow.ceiling, || {
            "snow.floor must lie below snow.ceiling".to_string()
        })?;
        nonzero("backdrop.count", self.backdrop.count)?;

        positive("hit_volume.radius", self.hit_volume.radius)?;
        require(self.hit_volume.bottom < self.hit_volume.top, || {
            "hit_volume.bottom must lie below hit_volume.top".to_string()
        })?;

        positive("camera.mix_rate", self.camera.mix_rate)?;
        positive("camera.fov_degrees", self.camera.fov_degrees)?;
        require(self.camera.near > 0.0 && self.camera.near < self.camera.far, || {
            "camera.near must be positive and below camera.far".to_string()
        })?;

        fraction("audio.volume", self.audio.volume)?;
        nonzero("window.width", self.window.width)?;
        nonzero("window.height", self.window.height)?;
        positive("time.max_delta", self.time.max_delta)?;
        Ok(())
    }
}
