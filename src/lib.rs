//! # Lumitree
//!
//! A glowing particle tree that unravels into a small universe and back.
//!
//! Every particle field is a pure function of attributes drawn once at
//! creation, the scene clock, and a smoothed mode mix. The CPU recomputes
//! positions, colors and sizes each frame; the GPU only draws camera-facing
//! sprites with additive blending and a bloom/noise/vignette post pass.
//!
//! ## Quick Start
//!
//! ```ignore
//! fn main() -> Result<(), lumitree::RunError> {
//!     env_logger::init();
//!     lumitree::run(lumitree::SceneConfig::default())
//! }
//! ```
//!
//! The scene itself never touches a window, so it can be driven headless:
//!
//! ```
//! use lumitree::prelude::*;
//!
//! let mut config = SceneConfig::default();
//! config.tree.count = 200;
//! let mut scene = Scene::new(&config).unwrap();
//! scene.advance(0.5);
//! assert_eq!(scene.mode(), ViewMode::Tree);
//! ```
//!
//! ## Core Concepts
//!
//! ### Modes
//!
//! [`ViewMode::Tree`] and [`ViewMode::Universe`] are the two targets. Each
//! component eases its own mix toward the requested target at a fixed rate,
//! so toggling mid-transition reverses smoothly instead of snapping.
//!
//! ### Fields
//!
//! | Component | Role |
//! |-----------|------|
//! | [`TreeField`] | Cone-shaped tree that blooms into a spherical galaxy |
//! | [`StarRings`] | Tilted orbital rings around the tree |
//! | [`MagicSpiral`] | Golden spiral ribbon winding up the trunk |
//! | [`TopStar`] | Star on the crown; pops in, then fades in universe mode |
//! | [`Gallery`] | Photo frames hung on the tree, flung into orbit |
//! | [`Snow`] | Falling flakes, recycled above the scene |
//! | [`Backdrop`] | Distant static starfield |
//!
//! ### Interaction
//!
//! Clicking a photo selects it; clicking the tree toggles the mode. Keys:
//! `Space`/`M` toggle mode, `A` toggles audio, `Escape` closes the photo,
//! `P` pauses time.
//!
//! ## Features
//!
//! - `egui`: code banner, title, controls and the photo modal.
//! - `audio`: looping background track through `rodio`.

pub mod attributes;
pub mod audio;
pub mod config;
pub mod easing;
pub mod entrance;
pub mod error;
pub mod fields;
pub mod gallery;
pub mod gpu;
pub mod growth;
pub mod hit;
pub mod input;
pub mod mode;
pub mod overlay;
pub mod scene;
pub mod spawn;
pub mod star;
pub mod time;
pub mod visuals;
mod window;

pub use bytemuck;
pub use glam::{Vec2, Vec3, Vec4};

pub use attributes::{ParticleAttributeSet, RenderBuffer, SpriteInstance};
pub use audio::{AudioConfig, AudioController, AudioSink};
pub use config::SceneConfig;
pub use error::{AudioError, ConfigError, GpuError, RunError, SceneError};
pub use fields::{Backdrop, FrameContext, MagicSpiral, ParticleSystem, Snow, StarRings, TreeField};
pub use gallery::{Gallery, PhotoSelection};
pub use growth::GrowthTimeline;
pub use hit::{Ray, TreeHitVolume};
pub use mode::{ModeMix, ViewMode};
pub use scene::{ClickOutcome, HoverTarget, Scene, SceneEvent};
pub use star::TopStar;
pub use visuals::{BlendMode, SpriteShape};
pub use window::run;

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use lumitree::prelude::*;
/// ```
///
/// This imports:
/// - [`Scene`] and [`SceneConfig`] - the composition root and its settings
/// - [`ViewMode`] - the two scene targets
/// - [`Ray`], [`ClickOutcome`], [`HoverTarget`] - picking
/// - [`ParticleSystem`] and [`FrameContext`] - the per-frame field contract
/// - [`Vec2`], [`Vec3`], [`Vec4`] - glam vector types
pub mod prelude {
    pub use crate::attributes::SpriteInstance;
    pub use crate::config::SceneConfig;
    pub use crate::fields::{FrameContext, ParticleSystem};
    pub use crate::gallery::PhotoSelection;
    pub use crate::hit::Ray;
    pub use crate::input::{Action, Input, KeyCode};
    pub use crate::mode::ViewMode;
    pub use crate::scene::{ClickOutcome, HoverTarget, Scene, SceneEvent};
    pub use crate::time::Time;
    pub use crate::{Vec2, Vec3, Vec4};
    #[cfg(feature = "egui")]
    pub use egui;
}
