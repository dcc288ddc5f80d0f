//! Particle systems.
//!
//! Each system is split the same way:
//!
//! - a `*Params` struct with its tuning constants,
//! - a `generate` function that draws the static [`ParticleAttributeSet`]
//!   once from a seeded [`SpawnContext`](crate::spawn::SpawnContext),
//! - a pure `transform` function mapping `(attributes, params, time, mix)`
//!   into a [`RenderBuffer`],
//! - a small owning struct implementing [`ParticleSystem`] that keeps its own
//!   [`ModeMix`](crate::mode::ModeMix) and calls `transform` once per frame.
//!
//! `transform` never touches a window or a GPU, so every formula can be
//! exercised from plain unit tests.

pub mod backdrop;
pub mod rings;
pub mod snow;
pub mod spiral;
pub mod tree;

pub use backdrop::{Backdrop, BackdropParams};
pub use rings::{RingParams, StarRings};
pub use snow::{Snow, SnowParams};
pub use spiral::{MagicSpiral, SpiralParams};
pub use tree::{TreeField, TreeParams};

use crate::attributes::{ParticleAttributeSet, RenderBuffer};
use crate::mode::ViewMode;
use crate::visuals::SpriteShape;

/// Everything a component may read during one frame.
///
/// Built once by the scene after the clock has ticked and handed to every
/// component unchanged, so no component observes another's output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Elapsed scene time in seconds.
    pub time: f32,
    /// Seconds since the previous frame.
    pub delta: f32,
    /// Requested mode.
    pub mode: ViewMode,
}

impl FrameContext {
    pub fn new(time: f32, delta: f32, mode: ViewMode) -> Self {
        Self { time, delta, mode }
    }
}

/// A fixed-size particle field driven once per frame.
pub trait ParticleSystem {
    /// Short name used in logs.
    fn label(&self) -> &'static str;

    /// Static attributes drawn at creation.
    fn attributes(&self) -> &ParticleAttributeSet;

    /// Advance the mode mix and recompute the render buffer.
    fn update(&mut self, frame: &FrameContext);

    /// Output of the most recent `update`.
    fn buffer(&self) -> &RenderBuffer;

    /// Current tree (0) ⇄ universe (1) blend. Systems without a universe
    /// layout stay at 0.
    fn mix(&self) -> f32 {
        0.0
    }

    /// Sprite shape used when drawing this system.
    fn shape(&self) -> SpriteShape {
        SpriteShape::Glow
    }

    /// Number of particles.
    fn len(&self) -> usize {
        self.attributes().len()
    }

    /// Whether the field holds no particles.
    fn is_empty(&self) -> bool {
        self.attributes().is_empty()
    }
}
