//! Ambient snowfall around the whole scene.
//!
//! Snow lives in world space outside the tree group and ignores the view
//! mode. Unlike the other fields it carries mutable per-flake state: each
//! flake falls steadily and is recycled to the top with fresh seeded
//! offsets once it drops below the floor.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::{FrameContext, ParticleSystem};
use crate::attributes::{AttributeSetBuilder, ParticleAttributeSet, ParticleSeed, RenderBuffer};
use crate::error::SceneError;
use crate::spawn::SpawnContext;
use crate::visuals::{palette, SpriteShape};

/// Flake motion was tuned per 60 Hz frame; deltas are scaled by this.
const REFERENCE_FPS: f32 = 60.0;
/// Seed step between successive recycles of the same flake.
const GENERATION_STRIDE: u64 = 0x9E37_79B9;

/// Snowfall constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnowParams {
    pub count: u32,
    /// Half-width of the horizontal spawn area.
    pub spread: f32,
    /// Height flakes are recycled to.
    pub ceiling: f32,
    /// Height below which a flake is recycled.
    pub floor: f32,
    /// Fall per reference frame.
    pub fall: f32,
    /// Base sprite size.
    pub size: f32,
    pub seed: u64,
}

impl Default for SnowParams {
    fn default() -> Self {
        Self {
            count: 1500,
            spread: 50.0,
            ceiling: 25.0,
            floor: -15.0,
            fall: 0.03,
            size: 0.45,
            seed: 0x736e_6f77,
        }
    }
}

/// Mutable state of one flake.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flake {
    /// Private flake clock driving the wobble.
    pub clock: f32,
    /// Wobble amplitude / frequency factor.
    pub factor: f32,
    /// Clock advance per reference frame.
    pub speed: f32,
    /// Drift anchor.
    pub anchor: Vec3,
    /// How many times this flake has been recycled.
    pub generation: u64,
}

impl Flake {
    fn spawn(params: &SnowParams, index: u32, generation: u64) -> Self {
        let seed = params.seed.wrapping_add(generation.wrapping_mul(GENERATION_STRIDE));
        let mut ctx = SpawnContext::new(seed, index, params.count);
        let clock = ctx.random() * 100.0;
        let factor = 20.0 + ctx.random() * 100.0;
        let speed = 0.01 + ctx.random() / 200.0;
        let x = ctx.random_signed(params.spread);
        let y = ctx.random_signed(params.spread);
        let z = ctx.random_signed(params.spread);
        Self {
            clock,
            factor,
            speed,
            anchor: Vec3::new(x, y, z),
            generation,
        }
    }

    /// Recycle to the ceiling with a new horizontal anchor and clock.
    fn recycle(&mut self, params: &SnowParams, index: u32) {
        let fresh = Flake::spawn(params, index, self.generation + 1);
        self.clock = fresh.clock;
        self.anchor = Vec3::new(fresh.anchor.x, params.ceiling, fresh.anchor.z);
        self.generation = fresh.generation;
    }

    /// World position for the current clock.
    pub fn position(&self) -> Vec3 {
        let t = self.clock;
        let f = self.factor;
        Vec3::new(
            self.anchor.x + (t / 10.0 * f).cos() + t.sin() * f / 10.0,
            self.anchor.y + (t / 10.0 * f).sin() + (t * 2.0).cos() * f / 10.0,
            self.anchor.z + (t / 10.0 * f).cos() + (t * 3.0).sin() * f / 10.0,
        )
    }

    /// Size pulse factor in `[0.6, 1.0]`.
    pub fn pulse(&self) -> f32 {
        self.clock.cos() * 0.2 + 0.8
    }
}

/// Advance every flake by `dt` seconds and write the render buffer.
pub fn step(flakes: &mut [Flake], params: &SnowParams, dt: f32, out: &mut RenderBuffer) {
    let frames = dt.max(0.0) * REFERENCE_FPS;
    for (i, flake) in flakes.iter_mut().enumerate() {
        flake.clock += flake.speed / 2.0 * frames;
        let pos = flake.position();
        if pos.y < params.floor {
            flake.recycle(params, i as u32);
        } else {
            flake.anchor.y -= params.fall * frames;
        }

        out.positions[i] = pos;
        out.sizes[i] = params.size * flake.pulse();
        out.colors[i] = palette::SNOW;
        out.settle[i] = 1.0;
        out.visible[i] = true;
    }
}

/// The snowfall system.
pub struct Snow {
    params: SnowParams,
    attributes: ParticleAttributeSet,
    flakes: Vec<Flake>,
    buffer: RenderBuffer,
}

impl Snow {
    pub fn new(params: &SnowParams) -> Result<Self, SceneError> {
        if params.count == 0 {
            return Err(SceneError::EmptyField("snow"));
        }
        let flakes: Vec<Flake> = (0..params.count)
            .map(|i| Flake::spawn(params, i, 0))
            .collect();

        let mut builder = AttributeSetBuilder::with_capacity(flakes.len());
        for flake in &flakes {
            builder.push(ParticleSeed {
                position: flake.anchor,
                destination: None,
                color: palette::SNOW,
                size: params.size,
                phase: flake.clock,
                speed: flake.speed,
            });
        }
        let attributes = builder.build()?;
        let mut buffer = RenderBuffer::new(flakes.len());
        for (i, flake) in flakes.iter().enumerate() {
            buffer.positions[i] = flake.position();
            buffer.sizes[i] = params.size * flake.pulse();
            buffer.colors[i] = palette::SNOW;
        }

        Ok(Self {
            params: *params,
            attributes,
            flakes,
            buffer,
        })
    }

    /// Current flake state.
    pub fn flakes(&self) -> &[Flake] {
        &self.flakes
    }
}

impl ParticleSystem for Snow {
    fn label(&self) -> &'static str {
        "snow"
    }

    fn attributes(&self) -> &ParticleAttributeSet {
        &self.attributes
    }

    fn update(&mut self, frame: &FrameContext) {
        step(&mut self.flakes, &self.params, frame.delta, &mut self.buffer);
    }

    fn buffer(&self) -> &RenderBuffer {
        &self.buffer
    }

    fn shape(&self) -> SpriteShape {
        SpriteShape::Flake
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::ViewMode;

    #[test]
    fn test_snow_falls() {
        let mut snow = Snow::new(&SnowParams::default()).unwrap();
        let before = snow.flakes().to_vec();
        snow.update(&FrameContext::new(0.1, 0.1, ViewMode::Tree));
        let mut fallen = 0;
        for (b, a) in before.iter().zip(snow.flakes()) {
            if a.generation == b.generation {
                assert!(a.anchor.y < b.anchor.y);
                fallen += 1;
            }
        }
        assert!(fallen > 0);
    }

    #[test]
    fn test_zero_delta_freezes_snow() {
        let mut snow = Snow::new(&SnowParams::default()).unwrap();
        let before = snow.flakes().to_vec();
        snow.update(&FrameContext::new(0.0, 0.0, ViewMode::Universe));
        let still_above: Vec<_> = before
            .iter()
            .zip(snow.flakes())
            .filter(|(b, _)| b.position().y >= SnowParams::default().floor)
            .map(|(b, a)| (b.anchor, a.anchor))
            .collect();
        for (b, a) in still_above {
            assert_eq!(b, a);
        }
    }

    #[test]
    fn test_flakes_recycle_to_ceiling() {
        let params = SnowParams {
            count: 50,
            ..SnowParams::default()
        };
        let mut snow = Snow::new(&params).unwrap();
        for _ in 0..3000 {
            snow.update(&FrameContext::new(0.0, 1.0 / 30.0, ViewMode::Tree));
        }
        assert!(snow.flakes().iter().any(|f| f.generation > 0));
        for f in snow.flakes() {
            // Anchors never sink far below the floor before being recycled.
            assert!(f.anchor.y > params.floor - 30.0);
        }
    }

    #[test]
    fn test_recycle_is_deterministic() {
        let params = SnowParams::default();
        let mut a = Flake::spawn(&params, 9, 0);
        let mut b = a;
        a.recycle(&params, 9);
        b.recycle(&params, 9);
        assert_eq!(a, b);
        assert_eq!(a.anchor.y, params.ceiling);
    }
}
