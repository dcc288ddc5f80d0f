//! The tree itself: a cone of spiral-armed glowing particles.
//!
//! Most particles sit on seven twisted arms near the cone surface; a fifth of
//! them are scattered inside as dust so the volume reads as solid. Roughly one
//! in three is a larger gold or cyan ornament that twinkles once settled.

use std::f32::consts::TAU;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::{FrameContext, ParticleSystem};
use crate::attributes::{AttributeSetBuilder, ParticleAttributeSet, ParticleSeed, RenderBuffer};
use crate::easing::{blend, blend_vec3, rotate_xz};
use crate::entrance::EntranceProfile;
use crate::error::SceneError;
use crate::growth::GrowthTimeline;
use crate::mode::{ModeMix, ViewMode};
use crate::spawn::SpawnContext;
use crate::visuals::palette;

/// Idle spin in radians per second, scaled by each particle's speed.
const IDLE_SPIN: f32 = 0.1;
/// Vertical float amplitude once settled.
const FLOAT_AMPLITUDE: f32 = 0.05;
const FLOAT_FREQUENCY: f32 = 0.8;
/// Base size above which a particle counts as an ornament and twinkles.
const ORNAMENT_SIZE: f32 = 0.2;
const TWINKLE_FREQUENCY: f32 = 8.0;
const TWINKLE_PHASE_SPREAD: f32 = 50.0;
const TWINKLE_AMPLITUDE: f32 = 0.15;
/// Fraction of the base size a particle keeps as a distant star.
const STAR_SIZE_SCALE: f32 = 0.4;
/// How far the resting color is pulled toward the starfield tint.
const STAR_TINT: f32 = 0.7;

/// Layout and behaviour constants for the tree field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeParams {
    pub count: u32,
    pub height: f32,
    pub max_radius: f32,
    /// Number of spiral arms.
    pub arms: u32,
    /// Arm twist in radians over the full height.
    pub arm_twist: f32,
    /// Half-width of the random angular offset from an arm.
    pub angle_jitter: f32,
    /// Probability a particle is dust scattered inside the cone.
    pub dust_ratio: f32,
    /// Probability a particle is an ornament.
    pub ornament_ratio: f32,
    /// Inner radius of the universe shell.
    pub universe_inner: f32,
    /// Outer radius of the universe shell.
    pub universe_outer: f32,
    /// Mode mix smoothing rate (1/s).
    pub mix_rate: f32,
    pub seed: u64,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            count: 4500,
            height: 10.0,
            max_radius: 3.8,
            arms: 7,
            arm_twist: 12.0,
            angle_jitter: 0.6,
            dust_ratio: 0.2,
            ornament_ratio: 0.3,
            universe_inner: 10.0,
            universe_outer: 30.0,
            mix_rate: 1.5,
            seed: 0x7265_6531,
        }
    }
}

/// Draw the tree's static attributes.
pub fn generate(params: &TreeParams) -> Result<ParticleAttributeSet, SceneError> {
    if params.count == 0 {
        return Err(SceneError::EmptyField("tree"));
    }
    let arms = params.arms.max(1);
    let dust_color = blend_vec3(palette::slate(), palette::blue(), 0.15);

    let mut builder = AttributeSetBuilder::with_capacity(params.count as usize);
    for i in 0..params.count {
        let mut ctx = SpawnContext::new(params.seed, i, params.count);

        let rel_y = ctx.random();
        let y = rel_y * params.height - params.height / 2.0;
        let arm_angle = rel_y * params.arm_twist + TAU * (i % arms) as f32 / arms as f32;
        let angle = arm_angle + ctx.random_signed(params.angle_jitter);

        let radius_at_height = params.max_radius * (1.0 - rel_y);
        let mut r = (ctx.random() * 0.3 + 0.7) * radius_at_height;
        if ctx.chance(params.dust_ratio) {
            r = ctx.random() * radius_at_height;
        }
        let position = Vec3::new(angle.cos() * r, y, angle.sin() * r);

        let ornament = ctx.chance(params.ornament_ratio);
        let (color, size) = if ornament {
            let color = if ctx.chance(0.4) {
                if ctx.chance(0.5) {
                    palette::gold()
                } else {
                    palette::amber()
                }
            } else if ctx.chance(0.5) {
                palette::cyan()
            } else {
                palette::blue()
            };
            (color, ctx.random_range(0.15, 0.45))
        } else {
            (dust_color, ctx.random_range(0.03, 0.13))
        };

        let speed = ctx.random_range(0.5, 1.0);
        let phase = ctx.random();
        let destination = ctx.random_in_shell(params.universe_inner, params.universe_outer);

        builder.push(ParticleSeed {
            position,
            destination: Some(destination),
            color,
            size,
            phase,
            speed,
        });
    }
    builder.build()
}

/// Compute every tree particle's render state at time `t` and blend `mix`.
pub fn transform(
    attrs: &ParticleAttributeSet,
    growth: &GrowthTimeline,
    t: f32,
    mix: f32,
    out: &mut RenderBuffer,
) {
    let profile = EntranceProfile::TREE;
    let destinations = attrs.destinations();

    for i in 0..attrs.len() {
        let base = attrs.positions()[i];
        let base_size = attrs.sizes()[i];
        let phase = attrs.phases()[i];
        let rest = attrs.colors()[i];

        let e = profile.sample(growth, base.y, t);

        let mut pos = profile.place(&e, base);
        pos = rotate_xz(pos, t * IDLE_SPIN * attrs.speeds()[i]);
        pos.y += (t * FLOAT_FREQUENCY + phase).sin() * FLOAT_AMPLITUDE * e.settle;

        let mut size = profile.size(&e, base_size);
        if e.visible && base_size > ORNAMENT_SIZE {
            let twinkle = (t * TWINKLE_FREQUENCY + phase * TWINKLE_PHASE_SPREAD).sin();
            size = (size + twinkle * TWINKLE_AMPLITUDE * e.appear).max(0.0);
        }
        let mut color = profile.color(&e, rest);

        if let Some(dest) = destinations {
            pos = blend_vec3(pos, dest[i], mix);
            if e.visible {
                size = blend(size, base_size * STAR_SIZE_SCALE * e.appear, mix);
            }
            color = blend_vec3(color, blend_vec3(rest, palette::STARFIELD, STAR_TINT), mix);
        }

        out.positions[i] = pos;
        out.sizes[i] = size;
        out.colors[i] = color;
        out.settle[i] = e.settle;
        out.visible[i] = e.visible;
    }
}

/// The tree particle field.
pub struct TreeField {
    growth: GrowthTimeline,
    attributes: ParticleAttributeSet,
    buffer: RenderBuffer,
    mix: ModeMix,
}

impl TreeField {
    /// Generate the field. `growth` must be the scene's shared timeline.
    pub fn new(
        params: &TreeParams,
        growth: GrowthTimeline,
        mode: ViewMode,
    ) -> Result<Self, SceneError> {
        let attributes = generate(params)?;
        let buffer = RenderBuffer::new(attributes.len());
        Ok(Self {
            growth,
            attributes,
            buffer,
            mix: ModeMix::new(mode, params.mix_rate),
        })
    }

    /// The timeline this field reveals with.
    pub fn growth(&self) -> &GrowthTimeline {
        &self.growth
    }
}

impl ParticleSystem for TreeField {
    fn label(&self) -> &'static str {
        "tree"
    }

    fn attributes(&self) -> &ParticleAttributeSet {
        &self.attributes
    }

    fn update(&mut self, frame: &FrameContext) {
        let mix = self.mix.update(frame.mode, frame.delta);
        transform(&self.attributes, &self.growth, frame.time, mix, &mut self.buffer);
    }

    fn buffer(&self) -> &RenderBuffer {
        &self.buffer
    }

    fn mix(&self) -> f32 {
        self.mix.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> TreeParams {
        TreeParams {
            count: 600,
            ..TreeParams::default()
        }
    }

    #[test]
    fn test_generation_is_reproducible() {
        let a = generate(&small()).unwrap();
        let b = generate(&small()).unwrap();
        assert_eq!(a.positions(), b.positions());
        assert_eq!(a.destinations(), b.destinations());
        assert_eq!(a.sizes(), b.sizes());
    }

    #[test]
    fn test_particles_stay_inside_cone() {
        let p = small();
        let attrs = generate(&p).unwrap();
        for pos in attrs.positions() {
            let rel_y = (pos.y + p.height / 2.0) / p.height;
            assert!((0.0..=1.0).contains(&rel_y));
            let planar = (pos.x * pos.x + pos.z * pos.z).sqrt();
            assert!(planar <= p.max_radius * (1.0 - rel_y) + 1e-4);
        }
    }

    #[test]
    fn test_destinations_lie_in_shell() {
        let p = small();
        let attrs = generate(&p).unwrap();
        for d in attrs.destinations().unwrap() {
            let r = d.length();
            assert!(r >= p.universe_inner - 1e-3 && r <= p.universe_outer + 1e-3);
        }
    }

    #[test]
    fn test_ornament_share_is_roughly_a_third() {
        let attrs = generate(&TreeParams::default()).unwrap();
        let ornaments = attrs.sizes().iter().filter(|s| **s >= 0.15).count();
        let share = ornaments as f32 / attrs.len() as f32;
        assert!(share > 0.25 && share < 0.36, "share = {}", share);
    }

    #[test]
    fn test_nothing_visible_at_start() {
        let p = small();
        let growth = GrowthTimeline::SCENE;
        let attrs = generate(&p).unwrap();
        let mut out = RenderBuffer::new(attrs.len());
        transform(&attrs, &growth, 0.0, 0.0, &mut out);
        for i in 0..attrs.len() {
            assert_eq!(out.sizes[i], 0.0);
            assert_eq!(out.settle[i], 0.0);
        }
    }

    #[test]
    fn test_front_particle_is_gated_but_not_drawn() {
        let p = small();
        let attrs = generate(&p).unwrap();
        let k = attrs.len() / 2;
        let growth = GrowthTimeline {
            start_height: attrs.positions()[k].y,
            ..GrowthTimeline::SCENE
        };
        let mut out = RenderBuffer::new(attrs.len());
        transform(&attrs, &growth, 0.0, 0.0, &mut out);
        assert!(out.is_visible(k));
        assert!(!out.is_drawn(k));
        assert_eq!(out.settle[k], 0.0);
        for (i, base) in attrs.positions().iter().enumerate() {
            assert_eq!(out.is_visible(i), base.y <= growth.start_height);
        }
    }

    #[test]
    fn test_mix_endpoints_are_exact() {
        let p = small();
        let growth = GrowthTimeline::SCENE;
        let attrs = generate(&p).unwrap();
        let t = 3.7;

        let mut tree = RenderBuffer::new(attrs.len());
        transform(&attrs, &growth, t, 0.0, &mut tree);
        let mut universe = RenderBuffer::new(attrs.len());
        transform(&attrs, &growth, t, 1.0, &mut universe);

        let dest = attrs.destinations().unwrap();
        for i in 0..attrs.len() {
            assert_eq!(universe.positions[i], dest[i]);
            // Tree-mode output is the entrance/idle pose with no blend residue.
            let base = attrs.positions()[i];
            let e = EntranceProfile::TREE.sample(&growth, base.y, t);
            let mut expected = EntranceProfile::TREE.place(&e, base);
            expected = rotate_xz(expected, t * IDLE_SPIN * attrs.speeds()[i]);
            expected.y +=
                (t * FLOAT_FREQUENCY + attrs.phases()[i]).sin() * FLOAT_AMPLITUDE * e.settle;
            assert_eq!(tree.positions[i], expected);
        }
    }

    #[test]
    fn test_field_follows_mode() {
        let mut field = TreeField::new(&small(), GrowthTimeline::SCENE, ViewMode::Tree).unwrap();
        let mut t = 0.0;
        for _ in 0..600 {
            t += 1.0 / 60.0;
            field.update(&FrameContext::new(t, 1.0 / 60.0, ViewMode::Universe));
        }
        assert_eq!(field.mix(), 1.0);
        assert_eq!(field.buffer().positions, field.attributes().destinations().unwrap());
    }

    #[test]
    fn test_empty_field_is_rejected() {
        let p = TreeParams {
            count: 0,
            ..TreeParams::default()
        };
        assert_eq!(generate(&p).unwrap_err(), SceneError::EmptyField("tree"));
    }
}
