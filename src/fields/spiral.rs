//! The cyan stream that winds up around the tree.
//!
//! Particles travel a fixed helix from the base to the tip and wrap around,
//! each offset along the path by its index so together they read as a ribbon.
//! The ribbon's width comes from a per-particle jitter drawn once at creation.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::{FrameContext, ParticleSystem};
use crate::attributes::{AttributeSetBuilder, ParticleAttributeSet, ParticleSeed, RenderBuffer};
use crate::easing::{blend, blend_vec3, fract};
use crate::entrance::EntranceProfile;
use crate::error::SceneError;
use crate::growth::GrowthTimeline;
use crate::mode::{ModeMix, ViewMode};
use crate::spawn::SpawnContext;
use crate::visuals::{palette, SpriteShape};

/// Layout and behaviour constants for the spiral stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiralParams {
    pub count: u32,
    /// Path cycles per second.
    pub flow_rate: f32,
    /// Path offset between consecutive particles.
    pub spacing: f32,
    /// Total height travelled per cycle.
    pub height: f32,
    /// Radius at the bottom of the path.
    pub radius: f32,
    /// Full turns around the tree per cycle.
    pub turns: f32,
    /// Angular drift of the whole helix, radians per second.
    pub sweep: f32,
    /// Half-width of the fixed per-axis jitter.
    pub jitter: f32,
    pub size: f32,
    pub opacity: f32,
    /// Outer radius of the galaxy disc in universe mode.
    pub galaxy_radius: f32,
    pub mix_rate: f32,
    pub seed: u64,
}

impl Default for SpiralParams {
    fn default() -> Self {
        Self {
            count: 600,
            flow_rate: 0.5,
            spacing: 0.005,
            height: 11.0,
            radius: 4.0,
            turns: 6.0,
            sweep: 0.5,
            jitter: 0.1,
            size: 0.15,
            opacity: 0.8,
            galaxy_radius: 26.0,
            mix_rate: 1.0,
            seed: 0x7370_6972,
        }
    }
}

/// Draw the spiral's static attributes.
///
/// Position holds the ribbon jitter; phase holds the path offset.
pub fn generate(params: &SpiralParams) -> Result<ParticleAttributeSet, SceneError> {
    if params.count == 0 {
        return Err(SceneError::EmptyField("spiral"));
    }

    let mut builder = AttributeSetBuilder::with_capacity(params.count as usize);
    for i in 0..params.count {
        let mut ctx = SpawnContext::new(params.seed, i, params.count);
        let jitter = ctx.random_jitter(params.jitter);

        // Two-armed logarithmic spiral disc.
        let arm = (i % 2) as f32 * PI;
        let r = 6.0 + (params.galaxy_radius - 6.0) * ctx.random();
        let theta = arm + r.ln() * 2.5 + ctx.random_signed(0.35);
        let destination = Vec3::new(theta.cos() * r, ctx.random_signed(1.5), theta.sin() * r);

        builder.push(ParticleSeed {
            position: jitter,
            destination: Some(destination),
            color: palette::spiral() * params.opacity,
            size: params.size,
            phase: i as f32 * params.spacing,
            speed: params.flow_rate,
        });
    }
    builder.build()
}

/// Point on the helix at path position `c` in `[0, 1)` at time `t`.
#[inline]
pub fn path_point(params: &SpiralParams, c: f32, t: f32) -> Vec3 {
    let height = c * params.height - params.height / 2.0;
    let radius = params.radius * (1.0 - c);
    let angle = c * TAU * params.turns - t * params.sweep;
    Vec3::new(angle.cos() * radius, height, angle.sin() * radius)
}

/// Compute every stream particle's render state.
pub fn transform(
    attrs: &ParticleAttributeSet,
    params: &SpiralParams,
    growth: &GrowthTimeline,
    t: f32,
    mix: f32,
    out: &mut RenderBuffer,
) {
    let profile = EntranceProfile::SPIRAL;
    let destinations = attrs.destinations();

    for i in 0..attrs.len() {
        let c = fract(t * attrs.speeds()[i] + attrs.phases()[i]);
        let on_path = path_point(params, c, t);

        // Gate on the path height, not the jittered one, so the ribbon edge is clean.
        let e = profile.sample(growth, on_path.y, t);
        let mut pos = profile.place(&e, on_path + attrs.positions()[i]);
        let mut size = profile.size(&e, attrs.sizes()[i]);
        let mut color = profile.color(&e, attrs.colors()[i]);

        if let Some(dest) = destinations {
            pos = blend_vec3(pos, dest[i], mix);
            if e.visible {
                size = blend(size, attrs.sizes()[i] * 0.6, mix);
            }
            color = blend_vec3(color, blend_vec3(attrs.colors()[i], palette::STARFIELD, 0.3), mix);
        }

        out.positions[i] = pos;
        out.sizes[i] = size;
        out.colors[i] = color;
        out.settle[i] = e.settle;
        out.visible[i] = e.visible;
    }
}

/// The spiral stream.
pub struct MagicSpiral {
    params: SpiralParams,
    growth: GrowthTimeline,
    attributes: ParticleAttributeSet,
    buffer: RenderBuffer,
    mix: ModeMix,
}

impl MagicSpiral {
    /// Generate the stream. `growth` must be the scene's shared timeline.
    pub fn new(params: &SpiralParams, growth: GrowthTimeline, mode: ViewMode) -> Result<Self, SceneError> {
        let attributes = generate(params)?;
        let buffer = RenderBuffer::new(attributes.len());
        Ok(Self {
            params: *params,
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

    /// Path shape of the stream.
    pub fn params(&self) -> &SpiralParams {
        &self.params
    }
}

impl ParticleSystem for MagicSpiral {
    fn label(&self) -> &'static str {
        "spiral"
    }

    fn attributes(&self) -> &ParticleAttributeSet {
        &self.attributes
    }

    fn update(&mut self, frame: &FrameContext) {
        let mix = self.mix.update(frame.mode, frame.delta);
        transform(
            &self.attributes,
            &self.params,
            &self.growth,
            frame.time,
            mix,
            &mut self.buffer,
        );
    }

    fn buffer(&self) -> &RenderBuffer {
        &self.buffer
    }

    fn mix(&self) -> f32 {
        self.mix.value()
    }

    fn shape(&self) -> SpriteShape {
        SpriteShape::Star
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_tapers_to_tip() {
        let p = SpiralParams::default();
        let bottom = path_point(&p, 0.0, 0.0);
        assert!((bottom.y - -5.5).abs() < 1e-6);
        assert!((Vec3::new(bottom.x, 0.0, bottom.z).length() - 4.0).abs() < 1e-5);
        let near_top = path_point(&p, 0.999, 0.0);
        assert!(near_top.y > 5.4);
        assert!(Vec3::new(near_top.x, 0.0, near_top.z).length() < 0.01);
    }

    #[test]
    fn test_jitter_is_fixed_between_frames() {
        let p = SpiralParams::default();
        let growth = GrowthTimeline::SCENE;
        let attrs = generate(&p).unwrap();
        let mut a = RenderBuffer::new(attrs.len());
        let mut b = RenderBuffer::new(attrs.len());
        transform(&attrs, &p, &growth, 12.25, 0.0, &mut a);
        transform(&attrs, &p, &growth, 12.25, 0.0, &mut b);
        assert_eq!(a.positions, b.positions);
        for j in attrs.positions() {
            assert!(j.abs().max_element() <= p.jitter);
        }
    }

    #[test]
    fn test_hidden_particles_keep_position() {
        let p = SpiralParams::default();
        let growth = GrowthTimeline::SCENE;
        let attrs = generate(&p).unwrap();
        let mut out = RenderBuffer::new(attrs.len());
        let t = 1.0;
        transform(&attrs, &p, &growth, t, 0.0, &mut out);
        let mut hidden = 0;
        for i in 0..attrs.len() {
            let c = fract(t * attrs.speeds()[i] + attrs.phases()[i]);
            if !growth.is_visible(path_point(&p, c, t).y, t) {
                hidden += 1;
                assert_eq!(out.sizes[i], 0.0);
                assert!(out.positions[i].y > -10.0);
            }
        }
        assert!(hidden > 0);
    }

    #[test]
    fn test_mix_endpoints_are_exact() {
        let p = SpiralParams::default();
        let growth = GrowthTimeline::SCENE;
        let attrs = generate(&p).unwrap();
        let dest = attrs.destinations().unwrap();
        let t = 30.0;

        let mut universe = RenderBuffer::new(attrs.len());
        transform(&attrs, &p, &growth, t, 1.0, &mut universe);
        assert_eq!(universe.positions.as_slice(), dest);

        let mut tree = RenderBuffer::new(attrs.len());
        transform(&attrs, &p, &growth, t, 0.0, &mut tree);
        let profile = EntranceProfile::SPIRAL;
        for i in 0..attrs.len() {
            let c = fract(t * attrs.speeds()[i] + attrs.phases()[i]);
            let on_path = path_point(&p, c, t);
            let e = profile.sample(&growth, on_path.y, t);
            assert_eq!(tree.positions[i], profile.place(&e, on_path + attrs.positions()[i]));
        }
    }

    #[test]
    fn test_universe_tint_ignores_entrance_flash() {
        let p = SpiralParams::default();
        let growth = GrowthTimeline::SCENE;
        let attrs = generate(&p).unwrap();
        let mut early = RenderBuffer::new(attrs.len());
        let mut late = RenderBuffer::new(attrs.len());
        transform(&attrs, &p, &growth, 0.0, 1.0, &mut early);
        transform(&attrs, &p, &growth, 30.0, 1.0, &mut late);
        for i in 0..attrs.len() {
            let target = blend_vec3(attrs.colors()[i], palette::STARFIELD, 0.3);
            assert!(early.colors[i].abs_diff_eq(target, 1e-5));
            assert!(late.colors[i].abs_diff_eq(target, 1e-5));
        }
    }
}
