//! Orbiting star rings that hug the tree like gyroscope bands.

use std::f32::consts::TAU;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::{FrameContext, ParticleSystem};
use crate::attributes::{AttributeSetBuilder, ParticleAttributeSet, ParticleSeed, RenderBuffer};
use crate::easing::{blend_vec3, rotate_xz};
use crate::entrance::EntranceProfile;
use crate::error::SceneError;
use crate::growth::GrowthTimeline;
use crate::mode::{ModeMix, ViewMode};
use crate::spawn::SpawnContext;
use crate::visuals::palette;

const PULSE_FREQUENCY: f32 = 3.0;
/// How much of the rings' brightness is lost at full universe mix.
const UNIVERSE_DIM: f32 = 0.6;
/// Seed offset for per-particle draws, kept apart from the per-ring stream.
const PARTICLE_STREAM: u64 = 0x5041_5254;

/// Layout and behaviour constants for the ring field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingParams {
    pub rings: u32,
    pub per_ring: u32,
    /// Height of the tree the rings wrap.
    pub tree_height: f32,
    /// Radius of the tree at its base.
    pub max_radius: f32,
    /// Fraction of the tree height the rings span.
    pub height_span: f32,
    /// Vertical offset applied to every ring.
    pub lift: f32,
    /// Gap between ring and tree surface.
    pub clearance: f32,
    /// Largest tilt around X in radians.
    pub max_tilt: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Radius of the innermost universe orbit.
    pub universe_radius: f32,
    /// Radius step between universe orbits.
    pub universe_spacing: f32,
    pub mix_rate: f32,
    pub seed: u64,
}

impl Default for RingParams {
    fn default() -> Self {
        Self {
            rings: 8,
            per_ring: 120,
            tree_height: 10.0,
            max_radius: 3.8,
            height_span: 0.85,
            lift: 0.5,
            clearance: 0.2,
            max_tilt: 0.15,
            min_speed: 0.3,
            max_speed: 0.6,
            universe_radius: 12.0,
            universe_spacing: 2.5,
            mix_rate: 1.2,
            seed: 0x7269_6e67,
        }
    }
}

/// One ring's shared orbit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingSpec {
    /// Height of the ring center.
    pub height: f32,
    pub radius: f32,
    /// Tilt around the X axis in radians.
    pub tilt: f32,
    /// Signed angular speed in radians per second.
    pub speed: f32,
}

impl RingSpec {
    /// Point on this ring at orbit `angle`, tilted, centered at the ring height.
    #[inline]
    pub fn point(&self, angle: f32) -> Vec3 {
        let x = angle.cos() * self.radius;
        let z = angle.sin() * self.radius;
        let (s, c) = self.tilt.sin_cos();
        Vec3::new(x, self.height - z * s, z * c)
    }
}

/// Draw the per-ring orbits.
pub fn generate_rings(params: &RingParams) -> Vec<RingSpec> {
    let denominator = params.rings.saturating_sub(1).max(1) as f32;
    (0..params.rings)
        .map(|r| {
            let mut ctx = SpawnContext::new(params.seed, r, params.rings);
            let rel_y = r as f32 / denominator;
            let height = rel_y * params.tree_height * params.height_span - params.tree_height / 2.0
                + params.lift;
            let radius = params.max_radius * (1.0 - rel_y) + params.clearance;
            let tilt = ctx.random_signed(params.max_tilt);
            let direction = if ctx.chance(0.5) { 1.0 } else { -1.0 };
            let speed = direction * ctx.random_range(params.min_speed, params.max_speed);
            RingSpec {
                height,
                radius,
                tilt,
                speed,
            }
        })
        .collect()
}

/// Draw the per-particle attributes for `rings`.
///
/// The stored position is the untilted ring point at the particle's starting
/// angle; the phase holds that angle.
pub fn generate(params: &RingParams, rings: &[RingSpec]) -> Result<ParticleAttributeSet, SceneError> {
    let total = rings.len() as u32 * params.per_ring;
    if total == 0 {
        return Err(SceneError::EmptyField("rings"));
    }

    let mut builder = AttributeSetBuilder::with_capacity(total as usize);
    for (r, ring) in rings.iter().enumerate() {
        // Each universe orbit gets its own wide tilt and facing.
        let mut orbit = SpawnContext::new(params.seed ^ PARTICLE_STREAM, r as u32, rings.len() as u32);
        let orbit_radius = params.universe_radius + params.universe_spacing * r as f32;
        let orbit_tilt = orbit.random_signed(0.6);
        let orbit_yaw = orbit.random() * TAU;
        let orbit_lift = orbit.random_signed(3.0);
        let universe = RingSpec {
            height: orbit_lift,
            radius: orbit_radius,
            tilt: orbit_tilt,
            speed: 0.0,
        };

        for p in 0..params.per_ring {
            let index = r as u32 * params.per_ring + p;
            let mut ctx = SpawnContext::new(params.seed ^ PARTICLE_STREAM, index + rings.len() as u32, total);
            let angle = p as f32 / params.per_ring as f32 * TAU;
            builder.push(ParticleSeed {
                position: Vec3::new(angle.cos() * ring.radius, ring.height, angle.sin() * ring.radius),
                destination: Some(rotate_xz(universe.point(angle), orbit_yaw)),
                color: palette::RING_BASE,
                size: ctx.random_range(0.1, 0.3),
                phase: angle,
                speed: ring.speed,
            });
        }
    }
    builder.build()
}

/// Compute every ring particle's render state.
pub fn transform(
    attrs: &ParticleAttributeSet,
    rings: &[RingSpec],
    per_ring: u32,
    growth: &GrowthTimeline,
    t: f32,
    mix: f32,
    out: &mut RenderBuffer,
) {
    let profile = EntranceProfile::RINGS;
    let per_ring = per_ring.max(1) as usize;
    let destinations = attrs.destinations();

    for i in 0..attrs.len() {
        let Some(ring) = rings.get(i / per_ring) else {
            out.sizes[i] = 0.0;
            out.visible[i] = false;
            continue;
        };
        let start_angle = attrs.phases()[i];
        let angle = start_angle + t * attrs.speeds()[i];
        let orbit = ring.point(angle);

        // Visibility follows the tilted height so a tipped ring reveals unevenly.
        let e = profile.sample(growth, orbit.y, t);
        let mut pos = profile.place(&e, orbit);
        let mut size = profile.size(&e, attrs.sizes()[i]);

        let pulse = (t * PULSE_FREQUENCY + start_angle * 2.0).sin() * 0.2 + 0.8;
        let mut color = profile.color(&e, attrs.colors()[i] * pulse);

        if let Some(dest) = destinations {
            pos = blend_vec3(pos, dest[i], mix);
            color *= 1.0 - UNIVERSE_DIM * mix;
        }
        if !e.visible {
            size = 0.0;
        }

        out.positions[i] = pos;
        out.sizes[i] = size;
        out.colors[i] = color;
        out.settle[i] = e.settle;
        out.visible[i] = e.visible;
    }
}

/// The orbiting ring field.
pub struct StarRings {
    growth: GrowthTimeline,
    rings: Vec<RingSpec>,
    per_ring: u32,
    attributes: ParticleAttributeSet,
    buffer: RenderBuffer,
    mix: ModeMix,
}

impl StarRings {
    /// Generate the rings. `growth` must be the scene's shared timeline.
    pub fn new(params: &RingParams, growth: GrowthTimeline, mode: ViewMode) -> Result<Self, SceneError> {
        let rings = generate_rings(params);
        let attributes = generate(params, &rings)?;
        let buffer = RenderBuffer::new(attributes.len());
        Ok(Self {
            growth,
            rings,
            per_ring: params.per_ring,
            attributes,
            buffer,
            mix: ModeMix::new(mode, params.mix_rate),
        })
    }

    /// Per-ring orbits.
    pub fn rings(&self) -> &[RingSpec] {
        &self.rings
    }

    /// The timeline this field reveals with.
    pub fn growth(&self) -> &GrowthTimeline {
        &self.growth
    }

    /// Particles per ring.
    pub fn per_ring(&self) -> u32 {
        self.per_ring
    }
}

impl ParticleSystem for StarRings {
    fn label(&self) -> &'static str {
        "rings"
    }

    fn attributes(&self) -> &ParticleAttributeSet {
        &self.attributes
    }

    fn update(&mut self, frame: &FrameContext) {
        let mix = self.mix.update(frame.mode, frame.delta);
        transform(
            &self.attributes,
            &self.rings,
            self.per_ring,
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_layout_tapers() {
        let rings = generate_rings(&RingParams::default());
        assert_eq!(rings.len(), 8);
        assert!((rings[0].height - -4.5).abs() < 1e-5);
        assert!((rings[7].height - 4.0).abs() < 1e-5);
        assert!((rings[0].radius - 4.0).abs() < 1e-5);
        assert!((rings[7].radius - 0.2).abs() < 1e-5);
        for ring in &rings {
            assert!(ring.tilt.abs() <= 0.15);
            assert!((0.3..=0.6).contains(&ring.speed.abs()));
        }
    }

    #[test]
    fn test_tilt_keeps_radius() {
        let ring = RingSpec {
            height: 1.0,
            radius: 2.0,
            tilt: 0.15,
            speed: 0.5,
        };
        for k in 0..16 {
            let p = ring.point(k as f32 * 0.4);
            let offset = p - Vec3::new(0.0, ring.height, 0.0);
            assert!((offset.length() - ring.radius).abs() < 1e-5);
        }
    }

    #[test]
    fn test_hidden_rings_have_zero_size() {
        let params = RingParams::default();
        let growth = GrowthTimeline::SCENE;
        let rings = generate_rings(&params);
        let attrs = generate(&params, &rings).unwrap();
        let mut out = RenderBuffer::new(attrs.len());
        transform(&attrs, &rings, params.per_ring, &growth, 1.0, 0.0, &mut out);
        let reveal = growth.reveal(1.0);
        for i in 0..attrs.len() {
            let ring = rings[i / params.per_ring as usize];
            let h = ring.point(attrs.phases()[i] + attrs.speeds()[i]).y;
            if h > reveal {
                assert_eq!(out.sizes[i], 0.0);
            }
        }
    }

    #[test]
    fn test_universe_dims_and_lands_on_orbit() {
        let params = RingParams::default();
        let growth = GrowthTimeline::SCENE;
        let rings = generate_rings(&params);
        let attrs = generate(&params, &rings).unwrap();
        let mut tree = RenderBuffer::new(attrs.len());
        let mut universe = RenderBuffer::new(attrs.len());
        transform(&attrs, &rings, params.per_ring, &growth, 20.0, 0.0, &mut tree);
        transform(&attrs, &rings, params.per_ring, &growth, 20.0, 1.0, &mut universe);
        let dest = attrs.destinations().unwrap();
        for i in 0..attrs.len() {
            assert_eq!(universe.positions[i], dest[i]);
            assert!(universe.colors[i].z < tree.colors[i].z);
        }
    }
}
