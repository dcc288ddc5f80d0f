//! The star on top of the tree.
//!
//! A single decorated anchor rather than a field: it pops in with an elastic
//! overshoot after the tree has mostly assembled, bobs and turns while idle,
//! and in universe mode glides to a distant anchor while growing.

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::attributes::SpriteInstance;
use crate::easing::{blend, blend_vec3, ease_out_elastic};
use crate::fields::FrameContext;
use crate::mode::{ModeMix, ViewMode};
use crate::visuals::{hex, palette, SpriteShape};

/// Sample points per decorative ring.
pub const RING_POINTS: usize = 32;
/// Sprites emitted by [`write_sprites`]: halo, core, two per spike, both rings.
pub const STAR_SPRITES: usize = 2 + 6 * 2 + RING_POINTS * 2;

/// Torus radius of the decorative rings before scaling.
const RING_RADIUS: f32 = 0.7;

/// Timing, motion and universe-anchor constants for the star.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarParams {
    /// Seconds before the pop-in starts.
    pub appear_time: f32,
    /// Pop-in progress per second.
    pub pop_rate: f32,
    /// Idle hover height.
    pub hover_height: f32,
    pub bob_amplitude: f32,
    pub bob_frequency: f32,
    /// Body yaw in radians per second.
    pub spin: f32,
    /// Where the star rests in universe mode.
    pub universe_anchor: Vec3,
    /// Scale multiplier at full universe mix.
    pub universe_scale: f32,
    pub mix_rate: f32,
}

impl Default for StarParams {
    fn default() -> Self {
        Self {
            appear_time: 5.0,
            pop_rate: 1.5,
            hover_height: 5.2,
            bob_amplitude: 0.1,
            bob_frequency: 2.0,
            spin: 0.2,
            universe_anchor: Vec3::new(0.0, 7.5, -14.0),
            universe_scale: 2.5,
            mix_rate: 2.0,
        }
    }
}

/// The star's full transform for one frame, in tree-group space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarPose {
    pub position: Vec3,
    /// Uniform scale; exactly 0 before the pop-in.
    pub scale: f32,
    pub body: Quat,
    /// Inner ring orientation relative to the body.
    pub ring_a: Quat,
    /// Outer ring orientation relative to the body.
    pub ring_b: Quat,
}

/// Pop-in scale at time `t`.
pub fn pop_scale(params: &StarParams, t: f32) -> f32 {
    if t <= params.appear_time {
        return 0.0;
    }
    let progress = ((t - params.appear_time) * params.pop_rate).min(1.0);
    ease_out_elastic(progress)
}

/// Compute the star's pose at time `t` and blend `mix`.
pub fn pose_at(params: &StarParams, t: f32, mix: f32) -> StarPose {
    let idle = Vec3::new(
        0.0,
        params.hover_height + (t * params.bob_frequency).sin() * params.bob_amplitude,
        0.0,
    );
    StarPose {
        position: blend_vec3(idle, params.universe_anchor, mix),
        scale: pop_scale(params, t) * blend(1.0, params.universe_scale, mix),
        body: Quat::from_rotation_y(t * params.spin),
        ring_a: Quat::from_euler(EulerRot::XYZ, t * 0.5, t * 0.3, 0.0),
        ring_b: Quat::from_euler(EulerRot::XYZ, -t * 0.4, 0.0, t * 0.2),
    }
}

/// The top star component.
pub struct TopStar {
    params: StarParams,
    mix: ModeMix,
    pose: StarPose,
}

impl TopStar {
    pub fn new(params: &StarParams, mode: ViewMode) -> Self {
        let mix = ModeMix::new(mode, params.mix_rate);
        Self {
            params: *params,
            pose: pose_at(params, 0.0, mix.value()),
            mix,
        }
    }

    pub fn update(&mut self, frame: &FrameContext) {
        let mix = self.mix.update(frame.mode, frame.delta);
        self.pose = pose_at(&self.params, frame.time, mix);
    }

    /// Pose from the most recent update.
    pub fn pose(&self) -> &StarPose {
        &self.pose
    }

    pub fn mix(&self) -> f32 {
        self.mix.value()
    }

    pub fn params(&self) -> &StarParams {
        &self.params
    }
}

/// Append the star as [`STAR_SPRITES`] sprites, offset by `origin`.
///
/// Sizes are world-space diameters.
///
/// Always emits the same number of sprites; a hidden star emits them with
/// zero size.
pub fn write_sprites(pose: &StarPose, origin: Vec3, out: &mut Vec<SpriteInstance>) {
    let center = origin + pose.position;
    let s = pose.scale;
    let body = palette::star_body();

    out.reserve(STAR_SPRITES);
    out.push(SpriteInstance::new(center, 1.2 * s, hex(0xbae6fd) * 0.35, SpriteShape::Glow));
    out.push(SpriteInstance::new(center, 0.7 * s, Vec3::splat(2.5), SpriteShape::Star));

    // Vertical spikes are longer than the other four.
    let spikes = [
        (Vec3::Y, 1.4),
        (Vec3::NEG_Y, 1.4),
        (Vec3::X, 1.2),
        (Vec3::NEG_X, 1.2),
        (Vec3::Z, 1.2),
        (Vec3::NEG_Z, 1.2),
    ];
    for (axis, length) in spikes {
        let dir = pose.body * axis;
        for (along, size) in [(0.35, 0.3), (0.8, 0.18)] {
            let p = center + dir * (along * length * s);
            out.push(SpriteInstance::new(p, size * s, body * 1.8, SpriteShape::Glow));
        }
    }

    let rings = [
        (pose.ring_a, 1.0, hex(0x7dd3fc) * 0.6),
        (pose.ring_b, 1.2, palette::star_ring() * 0.4),
    ];
    for (orientation, ring_scale, color) in rings {
        let rotation = pose.body * orientation;
        let radius = RING_RADIUS * ring_scale * s;
        for k in 0..RING_POINTS {
            let a = k as f32 / RING_POINTS as f32 * std::f32::consts::TAU;
            let local = Vec3::new(a.cos(), a.sin(), 0.0) * radius;
            out.push(SpriteInstance::new(
                center + rotation * local,
                0.07 * s,
                color,
                SpriteShape::Glow,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_hidden_until_appear_time() {
        let p = StarParams::default();
        assert_eq!(pop_scale(&p, 0.0), 0.0);
        assert_eq!(pop_scale(&p, 4.99), 0.0);
        assert_eq!(pop_scale(&p, 5.0), 0.0);
        assert!(pop_scale(&p, 5.01) > 0.0);
        assert_eq!(pop_scale(&p, 5.0 + 1.0 / 1.5 + 0.01), 1.0);
    }

    #[test]
    fn test_star_bobs_around_hover_height() {
        let p = StarParams::default();
        for i in 0..100 {
            let pose = pose_at(&p, i as f32 * 0.13, 0.0);
            assert!((pose.position.y - p.hover_height).abs() <= p.bob_amplitude + 1e-6);
            assert_eq!(pose.position.x, 0.0);
        }
    }

    #[test]
    fn test_universe_pose_is_exact() {
        let p = StarParams::default();
        let pose = pose_at(&p, 30.0, 1.0);
        assert_eq!(pose.position, p.universe_anchor);
        assert_eq!(pose.scale, p.universe_scale);
    }

    #[test]
    fn test_sprite_count_is_constant() {
        let p = StarParams::default();
        let mut out = Vec::new();
        write_sprites(&pose_at(&p, 0.0, 0.0), Vec3::ZERO, &mut out);
        assert_eq!(out.len(), STAR_SPRITES);
        assert!(out.iter().all(|s| s.size == 0.0));
        out.clear();
        write_sprites(&pose_at(&p, 20.0, 0.0), Vec3::ZERO, &mut out);
        assert_eq!(out.len(), STAR_SPRITES);
        assert!(out.iter().all(|s| s.size > 0.0));
    }

    #[test]
    fn test_star_follows_mode() {
        let mut star = TopStar::new(&StarParams::default(), ViewMode::Tree);
        let mut t = 0.0;
        for _ in 0..300 {
            t += 1.0 / 60.0;
            star.update(&FrameContext::new(t, 1.0 / 60.0, ViewMode::Universe));
        }
        assert_eq!(star.mix(), 1.0);
        assert_eq!(star.pose().position, star.params().universe_anchor);
    }
}
