//! Spiral-in entrance shared by the tree, the rings and the spiral stream.
//!
//! Each particle goes through the same five steps every frame:
//!
//! 1. settle progress from the [`GrowthTimeline`]
//! 2. an expansion multiplier easing from `expansion` down to 1
//! 3. an entrance rotation easing from `rotation` down to 0
//! 4. both applied to x/z only (height is untouched)
//! 5. color fading from a flash toward the resting color, size growing in
//!
//! Only the constants differ between systems; see the presets on
//! [`EntranceProfile`].

use glam::Vec3;

use crate::easing::{blend, blend_vec3, rotate_xz, smoothstep};
use crate::growth::GrowthTimeline;

/// Tuning constants for one system's entrance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntranceProfile {
    /// Planar radius multiplier at the moment a particle appears.
    pub expansion: f32,
    /// Angular offset (radians) at the moment a particle appears.
    pub rotation: f32,
    /// Over-bright color flashed on appearance.
    pub flash_color: Vec3,
    /// Exponent applied to settle progress for the flash fade.
    pub flash_exponent: f32,
    /// Settle progress by which size has fully grown in.
    pub appear_window: f32,
}

impl EntranceProfile {
    /// Tree field: wide fling, long spin, brief white-cyan flash.
    pub const TREE: EntranceProfile = EntranceProfile {
        expansion: 4.0,
        rotation: 3.0,
        flash_color: Vec3::new(1.5, 2.0, 2.5),
        flash_exponent: 4.0,
        appear_window: 0.5,
    };

    /// Orbit rings: slightly tighter than the tree so they hug it on arrival.
    pub const RINGS: EntranceProfile = EntranceProfile {
        expansion: 3.5,
        rotation: 2.0,
        flash_color: Vec3::new(1.4, 1.6, 1.8),
        flash_exponent: 2.0,
        appear_window: 0.5,
    };

    /// Spiral stream: the stream is already moving, so the fling is mild.
    pub const SPIRAL: EntranceProfile = EntranceProfile {
        expansion: 1.6,
        rotation: 1.0,
        flash_color: Vec3::new(1.2, 1.8, 2.0),
        flash_exponent: 4.0,
        appear_window: 0.5,
    };

    /// Evaluate the entrance for a particle at `height` at time `t`.
    pub fn sample(&self, timeline: &GrowthTimeline, height: f32, t: f32) -> Entrance {
        let settle = timeline.settle_progress(height, t);
        let visible = timeline.is_visible(height, t);
        let ease = settle.sqrt();

        Entrance {
            settle,
            visible,
            expansion: blend(self.expansion, 1.0, ease),
            rotation: (1.0 - ease) * self.rotation,
            appear: smoothstep(0.0, self.appear_window, settle),
        }
    }

    /// Apply expansion then entrance rotation to the planar coordinates.
    #[inline]
    pub fn place(&self, entrance: &Entrance, position: Vec3) -> Vec3 {
        let expanded = Vec3::new(
            position.x * entrance.expansion,
            position.y,
            position.z * entrance.expansion,
        );
        rotate_xz(expanded, entrance.rotation)
    }

    /// Flash color fading into `rest` as the particle settles.
    #[inline]
    pub fn color(&self, entrance: &Entrance, rest: Vec3) -> Vec3 {
        blend_vec3(
            self.flash_color,
            rest,
            entrance.settle.powf(self.flash_exponent),
        )
    }

    /// Rendered size; exactly zero while the particle is unrevealed.
    #[inline]
    pub fn size(&self, entrance: &Entrance, base: f32) -> f32 {
        if entrance.visible {
            base * entrance.appear
        } else {
            0.0
        }
    }
}

/// Per-particle entrance state for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entrance {
    /// Settle progress in `[0, 1]`.
    pub settle: f32,
    /// Whether the reveal front has reached this particle.
    pub visible: bool,
    /// Planar radius multiplier (≥ 1).
    pub expansion: f32,
    /// Remaining entrance rotation in radians.
    pub rotation: f32,
    /// Size ramp in `[0, 1]`.
    pub appear: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrevealed_particle_has_zero_size() {
        let g = GrowthTimeline::SCENE;
        let e = EntranceProfile::TREE.sample(&g, 2.0, 0.0);
        assert!(!e.visible);
        assert_eq!(e.settle, 0.0);
        assert_eq!(EntranceProfile::TREE.size(&e, 0.4), 0.0);
    }

    #[test]
    fn test_settled_particle_is_at_rest() {
        let g = GrowthTimeline::SCENE;
        let p = Vec3::new(1.0, 0.0, 2.0);
        let e = EntranceProfile::TREE.sample(&g, p.y, 60.0);
        assert_eq!(e.settle, 1.0);
        assert_eq!(e.expansion, 1.0);
        assert_eq!(e.rotation, 0.0);
        assert_eq!(EntranceProfile::TREE.place(&e, p), p);
        let rest = Vec3::new(0.2, 0.4, 0.9);
        assert_eq!(EntranceProfile::TREE.color(&e, rest), rest);
        assert_eq!(EntranceProfile::TREE.size(&e, 0.3), 0.3);
    }

    #[test]
    fn test_fresh_particle_is_flung_and_flashing() {
        let g = GrowthTimeline::SCENE;
        let h = 0.0;
        let t = g.time_to_reveal(h);
        let e = EntranceProfile::TREE.sample(&g, h, t + 1e-4);
        assert!(e.visible);
        assert!(e.expansion > 3.5);
        assert!(e.rotation > 2.5);
        let c = EntranceProfile::TREE.color(&e, Vec3::ZERO);
        assert!(c.z > 2.4);
    }

    #[test]
    fn test_entrance_only_moves_planar_coordinates() {
        let g = GrowthTimeline::SCENE;
        let p = Vec3::new(0.5, 1.25, -0.75);
        for i in 0..50 {
            let e = EntranceProfile::RINGS.sample(&g, p.y, i as f32 * 0.1);
            let placed = EntranceProfile::RINGS.place(&e, p);
            assert_eq!(placed.y, p.y);
            let planar = (placed.x * placed.x + placed.z * placed.z).sqrt();
            let base = (p.x * p.x + p.z * p.z).sqrt();
            assert!((planar - base * e.expansion).abs() < 1e-4);
        }
    }

    #[test]
    fn test_expansion_never_increases_over_time() {
        let g = GrowthTimeline::SCENE;
        let mut last = f32::INFINITY;
        for i in 0..400 {
            let e = EntranceProfile::TREE.sample(&g, -1.0, i as f32 * 0.01);
            assert!(e.expansion <= last);
            last = e.expansion;
        }
    }
}
