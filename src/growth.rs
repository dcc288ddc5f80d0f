//! The reveal front that sweeps up the tree.
//!
//! Every entrance-animated system asks the same [`GrowthTimeline`] how high
//! the front has climbed, so the tree, the rings and the spiral stream all
//! assemble in lockstep. Hand each of them the same instance; two timelines
//! with different constants put the reveal fronts out of alignment.

use serde::{Deserialize, Serialize};

use crate::easing::smoothstep;

/// Time-keyed reveal height shared across particle systems.
///
/// `reveal(t) = start_height + max(0, t - delay) * speed`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthTimeline {
    /// Height of the front before it starts moving.
    pub start_height: f32,
    /// Upward speed of the front in height units per second.
    pub speed: f32,
    /// Seconds before the front starts moving.
    pub delay: f32,
    /// Height span over which a revealed particle settles (0 → 1).
    pub settle_window: f32,
}

impl GrowthTimeline {
    /// The timeline the whole scene grows with.
    pub const SCENE: GrowthTimeline = GrowthTimeline {
        start_height: -6.0,
        speed: 3.0,
        delay: 0.5,
        settle_window: 2.5,
    };

    /// Height of the reveal front at time `t`.
    ///
    /// Non-decreasing in `t` and equal to `start_height` until `delay`.
    #[inline]
    pub fn reveal(&self, t: f32) -> f32 {
        self.start_height + (t - self.delay).max(0.0) * self.speed
    }

    /// Whether a particle at base height `height` has been reached.
    #[inline]
    pub fn is_visible(&self, height: f32, t: f32) -> bool {
        height <= self.reveal(t)
    }

    /// How far a particle has settled since the front passed it, in `[0, 1]`.
    #[inline]
    pub fn settle_progress(&self, height: f32, t: f32) -> f32 {
        smoothstep(0.0, self.settle_window, self.reveal(t) - height)
    }

    /// Time at which the front reaches `height`.
    ///
    /// Heights at or below the start height are revealed from the first frame.
    pub fn time_to_reveal(&self, height: f32) -> f32 {
        if height <= self.start_height || self.speed <= 0.0 {
            return 0.0;
        }
        self.delay + (height - self.start_height) / self.speed
    }
}

impl Default for GrowthTimeline {
    fn default() -> Self {
        Self::SCENE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reveal_holds_until_delay() {
        let g = GrowthTimeline::SCENE;
        assert_eq!(g.reveal(0.0), g.start_height);
        assert_eq!(g.reveal(0.25), g.start_height);
        assert_eq!(g.reveal(g.delay), g.start_height);
        assert!((g.reveal(1.5) - (g.start_height + g.speed)).abs() < 1e-6);
    }

    #[test]
    fn test_reveal_is_non_decreasing() {
        let g = GrowthTimeline::SCENE;
        let mut last = g.reveal(0.0);
        for i in 1..2000 {
            let r = g.reveal(i as f32 * 0.005);
            assert!(r >= last);
            last = r;
        }
    }

    #[test]
    fn test_nothing_above_start_is_visible_before_delay() {
        let g = GrowthTimeline::SCENE;
        for t in [0.0, 0.1, 0.49] {
            assert!(!g.is_visible(g.start_height + 0.01, t));
            assert!(g.is_visible(g.start_height, t));
            assert_eq!(g.settle_progress(g.start_height + 1.0, t), 0.0);
        }
    }

    #[test]
    fn test_settle_progress_saturates() {
        let g = GrowthTimeline::SCENE;
        let h = 0.0;
        let t_reach = g.time_to_reveal(h);
        assert!(g.settle_progress(h, t_reach) < 1e-6);
        let t_done = t_reach + g.settle_window / g.speed;
        assert!((g.settle_progress(h, t_done) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_time_to_reveal_matches_visibility() {
        let g = GrowthTimeline::SCENE;
        let h = 3.0;
        let t = g.time_to_reveal(h);
        assert!(!g.is_visible(h, t - 0.01));
        assert!(g.is_visible(h, t + 0.01));
        assert_eq!(g.time_to_reveal(-10.0), 0.0);
    }
}
