//! Photo cards hung on the tree that float off into space in universe mode.
//!
//! Tree placement is a pure function of `(index, count)`; universe placement
//! is drawn once from a seeded RNG when the gallery is built. Each card then
//! eases its own position and scale toward whichever target the current mode
//! selects. Selecting a card only reports it; whether a viewer is open is the
//! caller's business.

use std::f32::consts::TAU;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::attributes::SpriteInstance;
use crate::easing::smoothing_factor;
use crate::fields::FrameContext;
use crate::hit::{intersect_sphere, Ray};
use crate::mode::ViewMode;
use crate::spawn::{spherical, SpawnContext};
use crate::visuals::{palette, SpriteShape};

/// Golden ratio; successive cards are spaced by this many full turns.
pub const GOLDEN_RATIO: f32 = 1.618_034;

/// Placement and easing constants for the gallery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryParams {
    pub tree_height: f32,
    pub max_radius: f32,
    /// Fraction of the tree height the cards span.
    pub height_span: f32,
    /// Vertical offset of the lowest card.
    pub lift: f32,
    /// Gap between card and tree surface.
    pub clearance: f32,
    /// Shell radius of the first card in universe mode.
    pub universe_radius: f32,
    /// Shell radius added per card.
    pub universe_step: f32,
    /// Half-width of the azimuth jitter in universe mode.
    pub azimuth_jitter: f32,
    /// Position easing rate toward the tree.
    pub tree_rate: f32,
    /// Position easing rate toward the universe.
    pub universe_rate: f32,
    pub scale_rate: f32,
    pub tree_scale: f32,
    pub universe_scale: f32,
    /// Scale multiplier while hovered.
    pub hover_boost: f32,
    /// Vertical bob amplitude in universe mode.
    pub drift_amplitude: f32,
    /// Roll amplitude in radians in universe mode.
    pub roll_amplitude: f32,
    /// Easing rate of the drift weight.
    pub drift_rate: f32,
    pub seed: u64,
}

impl Default for GalleryParams {
    fn default() -> Self {
        Self {
            tree_height: 10.0,
            max_radius: 3.8,
            height_span: 0.75,
            lift: 1.2,
            clearance: 0.45,
            universe_radius: 18.0,
            universe_step: 4.0,
            azimuth_jitter: 0.5,
            tree_rate: 2.5,
            universe_rate: 1.2,
            scale_rate: 4.0,
            tree_scale: 0.65,
            universe_scale: 3.5,
            hover_boost: 1.15,
            drift_amplitude: 0.75,
            roll_amplitude: 0.08,
            drift_rate: 2.0,
            seed: 0x7068_6f74,
        }
    }
}

/// Card position on the tree surface.
///
/// Pure in `(index, count)`: the same inputs give the same bits every run.
pub fn tree_position(params: &GalleryParams, index: usize, count: usize) -> Vec3 {
    if count == 0 {
        return Vec3::ZERO;
    }
    let rel_y = index as f32 / count as f32;
    let y = rel_y * params.tree_height * params.height_span - params.tree_height / 2.0 + params.lift;
    let radius = params.max_radius * (1.0 - rel_y) + params.clearance;
    let angle = index as f32 * TAU * GOLDEN_RATIO;
    Vec3::new(angle.cos() * radius, y, angle.sin() * radius)
}

/// Card position in universe mode, drawn from the gallery's seeded stream.
pub fn universe_position(params: &GalleryParams, index: usize, count: usize) -> Vec3 {
    if count == 0 {
        return Vec3::ZERO;
    }
    let mut ctx = SpawnContext::new(params.seed, index as u32, count as u32);
    let radius = params.universe_radius + params.universe_step * index as f32;
    let theta = index as f32 / count as f32 * TAU + ctx.random_signed(params.azimuth_jitter);
    let phi = (2.0 * ctx.random() - 1.0).clamp(-1.0, 1.0).acos();
    spherical(radius, theta, phi)
}

/// One photo card.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoItem {
    pub index: usize,
    /// Image reference handed to the viewer.
    pub uri: String,
    pub tree_position: Vec3,
    pub universe_position: Vec3,
    /// Eased position before drift.
    pub position: Vec3,
    pub scale: f32,
    /// Roll around the view axis in radians.
    pub roll: f32,
    /// How much universe drift currently applies, in `[0, 1]`.
    pub drift_weight: f32,
    /// Vertical drift offset this frame.
    pub drift: f32,
    pub hovered: bool,
}

impl PhotoItem {
    /// Position the card is drawn and picked at.
    #[inline]
    pub fn render_position(&self) -> Vec3 {
        self.position + Vec3::new(0.0, self.drift, 0.0)
    }

    /// Picking radius; cards are unit squares scaled by `scale`.
    #[inline]
    pub fn pick_radius(&self) -> f32 {
        self.scale * 0.5
    }

    fn target(&self, mode: ViewMode) -> Vec3 {
        match mode {
            ViewMode::Tree => self.tree_position,
            ViewMode::Universe => self.universe_position,
        }
    }
}

/// What a selection reports to the photo viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoSelection {
    pub index: usize,
    pub uri: String,
}

/// All photo cards.
pub struct Gallery {
    params: GalleryParams,
    items: Vec<PhotoItem>,
}

impl Gallery {
    /// Place one card per URI, resting at `mode`'s layout.
    pub fn new(params: &GalleryParams, uris: &[String], mode: ViewMode) -> Self {
        let count = uris.len();
        let items = uris
            .iter()
            .enumerate()
            .map(|(index, uri)| {
                let tree_position = tree_position(params, index, count);
                let universe_position = universe_position(params, index, count);
                let (position, scale, drift_weight) = match mode {
                    ViewMode::Tree => (tree_position, params.tree_scale, 0.0),
                    ViewMode::Universe => (universe_position, params.universe_scale, 1.0),
                };
                PhotoItem {
                    index,
                    uri: uri.clone(),
                    tree_position,
                    universe_position,
                    position,
                    scale,
                    roll: 0.0,
                    drift_weight,
                    drift: 0.0,
                    hovered: false,
                }
            })
            .collect();
        Self {
            params: *params,
            items,
        }
    }

    pub fn items(&self) -> &[PhotoItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Ease every card toward the current mode's layout.
    pub fn update(&mut self, frame: &FrameContext) {
        let p = &self.params;
        let dt = frame.delta;
        let t = frame.time;
        let (rate, base_scale, drift_target) = match frame.mode {
            ViewMode::Tree => (p.tree_rate, p.tree_scale, 0.0),
            ViewMode::Universe => (p.universe_rate, p.universe_scale, 1.0),
        };
        let k_pos = smoothing_factor(rate, dt);
        let k_scale = smoothing_factor(p.scale_rate, dt);
        let k_drift = smoothing_factor(p.drift_rate, dt);

        for item in &mut self.items {
            let target = item.target(frame.mode);
            item.position += (target - item.position) * k_pos;

            let boost = if item.hovered { p.hover_boost } else { 1.0 };
            item.scale += (base_scale * boost - item.scale) * k_scale;

            item.drift_weight += (drift_target - item.drift_weight) * k_drift;
            let w = item.drift_weight;
            item.drift = (t * 0.4 + item.tree_position.x * 2.0).sin() * p.drift_amplitude * w;
            item.roll = (t * 0.2 + item.tree_position.y * 1.5).sin() * p.roll_amplitude * w;
        }
    }

    /// Nearest card hit by `ray` (in the gallery's own space).
    pub fn pick(&self, ray: &Ray) -> Option<usize> {
        self.pick_hit(ray).map(|(index, _)| index)
    }

    /// Nearest card hit by `ray` with its distance along the ray.
    pub fn pick_hit(&self, ray: &Ray) -> Option<(usize, f32)> {
        self.items
            .iter()
            .filter_map(|item| {
                intersect_sphere(ray, item.render_position(), item.pick_radius())
                    .map(|d| (item.index, d))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Mark at most one card as hovered.
    pub fn set_hovered(&mut self, hovered: Option<usize>) {
        for item in &mut self.items {
            item.hovered = Some(item.index) == hovered;
        }
    }

    /// Currently hovered card, if any.
    pub fn hovered(&self) -> Option<usize> {
        self.items.iter().find(|i| i.hovered).map(|i| i.index)
    }

    /// Report card `index` for the photo viewer.
    pub fn select(&self, index: usize) -> Option<PhotoSelection> {
        self.items.get(index).map(|item| PhotoSelection {
            index: item.index,
            uri: item.uri.clone(),
        })
    }

    /// Append one frame sprite per card, offset by `origin`.
    pub fn write_sprites(&self, origin: Vec3, out: &mut Vec<SpriteInstance>) {
        out.reserve(self.items.len());
        for item in &self.items {
            let color = if item.hovered {
                palette::spiral() * 0.8
            } else {
                palette::slate() * 0.45
            };
            out.push(SpriteInstance::new(
                origin + item.render_position(),
                item.scale * 1.15,
                color,
                SpriteShape::Frame,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uris(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("photos/memory-{:02}.jpg", i + 1)).collect()
    }

    #[test]
    fn test_tree_position_is_pure() {
        let p = GalleryParams::default();
        for i in 0..5 {
            assert_eq!(
                tree_position(&p, i, 5).to_array().map(f32::to_bits),
                tree_position(&p, i, 5).to_array().map(f32::to_bits)
            );
        }
        let first = tree_position(&p, 0, 3);
        assert!((first - Vec3::new(4.25, -3.8, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_cards_taper_with_tree() {
        let p = GalleryParams::default();
        let n = 8;
        let mut last_radius = f32::INFINITY;
        for i in 0..n {
            let pos = tree_position(&p, i, n);
            let r = (pos.x * pos.x + pos.z * pos.z).sqrt();
            assert!(r < last_radius);
            last_radius = r;
        }
    }

    #[test]
    fn test_universe_shells_grow_with_index() {
        let p = GalleryParams::default();
        for i in 0..4 {
            let r = universe_position(&p, i, 4).length();
            assert!((r - (18.0 + 4.0 * i as f32)).abs() < 1e-3);
        }
    }

    #[test]
    fn test_easing_converges_to_universe() {
        let mut gallery = Gallery::new(&GalleryParams::default(), &uris(3), ViewMode::Tree);
        let mut t = 0.0;
        for _ in 0..900 {
            t += 1.0 / 60.0;
            gallery.update(&FrameContext::new(t, 1.0 / 60.0, ViewMode::Universe));
        }
        for item in gallery.items() {
            assert!((item.position - item.universe_position).length() < 1e-2);
            assert!((item.scale - 3.5).abs() < 1e-3);
            assert!(item.drift_weight > 0.99);
        }
    }

    #[test]
    fn test_hover_boosts_scale() {
        let mut gallery = Gallery::new(&GalleryParams::default(), &uris(2), ViewMode::Tree);
        gallery.set_hovered(Some(1));
        assert_eq!(gallery.hovered(), Some(1));
        for _ in 0..300 {
            gallery.update(&FrameContext::new(1.0, 1.0 / 60.0, ViewMode::Tree));
        }
        let items = gallery.items();
        assert!((items[0].scale - 0.65).abs() < 1e-3);
        assert!((items[1].scale - 0.65 * 1.15).abs() < 1e-3);
        gallery.set_hovered(None);
        assert_eq!(gallery.hovered(), None);
    }

    #[test]
    fn test_pick_and_select() {
        let gallery = Gallery::new(&GalleryParams::default(), &uris(3), ViewMode::Tree);
        let target = gallery.items()[2].render_position();
        let origin = Vec3::new(0.0, target.y, 0.0) + (target - Vec3::new(0.0, target.y, 0.0)) * 4.0;
        let ray = Ray::new(origin, target - origin);
        assert_eq!(gallery.pick(&ray), Some(2));
        assert_eq!(
            gallery.select(2),
            Some(PhotoSelection {
                index: 2,
                uri: "photos/memory-03.jpg".to_string()
            })
        );
        assert_eq!(gallery.select(7), None);
    }

    #[test]
    fn test_tree_mode_has_no_drift() {
        let mut gallery = Gallery::new(&GalleryParams::default(), &uris(3), ViewMode::Tree);
        gallery.update(&FrameContext::new(3.0, 1.0 / 60.0, ViewMode::Tree));
        for item in gallery.items() {
            assert_eq!(item.drift, 0.0);
            assert_eq!(item.roll, 0.0);
        }
    }
}
