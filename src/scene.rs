//! Scene composer.
//!
//! [`Scene`] is the composition root: it owns the requested [`ViewMode`],
//! the scene clock and every component, and drives them through one
//! synchronous pass per frame. Components never see each other; they only
//! see the [`FrameContext`] built here after the clock has ticked.
//!
//! # Example
//!
//! ```
//! use lumitree::prelude::*;
//!
//! let mut config = SceneConfig::default();
//! config.tree.count = 300;
//! config.backdrop.count = 100;
//! config.snow.count = 100;
//! let mut scene = Scene::new(&config).unwrap();
//!
//! scene.advance(1.0 / 60.0);
//! scene.toggle_mode();
//! scene.advance(1.0 / 60.0);
//!
//! let mut sprites = Vec::new();
//! scene.write_sprites(&mut sprites);
//! assert_eq!(sprites.len(), scene.sprite_count());
//! ```

use glam::Vec3;

use crate::attributes::SpriteInstance;
use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::fields::{
    Backdrop, FrameContext, MagicSpiral, ParticleSystem, Snow, StarRings, TreeField,
};
use crate::gallery::{Gallery, PhotoSelection};
use crate::growth::GrowthTimeline;
use crate::hit::{Ray, TreeHitVolume};
use crate::mode::{ModeState, ViewMode};
use crate::star::{self, TopStar, STAR_SPRITES};

/// Result of a pointer click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A photo card was hit; the mode is unchanged.
    Photo(PhotoSelection),
    /// The tree volume was hit and the mode flipped to the contained value.
    ModeToggled(ViewMode),
    /// Nothing interactive under the pointer.
    Missed,
}

/// What the pointer is over, for the cursor affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverTarget {
    Nothing,
    Photo(usize),
    Tree,
}

impl HoverTarget {
    /// Whether a click here would do something.
    pub fn is_interactive(self) -> bool {
        !matches!(self, HoverTarget::Nothing)
    }
}

/// Something the app may want to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneEvent {
    ModeChanged(ViewMode),
    PhotoSelected(PhotoSelection),
}

/// The whole tree ⇄ universe scene.
pub struct Scene {
    mode: ModeState,
    time: f32,
    delta: f32,
    frame: u64,
    growth: GrowthTimeline,
    group_origin: Vec3,
    hit_volume: TreeHitVolume,
    tree: TreeField,
    rings: StarRings,
    spiral: MagicSpiral,
    star: TopStar,
    gallery: Gallery,
    snow: Snow,
    backdrop: Backdrop,
    events: Vec<SceneEvent>,
}

impl Scene {
    /// Build every component from `config`.
    ///
    /// The tree, rings and spiral are all handed the same growth timeline.
    pub fn new(config: &SceneConfig) -> Result<Self, SceneError> {
        let mode = config.initial_mode;
        let growth = config.growth;

        let tree = TreeField::new(&config.tree, growth, mode)?;
        let rings = StarRings::new(&config.rings, growth, mode)?;
        let spiral = MagicSpiral::new(&config.spiral, growth, mode)?;
        let star = TopStar::new(&config.star, mode);
        let gallery = Gallery::new(&config.gallery, &config.photos, mode);
        let snow = Snow::new(&config.snow)?;
        let backdrop = Backdrop::new(&config.backdrop)?;

        log::info!(
            "Scene built: {} tree, {} ring, {} spiral, {} snow, {} backdrop particles, {} photos",
            tree.len(),
            rings.len(),
            spiral.len(),
            snow.len(),
            backdrop.len(),
            gallery.len()
        );

        let mut scene = Self {
            mode: ModeState::new(mode),
            time: 0.0,
            delta: 0.0,
            frame: 0,
            growth,
            group_origin: config.group_origin,
            hit_volume: config.hit_volume,
            tree,
            rings,
            spiral,
            star,
            gallery,
            snow,
            backdrop,
            events: Vec::new(),
        };
        // Fill the render buffers so the first draw sees t = 0 state.
        scene.run(FrameContext::new(0.0, 0.0, mode));
        Ok(scene)
    }

    /// Advance the clock by `delta` seconds and update every component.
    ///
    /// Negative deltas are treated as zero so time never runs backwards.
    pub fn advance(&mut self, delta: f32) -> FrameContext {
        let delta = delta.max(0.0);
        self.advance_to(self.time + delta, delta)
    }

    /// Update every component for an externally tracked clock.
    ///
    /// `elapsed` earlier than the current time is ignored in favour of the
    /// current time.
    pub fn advance_to(&mut self, elapsed: f32, delta: f32) -> FrameContext {
        self.time = elapsed.max(self.time);
        self.delta = delta.max(0.0);
        self.frame += 1;
        let frame = FrameContext::new(self.time, self.delta, self.mode.current());
        self.run(frame);
        frame
    }

    fn run(&mut self, frame: FrameContext) {
        self.tree.update(&frame);
        self.rings.update(&frame);
        self.spiral.update(&frame);
        self.star.update(&frame);
        self.gallery.update(&frame);
        self.snow.update(&frame);
        self.backdrop.update(&frame);
    }

    /// Currently requested mode.
    pub fn mode(&self) -> ViewMode {
        self.mode.current()
    }

    /// Flip the mode. Components start easing on the next `advance`.
    pub fn toggle_mode(&mut self) -> ViewMode {
        let mode = self.mode.toggle();
        log::info!("View mode -> {}", mode);
        self.events.push(SceneEvent::ModeChanged(mode));
        mode
    }

    /// Request a specific mode. Returns `true` if it changed.
    pub fn set_mode(&mut self, mode: ViewMode) -> bool {
        let changed = self.mode.set(mode);
        if changed {
            log::info!("View mode -> {}", mode);
            self.events.push(SceneEvent::ModeChanged(mode));
        }
        changed
    }

    /// Handle a click along a world-space ray.
    ///
    /// A card in front of the tree takes the click; a ray that misses every
    /// card, or hits one hidden behind the trunk, reaches the tree volume and
    /// toggles the mode.
    pub fn click(&mut self, ray: &Ray) -> ClickOutcome {
        let local = ray.relative_to(self.group_origin);
        if let Some(selection) = self.pick_photo(&local).and_then(|i| self.gallery.select(i)) {
            log::debug!("Photo {} selected ({})", selection.index, selection.uri);
            self.events.push(SceneEvent::PhotoSelected(selection.clone()));
            return ClickOutcome::Photo(selection);
        }
        if self.hit_volume.intersect(&local).is_some() {
            return ClickOutcome::ModeToggled(self.toggle_mode());
        }
        ClickOutcome::Missed
    }

    /// Update hover state along a world-space ray; `None` clears it.
    pub fn hover(&mut self, ray: Option<&Ray>) -> HoverTarget {
        let Some(ray) = ray else {
            self.gallery.set_hovered(None);
            return HoverTarget::Nothing;
        };
        let local = ray.relative_to(self.group_origin);
        let photo = self.pick_photo(&local);
        self.gallery.set_hovered(photo);
        match photo {
            Some(i) => HoverTarget::Photo(i),
            None if self.hit_volume.intersect(&local).is_some() => HoverTarget::Tree,
            None => HoverTarget::Nothing,
        }
    }

    /// Card under a group-space ray, unless the tree hides it.
    ///
    /// A card counts as in front while its hit lies no deeper than the
    /// volume's radius past where the ray enters the volume, so cards on the
    /// near half of the tree stay pickable.
    fn pick_photo(&self, local: &Ray) -> Option<usize> {
        let (index, photo_t) = self.gallery.pick_hit(local)?;
        match self.hit_volume.intersect(local) {
            Some(volume_t) if photo_t > volume_t + self.hit_volume.radius => None,
            _ => Some(index),
        }
    }

    /// Take every event raised since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of sprites [`write_sprites`](Self::write_sprites) emits.
    ///
    /// Constant for the life of the scene.
    pub fn sprite_count(&self) -> usize {
        self.backdrop.len()
            + self.snow.len()
            + self.tree.len()
            + self.rings.len()
            + self.spiral.len()
            + STAR_SPRITES
            + self.gallery.len()
    }

    /// Append every component as world-space sprites.
    ///
    /// Hidden particles are emitted with size 0 rather than skipped.
    pub fn write_sprites(&self, out: &mut Vec<SpriteInstance>) {
        out.reserve(self.sprite_count());
        emit(&self.backdrop, Vec3::ZERO, out);
        emit(&self.snow, Vec3::ZERO, out);

        let origin = self.group_origin;
        emit(&self.tree, origin, out);
        emit(&self.rings, origin, out);
        emit(&self.spiral, origin, out);
        star::write_sprites(self.star.pose(), origin, out);
        self.gallery.write_sprites(origin, out);
    }

    /// Elapsed scene time in seconds.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Delta of the most recent frame.
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Frames advanced so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// The timeline every entrance-animated component shares.
    pub fn growth(&self) -> &GrowthTimeline {
        &self.growth
    }

    pub fn group_origin(&self) -> Vec3 {
        self.group_origin
    }

    pub fn hit_volume(&self) -> &TreeHitVolume {
        &self.hit_volume
    }

    pub fn tree(&self) -> &TreeField {
        &self.tree
    }

    pub fn rings(&self) -> &StarRings {
        &self.rings
    }

    pub fn spiral(&self) -> &MagicSpiral {
        &self.spiral
    }

    pub fn star(&self) -> &TopStar {
        &self.star
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn snow(&self) -> &Snow {
        &self.snow
    }

    pub fn backdrop(&self) -> &Backdrop {
        &self.backdrop
    }
}

fn emit(system: &dyn ParticleSystem, origin: Vec3, out: &mut Vec<SpriteInstance>) {
    system.buffer().write_sprites(origin, system.shape(), out);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SceneConfig {
        let mut config = SceneConfig::default();
        config.tree.count = 400;
        config.rings.per_ring = 20;
        config.spiral.count = 100;
        config.snow.count = 50;
        config.backdrop.count = 50;
        config.photos = (0..3).map(|i| format!("photos/{}.jpg", i)).collect();
        config
    }

    fn eye_ray(target: Vec3) -> Ray {
        let eye = Vec3::new(0.0, 0.0, 14.0);
        Ray::new(eye, target - eye)
    }

    /// Index of the card maximizing `key(z)`, i.e. nearest or farthest from the eye.
    fn nearest_card(scene: &Scene, key: impl Fn(f32) -> f32) -> usize {
        scene
            .gallery()
            .items()
            .iter()
            .max_by(|a, b| key(a.render_position().z).total_cmp(&key(b.render_position().z)))
            .map(|item| item.index)
            .unwrap()
    }

    #[test]
    fn test_click_on_tree_toggles_mode() {
        let mut scene = Scene::new(&small_config()).unwrap();
        // Aim between the cards at the bottom of the trunk.
        let ray = Ray::new(Vec3::new(0.0, -6.0, 14.0), Vec3::NEG_Z);
        assert_eq!(scene.hover(Some(&ray)), HoverTarget::Tree);
        assert_eq!(scene.click(&ray), ClickOutcome::ModeToggled(ViewMode::Universe));
        assert_eq!(scene.mode(), ViewMode::Universe);
        assert_eq!(scene.click(&ray), ClickOutcome::ModeToggled(ViewMode::Tree));
        assert_eq!(
            scene.drain_events(),
            vec![
                SceneEvent::ModeChanged(ViewMode::Universe),
                SceneEvent::ModeChanged(ViewMode::Tree)
            ]
        );
        assert!(scene.drain_events().is_empty());
    }

    #[test]
    fn test_click_beside_tree_misses() {
        let mut scene = Scene::new(&small_config()).unwrap();
        let ray = Ray::new(Vec3::new(30.0, 0.0, 14.0), Vec3::NEG_Z);
        assert_eq!(scene.click(&ray), ClickOutcome::Missed);
        assert_eq!(scene.mode(), ViewMode::Tree);
        assert!(scene.drain_events().is_empty());
    }

    #[test]
    fn test_photo_click_takes_priority() {
        let mut scene = Scene::new(&small_config()).unwrap();
        let front = nearest_card(&scene, |z| z);
        let card = scene.gallery().items()[front].render_position() + scene.group_origin();
        let outcome = scene.click(&eye_ray(card));
        match outcome {
            ClickOutcome::Photo(selection) => assert_eq!(selection.index, front),
            other => panic!("expected a photo, got {:?}", other),
        }
        assert_eq!(scene.mode(), ViewMode::Tree);
        assert!(matches!(
            scene.drain_events().as_slice(),
            [SceneEvent::PhotoSelected(_)]
        ));
    }

    #[test]
    fn test_card_behind_trunk_does_not_block_tree() {
        let mut scene = Scene::new(&small_config()).unwrap();
        let back = nearest_card(&scene, |z| -z);
        let card = scene.gallery().items()[back].render_position();
        assert!(card.z < -1.5, "card {back} is not behind the trunk: {card}");

        let ray = eye_ray(card + scene.group_origin());
        assert_eq!(scene.gallery().pick(&ray.relative_to(scene.group_origin())), Some(back));
        assert_eq!(scene.hover(Some(&ray)), HoverTarget::Tree);
        assert_eq!(scene.gallery().hovered(), None);
        assert_eq!(scene.click(&ray), ClickOutcome::ModeToggled(ViewMode::Universe));
    }

    #[test]
    fn test_hover_reports_targets() {
        let mut scene = Scene::new(&small_config()).unwrap();
        let card = scene.gallery().items()[0].render_position() + scene.group_origin();
        assert_eq!(scene.hover(Some(&eye_ray(card))), HoverTarget::Photo(0));
        assert_eq!(scene.gallery().hovered(), Some(0));

        let beside = Ray::new(Vec3::new(30.0, 0.0, 14.0), Vec3::NEG_Z);
        assert_eq!(scene.hover(Some(&beside)), HoverTarget::Nothing);
        assert_eq!(scene.gallery().hovered(), None);
        assert!(!HoverTarget::Nothing.is_interactive());
    }

    #[test]
    fn test_set_mode_only_reports_changes() {
        let mut scene = Scene::new(&small_config()).unwrap();
        assert!(!scene.set_mode(ViewMode::Tree));
        assert!(scene.set_mode(ViewMode::Universe));
        assert_eq!(scene.drain_events().len(), 1);
    }

    #[test]
    fn test_clock_is_monotonic() {
        let mut scene = Scene::new(&small_config()).unwrap();
        scene.advance(0.5);
        scene.advance(-1.0);
        assert_eq!(scene.time(), 0.5);
        scene.advance_to(0.2, 0.016);
        assert_eq!(scene.time(), 0.5);
        assert_eq!(scene.frame(), 3);
    }

    #[test]
    fn test_sprite_count_is_stable() {
        let mut scene = Scene::new(&small_config()).unwrap();
        let mut sprites = Vec::new();
        scene.write_sprites(&mut sprites);
        let first = sprites.len();
        assert_eq!(first, scene.sprite_count());

        scene.toggle_mode();
        for _ in 0..120 {
            scene.advance(1.0 / 60.0);
        }
        sprites.clear();
        scene.write_sprites(&mut sprites);
        assert_eq!(sprites.len(), first);
    }

    #[test]
    fn test_empty_tree_is_rejected() {
        let mut config = small_config();
        config.tree.count = 0;
        assert!(Scene::new(&config).is_err());
    }
}
