//! Per-particle static attributes and the per-frame output buffers.
//!
//! A [`ParticleAttributeSet`] is built once when a system is created and is
//! read-only afterwards. Every frame a system's transform reads it and writes
//! a [`RenderBuffer`] of the same length; index `i` in both always refers to
//! the same particle.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::error::SceneError;
use crate::visuals::{SpriteShape, PARTICLE_WORLD_SIZE};

/// Immutable, index-aligned particle attributes.
#[derive(Debug, Clone)]
pub struct ParticleAttributeSet {
    positions: Vec<Vec3>,
    destinations: Option<Vec<Vec3>>,
    colors: Vec<Vec3>,
    sizes: Vec<f32>,
    phases: Vec<f32>,
    speeds: Vec<f32>,
}

impl ParticleAttributeSet {
    /// Assemble a set from parallel arrays.
    ///
    /// Fails if any array's length differs from `positions`, since a shifted
    /// array would attach one particle's color or speed to another.
    pub fn new(
        positions: Vec<Vec3>,
        destinations: Option<Vec<Vec3>>,
        colors: Vec<Vec3>,
        sizes: Vec<f32>,
        phases: Vec<f32>,
        speeds: Vec<f32>,
    ) -> Result<Self, SceneError> {
        let expected = positions.len();
        let check = |attribute: &'static str, found: usize| {
            if found == expected {
                Ok(())
            } else {
                Err(SceneError::AttributeLengthMismatch {
                    attribute,
                    expected,
                    found,
                })
            }
        };

        if let Some(dest) = &destinations {
            check("destination", dest.len())?;
        }
        check("color", colors.len())?;
        check("size", sizes.len())?;
        check("phase", phases.len())?;
        check("speed", speeds.len())?;

        Ok(Self {
            positions,
            destinations,
            colors,
            sizes,
            phases,
            speeds,
        })
    }

    /// Number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the set holds no particles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Base (tree-layout) positions.
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Universe destinations, if this system takes part in the mode blend.
    #[inline]
    pub fn destinations(&self) -> Option<&[Vec3]> {
        self.destinations.as_deref()
    }

    /// Resting colors (linear RGB).
    #[inline]
    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    /// Base sizes.
    #[inline]
    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    /// Per-particle phase / random seed.
    #[inline]
    pub fn phases(&self) -> &[f32] {
        &self.phases
    }

    /// Per-particle angular speed.
    #[inline]
    pub fn speeds(&self) -> &[f32] {
        &self.speeds
    }
}

/// One particle's attributes, pushed whole into an [`AttributeSetBuilder`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSeed {
    pub position: Vec3,
    pub destination: Option<Vec3>,
    pub color: Vec3,
    pub size: f32,
    pub phase: f32,
    pub speed: f32,
}

/// Builds a [`ParticleAttributeSet`] one particle at a time.
#[derive(Debug, Default)]
pub struct AttributeSetBuilder {
    positions: Vec<Vec3>,
    destinations: Vec<Vec3>,
    with_destinations: bool,
    colors: Vec<Vec3>,
    sizes: Vec<f32>,
    phases: Vec<f32>,
    speeds: Vec<f32>,
}

impl AttributeSetBuilder {
    /// Pre-allocate for `count` particles.
    pub fn with_capacity(count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(count),
            destinations: Vec::with_capacity(count),
            with_destinations: false,
            colors: Vec::with_capacity(count),
            sizes: Vec::with_capacity(count),
            phases: Vec::with_capacity(count),
            speeds: Vec::with_capacity(count),
        }
    }

    /// Append one particle.
    pub fn push(&mut self, seed: ParticleSeed) -> &mut Self {
        self.positions.push(seed.position);
        if let Some(dest) = seed.destination {
            self.with_destinations = true;
            self.destinations.push(dest);
        }
        self.colors.push(seed.color);
        self.sizes.push(seed.size);
        self.phases.push(seed.phase);
        self.speeds.push(seed.speed);
        self
    }

    /// Finish the set. Mixing seeds with and without destinations is an error.
    pub fn build(self) -> Result<ParticleAttributeSet, SceneError> {
        let destinations = self.with_destinations.then_some(self.destinations);
        ParticleAttributeSet::new(
            self.positions,
            destinations,
            self.colors,
            self.sizes,
            self.phases,
            self.speeds,
        )
    }
}

/// Per-frame transform output for one system.
///
/// Sized once from the attribute set and overwritten in place every frame.
#[derive(Debug, Clone)]
pub struct RenderBuffer {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    pub sizes: Vec<f32>,
    pub settle: Vec<f32>,
    /// Growth gate per particle; a gated particle may still have zero size.
    pub visible: Vec<bool>,
}

impl RenderBuffer {
    /// Zeroed buffer for `len` particles.
    pub fn new(len: usize) -> Self {
        Self {
            positions: vec![Vec3::ZERO; len],
            colors: vec![Vec3::ZERO; len],
            sizes: vec![0.0; len],
            settle: vec![0.0; len],
            visible: vec![false; len],
        }
    }

    /// Number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Whether particle `i` has passed the growth gate this frame.
    #[inline]
    pub fn is_visible(&self, i: usize) -> bool {
        self.visible[i]
    }

    /// Whether particle `i` renders with non-zero size this frame.
    #[inline]
    pub fn is_drawn(&self, i: usize) -> bool {
        self.sizes[i] > 0.0
    }

    /// Append every particle as a sprite, offset by `origin`.
    ///
    /// Point-unit sizes are converted to world diameters.
    pub fn write_sprites(&self, origin: Vec3, shape: SpriteShape, out: &mut Vec<SpriteInstance>) {
        out.reserve(self.len());
        for i in 0..self.len() {
            out.push(SpriteInstance::new(
                self.positions[i] + origin,
                self.sizes[i] * PARTICLE_WORLD_SIZE,
                self.colors[i],
                shape,
            ));
        }
    }
}

/// GPU instance layout for one billboard sprite.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 3],
    pub shape: u32,
}

impl SpriteInstance {
    pub fn new(position: Vec3, size: f32, color: Vec3, shape: SpriteShape) -> Self {
        Self {
            position: position.to_array(),
            size: size.max(0.0),
            color: color.to_array(),
            shape: shape as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(i: usize) -> ParticleSeed {
        ParticleSeed {
            position: Vec3::splat(i as f32),
            destination: Some(Vec3::splat(-(i as f32))),
            color: Vec3::ONE,
            size: 0.1,
            phase: i as f32 * 0.5,
            speed: 1.0,
        }
    }

    #[test]
    fn test_builder_keeps_indices_aligned() {
        let mut builder = AttributeSetBuilder::with_capacity(4);
        for i in 0..4 {
            builder.push(seed(i));
        }
        let set = builder.build().unwrap();
        assert_eq!(set.len(), 4);
        let dest = set.destinations().unwrap();
        for i in 0..4 {
            assert_eq!(set.positions()[i], Vec3::splat(i as f32));
            assert_eq!(dest[i], -set.positions()[i]);
            assert_eq!(set.phases()[i], i as f32 * 0.5);
        }
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let err = ParticleAttributeSet::new(
            vec![Vec3::ZERO; 3],
            None,
            vec![Vec3::ONE; 3],
            vec![0.1; 2],
            vec![0.0; 3],
            vec![1.0; 3],
        )
        .unwrap_err();
        assert_eq!(
            err,
            SceneError::AttributeLengthMismatch {
                attribute: "size",
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_partial_destinations_are_rejected() {
        let mut builder = AttributeSetBuilder::with_capacity(2);
        builder.push(seed(0));
        builder.push(ParticleSeed {
            destination: None,
            ..seed(1)
        });
        assert!(matches!(
            builder.build(),
            Err(SceneError::AttributeLengthMismatch {
                attribute: "destination",
                ..
            })
        ));
    }

    #[test]
    fn test_sprite_instance_layout() {
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 32);
        let s = SpriteInstance::new(Vec3::X, -1.0, Vec3::ONE, SpriteShape::Glow);
        assert_eq!(s.size, 0.0);
    }
}
