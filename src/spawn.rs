//! Spawn context for particle field generation.
//!
//! Every field draws its static attributes through a [`SpawnContext`], once,
//! at creation. The RNG is seeded from the field seed and the particle index,
//! so a field built twice with the same seed is identical bit for bit, and
//! changing the particle count never reshuffles the particles that remain.
//!
//! ```ignore
//! let mut builder = AttributeSetBuilder::with_capacity(count);
//! for i in 0..count {
//!     let mut ctx = SpawnContext::new(seed, i, count);
//!     builder.push(ParticleSeed {
//!         position: ctx.random_in_shell(10.0, 30.0),
//!         ..
//!     });
//! }
//! ```

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Per-particle spawn helpers backed by a seeded RNG.
pub struct SpawnContext {
    /// Index of the particle being spawned (0 to count-1).
    pub index: u32,
    /// Total number of particles in the field.
    pub count: u32,
    /// Internal RNG - use helper methods instead of accessing directly.
    rng: SmallRng,
}

impl SpawnContext {
    /// Create the context for particle `index` of a field seeded with `seed`.
    pub fn new(seed: u64, index: u32, count: u32) -> Self {
        Self {
            index,
            count,
            rng: SmallRng::seed_from_u64(mix_seed(seed, index as u64)),
        }
    }

    /// Normalized progress through the field (0.0 to just under 1.0).
    #[inline]
    pub fn progress(&self) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        self.index as f32 / self.count as f32
    }

    // ========== Random primitives ==========

    /// Random f32 in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// Random f32 in `[-half_width, half_width)`.
    #[inline]
    pub fn random_signed(&mut self, half_width: f32) -> f32 {
        (self.random() - 0.5) * 2.0 * half_width
    }

    /// `true` with probability `p`.
    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.random() < p
    }

    // ========== Position helpers ==========

    /// Uniform random point on a sphere of given radius.
    ///
    /// Uses `acos(2u - 1)` for the polar angle so points do not bunch at the
    /// poles.
    pub fn random_on_sphere(&mut self, radius: f32) -> Vec3 {
        let theta = self.random() * TAU;
        let phi = (2.0 * self.random() - 1.0).clamp(-1.0, 1.0).acos();
        spherical(radius, theta, phi)
    }

    /// Random point in a spherical shell between `inner` and `outer` radius.
    pub fn random_in_shell(&mut self, inner: f32, outer: f32) -> Vec3 {
        let r = self.random_range(inner, outer);
        self.random_on_sphere(r)
    }

    /// Random offset with each axis in `[-half_width, half_width)`.
    pub fn random_jitter(&mut self, half_width: f32) -> Vec3 {
        Vec3::new(
            self.random_signed(half_width),
            self.random_signed(half_width),
            self.random_signed(half_width),
        )
    }
}

/// Point at `radius` with azimuth `theta` (around Y) and polar angle `phi`.
#[inline]
pub fn spherical(radius: f32, theta: f32, phi: f32) -> Vec3 {
    Vec3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

/// SplitMix64 finaliser over the field seed and particle index.
///
/// Neighbouring indices must land on unrelated RNG streams.
fn mix_seed(seed: u64, index: u64) -> u64 {
    let mut z = seed
        .wrapping_add(index.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_context_progress() {
        let ctx = SpawnContext::new(1, 50, 100);
        assert!((ctx.progress() - 0.5).abs() < 0.001);
        assert_eq!(SpawnContext::new(1, 0, 0).progress(), 0.0);
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = SpawnContext::new(7, 12, 100);
        let mut b = SpawnContext::new(7, 12, 100);
        for _ in 0..16 {
            assert_eq!(a.random().to_bits(), b.random().to_bits());
        }
    }

    #[test]
    fn test_neighbouring_indices_differ() {
        let mut a = SpawnContext::new(7, 12, 100);
        let mut b = SpawnContext::new(7, 13, 100);
        assert_ne!(a.random().to_bits(), b.random().to_bits());
    }

    #[test]
    fn test_random_in_shell_bounds() {
        let mut ctx = SpawnContext::new(3, 0, 1);
        for _ in 0..200 {
            let r = ctx.random_in_shell(10.0, 30.0).length();
            assert!(r >= 10.0 - 1e-3 && r <= 30.0 + 1e-3);
        }
    }

    #[test]
    fn test_random_signed_bounds() {
        let mut ctx = SpawnContext::new(3, 4, 10);
        for _ in 0..200 {
            let v = ctx.random_signed(0.6);
            assert!((-0.6..=0.6).contains(&v));
        }
        assert_eq!(ctx.random_range(2.0, 2.0), 2.0);
    }
}
