//! Scalar helpers shared by every per-particle transform.
//!
//! These mirror the GLSL/WGSL built-ins the transforms were designed around
//! (`smoothstep`, `mix`, `fract`) so the closed-form formulas read the same on
//! the CPU as they would in a vertex program.

use glam::Vec3;

/// Hermite smoothstep, identical to the shader built-in.
///
/// Returns 0 for `x <= edge0`, 1 for `x >= edge1`.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Linear blend that is exact at both ends.
///
/// `blend(a, b, 0.0) == a` and `blend(a, b, 1.0) == b` bit for bit, which the
/// `a + (b - a) * t` form does not guarantee.
#[inline]
pub fn blend(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Component-wise [`blend`] for vectors.
#[inline]
pub fn blend_vec3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a * (1.0 - t) + b * t
}

/// Rotate a point around the Y axis, acting on its x/z components only.
#[inline]
pub fn rotate_xz(v: Vec3, angle: f32) -> Vec3 {
    let (s, c) = angle.sin_cos();
    Vec3::new(v.x * c - v.z * s, v.y, v.x * s + v.z * c)
}

/// Fractional part, always in `[0, 1)` for finite input.
#[inline]
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Frame-rate independent smoothing weight for exponential approach.
///
/// Moving `value += (target - value) * smoothing_factor(rate, dt)` each frame
/// converges at the same wall-clock speed no matter how `dt` is sliced.
#[inline]
pub fn smoothing_factor(rate: f32, dt: f32) -> f32 {
    if dt <= 0.0 || rate <= 0.0 {
        return 0.0;
    }
    1.0 - (-rate * dt).exp()
}

/// Elastic overshoot ease used by the top star pop-in.
///
/// The first tenth ramps linearly (the raw elastic curve dips below zero
/// there), and anything at or past 1 is pinned to exactly 1.
pub fn ease_out_elastic(progress: f32) -> f32 {
    if progress <= 0.0 {
        return 0.0;
    }
    if progress >= 1.0 {
        return 1.0;
    }
    if progress < 0.1 {
        return progress * 10.0;
    }
    let c4 = std::f32::consts::TAU / 3.0;
    2f32.powf(-10.0 * progress) * ((progress * 10.0 - 0.75) * c4).sin() + 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(0.0, 2.5, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 2.5, 0.0), 0.0);
        assert_eq!(smoothstep(0.0, 2.5, 2.5), 1.0);
        assert_eq!(smoothstep(0.0, 2.5, 10.0), 1.0);
        assert!((smoothstep(0.0, 2.0, 1.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_blend_is_exact_at_ends() {
        let a = Vec3::new(0.1, -3.7, 2.9);
        let b = Vec3::new(17.3, 0.3, -8.1);
        assert_eq!(blend_vec3(a, b, 0.0), a);
        assert_eq!(blend_vec3(a, b, 1.0), b);
        assert_eq!(blend(0.3, 0.7, 1.0), 0.7);
    }

    #[test]
    fn test_rotate_xz_keeps_height() {
        let v = Vec3::new(1.0, 4.0, 0.0);
        let r = rotate_xz(v, std::f32::consts::FRAC_PI_2);
        assert!(r.x.abs() < 1e-6);
        assert!((r.z - 1.0).abs() < 1e-6);
        assert_eq!(r.y, 4.0);
    }

    #[test]
    fn test_smoothing_factor_splits_evenly() {
        // Two half steps must land where one full step does.
        let k_full = smoothing_factor(3.0, 0.1);
        let k_half = smoothing_factor(3.0, 0.05);
        let two_halves = 1.0 - (1.0 - k_half) * (1.0 - k_half);
        assert!((k_full - two_halves).abs() < 1e-6);
        assert_eq!(smoothing_factor(3.0, 0.0), 0.0);
    }

    #[test]
    fn test_elastic_endpoints() {
        assert_eq!(ease_out_elastic(0.0), 0.0);
        assert_eq!(ease_out_elastic(1.0), 1.0);
        assert_eq!(ease_out_elastic(2.0), 1.0);
        assert!((ease_out_elastic(0.05) - 0.5).abs() < 1e-6);
        // Overshoots past 1 somewhere in the middle.
        let peak = (10..100)
            .map(|i| ease_out_elastic(i as f32 / 100.0))
            .fold(0.0f32, f32::max);
        assert!(peak > 1.0);
    }
}
