//! Colors and sprite shapes.
//!
//! Palette entries are authored as sRGB hex (the values designers pick) and
//! converted to linear RGB, which is what the transforms blend and what the
//! sprite shader adds up.

use glam::Vec3;

/// Shape drawn for a sprite instance.
///
/// The discriminant is uploaded as-is; the sprite shader switches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum SpriteShape {
    /// Soft round glow with a gaussian-like falloff (default).
    #[default]
    Glow = 0,
    /// Square photo frame with a bright border.
    Frame = 1,
    /// Four-pointed sparkle.
    Star = 2,
    /// Small soft flake with a hard core.
    Flake = 3,
}

/// World-space diameter of a particle with size 1.
///
/// Field sizes are authored in point units; sprites are drawn in world units.
pub const PARTICLE_WORLD_SIZE: f32 = 0.36;

/// Blend mode for a draw pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Standard alpha blending.
    Alpha,
    /// Additive blending. Overlapping particles become brighter.
    #[default]
    Additive,
}

impl BlendMode {
    /// Whether depth writes should stay enabled for this mode.
    ///
    /// Additive particles are order-independent and must not occlude each other.
    #[inline]
    pub fn writes_depth(self) -> bool {
        matches!(self, BlendMode::Alpha)
    }
}

/// Decode a `0xRRGGBB` sRGB color into linear RGB.
pub fn hex(rgb: u32) -> Vec3 {
    let r = ((rgb >> 16) & 0xff) as f32 / 255.0;
    let g = ((rgb >> 8) & 0xff) as f32 / 255.0;
    let b = (rgb & 0xff) as f32 / 255.0;
    Vec3::new(srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b))
}

/// sRGB transfer function, inverse.
#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Named scene colors.
pub mod palette {
    use super::hex;
    use glam::Vec3;

    /// Scene background (`#020617`).
    pub fn background() -> Vec3 {
        hex(0x020617)
    }
    /// Silver dust base (`#cbd5e1`).
    pub fn slate() -> Vec3 {
        hex(0xcbd5e1)
    }
    /// Cyan ornament (`#22d3ee`).
    pub fn cyan() -> Vec3 {
        hex(0x22d3ee)
    }
    /// Blue ornament and dust tint (`#60a5fa`).
    pub fn blue() -> Vec3 {
        hex(0x60a5fa)
    }
    /// Gold ornament (`#facc15`).
    pub fn gold() -> Vec3 {
        hex(0xfacc15)
    }
    /// Amber ornament (`#fbbf24`).
    pub fn amber() -> Vec3 {
        hex(0xfbbf24)
    }
    /// Spiral stream (`#67e8f9`).
    pub fn spiral() -> Vec3 {
        hex(0x67e8f9)
    }
    /// Top star body (`#fde68a`).
    pub fn star_body() -> Vec3 {
        hex(0xfde68a)
    }
    /// Top star rings (`#a5f3fc`).
    pub fn star_ring() -> Vec3 {
        hex(0xa5f3fc)
    }
    /// Pale tint particles drift toward in universe mode.
    pub const STARFIELD: Vec3 = Vec3::new(0.75, 0.85, 1.0);
    /// Star-ring base color before pulsing.
    pub const RING_BASE: Vec3 = Vec3::new(0.4, 0.8, 1.0);
    /// Snowflake color.
    pub const SNOW: Vec3 = Vec3::new(0.9, 0.95, 1.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_endpoints() {
        assert_eq!(hex(0x000000), Vec3::ZERO);
        assert!(hex(0xffffff).abs_diff_eq(Vec3::ONE, 1e-5));
    }

    #[test]
    fn test_hex_channel_order() {
        let c = hex(0xff0000);
        assert!(c.abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-5));
        let gold = palette::gold();
        assert!(gold.x > gold.y && gold.y > gold.z);
    }

    #[test]
    fn test_additive_does_not_write_depth() {
        assert!(!BlendMode::Additive.writes_depth());
        assert!(BlendMode::Alpha.writes_depth());
    }
}
