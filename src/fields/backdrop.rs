//! Distant background stars.
//!
//! A static shell of faint points far behind everything else. They only
//! twinkle; they take no part in the entrance or the mode blend.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::{FrameContext, ParticleSystem};
use crate::attributes::{AttributeSetBuilder, ParticleAttributeSet, ParticleSeed, RenderBuffer};
use crate::error::SceneError;
use crate::spawn::SpawnContext;

/// Background star constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackdropParams {
    pub count: u32,
    /// Inner radius of the star shell.
    pub radius: f32,
    /// Shell thickness.
    pub depth: f32,
    /// Largest base size.
    pub factor: f32,
    /// Twinkle speed.
    pub speed: f32,
    pub seed: u64,
}

impl Default for BackdropParams {
    fn default() -> Self {
        Self {
            count: 5000,
            radius: 100.0,
            depth: 50.0,
            factor: 1.6,
            speed: 1.0,
            seed: 0x7374_6172,
        }
    }
}

/// Draw the backdrop's static attributes.
pub fn generate(params: &BackdropParams) -> Result<ParticleAttributeSet, SceneError> {
    if params.count == 0 {
        return Err(SceneError::EmptyField("backdrop"));
    }
    let mut builder = AttributeSetBuilder::with_capacity(params.count as usize);
    for i in 0..params.count {
        let mut ctx = SpawnContext::new(params.seed, i, params.count);
        let position = ctx.random_in_shell(params.radius, params.radius + params.depth);
        // Farther stars are fainter.
        let fade = 1.0 - (position.length() - params.radius) / params.depth.max(1e-3) * 0.6;
        let brightness = (0.5 + 0.5 * ctx.random()) * fade;
        builder.push(ParticleSeed {
            position,
            destination: None,
            color: Vec3::splat(brightness),
            size: params.factor * (0.5 + 0.5 * ctx.random()),
            phase: ctx.random() * std::f32::consts::TAU,
            speed: params.speed * (0.5 + ctx.random()),
        });
    }
    builder.build()
}

/// Twinkle every star in place.
pub fn transform(attrs: &ParticleAttributeSet, t: f32, out: &mut RenderBuffer) {
    for i in 0..attrs.len() {
        let twinkle = (t * attrs.speeds()[i] + attrs.phases()[i]).sin() * 0.25 + 0.75;
        out.positions[i] = attrs.positions()[i];
        out.sizes[i] = attrs.sizes()[i];
        out.colors[i] = attrs.colors()[i] * twinkle;
        out.settle[i] = 1.0;
        out.visible[i] = true;
    }
}

/// The background star shell.
pub struct Backdrop {
    attributes: ParticleAttributeSet,
    buffer: RenderBuffer,
}

impl Backdrop {
    pub fn new(params: &BackdropParams) -> Result<Self, SceneError> {
        let attributes = generate(params)?;
        let mut buffer = RenderBuffer::new(attributes.len());
        transform(&attributes, 0.0, &mut buffer);
        Ok(Self { attributes, buffer })
    }
}

impl ParticleSystem for Backdrop {
    fn label(&self) -> &'static str {
        "backdrop"
    }

    fn attributes(&self) -> &ParticleAttributeSet {
        &self.attributes
    }

    fn update(&mut self, frame: &FrameContext) {
        transform(&self.attributes, frame.time, &mut self.buffer);
    }

    fn buffer(&self) -> &RenderBuffer {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backdrop_is_far_away() {
        let params = BackdropParams {
            count: 300,
            ..BackdropParams::default()
        };
        let attrs = generate(&params).unwrap();
        for p in attrs.positions() {
            assert!(p.length() >= params.radius - 1e-2);
        }
    }

    #[test]
    fn test_backdrop_does_not_move() {
        let params = BackdropParams {
            count: 100,
            ..BackdropParams::default()
        };
        let attrs = generate(&params).unwrap();
        let mut out = RenderBuffer::new(attrs.len());
        transform(&attrs, 42.0, &mut out);
        assert_eq!(out.positions, attrs.positions());
        assert!(out.colors.iter().all(|c| c.max_element() <= 1.0));
    }
}
