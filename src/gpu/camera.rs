//! Slowly orbiting camera rig.

use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::hit::Ray;
use crate::mode::{ModeMix, ViewMode};

/// Orbit and lens constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraParams {
    /// Orbit radius in tree mode.
    pub distance: f32,
    /// Orbit radius in universe mode.
    pub universe_distance: f32,
    /// Eye height in tree mode.
    pub height: f32,
    /// Eye height in universe mode.
    pub universe_height: f32,
    /// Orbit speed in radians per second.
    pub orbit_speed: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub mix_rate: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            distance: 14.0,
            universe_distance: 20.0,
            height: 2.0,
            universe_height: 4.0,
            orbit_speed: 0.1,
            fov_degrees: 50.0,
            near: 0.1,
            far: 500.0,
            mix_rate: 1.0,
        }
    }
}

/// Orbit camera that always looks at the origin.
pub struct CameraRig {
    params: CameraParams,
    mix: ModeMix,
    /// Current eye position.
    pub position: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
}

impl CameraRig {
    pub fn new(params: &CameraParams, mode: ViewMode) -> Self {
        let mut rig = Self {
            params: *params,
            mix: ModeMix::new(mode, params.mix_rate),
            position: Vec3::ZERO,
            target: Vec3::ZERO,
        };
        rig.place(0.0);
        rig
    }

    /// Advance the orbit and the universe pull-back.
    pub fn update(&mut self, time: f32, delta: f32, mode: ViewMode) {
        self.mix.update(mode, delta);
        self.place(time);
    }

    fn place(&mut self, time: f32) {
        let m = self.mix.value();
        let p = &self.params;
        let distance = p.distance * (1.0 - m) + p.universe_distance * m;
        let height = p.height * (1.0 - m) + p.universe_height * m;
        let angle = time * p.orbit_speed;
        self.position = Vec3::new(angle.sin() * distance, height, angle.cos() * distance);
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    /// Projection matrix for the given aspect ratio.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.params.fov_degrees.to_radians(),
            aspect.max(1e-3),
            self.params.near,
            self.params.far,
        )
    }

    /// Combined view-projection matrix.
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// World-space picking ray through normalized device coordinates.
    ///
    /// `ndc` is `(-1, -1)` bottom-left to `(1, 1)` top-right.
    pub fn ray_from_ndc(&self, ndc_x: f32, ndc_y: f32, aspect: f32) -> Ray {
        let inv = self.view_projection(aspect).inverse();
        let near = inv * Vec4::new(ndc_x, ndc_y, 0.0, 1.0);
        let far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;
        Ray::new(near, far - near)
    }

    /// Current pull-back blend.
    pub fn mix(&self) -> f32 {
        self.mix.value()
    }
}

/// Convert a cursor position in physical pixels to NDC.
pub fn cursor_to_ndc(x: f64, y: f64, width: u32, height: u32) -> (f32, f32) {
    let w = width.max(1) as f64;
    let h = height.max(1) as f64;
    ((2.0 * x / w - 1.0) as f32, (1.0 - 2.0 * y / h) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_radius() {
        let mut rig = CameraRig::new(&CameraParams::default(), ViewMode::Tree);
        for i in 0..20 {
            rig.update(i as f32 * 3.0, 1.0 / 60.0, ViewMode::Tree);
            let planar = Vec3::new(rig.position.x, 0.0, rig.position.z).length();
            assert!((planar - 14.0).abs() < 1e-3);
            assert_eq!(rig.position.y, 2.0);
        }
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let rig = CameraRig::new(&CameraParams::default(), ViewMode::Tree);
        let ray = rig.ray_from_ndc(0.0, 0.0, 16.0 / 9.0);
        let to_target = (rig.target - rig.position).normalize();
        assert!(ray.direction.dot(to_target) > 0.9999);
    }

    #[test]
    fn test_universe_pulls_back() {
        let mut rig = CameraRig::new(&CameraParams::default(), ViewMode::Tree);
        for i in 0..600 {
            rig.update(i as f32 / 60.0, 1.0 / 60.0, ViewMode::Universe);
        }
        assert!(rig.position.length() > 19.0);
    }

    #[test]
    fn test_cursor_to_ndc() {
        assert_eq!(cursor_to_ndc(0.0, 0.0, 800, 600), (-1.0, 1.0));
        assert_eq!(cursor_to_ndc(400.0, 300.0, 800, 600), (0.0, 0.0));
    }
}
