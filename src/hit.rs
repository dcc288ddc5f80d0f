//! Ray casting against the tree's click volume and the photo cards.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A picking ray. `direction` is expected to be normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Build a ray, normalizing `direction`.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at distance `t` along the ray.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Same ray expressed relative to a group placed at `origin`.
    #[inline]
    pub fn relative_to(&self, origin: Vec3) -> Ray {
        Ray {
            origin: self.origin - origin,
            direction: self.direction,
        }
    }
}

/// Nearest non-negative hit distance against a sphere.
pub fn intersect_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let near = -b - sqrt_disc;
    let far = -b + sqrt_disc;
    if near >= 0.0 {
        Some(near)
    } else if far >= 0.0 {
        // Origin is inside the sphere.
        Some(0.0)
    } else {
        None
    }
}

/// Invisible vertical cylinder wrapping the whole tree silhouette.
///
/// Clicking anywhere inside it toggles the view mode. Coordinates are in
/// tree-group space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeHitVolume {
    pub radius: f32,
    pub bottom: f32,
    pub top: f32,
}

impl Default for TreeHitVolume {
    fn default() -> Self {
        Self {
            radius: 4.5,
            bottom: -6.0,
            top: 7.0,
        }
    }
}

impl TreeHitVolume {
    /// Whether a point lies inside the volume.
    pub fn contains(&self, p: Vec3) -> bool {
        p.y >= self.bottom && p.y <= self.top && p.x * p.x + p.z * p.z <= self.radius * self.radius
    }

    /// Nearest non-negative distance at which `ray` enters the volume.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        if self.contains(ray.origin) {
            return Some(0.0);
        }

        let mut best: Option<f32> = None;
        let mut consider = |t: f32| {
            if t >= 0.0 && best.map_or(true, |b| t < b) {
                best = Some(t);
            }
        };

        // Side wall.
        let (ox, oz) = (ray.origin.x, ray.origin.z);
        let (dx, dz) = (ray.direction.x, ray.direction.z);
        let a = dx * dx + dz * dz;
        if a > 1e-12 {
            let b = ox * dx + oz * dz;
            let c = ox * ox + oz * oz - self.radius * self.radius;
            let disc = b * b - a * c;
            if disc >= 0.0 {
                let s = disc.sqrt();
                for t in [(-b - s) / a, (-b + s) / a] {
                    let y = ray.origin.y + ray.direction.y * t;
                    if y >= self.bottom && y <= self.top {
                        consider(t);
                    }
                }
            }
        }

        // Caps.
        if ray.direction.y.abs() > 1e-12 {
            for plane in [self.bottom, self.top] {
                let t = (plane - ray.origin.y) / ray.direction.y;
                let p = ray.at(t);
                if p.x * p.x + p.z * p.z <= self.radius * self.radius {
                    consider(t);
                }
            }
        }

        best
    }
}
