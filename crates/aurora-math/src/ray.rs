//! Rays and interval intersections against spheres and boxes.

use glam::Vec3;

use crate::{Aabb, Sphere};

/// A half-infinite ray with a normalized direction.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing the direction.
    ///
    /// # Panics
    ///
    /// Panics if the direction has near-zero length.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let len = direction.length();
        assert!(len > 1e-6, "ray direction must not be zero");
        Self {
            origin,
            direction: direction / len,
        }
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Point at parameter `t` along the ray.
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Intersect against a sphere, returning the `(t_enter, t_exit)` interval.
    ///
    /// `t_enter` is clamped to zero when the origin is inside the sphere.
    /// Returns `None` when the ray misses or the sphere is entirely behind
    /// the origin.
    pub fn intersect_sphere(&self, sphere: &Sphere) -> Option<(f32, f32)> {
        let oc = self.origin - sphere.center;
        // Direction is unit length, so the quadratic's `a` term is 1.
        let b = 2.0 * self.direction.dot(oc);
        let c = oc.dot(oc) - sphere.radius * sphere.radius;
        let d = b * b - 4.0 * c;
        if d < 0.0 {
            return None;
        }
        let sqrt_d = d.sqrt();
        let t0 = (-b - sqrt_d) * 0.5;
        let t1 = (-b + sqrt_d) * 0.5;
        if t1 < 0.0 {
            return None;
        }
        Some((t0.max(0.0), t1))
    }

    /// Intersect against an axis-aligned box via the slab method, returning
    /// the `(t_enter, t_exit)` interval with `t_enter` clamped to zero.
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<(f32, f32)> {
        let inv = self.direction.recip();
        let t_a = (aabb.min - self.origin) * inv;
        let t_b = (aabb.max - self.origin) * inv;

        let t_min = t_a.min(t_b).max_element();
        let t_max = t_a.max(t_b).min_element();

        if t_max >= t_min && t_max >= 0.0 {
            Some((t_min.max(0.0), t_max))
        } else {
            None
        }
    }
}
