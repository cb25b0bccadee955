/// Rays and ray intersection primitives.
///
/// Boxes use the slab method (entry = largest entry distance, exit =
/// smallest exit distance). Triangles use Möller–Trumbore with backface
/// culling and an epsilon scaled to the triangle's size.

use glam::Vec3;
use super::aabb::AABB;
use super::obb::OBB;

/// Direction components below this are treated as parallel to a slab.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Relative determinant threshold for Möller–Trumbore, multiplied by the
/// product of the two edge lengths.
const TRIANGLE_EPSILON_SCALE: f32 = 1e-6;

/// World-space ray with an optional maximum length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Ray origin
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
    /// Hits farther than this are ignored (`f32::INFINITY` = unbounded)
    pub max_length: f32,
}

/// A single ray hit: distance along the ray and surface normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin
    pub distance: f32,
    /// Unit normal of the surface that was hit, facing the ray
    pub normal: Vec3,
}

/// Triangle with counter-clockwise front face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
}

impl Triangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Unit face normal (zero for a degenerate triangle).
    pub fn normal(&self) -> Vec3 {
        (self.v1 - self.v0).cross(self.v2 - self.v0).normalize_or_zero()
    }
}

impl Ray {
    /// Unbounded ray. `direction` is normalized here.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            max_length: f32::INFINITY,
        }
    }

    /// Limit the ray to `max_length`.
    pub fn with_max_length(mut self, max_length: f32) -> Self {
        self.max_length = max_length;
        self
    }

    /// Point at distance `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Ray vs AABB.
    pub fn intersect_aabb(&self, aabb: &AABB) -> Option<RayHit> {
        self.intersect_obb(&OBB::from(*aabb))
    }

    /// Ray vs OBB using the slab method against the box's local axes.
    ///
    /// A ray starting inside the box hits at distance 0 with the normal
    /// opposing the ray direction.
    pub fn intersect_obb(&self, obb: &OBB) -> Option<RayHit> {
        let to_center = obb.center - self.origin;

        let mut t_entry = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut entry_normal = Vec3::ZERO;

        for i in 0..3 {
            let axis = obb.axes[i];
            let half = obb.half_extents[i];
            let e = axis.dot(to_center);
            let f = axis.dot(self.direction);

            if f.abs() > PARALLEL_EPSILON {
                // t_near hits the face at -half, t_far the face at +half
                let mut t_near = (e - half) / f;
                let mut t_far = (e + half) / f;
                let mut near_normal = -axis;
                if t_near > t_far {
                    std::mem::swap(&mut t_near, &mut t_far);
                    near_normal = axis;
                }

                if t_near > t_entry {
                    t_entry = t_near;
                    entry_normal = near_normal;
                }
                if t_far < t_exit {
                    t_exit = t_far;
                }

                if t_entry > t_exit || t_exit < 0.0 {
                    return None;
                }
            } else if -e - half > 0.0 || -e + half < 0.0 {
                // Parallel to this slab and outside it
                return None;
            }
        }

        let hit = if t_entry >= 0.0 {
            RayHit { distance: t_entry, normal: entry_normal }
        } else {
            RayHit { distance: 0.0, normal: -self.direction }
        };

        (hit.distance <= self.max_length).then_some(hit)
    }

    /// Ray vs triangle (Möller–Trumbore), back faces are culled.
    pub fn intersect_triangle(&self, triangle: &Triangle) -> Option<RayHit> {
        let edge1 = triangle.v1 - triangle.v0;
        let edge2 = triangle.v2 - triangle.v0;

        let face = edge1.cross(edge2);
        if face.dot(self.direction) >= 0.0 {
            return None;
        }

        let p = self.direction.cross(edge2);
        let det = edge1.dot(p);
        let epsilon = TRIANGLE_EPSILON_SCALE * edge1.length() * edge2.length();
        if det.abs() <= epsilon {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = self.origin - triangle.v0;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(q) * inv_det;
        if t < 0.0 || t > self.max_length {
            return None;
        }

        Some(RayHit { distance: t, normal: face.normalize() })
    }
}

#[cfg(test)]
#[path = "ray_tests.rs"]
mod tests;
