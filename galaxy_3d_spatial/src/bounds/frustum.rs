/// Frustum: up to six clipping planes for visibility culling.
///
/// Each plane is represented as a Vec4 (A, B, C, D) where:
/// - (A, B, C) is the inward-pointing normal
/// - D is the signed distance
/// - A point P is inside the frustum if dot(plane, P_homogeneous) >= 0 for all planes
///
/// The caller is responsible for computing and setting the frustum.
/// `from_view_projection()` covers the usual camera case; `from_planes()`
/// accepts any convex set of up to six planes (e.g. a light volume with
/// the near plane dropped).

use glam::{Mat4, Vec3, Vec4};
use super::aabb::AABB;
use super::obb::OBB;
use super::volume::Containment;

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

const MAX_PLANES: usize = 6;

/// Convex culling volume bounded by up to six planes.
///
/// Each plane is (A, B, C, D) where Ax + By + Cz + D = 0.
/// Normal (A, B, C) points inward (toward the visible volume).
/// Works with both perspective and orthographic projections.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    planes: [Vec4; MAX_PLANES],
    plane_count: usize,
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix.
    ///
    /// Uses the Gribb & Hartmann method. Works for both perspective
    /// and orthographic projections.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let m = vp.to_cols_array_2d();

        // Gribb & Hartmann: extract planes from rows of the VP matrix
        let planes = [
            // Left:   row3 + row0
            Vec4::new(m[0][3] + m[0][0], m[1][3] + m[1][0], m[2][3] + m[2][0], m[3][3] + m[3][0]),
            // Right:  row3 - row0
            Vec4::new(m[0][3] - m[0][0], m[1][3] - m[1][0], m[2][3] - m[2][0], m[3][3] - m[3][0]),
            // Bottom: row3 + row1
            Vec4::new(m[0][3] + m[0][1], m[1][3] + m[1][1], m[2][3] + m[2][1], m[3][3] + m[3][1]),
            // Top:    row3 - row1
            Vec4::new(m[0][3] - m[0][1], m[1][3] - m[1][1], m[2][3] - m[2][1], m[3][3] - m[3][1]),
            // Near:   row3 + row2
            Vec4::new(m[0][3] + m[0][2], m[1][3] + m[1][2], m[2][3] + m[2][2], m[3][3] + m[3][2]),
            // Far:    row3 - row2
            Vec4::new(m[0][3] - m[0][2], m[1][3] - m[1][2], m[2][3] - m[2][2], m[3][3] - m[3][2]),
        ];

        Self::from_planes(&planes)
    }

    /// Build a frustum from explicit inward-facing planes.
    ///
    /// Planes are normalized so that (A, B, C) is a unit vector. At most six
    /// planes are kept; extra planes are ignored.
    pub fn from_planes(planes: &[Vec4]) -> Self {
        let mut stored = [Vec4::ZERO; MAX_PLANES];
        let plane_count = planes.len().min(MAX_PLANES);

        for (dst, src) in stored.iter_mut().zip(planes) {
            let normal_len = src.truncate().length();
            *dst = if normal_len > 0.0 { *src / normal_len } else { *src };
        }

        Self { planes: stored, plane_count }
    }

    /// Active planes (normalized).
    pub fn planes(&self) -> &[Vec4] {
        &self.planes[..self.plane_count]
    }

    /// Test if a point lies inside all planes.
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes().iter().all(|plane| plane.truncate().dot(point) + plane.w >= 0.0)
    }

    /// Test if an AABB intersects this frustum.
    ///
    /// Uses the "positive vertex" test: for each plane, find the AABB corner
    /// most in the direction of the plane normal. If that corner is outside,
    /// the AABB is fully outside.
    ///
    /// May return false positives (conservative), never false negatives.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        self.classify_aabb(aabb) != Containment::Disjoint
    }

    /// Classify an AABB against the frustum (3-way test).
    ///
    /// Tests both the positive vertex (p-vertex) and negative vertex (n-vertex)
    /// against each plane:
    /// - If the p-vertex is outside any plane → `Disjoint` (early out)
    /// - If the n-vertex is outside any plane → at least `Intersects`
    /// - If all n-vertices are inside all planes → `Contains`
    pub fn classify_aabb(&self, aabb: &AABB) -> Containment {
        let mut all_inside = true;

        for plane in self.planes() {
            let normal = plane.truncate();

            // Positive vertex: corner most in the direction of the normal
            let p_vertex = Vec3::new(
                if normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );

            if normal.dot(p_vertex) + plane.w < 0.0 {
                return Containment::Disjoint;
            }

            // Negative vertex: corner least in the direction of the normal
            let n_vertex = Vec3::new(
                if normal.x >= 0.0 { aabb.min.x } else { aabb.max.x },
                if normal.y >= 0.0 { aabb.min.y } else { aabb.max.y },
                if normal.z >= 0.0 { aabb.min.z } else { aabb.max.z },
            );

            if normal.dot(n_vertex) + plane.w < 0.0 {
                all_inside = false;
            }
        }

        if all_inside { Containment::Contains } else { Containment::Intersects }
    }

    /// Test if an OBB intersects this frustum.
    ///
    /// Same conservative plane test as `intersects_aabb`, using the box's
    /// projected radius on each plane normal.
    pub fn intersects_obb(&self, obb: &OBB) -> bool {
        self.planes().iter().all(|plane| {
            let normal = plane.truncate();
            normal.dot(obb.center) + plane.w >= -obb.projected_radius(normal)
        })
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
