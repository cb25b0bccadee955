/// Oriented Bounding Box: per-object bounds consumed by the spatial trees.
///
/// Defined by a center, non-negative half-extents and three orthonormal
/// axes. An AABB is the special case with the world axes.

use glam::{Mat4, Quat, Vec3};
use super::aabb::AABB;

/// Tolerance added to the rotation terms of the separating axis test so
/// that near-parallel edge pairs do not produce false separations.
const SAT_EPSILON: f32 = 1e-6;

/// Oriented Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OBB {
    /// Center in world space
    pub center: Vec3,
    /// Half size along each local axis
    pub half_extents: Vec3,
    /// Local axes (unit length, mutually orthogonal)
    pub axes: [Vec3; 3],
}

impl OBB {
    /// Create an OBB from center, half-extents and an orientation.
    pub fn new(center: Vec3, half_extents: Vec3, rotation: Quat) -> Self {
        Self {
            center,
            half_extents,
            axes: [rotation * Vec3::X, rotation * Vec3::Y, rotation * Vec3::Z],
        }
    }

    /// Place a local-space AABB in the world with a TRS matrix.
    ///
    /// Scale is folded into the half-extents; the matrix must not shear.
    pub fn from_transformed_aabb(local: &AABB, matrix: &Mat4) -> Self {
        let center = matrix.transform_point3(local.center());
        let half = local.half_extents();
        let mut axes = [Vec3::X, Vec3::Y, Vec3::Z];
        let mut half_extents = Vec3::ZERO;
        for i in 0..3 {
            let column = matrix.col(i).truncate();
            let scale = column.length();
            if scale > 0.0 {
                axes[i] = column / scale;
            }
            half_extents[i] = half[i] * scale;
        }
        Self { center, half_extents, axes }
    }

    /// The 8 corners, bit0 = axis X, bit1 = axis Y, bit2 = axis Z (0 = negative side).
    pub fn corners(&self) -> [Vec3; 8] {
        let [ax, ay, az] = self.scaled_axes();
        std::array::from_fn(|i| {
            let sx = if i & 1 == 0 { -1.0 } else { 1.0 };
            let sy = if i & 2 == 0 { -1.0 } else { 1.0 };
            let sz = if i & 4 == 0 { -1.0 } else { 1.0 };
            self.center + ax * sx + ay * sy + az * sz
        })
    }

    /// Tight world AABB around this box.
    pub fn enclosing_aabb(&self) -> AABB {
        let [ax, ay, az] = self.scaled_axes();
        let extent = ax.abs() + ay.abs() + az.abs();
        AABB::from_center_half_extents(self.center, extent)
    }

    /// Radius of the projection of this box onto `direction`.
    pub fn projected_radius(&self, direction: Vec3) -> f32 {
        self.half_extents.x * self.axes[0].dot(direction).abs()
            + self.half_extents.y * self.axes[1].dot(direction).abs()
            + self.half_extents.z * self.axes[2].dot(direction).abs()
    }

    /// Test if a point lies inside or on the boundary.
    pub fn contains_point(&self, point: Vec3) -> bool {
        let d = point - self.center;
        (0..3).all(|i| d.dot(self.axes[i]).abs() <= self.half_extents[i] + SAT_EPSILON)
    }

    /// Separating axis test against another OBB (15 candidate axes).
    ///
    /// Touching boxes count as intersecting.
    pub fn intersects_obb(&self, other: &OBB) -> bool {
        let a = self.half_extents;
        let b = other.half_extents;

        // Rotation of `other` expressed in this box's frame
        let mut r = [[0.0f32; 3]; 3];
        let mut abs_r = [[0.0f32; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                r[i][j] = self.axes[i].dot(other.axes[j]);
                abs_r[i][j] = r[i][j].abs() + SAT_EPSILON;
            }
        }

        let d = other.center - self.center;
        let t = [d.dot(self.axes[0]), d.dot(self.axes[1]), d.dot(self.axes[2])];

        // Axes of self
        for i in 0..3 {
            let rb = b[0] * abs_r[i][0] + b[1] * abs_r[i][1] + b[2] * abs_r[i][2];
            if t[i].abs() > a[i] + rb {
                return false;
            }
        }

        // Axes of other
        for j in 0..3 {
            let ra = a[0] * abs_r[0][j] + a[1] * abs_r[1][j] + a[2] * abs_r[2][j];
            let tj = t[0] * r[0][j] + t[1] * r[1][j] + t[2] * r[2][j];
            if tj.abs() > ra + b[j] {
                return false;
            }
        }

        // Cross products of edge directions
        for i in 0..3 {
            let (i1, i2) = ((i + 1) % 3, (i + 2) % 3);
            for j in 0..3 {
                let (j1, j2) = ((j + 1) % 3, (j + 2) % 3);
                let ra = a[i1] * abs_r[i2][j] + a[i2] * abs_r[i1][j];
                let rb = b[j1] * abs_r[i][j2] + b[j2] * abs_r[i][j1];
                let dist = (t[i2] * r[i1][j] - t[i1] * r[i2][j]).abs();
                if dist > ra + rb {
                    return false;
                }
            }
        }

        true
    }

    /// Separating axis test against an AABB.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        // Cheap reject on the world axes first
        if !self.enclosing_aabb().intersects(aabb) {
            return false;
        }
        self.intersects_obb(&OBB::from(*aabb))
    }

    fn scaled_axes(&self) -> [Vec3; 3] {
        [
            self.axes[0] * self.half_extents.x,
            self.axes[1] * self.half_extents.y,
            self.axes[2] * self.half_extents.z,
        ]
    }
}

impl From<AABB> for OBB {
    fn from(aabb: AABB) -> Self {
        Self {
            center: aabb.center(),
            half_extents: aabb.half_extents(),
            axes: [Vec3::X, Vec3::Y, Vec3::Z],
        }
    }
}

#[cfg(test)]
#[path = "obb_tests.rs"]
mod tests;
