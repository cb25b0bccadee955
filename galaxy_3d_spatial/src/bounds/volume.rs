/// Query volumes for hierarchical culling.
///
/// A `CullVolume` classifies tree regions (always AABBs) and tests object
/// bounds (always OBBs). Frustums, OBBs and AABBs all implement it, so the
/// trees run a single traversal for frustum and box culling.

use super::aabb::AABB;
use super::frustum::Frustum;
use super::obb::OBB;

/// Result of a 3-way volume/region classification.
///
/// Used by the spatial trees for hierarchical culling:
/// - `Disjoint` → skip the entire subtree
/// - `Contains` → collect all objects without further testing
/// - `Intersects` → test individual objects and recurse into children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    /// Region is entirely outside the volume
    Disjoint,
    /// Region partially overlaps the volume
    Intersects,
    /// Region is entirely inside the volume
    Contains,
}

/// A convex query volume usable by `frustum_cull` / `box_cull`.
pub trait CullVolume {
    /// Classify a tree region against this volume.
    fn classify_aabb(&self, aabb: &AABB) -> Containment;

    /// Whether an object's bounds touch this volume.
    fn intersects_obb(&self, obb: &OBB) -> bool;
}

impl CullVolume for Frustum {
    fn classify_aabb(&self, aabb: &AABB) -> Containment {
        Frustum::classify_aabb(self, aabb)
    }

    fn intersects_obb(&self, obb: &OBB) -> bool {
        Frustum::intersects_obb(self, obb)
    }
}

impl CullVolume for OBB {
    fn classify_aabb(&self, aabb: &AABB) -> Containment {
        if !self.intersects_aabb(aabb) {
            return Containment::Disjoint;
        }
        if aabb.corners().iter().all(|&corner| self.contains_point(corner)) {
            Containment::Contains
        } else {
            Containment::Intersects
        }
    }

    fn intersects_obb(&self, obb: &OBB) -> bool {
        OBB::intersects_obb(self, obb)
    }
}

impl CullVolume for AABB {
    fn classify_aabb(&self, aabb: &AABB) -> Containment {
        if !self.intersects(aabb) {
            Containment::Disjoint
        } else if self.contains(aabb) {
            Containment::Contains
        } else {
            Containment::Intersects
        }
    }

    fn intersects_obb(&self, obb: &OBB) -> bool {
        obb.intersects_aabb(self)
    }
}

#[cfg(test)]
#[path = "volume_tests.rs"]
mod tests;
