//! Bounds module: bounding volumes and intersection primitives.
//!
//! Passive math types shared by the spatial trees and their callers:
//! axis-aligned and oriented boxes, frustums, rays and triangles, plus the
//! 3-way `Containment` classification used for hierarchical culling.

mod aabb;
mod obb;
mod frustum;
mod ray;
mod volume;

pub use aabb::AABB;
pub use obb::OBB;
pub use frustum::{
    Frustum,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
pub use ray::{Ray, RayHit, Triangle};
pub use volume::{Containment, CullVolume};
