/// Split geometry shared by the quadtree and octree.
///
/// The two trees run the same node code; a `Subdivision` supplies the
/// child count, how a region is cut, and whether nodes keep tightened
/// culling bounds.

use glam::Vec3;
use crate::bounds::AABB;
use super::config::TreeConfig;

/// How a node region is divided among its children.
pub trait Subdivision: Send + Sync + 'static {
    /// Number of children created by a split
    const CHILD_COUNT: usize;

    /// Whether nodes maintain lazily tightened culling bounds
    const TIGHTEN_CULLING_BOUNDS: bool;

    /// Log source for this tree kind
    const LOG_SOURCE: &'static str;

    /// Default split/merge policy
    fn default_config() -> TreeConfig;

    /// Region of child `index` (0..CHILD_COUNT) of `parent`.
    fn child_bounds(parent: &AABB, index: usize) -> AABB;
}

/// Horizontal 4-way split on X and Z; every child spans the parent's full Y.
///
/// Child bit layout: bit0 = X, bit1 = Z (0 = low, 1 = high).
#[derive(Debug, Clone, Copy, Default)]
pub struct Quadrants;

impl Subdivision for Quadrants {
    const CHILD_COUNT: usize = 4;
    const TIGHTEN_CULLING_BOUNDS: bool = true;
    const LOG_SOURCE: &'static str = "galaxy3d::Quadtree";

    fn default_config() -> TreeConfig {
        TreeConfig::quadtree()
    }

    fn child_bounds(parent: &AABB, index: usize) -> AABB {
        let center = parent.center();
        AABB {
            min: Vec3::new(
                if index & 1 == 0 { parent.min.x } else { center.x },
                parent.min.y,
                if index & 2 == 0 { parent.min.z } else { center.z },
            ),
            max: Vec3::new(
                if index & 1 == 0 { center.x } else { parent.max.x },
                parent.max.y,
                if index & 2 == 0 { center.z } else { parent.max.z },
            ),
        }
    }
}

/// 8-way split on all three axes.
///
/// Octant bit layout: bit0 = X, bit1 = Y, bit2 = Z (0 = low, 1 = high).
#[derive(Debug, Clone, Copy, Default)]
pub struct Octants;

impl Subdivision for Octants {
    const CHILD_COUNT: usize = 8;
    const TIGHTEN_CULLING_BOUNDS: bool = false;
    const LOG_SOURCE: &'static str = "galaxy3d::Octree";

    fn default_config() -> TreeConfig {
        TreeConfig::octree()
    }

    fn child_bounds(parent: &AABB, index: usize) -> AABB {
        let center = parent.center();
        AABB {
            min: Vec3::new(
                if index & 1 == 0 { parent.min.x } else { center.x },
                if index & 2 == 0 { parent.min.y } else { center.y },
                if index & 4 == 0 { parent.min.z } else { center.z },
            ),
            max: Vec3::new(
                if index & 1 == 0 { center.x } else { parent.max.x },
                if index & 2 == 0 { center.y } else { parent.max.y },
                if index & 4 == 0 { center.z } else { parent.max.z },
            ),
        }
    }
}
