/// Read-only views of a tree's structure for debug drawing and profiling.

use bytemuck::{Pod, Zeroable};
use crate::bounds::AABB;

/// One node region, laid out for direct upload as line-box instance data.
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct DebugNodeBox {
    pub min: [f32; 3],
    /// Node depth (root = 0)
    pub depth: u32,
    pub max: [f32; 3],
    /// Items stored directly in the node (0 for internal nodes)
    pub item_count: u32,
}

impl DebugNodeBox {
    pub(crate) fn new(region: &AABB, depth: u32, item_count: usize) -> Self {
        Self {
            min: region.min.to_array(),
            depth,
            max: region.max.to_array(),
            item_count: u32::try_from(item_count).unwrap_or(u32::MAX),
        }
    }

    /// Region as an AABB.
    pub fn aabb(&self) -> AABB {
        AABB::new(self.min.into(), self.max.into())
    }
}

/// Filters for `SpatialTree::debug_structure`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugStructureOptions {
    /// Emit only leaf nodes
    pub leaves_only: bool,
    /// Emit tight culling bounds instead of static regions; nodes known to
    /// be empty are skipped together with their subtree
    pub use_culling_bounds: bool,
}

/// Shape summary of a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub node_count: usize,
    pub leaf_count: usize,
    /// Sum of leaf item counts; straddling items count once per leaf
    pub item_entries: usize,
    pub max_depth_reached: u32,
}

#[cfg(test)]
#[path = "debug_tests.rs"]
mod tests;
