/// Tree capacity and depth policy.
///
/// These are tuning knobs, not invariants: exceeding them only changes
/// query cost, never results.

/// Items a leaf holds before it splits
pub const MAX_ITEMS_IN_NODE: usize = 16;

/// Default maximum depth of the quadtree (root = 0)
pub const QUADTREE_MAX_DEPTH: u32 = 5;

/// Default maximum depth of the octree (root = 0)
pub const OCTREE_MAX_DEPTH: u32 = 3;

/// Split/merge policy for a spatial tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeConfig {
    /// A leaf splits when an insert would exceed this many items,
    /// and children merge back when their union fits in it
    pub max_items_in_node: usize,
    /// Leaves at this depth never split
    pub max_depth: u32,
}

impl TreeConfig {
    /// Quadtree defaults (16 items, depth 5)
    pub fn quadtree() -> Self {
        Self {
            max_items_in_node: MAX_ITEMS_IN_NODE,
            max_depth: QUADTREE_MAX_DEPTH,
        }
    }

    /// Octree defaults (16 items, depth 3)
    pub fn octree() -> Self {
        Self {
            max_items_in_node: MAX_ITEMS_IN_NODE,
            max_depth: OCTREE_MAX_DEPTH,
        }
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::quadtree()
    }
}
