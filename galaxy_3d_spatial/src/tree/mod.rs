//! Tree module: dynamic quadtree/octree indexing of caller-owned objects.
//!
//! `SpatialTree` is generic over the handle type and a `Subdivision`:
//! `Quadtree<K>` splits on X/Z and maintains tight culling bounds,
//! `Octree<K>` splits on all three axes and culls against static regions.

mod config;
mod debug;
mod node;
mod path;
mod source;
mod spatial_tree;
mod subdivision;

pub use config::{TreeConfig, MAX_ITEMS_IN_NODE, QUADTREE_MAX_DEPTH, OCTREE_MAX_DEPTH};
pub use debug::{DebugNodeBox, DebugStructureOptions, TreeStats};
pub use node::{NodeFlags, TreeNode};
pub use path::{TreePath, BITS_PER_LEVEL};
pub use source::CullingSource;
pub use spatial_tree::{SpatialTree, Quadtree, Octree, RaycastHit};
pub use subdivision::{Subdivision, Quadrants, Octants};
