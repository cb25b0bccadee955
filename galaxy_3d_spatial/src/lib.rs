/*!
# Galaxy 3D Spatial

Dynamic spatial partitioning for per-frame culling in the Galaxy 3D engine.

A quadtree (and an octree variant) indexes caller-owned objects by their
oriented bounding boxes and answers three queries: which objects a camera
frustum sees, which objects overlap an arbitrary volume, and which object a
ray hits first.

## Architecture

- **bounds**: AABB, OBB, Frustum, Ray and the 3-way `Containment` test
- **tree**: `SpatialTree` generic over handle type and `Subdivision`
  (`Quadtree<K>`, `Octree<K>`), `TreePath` removal shortcuts
- **scene**: `SceneObjects`, a slot-map object store that keeps a tree in
  sync with insertions, removals and parallel per-object updates

The trees store handles only; object data is read on demand through the
`CullingSource` trait, so the caller stays the single owner.

## Example

```
use galaxy_3d_spatial::galaxy3d::bounds::{AABB, OBB, Ray};
use galaxy_3d_spatial::galaxy3d::scene::{ObjectKey, SceneObjects, SceneObject};
use galaxy_3d_spatial::galaxy3d::tree::Quadtree;
use galaxy_3d_spatial::glam::{Quat, Vec3};

let mut tree: Quadtree<ObjectKey> = Quadtree::new();
tree.initialize(AABB::from_center_half_extents(Vec3::ZERO, Vec3::splat(100.0)))?;

let mut objects = SceneObjects::new();
let key = objects.insert(
    SceneObject::new(OBB::new(Vec3::new(10.0, 0.0, 0.0), Vec3::ONE, Quat::IDENTITY)),
    &mut tree,
)?;

tree.recalculate_culling_bounds(&objects)?;
let hit = tree.raycast(&Ray::new(Vec3::new(-50.0, 0.0, 0.0), Vec3::X), &objects)?;
assert_eq!(hit.map(|hit| hit.key), Some(key));
# Ok::<(), galaxy_3d_spatial::galaxy3d::Error>(())
```
*/

// Internal modules
mod error;
pub mod log;
pub mod bounds;
pub mod tree;
pub mod scene;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging sub-module (types and global controls; spatial_* macros are exported at the crate root)
    pub mod log {
        pub use crate::log::{
            Logger, LogEntry, LogSeverity, DefaultLogger,
            set_logger, reset_logger, set_min_severity, min_severity,
        };
    }

    // Bounding volumes and intersection primitives
    pub mod bounds {
        pub use crate::bounds::*;
    }

    // Quadtree / octree
    pub mod tree {
        pub use crate::tree::*;
    }

    // Object store
    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
