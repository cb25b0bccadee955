/// Capability interface the trees use to read caller-owned objects.
///
/// The trees store only handles. Whenever they need an object's current
/// bounds or enabled state (split, culling-bounds recompute, queries) they
/// ask the `CullingSource` passed to that call.

use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};
use crate::bounds::{OBB, Ray, RayHit};

/// Read access to the objects indexed by a tree.
pub trait CullingSource<K> {
    /// Current world-space bounds, or `None` if the handle is unknown.
    fn bounds(&self, key: K) -> Option<OBB>;

    /// Disabled objects stay indexed but are skipped by queries and by
    /// culling-bounds recomputation.
    fn is_enabled(&self, _key: K) -> bool {
        true
    }

    /// Narrow-phase ray test. Defaults to the object's bounds.
    fn intersect_ray(&self, key: K, ray: &Ray) -> Option<RayHit> {
        self.bounds(key).and_then(|bounds| ray.intersect_obb(&bounds))
    }
}

impl<K, S> CullingSource<K> for HashMap<K, OBB, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn bounds(&self, key: K) -> Option<OBB> {
        self.get(&key).copied()
    }
}
