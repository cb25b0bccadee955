/// SpatialTree: root-owning wrapper around `TreeNode`.
///
/// The tree stores object handles only. Every call that needs an object's
/// bounds or enabled flag takes a `CullingSource` so the caller stays the
/// single owner of object data.
///
/// Typical frame:
/// 1. insert/remove objects whose bounds changed
/// 2. `recalculate_culling_bounds` (quadtree only, no-op for the octree)
/// 3. `frustum_cull` / `box_cull` / `raycast`

use std::hash::Hash;
use rustc_hash::FxHashSet;
use crate::error::{Error, Result};
use crate::bounds::{AABB, OBB, CullVolume, Frustum, Ray};
use super::config::TreeConfig;
use super::debug::{DebugNodeBox, DebugStructureOptions, TreeStats};
use super::node::TreeNode;
use super::path::TreePath;
use super::source::CullingSource;
use super::subdivision::{Octants, Quadrants, Subdivision};

/// Dynamic quadtree: 4-way X/Z splits, tightened culling bounds.
pub type Quadtree<K> = SpatialTree<K, Quadrants>;

/// Dynamic octree: 8-way splits, static node regions only.
pub type Octree<K> = SpatialTree<K, Octants>;

/// Nearest raycast hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit<K> {
    /// Handle of the object that was hit
    pub key: K,
    /// Distance from the ray origin
    pub distance: f32,
    /// Surface normal at the hit point
    pub normal: glam::Vec3,
}

/// Dynamic spatial tree over caller-owned objects.
pub struct SpatialTree<K, S: Subdivision> {
    root: Option<TreeNode<K, S>>,
    config: TreeConfig,
}

impl<K, S> SpatialTree<K, S>
where
    K: Copy + Eq + Hash,
    S: Subdivision,
{
    /// Create an uninitialized tree with the subdivision's default policy.
    pub fn new() -> Self {
        Self::with_config(S::default_config())
    }

    /// Create an uninitialized tree with a custom split/merge policy.
    ///
    /// `max_depth` is clamped to what a `TreePath` can encode and
    /// `max_items_in_node` to at least 1.
    pub fn with_config(mut config: TreeConfig) -> Self {
        if config.max_depth > TreePath::MAX_DEPTH {
            crate::spatial_warn!(S::LOG_SOURCE,
                "max_depth {} exceeds path capacity, clamping to {}",
                config.max_depth, TreePath::MAX_DEPTH);
            config.max_depth = TreePath::MAX_DEPTH;
        }
        config.max_items_in_node = config.max_items_in_node.max(1);
        Self { root: None, config }
    }

    /// Helper to log errors before returning them
    fn log_and_return_error(error: Error) -> Error {
        crate::spatial_error!(S::LOG_SOURCE, "{}", error);
        error
    }

    fn root(&self) -> Result<&TreeNode<K, S>> {
        self.root.as_ref().ok_or_else(|| Self::log_and_return_error(Error::NotInitialized))
    }

    fn root_mut(&mut self) -> Result<&mut TreeNode<K, S>> {
        self.root.as_mut().ok_or_else(|| Self::log_and_return_error(Error::NotInitialized))
    }

    // ===== LIFECYCLE =====

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.root.is_some()
    }

    /// Allocate the root node covering `scene_bounds`.
    ///
    /// # Errors
    ///
    /// - `AlreadyInitialized` if the tree already has a root
    /// - `InvalidBounds` if the bounds are non-finite or inverted
    pub fn initialize(&mut self, scene_bounds: AABB) -> Result<()> {
        if self.root.is_some() {
            return Err(Self::log_and_return_error(Error::AlreadyInitialized));
        }
        if !scene_bounds.is_valid() {
            return Err(Self::log_and_return_error(Error::InvalidBounds(
                format!("min {:?} max {:?}", scene_bounds.min, scene_bounds.max),
            )));
        }

        self.root = Some(TreeNode::new(scene_bounds));
        crate::spatial_info!(S::LOG_SOURCE,
            "Initialized (min {:?}, max {:?}, {} items/node, depth {})",
            scene_bounds.min, scene_bounds.max,
            self.config.max_items_in_node, self.config.max_depth);
        Ok(())
    }

    /// Release the root and every node below it. No-op when uninitialized.
    pub fn shutdown(&mut self) {
        if self.root.take().is_some() {
            crate::spatial_info!(S::LOG_SOURCE, "Shut down");
        }
    }

    /// Drop all items and children, keeping the scene region.
    pub fn clear(&mut self) -> Result<()> {
        self.root_mut()?.clear();
        Ok(())
    }

    /// Region passed to `initialize`.
    pub fn scene_bounds(&self) -> Result<AABB> {
        Ok(*self.root()?.bounds())
    }

    /// Root node, for read-only inspection.
    pub fn root_node(&self) -> Option<&TreeNode<K, S>> {
        self.root.as_ref()
    }

    // ===== MUTATION =====

    /// Insert `key` into every leaf its `bounds` touch.
    ///
    /// Returns `Ok(false)` when the bounds lie entirely outside the scene.
    /// `source` is consulted when a full leaf splits and its items are
    /// redistributed.
    pub fn insert<Src>(&mut self, key: K, bounds: &OBB, source: &Src) -> Result<bool>
    where
        Src: CullingSource<K> + ?Sized,
    {
        Ok(!self.insert_tracked(key, bounds, source)?.is_empty())
    }

    /// Like `insert`, returning the paths of the leaves that received `key`.
    ///
    /// Paths are a removal shortcut for `remove_at_paths`.
    pub fn insert_tracked<Src>(&mut self, key: K, bounds: &OBB, source: &Src) -> Result<Vec<TreePath>>
    where
        Src: CullingSource<K> + ?Sized,
    {
        let config = self.config;
        let root = self.root_mut()?;
        let mut placed = Vec::new();
        if !root.insert(key, bounds, 0, TreePath::ROOT, &config, source, &mut placed) {
            crate::spatial_debug!(S::LOG_SOURCE,
                "Insert outside scene bounds ignored (center {:?})", bounds.center);
        }
        Ok(placed)
    }

    /// Remove `key` from the leaves `bounds` touch.
    ///
    /// `bounds` must be the bounds used at insertion (or the object's last
    /// culling bounds). With `skip_intersection_test` every leaf is visited
    /// instead. Returns whether anything was removed.
    pub fn remove(&mut self, key: K, bounds: &OBB, skip_intersection_test: bool) -> Result<bool> {
        let config = self.config;
        let filter = (!skip_intersection_test).then_some(bounds);
        Ok(self.root_mut()?.remove(key, filter, 0, &config))
    }

    /// Remove `key` following paths recorded by `insert_tracked`.
    ///
    /// Paths made stale by later splits or merges still work: removal
    /// sweeps the subtree where a path stops early.
    pub fn remove_at_paths(&mut self, key: K, paths: &[TreePath]) -> Result<bool> {
        let config = self.config;
        let root = self.root_mut()?;
        let mut removed = false;
        for &path in paths {
            removed |= root.remove_along_path(key, path, 0, &config);
        }
        Ok(removed)
    }

    // ===== CULLING BOUNDS =====

    /// Rebuild dirty culling bounds. Call once per frame, after every
    /// insert/remove/enable change and before any query.
    pub fn recalculate_culling_bounds<Src>(&mut self, source: &Src) -> Result<()>
    where
        Src: CullingSource<K> + ?Sized,
    {
        let root = self.root_mut()?;
        if S::TIGHTEN_CULLING_BOUNDS {
            root.recalculate_culling_bounds(source);
        }
        Ok(())
    }

    /// Mark culling bounds touching `bounds` dirty, for objects whose
    /// enabled flag changed without reinsertion.
    pub fn invalidate(&mut self, bounds: &OBB) -> Result<()> {
        self.root_mut()?.invalidate(Some(bounds));
        Ok(())
    }

    /// Mark every node's culling bounds dirty.
    pub fn invalidate_all(&mut self) -> Result<()> {
        self.root_mut()?.invalidate(None);
        Ok(())
    }

    // ===== QUERIES =====

    /// Append the enabled objects intersecting `frustum` to `out`.
    ///
    /// Results are unordered; each handle appears at most once, including
    /// handles already present in `out`.
    pub fn frustum_cull<Src>(&self, frustum: &Frustum, source: &Src, out: &mut Vec<K>) -> Result<()>
    where
        Src: CullingSource<K> + ?Sized,
    {
        self.box_cull(frustum, source, out)
    }

    /// Append the enabled objects intersecting `volume` (OBB, AABB or
    /// frustum) to `out`, deduplicated.
    pub fn box_cull<V, Src>(&self, volume: &V, source: &Src, out: &mut Vec<K>) -> Result<()>
    where
        V: CullVolume + ?Sized,
        Src: CullingSource<K> + ?Sized,
    {
        let root = self.root()?;
        let mut seen: FxHashSet<K> = out.iter().copied().collect();
        root.cull(volume, source, &mut seen, out);
        Ok(())
    }

    /// Nearest enabled object hit by `ray`, if any.
    pub fn raycast<Src>(&self, ray: &Ray, source: &Src) -> Result<Option<RaycastHit<K>>>
    where
        Src: CullingSource<K> + ?Sized,
    {
        let root = self.root()?;
        if ray.intersect_aabb(root.bounds()).is_none() {
            return Ok(None);
        }

        let mut best = None;
        root.raycast(ray, source, &mut best);
        Ok(best.map(|(key, hit)| RaycastHit {
            key,
            distance: hit.distance,
            normal: hit.normal,
        }))
    }

    // ===== DIAGNOSTICS =====

    /// Append node regions to `out`, optionally filtered by `frustum`.
    pub fn debug_structure(
        &self,
        options: DebugStructureOptions,
        frustum: Option<&Frustum>,
        out: &mut Vec<DebugNodeBox>,
    ) -> Result<()> {
        self.root()?.debug_structure(0, &options, frustum, out);
        Ok(())
    }

    pub fn stats(&self) -> Result<TreeStats> {
        let mut stats = TreeStats::default();
        self.root()?.accumulate_stats(0, &mut stats);
        Ok(stats)
    }

    /// Whether `key` is stored in any leaf.
    pub fn contains(&self, key: K) -> bool {
        self.root.as_ref().is_some_and(|root| root.contains_item(key))
    }

    /// Every indexed handle, once each.
    pub fn indexed_items(&self) -> Result<Vec<K>> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        self.root()?.collect_items(&mut seen, &mut out);
        Ok(out)
    }
}

impl<K, S> Default for SpatialTree<K, S>
where
    K: Copy + Eq + Hash,
    S: Subdivision,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "spatial_tree_tests.rs"]
mod tests;
