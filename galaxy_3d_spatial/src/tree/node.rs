/// TreeNode: one region of a dynamic quadtree/octree.
///
/// Nodes own their children by value (`Vec<TreeNode>`, empty on leaves).
/// Items are stored only in leaves; an item whose bounds straddle a split
/// plane is stored in every leaf it touches, so queries deduplicate.
///
/// Each node keeps two regions:
/// - `bounds`: fixed when the parent splits, never changes afterwards
/// - `culling_bounds`: tight box around the enabled items below, rebuilt
///   lazily (only when `DIRTY`) and only for subdivisions that ask for it

use std::hash::Hash;
use std::marker::PhantomData;
use rustc_hash::FxHashSet;
use crate::bounds::{AABB, OBB, Containment, CullVolume, Frustum, Ray, RayHit};
use super::config::TreeConfig;
use super::debug::{DebugNodeBox, DebugStructureOptions, TreeStats};
use super::path::TreePath;
use super::source::CullingSource;
use super::subdivision::Subdivision;

/// Largest child count of any subdivision (octree)
const MAX_CHILDREN: usize = 8;

bitflags::bitflags! {
    /// Node state flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node has no children and stores items
        const LEAF  = 0b0000_0001;
        /// Culling bounds must be rebuilt before use
        const DIRTY = 0b0000_0010;
        /// Last rebuild found no enabled item below this node
        const EMPTY = 0b0000_0100;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::LEAF | Self::DIRTY
    }
}

/// A node of a `SpatialTree`.
pub struct TreeNode<K, S> {
    bounds: AABB,
    culling_bounds: AABB,
    children: Vec<TreeNode<K, S>>,
    items: Vec<K>,
    flags: NodeFlags,
    _subdivision: PhantomData<S>,
}

impl<K, S> TreeNode<K, S>
where
    K: Copy + Eq + Hash,
    S: Subdivision,
{
    pub(crate) fn new(bounds: AABB) -> Self {
        Self {
            bounds,
            culling_bounds: bounds,
            children: Vec::new(),
            items: Vec::new(),
            flags: NodeFlags::default(),
            _subdivision: PhantomData,
        }
    }

    // ===== ACCESSORS =====

    /// Static region assigned when this node was created.
    pub fn bounds(&self) -> &AABB {
        &self.bounds
    }

    /// Tight culling region, if one is currently valid.
    ///
    /// `None` when the subdivision does not tighten, when the node is dirty,
    /// or when no enabled item lies below it.
    pub fn culling_bounds(&self) -> Option<&AABB> {
        let valid = S::TIGHTEN_CULLING_BOUNDS
            && !self.flags.intersects(NodeFlags::DIRTY | NodeFlags::EMPTY);
        valid.then_some(&self.culling_bounds)
    }

    /// Child nodes (empty for a leaf).
    pub fn children(&self) -> &[TreeNode<K, S>] {
        &self.children
    }

    /// Items stored in this node (always empty for internal nodes).
    pub fn items(&self) -> &[K] {
        &self.items
    }

    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    pub fn is_leaf(&self) -> bool {
        self.flags.contains(NodeFlags::LEAF)
    }

    /// Region used to classify this node against a query volume.
    ///
    /// `None` means the node is known to hold no enabled item.
    fn cull_region(&self) -> Option<AABB> {
        if S::TIGHTEN_CULLING_BOUNDS && !self.flags.contains(NodeFlags::DIRTY) {
            (!self.flags.contains(NodeFlags::EMPTY)).then_some(self.culling_bounds)
        } else {
            Some(self.bounds)
        }
    }

    // ===== INSERT / SPLIT =====

    /// Insert `key` into every leaf its bounds touch, splitting full leaves.
    ///
    /// Returns false when `bounds` misses this node entirely. Each leaf that
    /// receives the key is reported through `placed`.
    pub(crate) fn insert<Src>(
        &mut self,
        key: K,
        bounds: &OBB,
        depth: u32,
        path: TreePath,
        config: &TreeConfig,
        source: &Src,
        placed: &mut Vec<TreePath>,
    ) -> bool
    where
        Src: CullingSource<K> + ?Sized,
    {
        if !bounds.intersects_aabb(&self.bounds) {
            return false;
        }
        self.flags.insert(NodeFlags::DIRTY);

        if self.is_leaf() {
            if depth >= config.max_depth || self.items.len() < config.max_items_in_node {
                if !self.items.contains(&key) {
                    self.items.push(key);
                }
                placed.push(path);
                return true;
            }
            self.split(depth, source);
        }

        let mut inserted = false;
        for (index, child) in self.children.iter_mut().enumerate() {
            inserted |= child.insert(
                key, bounds, depth + 1, path.child(index), config, source, placed,
            );
        }
        inserted
    }

    /// Turn a full leaf into an internal node.
    ///
    /// Items are redistributed by their *current* bounds. An item whose
    /// bounds no longer touch any child (it moved without being reinserted)
    /// goes to the child holding its clamped center so it stays indexed.
    /// An item the source cannot resolve goes to every child.
    fn split<Src>(&mut self, depth: u32, source: &Src)
    where
        Src: CullingSource<K> + ?Sized,
    {
        let items = std::mem::take(&mut self.items);
        self.children = (0..S::CHILD_COUNT)
            .map(|index| TreeNode::new(S::child_bounds(&self.bounds, index)))
            .collect();
        self.flags.remove(NodeFlags::LEAF);

        for &key in &items {
            let Some(bounds) = source.bounds(key) else {
                // Location unknown: keep it reachable from every child
                crate::spatial_warn!(S::LOG_SOURCE,
                    "Unknown item kept in all children while splitting node at depth {}", depth);
                for child in &mut self.children {
                    child.items.push(key);
                }
                continue;
            };

            let mut placed = false;
            for child in &mut self.children {
                if bounds.intersects_aabb(&child.bounds) {
                    child.items.push(key);
                    placed = true;
                }
            }

            if !placed {
                let center = bounds.center.clamp(self.bounds.min, self.bounds.max);
                let index = self.children.iter()
                    .position(|child| child.bounds.contains_point(center))
                    .unwrap_or(0);
                self.children[index].items.push(key);
            }
        }

        crate::spatial_trace!(S::LOG_SOURCE,
            "Split node at depth {} ({} items into {} children)",
            depth, items.len(), S::CHILD_COUNT);
    }

    // ===== REMOVE / MERGE =====

    /// Remove every occurrence of `key` from the leaves `bounds` touches,
    /// or from the whole subtree when `bounds` is `None`.
    pub(crate) fn remove(
        &mut self,
        key: K,
        bounds: Option<&OBB>,
        depth: u32,
        config: &TreeConfig,
    ) -> bool {
        if let Some(bounds) = bounds {
            if !bounds.intersects_aabb(&self.bounds) {
                return false;
            }
        }

        if self.is_leaf() {
            return self.remove_local(key);
        }

        let mut removed = false;
        for child in &mut self.children {
            removed |= child.remove(key, bounds, depth + 1, config);
        }
        if removed {
            self.flags.insert(NodeFlags::DIRTY);
            self.try_merge(depth, config);
        }
        removed
    }

    /// Remove `key` following a recorded leaf path.
    ///
    /// The tree may have changed since the path was recorded. If the path
    /// stops at an internal node (the leaf split later) the whole subtree is
    /// swept; if it runs past a leaf (children merged) the leaf is used.
    pub(crate) fn remove_along_path(
        &mut self,
        key: K,
        path: TreePath,
        depth: u32,
        config: &TreeConfig,
    ) -> bool {
        if self.is_leaf() {
            return self.remove_local(key);
        }

        let removed = match path.index_at(depth) {
            None => return self.remove(key, None, depth, config),
            Some(index) => match self.children.get_mut(index) {
                Some(child) => child.remove_along_path(key, path, depth + 1, config),
                None => false,
            },
        };
        if removed {
            self.flags.insert(NodeFlags::DIRTY);
            self.try_merge(depth, config);
        }
        removed
    }

    fn remove_local(&mut self, key: K) -> bool {
        let before = self.items.len();
        self.items.retain(|&item| item != key);
        let removed = self.items.len() != before;
        if removed {
            self.flags.insert(NodeFlags::DIRTY);
        }
        removed
    }

    /// Collapse the children into this node if they are all leaves and
    /// their deduplicated items fit in one node.
    fn try_merge(&mut self, depth: u32, config: &TreeConfig) -> bool {
        if self.children.iter().any(|child| !child.is_leaf()) {
            return false;
        }

        let mut seen = FxHashSet::default();
        let mut merged = Vec::new();
        for child in &self.children {
            for &key in &child.items {
                if seen.insert(key) {
                    if merged.len() == config.max_items_in_node {
                        return false;
                    }
                    merged.push(key);
                }
            }
        }

        self.children = Vec::new();
        self.items = merged;
        self.flags.insert(NodeFlags::LEAF | NodeFlags::DIRTY);

        crate::spatial_trace!(S::LOG_SOURCE,
            "Merged children of node at depth {} ({} items)", depth, self.items.len());
        true
    }

    /// Drop all items and children, keeping this node's region.
    pub(crate) fn clear(&mut self) {
        self.children = Vec::new();
        self.items.clear();
        self.flags = NodeFlags::default();
    }

    // ===== CULLING BOUNDS =====

    /// Rebuild tight culling bounds for every dirty node below this one.
    ///
    /// Leaf: enclosing box of the enabled items' OBB corners, X/Z clamped
    /// to the node region (Y left free). Internal: union of the non-empty
    /// children.
    pub(crate) fn recalculate_culling_bounds<Src>(&mut self, source: &Src)
    where
        Src: CullingSource<K> + ?Sized,
    {
        if !self.flags.contains(NodeFlags::DIRTY) {
            return;
        }

        let tight = if self.is_leaf() {
            AABB::from_points(
                self.items.iter()
                    .filter(|&&key| source.is_enabled(key))
                    .filter_map(|&key| source.bounds(key))
                    .flat_map(|bounds| bounds.corners()),
            )
            .map(|aabb| aabb.clamped_xz(&self.bounds))
        } else {
            for child in &mut self.children {
                child.recalculate_culling_bounds(source);
            }
            self.children.iter()
                .filter(|child| !child.flags.contains(NodeFlags::EMPTY))
                .map(|child| child.culling_bounds)
                .reduce(|a, b| a.merged(&b))
        };

        match tight {
            Some(aabb) => {
                self.culling_bounds = aabb;
                self.flags.remove(NodeFlags::EMPTY);
            }
            None => {
                self.culling_bounds = self.bounds;
                self.flags.insert(NodeFlags::EMPTY);
            }
        }
        self.flags.remove(NodeFlags::DIRTY);
    }

    /// Mark nodes touching `bounds` (all nodes when `None`) as dirty.
    pub(crate) fn invalidate(&mut self, bounds: Option<&OBB>) {
        if let Some(bounds) = bounds {
            if !bounds.intersects_aabb(&self.bounds) {
                return;
            }
        }
        self.flags.insert(NodeFlags::DIRTY);
        for child in &mut self.children {
            child.invalidate(bounds);
        }
    }

    // ===== QUERIES =====

    /// Hierarchical volume cull.
    ///
    /// 3-way classification at each node:
    /// - `Disjoint` → skip entire subtree
    /// - `Contains` → collect all enabled items without further testing
    /// - `Intersects` → test items individually at leaves, recurse otherwise
    pub(crate) fn cull<V, Src>(
        &self,
        volume: &V,
        source: &Src,
        seen: &mut FxHashSet<K>,
        out: &mut Vec<K>,
    )
    where
        V: CullVolume + ?Sized,
        Src: CullingSource<K> + ?Sized,
    {
        let Some(region) = self.cull_region() else {
            return;
        };

        match volume.classify_aabb(&region) {
            Containment::Disjoint => {}

            Containment::Contains => self.collect_enabled(source, seen, out),

            Containment::Intersects => {
                if !self.is_leaf() {
                    for child in &self.children {
                        child.cull(volume, source, seen, out);
                    }
                    return;
                }

                for &key in &self.items {
                    if seen.contains(&key) || !source.is_enabled(key) {
                        continue;
                    }
                    let visible = source.bounds(key)
                        .is_some_and(|bounds| volume.intersects_obb(&bounds));
                    if visible {
                        seen.insert(key);
                        out.push(key);
                    }
                }
            }
        }
    }

    /// Collect every enabled item of the subtree (no volume test).
    fn collect_enabled<Src>(&self, source: &Src, seen: &mut FxHashSet<K>, out: &mut Vec<K>)
    where
        Src: CullingSource<K> + ?Sized,
    {
        for &key in &self.items {
            if source.is_enabled(key) && seen.insert(key) {
                out.push(key);
            }
        }
        for child in &self.children {
            child.collect_enabled(source, seen, out);
        }
    }

    /// Nearest-hit raycast below this node.
    ///
    /// Children are visited in order of their entry distance and the walk
    /// stops once the best hit is no farther than the next child's entry.
    pub(crate) fn raycast<Src>(&self, ray: &Ray, source: &Src, best: &mut Option<(K, RayHit)>)
    where
        Src: CullingSource<K> + ?Sized,
    {
        if self.is_leaf() {
            for &key in &self.items {
                if !source.is_enabled(key) {
                    continue;
                }
                if let Some(hit) = source.intersect_ray(key, ray) {
                    if best.map_or(true, |(_, nearest)| hit.distance < nearest.distance) {
                        *best = Some((key, hit));
                    }
                }
            }
            return;
        }

        debug_assert!(self.children.len() <= MAX_CHILDREN);
        let mut order = [(0.0f32, 0usize); MAX_CHILDREN];
        let mut count = 0;
        for (index, child) in self.children.iter().enumerate() {
            let Some(entry) = ray.intersect_aabb(&child.bounds) else {
                continue;
            };
            // Insertion sort by entry distance
            let mut slot = count;
            while slot > 0 && order[slot - 1].0 > entry.distance {
                order[slot] = order[slot - 1];
                slot -= 1;
            }
            order[slot] = (entry.distance, index);
            count += 1;
        }

        for &(entry, index) in &order[..count] {
            if best.is_some_and(|(_, nearest)| nearest.distance <= entry) {
                break;
            }
            self.children[index].raycast(ray, source, best);
        }
    }

    // ===== DIAGNOSTICS =====

    pub(crate) fn debug_structure(
        &self,
        depth: u32,
        options: &DebugStructureOptions,
        frustum: Option<&Frustum>,
        out: &mut Vec<DebugNodeBox>,
    ) {
        let region = if options.use_culling_bounds {
            match self.cull_region() {
                Some(region) => region,
                None => return,
            }
        } else {
            self.bounds
        };

        if frustum.is_some_and(|frustum| !frustum.intersects_aabb(&region)) {
            return;
        }

        if !options.leaves_only || self.is_leaf() {
            out.push(DebugNodeBox::new(&region, depth, self.items.len()));
        }
        for child in &self.children {
            child.debug_structure(depth + 1, options, frustum, out);
        }
    }

    pub(crate) fn accumulate_stats(&self, depth: u32, stats: &mut TreeStats) {
        stats.node_count += 1;
        stats.max_depth_reached = stats.max_depth_reached.max(depth);
        if self.is_leaf() {
            stats.leaf_count += 1;
            stats.item_entries += self.items.len();
        }
        for child in &self.children {
            child.accumulate_stats(depth + 1, stats);
        }
    }

    /// Every item of the subtree, once each, in first-seen order.
    pub(crate) fn collect_items(&self, seen: &mut FxHashSet<K>, out: &mut Vec<K>) {
        out.extend(self.items.iter().copied().filter(|&key| seen.insert(key)));
        for child in &self.children {
            child.collect_items(seen, out);
        }
    }

    pub(crate) fn contains_item(&self, key: K) -> bool {
        self.items.contains(&key) || self.children.iter().any(|child| child.contains_item(key))
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
