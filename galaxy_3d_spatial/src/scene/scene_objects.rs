/// SceneObjects: slot-map store of cullable objects.
///
/// Each object carries its world-space OBB, an enabled flag and optional
/// collision triangles, plus the bookkeeping needed to remove it from a
/// tree later: the bounds it was last indexed with and the leaf paths it
/// landed in.
///
/// Per-frame flow:
/// 1. `update_parallel` (or `set_bounds` / `set_enabled`) changes objects
/// 2. `sync_tree` reinserts moved objects and invalidates enable changes
/// 3. the tree recalculates culling bounds and answers queries with
///    `&SceneObjects` as the source

use std::hash::Hash;
use glam::Mat4;
use rayon::prelude::*;
use slotmap::{new_key_type, SlotMap};
use crate::error::Result;
use crate::bounds::{AABB, OBB, Ray, RayHit, Triangle};
use crate::tree::{CullingSource, SpatialTree, Subdivision, TreePath};

const LOG_SOURCE: &str = "galaxy3d::SceneObjects";

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Stable key for a SceneObject within a SceneObjects store.
    ///
    /// Keys remain valid even after other objects are removed.
    pub struct ObjectKey;
}

// ===== SCENE OBJECT =====

/// A cullable object: bounds, enabled flag and optional collision mesh.
#[derive(Debug, Clone)]
pub struct SceneObject {
    bounds: OBB,
    enabled: bool,
    /// World-space collision triangles (empty = raycast against the OBB)
    triangles: Vec<Triangle>,
    /// Bounds the object is currently indexed with (`None` = not indexed)
    last_culling_bounds: Option<OBB>,
    /// Leaves the object landed in at its last insertion
    tree_paths: Vec<TreePath>,
    moved: bool,
    enabled_changed: bool,
}

impl SceneObject {
    /// Create an enabled object without collision triangles.
    pub fn new(bounds: OBB) -> Self {
        Self {
            bounds,
            enabled: true,
            triangles: Vec::new(),
            last_culling_bounds: None,
            tree_paths: Vec::new(),
            moved: false,
            enabled_changed: false,
        }
    }

    /// Object whose bounds are a local AABB placed by a world matrix.
    pub fn from_transform(local_bounds: &AABB, world_matrix: &Mat4) -> Self {
        Self::new(OBB::from_transformed_aabb(local_bounds, world_matrix))
    }

    pub fn with_triangles(mut self, triangles: Vec<Triangle>) -> Self {
        self.triangles = triangles;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn bounds(&self) -> &OBB {
        &self.bounds
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn last_culling_bounds(&self) -> Option<&OBB> {
        self.last_culling_bounds.as_ref()
    }

    pub fn tree_paths(&self) -> &[TreePath] {
        &self.tree_paths
    }

    /// Whether the object has changes `sync_tree` has not applied yet.
    pub fn needs_sync(&self) -> bool {
        self.moved || self.enabled_changed
    }

    /// Move the object. The tree is updated by the next `sync_tree`.
    pub fn set_bounds(&mut self, bounds: OBB) {
        self.bounds = bounds;
        self.moved = true;
    }

    /// Move the object by placing its local AABB with a new world matrix.
    pub fn set_transform(&mut self, local_bounds: &AABB, world_matrix: &Mat4) {
        self.set_bounds(OBB::from_transformed_aabb(local_bounds, world_matrix));
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.enabled_changed = true;
        }
    }

    /// Replace the world-space collision triangles.
    pub fn set_triangles(&mut self, triangles: Vec<Triangle>) {
        self.triangles = triangles;
    }

    /// Nearest hit: OBB broad phase, then triangles when present.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<RayHit> {
        let box_hit = ray.intersect_obb(&self.bounds)?;
        if self.triangles.is_empty() {
            return Some(box_hit);
        }
        self.triangles.iter()
            .filter_map(|triangle| ray.intersect_triangle(triangle))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn mark_indexed(&mut self, paths: Vec<TreePath>) {
        self.last_culling_bounds = (!paths.is_empty()).then_some(self.bounds);
        self.tree_paths = paths;
        self.moved = false;
        self.enabled_changed = false;
    }

    /// Remove this object from `tree` using its recorded paths, or its
    /// last culling bounds when no paths were recorded.
    ///
    /// A moved object is swept from the whole tree: splits since its last
    /// insertion placed it by its new bounds, which neither the paths nor
    /// the last culling bounds lead to.
    fn unindex<K, S>(&self, key: K, tree: &mut SpatialTree<K, S>) -> Result<bool>
    where
        K: Copy + Eq + Hash,
        S: Subdivision,
    {
        if self.moved {
            tree.remove(key, &self.bounds, true)
        } else if !self.tree_paths.is_empty() {
            tree.remove_at_paths(key, &self.tree_paths)
        } else if let Some(last) = &self.last_culling_bounds {
            tree.remove(key, last, false)
        } else {
            Ok(false)
        }
    }
}

// ===== SCENE OBJECTS =====

/// Slot-map store of `SceneObject`s.
#[derive(Default)]
pub struct SceneObjects {
    objects: SlotMap<ObjectKey, SceneObject>,
}

impl SceneObjects {
    pub fn new() -> Self {
        Self {
            objects: SlotMap::with_key(),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, key: ObjectKey) -> Option<&SceneObject> {
        self.objects.get(key)
    }

    /// Mutable access. Changes made through `SceneObject` setters are
    /// applied to the tree by the next `sync_tree`.
    pub fn get_mut(&mut self, key: ObjectKey) -> Option<&mut SceneObject> {
        self.objects.get_mut(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectKey, &SceneObject)> {
        self.objects.iter()
    }

    /// Add an object to the store and index it in `tree`.
    ///
    /// An object entirely outside the scene is stored but not indexed.
    ///
    /// # Errors
    ///
    /// Returns the tree's error (the object is not kept) if the tree is
    /// not initialized.
    pub fn insert<S: Subdivision>(
        &mut self,
        object: SceneObject,
        tree: &mut SpatialTree<ObjectKey, S>,
    ) -> Result<ObjectKey> {
        let bounds = object.bounds;
        let key = self.objects.insert(object);

        let paths = match tree.insert_tracked(key, &bounds, &*self) {
            Ok(paths) => paths,
            Err(error) => {
                self.objects.remove(key);
                return Err(error);
            }
        };

        if let Some(object) = self.objects.get_mut(key) {
            object.mark_indexed(paths);
        }
        Ok(key)
    }

    /// Remove an object from `tree`, then from the store.
    ///
    /// Returns `Ok(None)` for an unknown key. When the tree is not
    /// initialized nothing can be indexed, so the object is simply dropped.
    pub fn remove<S: Subdivision>(
        &mut self,
        key: ObjectKey,
        tree: &mut SpatialTree<ObjectKey, S>,
    ) -> Result<Option<SceneObject>> {
        let Some(object) = self.objects.get(key) else {
            return Ok(None);
        };
        if tree.is_initialized() {
            object.unindex(key, tree)?;
        }
        Ok(self.objects.remove(key))
    }

    /// Move an object. Returns false for an unknown key.
    pub fn set_bounds(&mut self, key: ObjectKey, bounds: OBB) -> bool {
        match self.objects.get_mut(key) {
            Some(object) => {
                object.set_bounds(bounds);
                true
            }
            None => false,
        }
    }

    /// Enable or disable an object. Returns false for an unknown key.
    pub fn set_enabled(&mut self, key: ObjectKey, enabled: bool) -> bool {
        match self.objects.get_mut(key) {
            Some(object) => {
                object.set_enabled(enabled);
                true
            }
            None => false,
        }
    }

    /// Run `update` over every object on rayon's thread pool.
    ///
    /// Returns once all updates have finished, so a following
    /// `sync_tree` and any query see every change.
    pub fn update_parallel<F>(&mut self, update: F)
    where
        F: Fn(ObjectKey, &mut SceneObject) + Send + Sync,
    {
        let objects: Vec<(ObjectKey, &mut SceneObject)> = self.objects.iter_mut().collect();
        objects
            .into_par_iter()
            .for_each(|(key, object)| update(key, object));
    }

    /// Apply pending moves and enable changes to `tree`.
    ///
    /// Moved objects are removed with their recorded paths and reinserted
    /// with their new bounds; objects whose enabled flag changed only
    /// invalidate the culling bounds around them. Returns the number of
    /// objects synced.
    pub fn sync_tree<S: Subdivision>(&mut self, tree: &mut SpatialTree<ObjectKey, S>) -> Result<usize> {
        let pending: Vec<ObjectKey> = self.objects.iter()
            .filter(|(_, object)| object.needs_sync())
            .map(|(key, _)| key)
            .collect();

        for &key in &pending {
            let Some(object) = self.objects.get(key) else {
                continue;
            };

            let paths = if object.moved {
                let bounds = object.bounds;
                object.unindex(key, tree)?;
                tree.insert_tracked(key, &bounds, &*self)?
            } else {
                if let Some(last) = &object.last_culling_bounds {
                    tree.invalidate(last)?;
                }
                object.tree_paths.clone()
            };

            if let Some(object) = self.objects.get_mut(key) {
                object.mark_indexed(paths);
            }
        }

        if !pending.is_empty() {
            crate::spatial_trace!(LOG_SOURCE, "Synced {} objects", pending.len());
        }
        Ok(pending.len())
    }
}

impl CullingSource<ObjectKey> for SceneObjects {
    fn bounds(&self, key: ObjectKey) -> Option<OBB> {
        self.objects.get(key).map(|object| object.bounds)
    }

    fn is_enabled(&self, key: ObjectKey) -> bool {
        self.objects.get(key).is_some_and(|object| object.enabled)
    }

    fn intersect_ray(&self, key: ObjectKey, ray: &Ray) -> Option<RayHit> {
        self.objects.get(key)?.intersect_ray(ray)
    }
}

#[cfg(test)]
#[path = "scene_objects_tests.rs"]
mod tests;
