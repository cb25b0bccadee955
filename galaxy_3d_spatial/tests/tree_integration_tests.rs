//! Integration tests for the spatial trees
//!
//! End-to-end scenarios through the public `galaxy3d` namespace: the
//! insert/remove cycle, nearest-hit ordering, and the structural
//! invariants that must hold after arbitrary churn.
//!
//! Run with: cargo test --test tree_integration_tests

use galaxy_3d_spatial::galaxy3d::bounds::{AABB, OBB, Frustum, Ray};
use galaxy_3d_spatial::galaxy3d::scene::{ObjectKey, SceneObject, SceneObjects};
use galaxy_3d_spatial::galaxy3d::tree::{
    CullingSource, Octree, Quadtree, SpatialTree, Subdivision, TreeConfig, TreeNode,
};
use galaxy_3d_spatial::glam::{Mat4, Quat, Vec3};
use rustc_hash::{FxHashMap, FxHashSet};

fn scene() -> AABB {
    AABB::from_center_half_extents(Vec3::ZERO, Vec3::splat(100.0))
}

fn sorted<K: Ord>(mut keys: Vec<K>) -> Vec<K> {
    keys.sort();
    keys
}

/// Deterministic scatter of points over the scene (xorshift)
fn scatter(count: u32, seed: u32) -> Vec<Vec3> {
    let mut state = seed.max(1);
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        (state % 19_000) as f32 / 100.0 - 95.0
    };
    (0..count).map(|_| Vec3::new(next(), next() * 0.5, next())).collect()
}

fn collect_leaf_items<K: Copy + Eq + std::hash::Hash, S: Subdivision>(
    node: &TreeNode<K, S>,
    out: &mut FxHashSet<K>,
) {
    out.extend(node.items().iter().copied());
    for child in node.children() {
        collect_leaf_items(child, out);
    }
}

fn check_structure<K: Copy + Eq + std::hash::Hash, S: Subdivision>(node: &TreeNode<K, S>) {
    if node.is_leaf() {
        assert!(node.children().is_empty());
    } else {
        assert!(node.items().is_empty(), "internal nodes hold no items");
        assert_eq!(node.children().len(), S::CHILD_COUNT);
    }
    if let Some(tight) = node.culling_bounds() {
        let region = node.bounds();
        assert!(tight.min.x >= region.min.x && tight.max.x <= region.max.x);
        assert!(tight.min.z >= region.min.z && tight.max.z <= region.max.z);
    }
    for child in node.children() {
        check_structure(child);
    }
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn test_integration_insert_twenty_remove_ten() {
    let mut tree: Quadtree<ObjectKey> = Quadtree::new();
    tree.initialize(scene()).unwrap();

    let mut objects = SceneObjects::new();
    let keys: Vec<ObjectKey> = scatter(20, 7)
        .into_iter()
        .map(|p| {
            let object = SceneObject::new(OBB::new(p, Vec3::splat(0.1), Quat::IDENTITY));
            objects.insert(object, &mut tree).unwrap()
        })
        .collect();
    assert!(!tree.root_node().unwrap().is_leaf(), "20 objects must split the root");

    for &key in &keys[..10] {
        objects.remove(key, &mut tree).unwrap();
    }

    let remaining = sorted(keys[10..].to_vec());
    assert_eq!(sorted(tree.indexed_items().unwrap()), remaining);

    tree.recalculate_culling_bounds(&objects).unwrap();
    let mut visible = Vec::new();
    tree.box_cull(&scene(), &objects, &mut visible).unwrap();
    assert_eq!(visible.len(), 10);
    assert_eq!(sorted(visible), remaining);
}

#[test]
fn test_integration_raycast_hits_nearer_of_two() {
    for insert_far_first in [true, false] {
        let mut tree: Quadtree<u32> = Quadtree::new();
        tree.initialize(scene()).unwrap();

        let half = 1.0;
        let mut source = FxHashMap::default();
        source.insert(10u32, OBB::new(Vec3::new(10.0, 0.0, 0.0), Vec3::splat(half), Quat::IDENTITY));
        source.insert(40u32, OBB::new(Vec3::new(40.0, 0.0, 0.0), Vec3::splat(half), Quat::IDENTITY));
        let order = if insert_far_first { [40, 10] } else { [10, 40] };
        for key in order {
            tree.insert(key, &source[&key], &source).unwrap();
        }

        let ray = Ray::new(Vec3::new(-50.0, 0.0, 0.0), Vec3::X);
        let hit = tree.raycast(&ray, &source).unwrap().unwrap();
        assert_eq!(hit.key, 10);
        assert!((hit.distance - (60.0 - half)).abs() < 1e-4);
    }
}

#[test]
fn test_integration_raycast_across_split_tree_matches_brute_force() {
    let mut tree: Quadtree<u32> = Quadtree::with_config(TreeConfig { max_items_in_node: 2, max_depth: 5 });
    tree.initialize(scene()).unwrap();

    let mut source = FxHashMap::default();
    for (i, p) in scatter(200, 3).into_iter().enumerate() {
        let rotation = Quat::from_rotation_y(i as f32 * 0.37);
        source.insert(i as u32, OBB::new(p, Vec3::new(2.0, 1.5, 0.5), rotation));
        tree.insert(i as u32, &source[&(i as u32)], &source).unwrap();
    }

    let rays = [
        Ray::new(Vec3::new(-120.0, 0.0, -3.0), Vec3::new(1.0, 0.0, 0.2)),
        Ray::new(Vec3::new(100.0, 20.0, 100.0), Vec3::new(-1.0, -0.1, -1.0)),
        Ray::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.3, 0.0, -1.0)),
        Ray::new(Vec3::new(-80.0, 5.0, 90.0), Vec3::new(0.5, 0.0, -1.0)),
    ];
    for ray in &rays {
        let expected = source.iter()
            .filter_map(|(&key, bounds)| ray.intersect_obb(bounds).map(|hit| (key, hit.distance)))
            .min_by(|a, b| a.1.total_cmp(&b.1));
        let actual = tree.raycast(ray, &source).unwrap().map(|hit| (hit.key, hit.distance));

        match (expected, actual) {
            (None, None) => {}
            (Some((_, want)), Some((_, got))) => assert!((want - got).abs() < 1e-4),
            other => panic!("raycast mismatch: {:?}", other),
        }
    }
}

#[test]
fn test_integration_round_trip_restores_empty_tree() {
    let mut tree: Quadtree<u32> = Quadtree::with_config(TreeConfig { max_items_in_node: 3, max_depth: 5 });
    tree.initialize(scene()).unwrap();

    let mut source = FxHashMap::default();
    for (i, p) in scatter(150, 11).into_iter().enumerate() {
        source.insert(i as u32, OBB::new(p, Vec3::splat(1.5), Quat::IDENTITY));
        tree.insert(i as u32, &source[&(i as u32)], &source).unwrap();
    }
    assert!(tree.stats().unwrap().max_depth_reached > 1);

    for i in 0..150u32 {
        assert_eq!(tree.remove(i, &source[&i], false), Ok(true));
    }

    let fresh: Quadtree<u32> = {
        let mut fresh = Quadtree::new();
        fresh.initialize(scene()).unwrap();
        fresh
    };
    assert_eq!(tree.stats().unwrap(), fresh.stats().unwrap());
    assert!(tree.indexed_items().unwrap().is_empty());
}

#[test]
fn test_integration_no_orphans_after_churn() {
    let mut tree: Octree<ObjectKey> = Octree::with_config(TreeConfig { max_items_in_node: 4, max_depth: 3 });
    tree.initialize(scene()).unwrap();
    let mut objects = SceneObjects::new();

    let points = scatter(120, 5);
    let mut live: Vec<ObjectKey> = Vec::new();
    for (i, p) in points.iter().enumerate() {
        let object = SceneObject::from_transform(
            &AABB::from_center_half_extents(Vec3::ZERO, Vec3::splat(1.0)),
            &Mat4::from_rotation_translation(Quat::from_rotation_x(i as f32), *p),
        );
        live.push(objects.insert(object, &mut tree).unwrap());

        // Every third step drops the oldest live object
        if i % 3 == 2 {
            let key = live.remove(0);
            objects.remove(key, &mut tree).unwrap();
        }
    }

    // Move half of the survivors and sync
    let moved: FxHashSet<ObjectKey> = live.iter().copied().step_by(2).collect();
    objects.update_parallel(|key, object| {
        if moved.contains(&key) {
            let mut bounds = *object.bounds();
            bounds.center = -bounds.center;
            object.set_bounds(bounds);
        }
    });
    objects.sync_tree(&mut tree).unwrap();

    let root = tree.root_node().unwrap();
    check_structure(root);
    let mut indexed = FxHashSet::default();
    collect_leaf_items(root, &mut indexed);
    assert_eq!(indexed, live.iter().copied().collect::<FxHashSet<_>>());

    // Every live object is found by a cull that covers it, exactly once
    for &key in &live {
        let bounds = *objects.get(key).unwrap().bounds();
        let mut hits = Vec::new();
        tree.box_cull(&bounds, &objects, &mut hits).unwrap();
        assert_eq!(hits.iter().filter(|&&hit| hit == key).count(), 1);
    }
}

#[test]
fn test_integration_frustum_cull_matches_brute_force() {
    let mut tree: Quadtree<u32> = Quadtree::new();
    tree.initialize(scene()).unwrap();

    let mut source = FxHashMap::default();
    for (i, p) in scatter(300, 21).into_iter().enumerate() {
        source.insert(i as u32, OBB::new(p, Vec3::new(1.0, 2.0, 1.0), Quat::from_rotation_y(i as f32)));
        tree.insert(i as u32, &source[&(i as u32)], &source).unwrap();
    }
    tree.recalculate_culling_bounds(&source).unwrap();
    check_structure(tree.root_node().unwrap());

    let projection = Mat4::perspective_rh(std::f32::consts::FRAC_PI_3, 16.0 / 9.0, 0.5, 120.0);
    let view = Mat4::look_at_rh(Vec3::new(-90.0, 30.0, -90.0), Vec3::new(10.0, 0.0, 0.0), Vec3::Y);
    let frustum = Frustum::from_view_projection(&(projection * view));

    let mut visible = Vec::new();
    tree.frustum_cull(&frustum, &source, &mut visible).unwrap();

    // Never more than the per-object test accepts, and each handle once
    let candidates: FxHashSet<u32> = source.iter()
        .filter(|(_, bounds)| frustum.intersects_obb(bounds))
        .map(|(&key, _)| key)
        .collect();
    let unique: FxHashSet<u32> = visible.iter().copied().collect();
    assert_eq!(unique.len(), visible.len());
    assert!(unique.is_subset(&candidates));

    // Every object whose center is in view is reported
    let centered: Vec<u32> = source.iter()
        .filter(|(_, bounds)| frustum.contains_point(bounds.center))
        .map(|(&key, _)| key)
        .collect();
    assert!(!centered.is_empty());
    assert!(centered.iter().all(|key| unique.contains(key)));
}

#[test]
fn test_integration_trees_accept_custom_handles() {
    fn exercise<S: Subdivision>(mut tree: SpatialTree<(u16, u16), S>) {
        tree.initialize(scene()).unwrap();
        let mut source = FxHashMap::default();
        source.insert((1, 7), OBB::new(Vec3::new(5.0, 5.0, 5.0), Vec3::ONE, Quat::IDENTITY));
        tree.insert((1, 7), &source[&(1, 7)], &source).unwrap();
        assert!(tree.contains((1, 7)));
        assert_eq!(source.bounds((1, 7)).map(|b| b.center), Some(Vec3::splat(5.0)));
    }
    exercise(Quadtree::<(u16, u16)>::new());
    exercise(Octree::<(u16, u16)>::new());
}
