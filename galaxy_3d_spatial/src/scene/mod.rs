//! Scene module: a slot-map store of cullable objects tied to a tree.
//!
//! `SceneObjects` owns object data, serves it to the trees through
//! `CullingSource`, and keeps tree membership in step with object
//! insertion, removal and movement.

mod scene_objects;

pub use scene_objects::{SceneObjects, SceneObject, ObjectKey};
