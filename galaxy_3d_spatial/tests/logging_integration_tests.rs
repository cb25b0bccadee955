//! Integration tests for spatial index logging
//!
//! These tests verify that tree operations report through the global
//! logger with the expected severities and sources.
//!
//! Run with: cargo test --test logging_integration_tests

use galaxy_3d_spatial::galaxy3d::bounds::{AABB, OBB};
use galaxy_3d_spatial::galaxy3d::log::{self, Logger, LogEntry, LogSeverity};
use galaxy_3d_spatial::galaxy3d::tree::{Quadtree, Octree, TreeConfig};
use galaxy_3d_spatial::glam::{Quat, Vec3};
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn scene() -> AABB {
    AABB::from_center_half_extents(Vec3::ZERO, Vec3::splat(100.0))
}

fn point(x: f32, z: f32) -> OBB {
    OBB::new(Vec3::new(x, 0.0, z), Vec3::splat(0.1), Quat::IDENTITY)
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_lifecycle_logs_info() {
    let (test_logger, entries) = TestLogger::new();
    log::set_logger(test_logger);

    let mut tree: Quadtree<u32> = Quadtree::new();
    tree.initialize(scene()).unwrap();
    tree.shutdown();

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert!(captured.iter().all(|entry| entry.severity == LogSeverity::Info));
        assert!(captured.iter().all(|entry| entry.source == "galaxy3d::Quadtree"));
        assert!(captured[0].message.starts_with("Initialized"));
        assert_eq!(captured[1].message, "Shut down");
    }

    log::reset_logger();
}

#[test]
#[serial]
fn test_integration_errors_logged_with_location() {
    let (test_logger, entries) = TestLogger::new();
    log::set_logger(test_logger);

    let mut tree: Octree<u32> = Octree::new();
    let source: FxHashMap<u32, OBB> = FxHashMap::default();
    assert!(tree.insert(1, &point(0.0, 0.0), &source).is_err());

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 1);
        let entry = &captured[0];
        assert_eq!(entry.severity, LogSeverity::Error);
        assert_eq!(entry.source, "galaxy3d::Octree");
        assert_eq!(entry.message, "Tree not initialized");
        assert!(entry.file.is_some());
        assert!(entry.line.is_some());
    }

    log::reset_logger();
}

#[test]
#[serial]
fn test_integration_min_severity_filters_splits() {
    let (test_logger, entries) = TestLogger::new();
    log::set_logger(test_logger);

    let mut tree: Quadtree<u32> = Quadtree::with_config(TreeConfig { max_items_in_node: 1, max_depth: 3 });
    tree.initialize(scene()).unwrap();
    let mut source = FxHashMap::default();
    source.insert(1u32, point(-50.0, -50.0));
    source.insert(2u32, point(50.0, 50.0));
    source.insert(3u32, point(-50.0, 50.0));

    // Default minimum is Info: the split is not reported
    assert_eq!(log::min_severity(), LogSeverity::Info);
    tree.insert(1, &source[&1], &source).unwrap();
    tree.insert(2, &source[&2], &source).unwrap();
    assert!(entries.lock().unwrap().iter().all(|entry| entry.severity >= LogSeverity::Info));

    // Removing item 2 merges the root back; re-adding it splits again
    log::set_min_severity(LogSeverity::Trace);
    tree.remove(2, &source[&2], false).unwrap();
    tree.insert(3, &source[&3], &source).unwrap();

    {
        let captured = entries.lock().unwrap();
        assert!(captured.iter().any(|entry| {
            entry.severity == LogSeverity::Trace && entry.message.starts_with("Merged children")
        }));
        assert!(captured.iter().any(|entry| {
            entry.severity == LogSeverity::Trace && entry.message.starts_with("Split node at depth 0")
        }));
    }

    log::set_min_severity(LogSeverity::Info);
    log::reset_logger();
}

#[test]
#[serial]
fn test_integration_out_of_bounds_insert_logs_debug() {
    let (test_logger, entries) = TestLogger::new();
    log::set_logger(test_logger);
    log::set_min_severity(LogSeverity::Debug);

    let mut tree: Quadtree<u32> = Quadtree::new();
    tree.initialize(scene()).unwrap();
    let mut source = FxHashMap::default();
    source.insert(1u32, point(500.0, 0.0));
    assert_eq!(tree.insert(1, &source[&1], &source), Ok(false));

    {
        let captured = entries.lock().unwrap();
        let debug: Vec<&LogEntry> = captured.iter()
            .filter(|entry| entry.severity == LogSeverity::Debug)
            .collect();
        assert_eq!(debug.len(), 1);
        assert!(debug[0].message.contains("outside scene bounds"));
    }

    log::set_min_severity(LogSeverity::Info);
    log::reset_logger();
}

#[test]
#[serial]
fn test_integration_logger_reset() {
    let (test_logger, entries) = TestLogger::new();
    log::set_logger(test_logger);

    let mut tree: Quadtree<u32> = Quadtree::new();
    tree.initialize(scene()).unwrap();
    assert_eq!(entries.lock().unwrap().len(), 1);

    log::reset_logger();

    // Goes to the default logger, not captured
    tree.shutdown();
    assert_eq!(entries.lock().unwrap().len(), 1);
}
