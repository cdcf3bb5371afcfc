//! Integration tests for the road builder using the `TestRoads` harness.
//!
//! These tests run the build roads operator inside a headless Bevy App and
//! drive it with the same input events the application sends.

mod crossroad_order_tests;
mod single_operator_tests;
mod split_join_tests;

use bevy::prelude::*;

use crate::road_type_library::RoadTypeLibrary;
use crate::scene::RoadScene;
use crate::test_harness::TestRoads;

// ===========================================================================
// Harness bootstrap
// ===========================================================================

#[test]
fn test_plugin_starts_idle() {
    let roads = TestRoads::new();
    roads.assert_not_running();
    assert!(roads.scene().objects.is_empty());
}

#[test]
fn test_request_starts_session_and_loads_road_types() {
    let mut roads = TestRoads::new().started();
    roads.assert_running();
    roads.assert_counts(0, 0);
    let library = roads.world_mut().resource::<RoadTypeLibrary>();
    assert_eq!(library.len(), 2);
}

#[test]
fn test_request_without_road_types_is_ignored() {
    let mut roads = TestRoads::new();
    roads
        .world_mut()
        .resource_mut::<crate::settings::RoadGeneratorSettings>()
        .roads_path = "/nonexistent/roads".into();
    roads.request_build_roads();
    roads.assert_not_running();
}

// ===========================================================================
// Session lifecycle
// ===========================================================================

#[test]
fn test_escape_moves_scene_back_into_resource() {
    let mut roads = TestRoads::new().started();
    roads.draw((0.0, 0.0), (100.0, 0.0));
    roads.press_key(KeyCode::Escape);
    roads.assert_not_running();

    let scene = roads.world_mut().resource::<RoadScene>();
    assert_eq!(scene.splines.len(), 1);
    assert!(scene.object("tq_City").is_some());
}

#[test]
fn test_events_after_escape_are_dropped() {
    let mut roads = TestRoads::new().started();
    roads.send([
        crate::build_roads::ModalEvent::key(KeyCode::Escape),
        crate::build_roads::ModalEvent::mouse_move(Vec3::new(10.0, 0.0, 0.0)),
        crate::build_roads::ModalEvent::press(crate::build_roads::EventKind::LeftMouse),
    ]);
    roads.assert_not_running();
    assert!(roads.scene().splines.is_empty());
}

#[test]
fn test_road_type_choice_survives_session() {
    let mut roads = TestRoads::new().started();
    roads.press_key(KeyCode::KeyQ);
    assert_eq!(roads.settings().current_road_type, "tq_Avenue");
    roads.press_key(KeyCode::Escape);
    assert_eq!(roads.settings().current_road_type, "tq_Avenue");
}

#[test]
fn test_restart_rebuilds_network_from_scene() {
    let mut roads = TestRoads::new().started();
    roads.draw((0.0, 0.0), (100.0, 0.0));
    roads.draw((100.0, 0.0), (200.0, 0.0));
    roads.draw((100.0, 0.0), (100.0, 100.0));
    roads.assert_counts(3, 1);
    let before = roads.all_spline_points();

    roads.press_key(KeyCode::Escape);
    roads.request_build_roads();
    roads.assert_running();
    roads.assert_counts(3, 1);
    roads.assert_network_consistent();
    assert_eq!(roads.all_spline_points(), before);
}
