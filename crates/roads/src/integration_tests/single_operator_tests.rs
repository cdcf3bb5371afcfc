//! Only one build roads operator runs at a time. A second invocation is
//! rejected without touching the scene or the running network.

use bevy::prelude::*;

use crate::build_roads::{BuildRoadsLock, BuildRoadsOperator};
use crate::error::OperatorError;
use crate::road_type_library::RoadTypeLibrary;
use crate::scene::{ObjectKind, RoadScene, SceneObject};
use crate::settings::RoadGeneratorSettings;
use crate::test_harness::TestRoads;

#[test]
fn test_second_request_keeps_first_session() {
    let mut roads = TestRoads::new().started();
    roads.draw((0.0, 0.0), (100.0, 0.0));
    roads.click(200.0, 0.0);
    let points = roads.all_spline_points();

    roads.request_build_roads();
    roads.assert_running();
    assert!(roads.operator().builder().is_building());
    assert_eq!(roads.all_spline_points(), points);
    roads.assert_counts(1, 0);
}

#[test]
fn test_concurrent_invoke_is_rejected() {
    let mut roads = TestRoads::new().started();
    roads.draw((0.0, 0.0), (100.0, 0.0));

    let lock = roads.world_mut().resource::<BuildRoadsLock>().clone();
    let settings = roads.settings().clone();
    let mut library = RoadTypeLibrary::new();
    let mut scene = RoadScene::new();
    scene.add_object(SceneObject::new("Marker", ObjectKind::Mesh, "Collection"));

    let result = BuildRoadsOperator::invoke(&lock, settings, &mut library, &mut scene, 1.0);
    assert!(matches!(result, Err(OperatorError::AlreadyRunning)));
    assert!(lock.is_running());
    assert!(library.is_empty());
    assert_eq!(scene.objects.len(), 1);
    roads.assert_counts(1, 0);
}

#[test]
fn test_lock_is_free_again_after_escape() {
    let mut roads = TestRoads::new().started();
    roads.press_key(KeyCode::Escape);
    roads.assert_not_running();

    roads.request_build_roads();
    roads.assert_running();
}

#[test]
fn test_failed_invoke_leaves_lock_free() {
    let lock = BuildRoadsLock::default();
    let settings = RoadGeneratorSettings {
        roads_path: "/nonexistent/roads".into(),
        ..Default::default()
    };
    let mut scene = RoadScene::new();
    let result = BuildRoadsOperator::invoke(
        &lock,
        settings,
        &mut RoadTypeLibrary::new(),
        &mut scene,
        1.0,
    );
    assert!(matches!(result, Err(OperatorError::RoadTypesMissing(_))));
    assert!(!lock.is_running());
}

#[test]
fn test_second_session_reloads_finished_scene() {
    let mut first = TestRoads::new().started();
    first.draw((0.0, 0.0), (100.0, 0.0));
    first.press_key(KeyCode::Escape);
    first.update();
    first.assert_not_running();
    let scene = first.scene().clone();

    let mut second = TestRoads::new().with_scene(scene).started();
    second.assert_counts(1, 0);
    second.assert_network_consistent();
    second.draw((0.0, 50.0), (100.0, 50.0));
    second.assert_counts(2, 0);
    second.assert_network_consistent();
}
