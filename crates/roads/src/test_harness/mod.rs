//! # TestRoads: headless integration test harness for the road builder
//!
//! Wraps `bevy::app::App` + `RoadGeneratorPlugin` so integration tests can
//! drive the build roads operator with input events, without a window.

mod assertions;
mod input;
mod queries;
mod setup;

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use bevy::app::App;
use bevy::prelude::*;

use crate::road_type::test_types::{avenue, city_road};
use crate::road_type::RoadType;
use crate::road_type_library::RoadTypeFile;
use crate::settings::RoadGeneratorSettings;
use crate::RoadGeneratorPlugin;

static NEXT_HARNESS_ID: AtomicUsize = AtomicUsize::new(0);

/// A headless Bevy App with the road generator plugin.
///
/// Every harness gets its own road type directory, with `tq_City` and
/// `tq_Avenue` written to it. `tq_City` is the current road type.
pub struct TestRoads {
    app: App,
    roads_dir: PathBuf,
}

impl TestRoads {
    pub fn new() -> Self {
        let id = NEXT_HARNESS_ID.fetch_add(1, Ordering::Relaxed);
        let roads_dir = std::env::temp_dir()
            .join(format!("test_roads_{}_{id}", std::process::id()))
            .join("roads");
        let _ = std::fs::remove_dir_all(&roads_dir);
        std::fs::create_dir_all(&roads_dir).expect("create road type directory");

        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        // Settings go in BEFORE the plugin so init_resource keeps them
        app.insert_resource(RoadGeneratorSettings {
            roads_path: roads_dir.clone(),
            current_road_type: "tq_City".to_string(),
            ..Default::default()
        });
        app.add_plugins(RoadGeneratorPlugin);
        app.update();

        let harness = Self { app, roads_dir };
        harness.write_road_type(&city_road("tq_City"));
        harness.write_road_type(&avenue("tq_Avenue"));
        harness
    }

    fn write_road_type(&self, road_type: &RoadType) {
        let file = RoadTypeFile {
            modifiers: road_type.modifiers.clone(),
        };
        let json = serde_json::to_string(&file).expect("serialize road type");
        std::fs::write(self.roads_dir.join(format!("{}.json", road_type.name)), json)
            .expect("write road type file");
    }
}

impl Drop for TestRoads {
    fn drop(&mut self) {
        if let Some(root) = self.roads_dir.parent() {
            let _ = std::fs::remove_dir_all(root);
        }
    }
}
