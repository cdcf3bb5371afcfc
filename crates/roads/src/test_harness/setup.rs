//! Builder methods for settings, road types and the starting scene.

use crate::road_type::RoadType;
use crate::scene::RoadScene;
use crate::settings::RoadGeneratorSettings;
use crate::BuildRoadsSession;

use super::TestRoads;

impl TestRoads {
    // -----------------------------------------------------------------------
    // Settings and road types
    // -----------------------------------------------------------------------

    /// Make another road type available to the operator.
    pub fn with_road_type(self, road_type: RoadType) -> Self {
        self.write_road_type(&road_type);
        self
    }

    pub fn with_current_road_type(mut self, name: &str) -> Self {
        self.settings_mut().current_road_type = name.to_string();
        self
    }

    pub fn with_points_offset(mut self, offset: f32) -> Self {
        self.settings_mut().crossroad.points_offset = offset;
        self
    }

    /// Replace the scene the operator starts from.
    pub fn with_scene(mut self, scene: RoadScene) -> Self {
        self.app.world_mut().insert_resource(scene);
        self
    }

    fn settings_mut(&mut self) -> bevy::prelude::Mut<'_, RoadGeneratorSettings> {
        self.app.world_mut().resource_mut::<RoadGeneratorSettings>()
    }

    // -----------------------------------------------------------------------
    // Operator
    // -----------------------------------------------------------------------

    /// Request the build roads operator and run one update.
    pub fn started(mut self) -> Self {
        self.request_build_roads();
        assert!(
            self.app.world().resource::<BuildRoadsSession>().is_active(),
            "build roads operator failed to start"
        );
        self
    }
}
