//! Query methods for `TestRoads`.

use bevy::prelude::*;

use crate::build_roads::{BuildRoadsLock, BuildRoadsOperator, BuildRoadsSession};
use crate::road_network::{Crossroad, RoadNetwork, RoadSegment};
use crate::scene::RoadScene;
use crate::settings::RoadGeneratorSettings;

use super::TestRoads;

impl TestRoads {
    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn update(&mut self) {
        self.app.update();
    }

    pub fn is_running(&self) -> bool {
        self.app.world().resource::<BuildRoadsLock>().is_running()
    }

    pub fn session(&self) -> &BuildRoadsSession {
        self.app.world().resource::<BuildRoadsSession>()
    }

    /// The running operator. Panics when none is running.
    pub fn operator(&self) -> &BuildRoadsOperator {
        self.session()
            .operator()
            .expect("build roads operator is not running")
    }

    pub fn network(&self) -> &RoadNetwork {
        self.operator().builder().network()
    }

    /// Scene of the running operator, or the resource when none runs.
    pub fn scene(&self) -> &RoadScene {
        match self.session().operator() {
            Some(op) => op.builder().scene(),
            None => self.app.world().resource::<RoadScene>(),
        }
    }

    pub fn settings(&self) -> &RoadGeneratorSettings {
        match self.session().operator() {
            Some(op) => op.settings(),
            None => self.app.world().resource::<RoadGeneratorSettings>(),
        }
    }

    pub fn segments(&self) -> Vec<RoadSegment> {
        self.network().segments().cloned().collect()
    }

    pub fn crossroads(&self) -> Vec<Crossroad> {
        self.network().crossroads().cloned().collect()
    }

    /// Point positions of the spline behind `segment`.
    pub fn points(&self, segment: &RoadSegment) -> Vec<Vec3> {
        self.scene()
            .spline(segment.id)
            .map(|s| s.points.iter().map(|p| p.co).collect())
            .unwrap_or_default()
    }

    /// All splines of the scene with their points, in id order.
    pub fn all_spline_points(&self) -> Vec<Vec<Vec3>> {
        self.scene()
            .splines
            .values()
            .map(|s| s.points.iter().map(|p| p.co).collect())
            .collect()
    }
}
