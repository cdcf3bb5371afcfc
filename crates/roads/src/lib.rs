use bevy::prelude::*;

pub mod build_roads;
pub mod config;
pub mod crossroad_builder;
pub mod error;
pub mod modifier;
pub mod overlay;
pub mod road_builder;
pub mod road_network;
pub mod road_type;
pub mod road_type_library;
pub mod scene;
pub mod settings;
pub mod spline;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
pub(crate) mod test_harness;

pub use build_roads::{BuildRoadsOperator, BuildRoadsPlugin, BuildRoadsSession};
pub use road_builder::RoadBuilder;
pub use road_network::RoadNetwork;
pub use road_type_library::RoadTypeLibrary;
pub use scene::RoadScene;
pub use settings::RoadGeneratorSettings;

/// Road generator resources and the build roads operator.
///
/// Settings inserted before the plugin are kept, otherwise the defaults apply.
pub struct RoadGeneratorPlugin;

impl Plugin for RoadGeneratorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RoadGeneratorSettings>()
            .init_resource::<RoadTypeLibrary>()
            .init_resource::<RoadScene>()
            .add_plugins(BuildRoadsPlugin);
    }
}
