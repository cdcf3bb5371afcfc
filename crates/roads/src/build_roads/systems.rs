use bevy::prelude::*;

use crate::road_type_library::RoadTypeLibrary;
use crate::scene::RoadScene;
use crate::settings::RoadGeneratorSettings;

use super::operator::BuildRoadsOperator;
use super::types::{BuildRoadsLock, BuildRoadsRequest, ModalAction, ModalInput, OverlayGridScale};

// =============================================================================
// Resources
// =============================================================================

/// The running build roads operator, if any.
///
/// While a session runs the operator owns the scene and the [`RoadScene`]
/// resource is left empty. The scene moves back once the session finishes.
#[derive(Resource, Default)]
pub struct BuildRoadsSession {
    operator: Option<BuildRoadsOperator>,
}

impl BuildRoadsSession {
    pub fn operator(&self) -> Option<&BuildRoadsOperator> {
        self.operator.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.operator.is_some()
    }

    /// Stop the operator and hand the scene and settings back.
    pub fn finish(&mut self) -> Option<(RoadScene, RoadGeneratorSettings)> {
        let mut operator = self.operator.take()?;
        if operator.is_running() {
            operator.cancel();
        }
        Some(operator.into_parts())
    }
}

// =============================================================================
// Systems
// =============================================================================

/// Invoke the operator for pending [`BuildRoadsRequest`] events.
pub fn start_build_roads(
    mut requests: EventReader<BuildRoadsRequest>,
    lock: Res<BuildRoadsLock>,
    settings: Res<RoadGeneratorSettings>,
    grid_scale: Res<OverlayGridScale>,
    mut library: ResMut<RoadTypeLibrary>,
    mut scene: ResMut<RoadScene>,
    mut session: ResMut<BuildRoadsSession>,
) {
    if requests.read().count() == 0 {
        return;
    }
    if session.is_active() {
        warn!("Build roads is already active");
        return;
    }

    match BuildRoadsOperator::invoke(
        &lock,
        settings.clone(),
        &mut library,
        &mut scene,
        grid_scale.0,
    ) {
        Ok(operator) => session.operator = Some(operator),
        Err(e) => error!("Failed to start build roads: {e}"),
    }
}

/// Feed [`ModalInput`] events to the running operator.
///
/// Once the operator reports [`ModalAction::Finished`] the remaining events
/// of the frame are dropped and the scene is moved back.
pub fn drive_build_roads(
    mut inputs: EventReader<ModalInput>,
    grid_scale: Res<OverlayGridScale>,
    mut session: ResMut<BuildRoadsSession>,
    mut scene: ResMut<RoadScene>,
    mut settings: ResMut<RoadGeneratorSettings>,
) {
    let Some(operator) = session.operator.as_mut() else {
        inputs.clear();
        return;
    };
    operator.set_grid_scale(grid_scale.0);

    let mut finished = false;
    for ModalInput(event) in inputs.read() {
        if operator.handle_event(event) == ModalAction::Finished {
            finished = true;
            break;
        }
    }
    inputs.clear();

    if finished {
        if let Some((edited, new_settings)) = session.finish() {
            *scene = edited;
            *settings = new_settings;
        }
    }
}

// =============================================================================
// Plugin
// =============================================================================

pub struct BuildRoadsPlugin;

impl Plugin for BuildRoadsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BuildRoadsLock>()
            .init_resource::<BuildRoadsSession>()
            .init_resource::<OverlayGridScale>()
            .add_event::<BuildRoadsRequest>()
            .add_event::<ModalInput>()
            .add_systems(Update, (start_build_roads, drive_build_roads).chain());
    }
}
