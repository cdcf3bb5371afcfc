use std::path::PathBuf;

use bevy::prelude::*;
use roads::{BuildRoadsSession, RoadScene};

use crate::save_error::SaveError;

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Where [`SaveRoadsEvent`] writes and [`LoadRoadsEvent`] reads.
#[derive(Resource, Debug, Clone)]
pub struct SavePath(pub PathBuf);

impl Default for SavePath {
    fn default() -> Self {
        Self(PathBuf::from("roadbuilder_save.bin"))
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Event)]
pub struct SaveRoadsEvent;

#[derive(Event)]
pub struct LoadRoadsEvent;

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SaveRoadsEvent>()
            .add_event::<LoadRoadsEvent>()
            .init_resource::<SavePath>()
            .add_systems(Update, (handle_save_event, handle_load_event).chain());
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

fn session_active(session: Option<&BuildRoadsSession>) -> bool {
    session.is_some_and(BuildRoadsSession::is_active)
}

/// Writes the scene on [`SaveRoadsEvent`]. Only one save runs per frame.
fn handle_save_event(
    mut events: EventReader<SaveRoadsEvent>,
    path: Res<SavePath>,
    scene: Res<RoadScene>,
    session: Option<Res<BuildRoadsSession>>,
) {
    if events.read().next().is_none() {
        return;
    }
    events.clear();

    let result = if session_active(session.as_deref()) {
        Err(SaveError::SessionActive)
    } else {
        crate::save_scene(&scene, &path.0).map(|_| ())
    };
    if let Err(e) = result {
        error!("Save failed: {e}");
    }
}

/// Replaces the scene on [`LoadRoadsEvent`]. A failed load keeps the
/// current scene.
fn handle_load_event(
    mut events: EventReader<LoadRoadsEvent>,
    path: Res<SavePath>,
    mut scene: ResMut<RoadScene>,
    session: Option<Res<BuildRoadsSession>>,
) {
    if events.read().next().is_none() {
        return;
    }
    events.clear();

    let result = if session_active(session.as_deref()) {
        Err(SaveError::SessionActive)
    } else {
        crate::load_scene(&path.0)
    };
    match result {
        Ok(loaded) => *scene = loaded,
        Err(e) => error!("Load failed: {e}"),
    }
}
