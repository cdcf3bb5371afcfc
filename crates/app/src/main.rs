use std::path::PathBuf;

use bevy::prelude::*;
use bevy::window::PresentMode;
use bevy::winit::{UpdateMode, WinitSettings};

use roads::{RoadGeneratorPlugin, RoadGeneratorSettings};

const SETTINGS_ENV: &str = "ROADBUILDER_SETTINGS";
const SAVE_ENV: &str = "ROADBUILDER_SAVE";
const DEFAULT_SETTINGS_FILE: &str = "roadbuilder_settings.json";

/// Settings file read at startup and written back on exit.
#[derive(Resource, Debug, Clone)]
struct SettingsPath(PathBuf);

fn main() {
    let settings_path = std::env::var_os(SETTINGS_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Road Builder".to_string(),
            resolution: (1280.0, 720.0).into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }))
    .insert_resource(WinitSettings {
        focused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(16)),
        unfocused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(100)),
    })
    .insert_resource(SettingsPath(settings_path))
    .add_plugins((
        RoadGeneratorPlugin,
        rendering::RenderingPlugin,
        ui::UiPlugin,
        save::SavePlugin,
    ))
    .add_systems(PreStartup, load_settings)
    .add_systems(Last, save_settings_on_exit);

    if let Some(save_path) = std::env::var_os(SAVE_ENV) {
        app.insert_resource(save::SavePath(PathBuf::from(save_path)));
    }

    app.run();
}

/// An unreadable settings file keeps the defaults, so the tool still starts.
fn load_settings(path: Res<SettingsPath>, mut settings: ResMut<RoadGeneratorSettings>) {
    match RoadGeneratorSettings::load(&path.0) {
        Ok(loaded) => *settings = loaded,
        Err(e) => error!("Failed to load settings from {}: {e}", path.0.display()),
    }
}

fn save_settings_on_exit(
    mut exit: EventReader<AppExit>,
    path: Res<SettingsPath>,
    settings: Res<RoadGeneratorSettings>,
) {
    if exit.read().next().is_none() {
        return;
    }
    match settings.save(&path.0) {
        Ok(()) => info!("Saved settings to {}", path.0.display()),
        Err(e) => error!("Failed to save settings to {}: {e}", path.0.display()),
    }
}
