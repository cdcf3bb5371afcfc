use bevy::prelude::*;
use bevy_egui::EguiPlugin;

pub mod build_roads_hud;
pub mod keybinds;
pub mod road_generator_panel;
pub mod theme;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin)
            .add_systems(Startup, theme::apply_overlay_theme)
            .add_systems(
                Update,
                (
                    keybinds::hotkeys,
                    road_generator_panel::road_generator_panel_ui,
                    build_roads_hud::build_roads_hud_ui,
                )
                    .chain(),
            );
    }
}
