use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use roads::build_roads::BuildRoadsRequest;
use roads::config::MIN_CROSSROAD_POINTS_OFFSET;
use roads::{BuildRoadsSession, RoadGeneratorSettings, RoadTypeLibrary};
use save::{LoadRoadsEvent, SaveRoadsEvent};

use crate::theme;

/// Side panel with the build roads button, the settings used by the next
/// session, and save/load.
///
/// Settings are read-only while a session runs, the operator works on its own
/// copy and writes it back when it finishes.
pub fn road_generator_panel_ui(
    mut contexts: EguiContexts,
    session: Res<BuildRoadsSession>,
    library: Res<RoadTypeLibrary>,
    mut settings: ResMut<RoadGeneratorSettings>,
    mut requests: EventWriter<BuildRoadsRequest>,
    mut save_events: EventWriter<SaveRoadsEvent>,
    mut load_events: EventWriter<LoadRoadsEvent>,
) {
    let Some(ctx) = contexts.try_ctx_mut() else {
        return;
    };
    let running = session.is_active();

    egui::Window::new("Road Generator")
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-12.0, 12.0))
        .resizable(false)
        .default_width(240.0)
        .show(ctx, |ui| {
            ui.colored_label(theme::HINT_COLOR, "Road System Builder");
            ui.add_enabled_ui(!running, |ui| {
                if ui
                    .add_sized([ui.available_width(), 28.0], egui::Button::new("Build Roads"))
                    .on_hover_text("B")
                    .clicked()
                {
                    requests.send(BuildRoadsRequest);
                }
            });

            if running {
                let road_type = session
                    .operator()
                    .and_then(|op| op.current_road_type())
                    .map(|rt| rt.name.clone())
                    .unwrap_or_default();
                ui.label(format!("Road Type: {road_type}"));
                ui.colored_label(theme::HINT_COLOR, "Press ESC to exit Build Roads");
                return;
            }

            ui.separator();
            ui.colored_label(theme::HINT_COLOR, "Road Type");
            egui::ComboBox::from_id_salt("current_road_type")
                .selected_text(roads::road_type_library::nice_name(
                    &settings.current_road_type,
                ))
                .show_ui(ui, |ui| {
                    for item in library.get_road_types_as_enum_items() {
                        ui.selectable_value(
                            &mut settings.current_road_type,
                            item.name.clone(),
                            item.nice_name,
                        )
                        .on_hover_text(item.description);
                    }
                });
            ui.add(
                egui::DragValue::new(&mut settings.current_road_height)
                    .speed(0.1)
                    .prefix("Road Height: "),
            );

            ui.separator();
            ui.colored_label(theme::HINT_COLOR, "Crossroad Settings");
            ui.checkbox(&mut settings.crossroad.build_crosswalks, "Build Crosswalks");
            ui.add(
                egui::DragValue::new(&mut settings.crossroad.points_offset)
                    .speed(0.1)
                    .range(MIN_CROSSROAD_POINTS_OFFSET..=f32::MAX)
                    .prefix("Crossroad Points Offset: "),
            );

            ui.separator();
            ui.colored_label(theme::HINT_COLOR, "Tool Settings");
            ui.add(
                egui::DragValue::new(&mut settings.grid_scale_multiplier)
                    .speed(0.5)
                    .range(0.0..=f32::MAX)
                    .prefix("Grid Scale Multiplier: "),
            );
            ui.checkbox(&mut settings.debug, "Debug Overlays");

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Save").on_hover_text("F5").clicked() {
                    save_events.send(SaveRoadsEvent);
                }
                if ui.button("Load").on_hover_text("F9").clicked() {
                    load_events.send(LoadRoadsEvent);
                }
            });
        });
}
