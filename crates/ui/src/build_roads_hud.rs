//! Text overlay of the running build roads operator.
//!
//! Mirrors the operator's info box in the top left corner, the key help in the
//! bottom left and, with debug overlays on, the provisional state below the
//! info box.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use roads::build_roads::TextLine;
use roads::BuildRoadsSession;

use crate::theme;

fn text_line(ui: &mut egui::Ui, line: &TextLine) {
    if line.heading {
        ui.add_space(4.0);
        ui.label(egui::RichText::new(&line.text).strong().color(theme::HEADING_COLOR));
    } else {
        ui.label(egui::RichText::new(&line.text).color(theme::TEXT_COLOR));
    }
}

/// Split a help line into its key and description, `"Q - Change Road Type"`
/// becomes `("Q", "Change Road Type")`.
pub fn split_help_line(line: &str) -> (&str, &str) {
    line.split_once(" - ").unwrap_or(("", line))
}

pub fn build_roads_hud_ui(mut contexts: EguiContexts, session: Res<BuildRoadsSession>) {
    let Some(operator) = session.operator() else {
        return;
    };
    let Some(ctx) = contexts.try_ctx_mut() else {
        return;
    };

    egui::Area::new(egui::Id::new("build_roads_info"))
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(12.0, 12.0))
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                for line in operator.info_lines() {
                    text_line(ui, &line);
                }
                let debug = operator.debug_lines();
                if !debug.is_empty() {
                    ui.separator();
                    for line in debug {
                        ui.label(egui::RichText::new(line).monospace().color(theme::HINT_COLOR));
                    }
                }
            });
        });

    egui::Area::new(egui::Id::new("build_roads_help"))
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(12.0, -12.0))
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                for line in operator.help_lines() {
                    let (key, what) = split_help_line(&line);
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(key).monospace().color(theme::KEY_COLOR));
                        ui.label(egui::RichText::new(what).color(theme::TEXT_COLOR));
                    });
                }
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_help_line() {
        assert_eq!(
            split_help_line("Q - Change Road Type"),
            ("Q", "Change Road Type")
        );
        assert_eq!(
            split_help_line("Left Click - Start Segment"),
            ("Left Click", "Start Segment")
        );
    }

    #[test]
    fn test_split_help_line_without_key() {
        assert_eq!(split_help_line("Building"), ("", "Building"));
    }
}
