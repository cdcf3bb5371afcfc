use bevy_egui::{egui, EguiContexts};

pub const HEADING_COLOR: egui::Color32 = egui::Color32::from_rgb(235, 235, 240);
pub const TEXT_COLOR: egui::Color32 = egui::Color32::from_gray(200);
pub const HINT_COLOR: egui::Color32 = egui::Color32::from_gray(150);
pub const KEY_COLOR: egui::Color32 = egui::Color32::from_rgb(130, 200, 255);

/// Translucent dark overlay style, so the viewport stays readable under the HUD.
pub fn apply_overlay_theme(mut contexts: EguiContexts) {
    let Some(ctx) = contexts.try_ctx_mut() else {
        return;
    };
    let mut style = (*ctx.style()).clone();

    let panel = egui::Color32::from_rgba_unmultiplied(24, 26, 32, 220);
    let inactive = egui::Color32::from_rgb(48, 52, 62);
    let active = egui::Color32::from_rgb(64, 130, 220);

    style.visuals.window_fill = panel;
    style.visuals.panel_fill = panel;
    style.visuals.widgets.inactive.bg_fill = inactive;
    style.visuals.widgets.inactive.weak_bg_fill = inactive;
    style.visuals.widgets.active.bg_fill = active;
    style.visuals.widgets.active.weak_bg_fill = active;
    style.visuals.selection.bg_fill = active;
    style.visuals.selection.stroke = egui::Stroke::new(1.0, active);
    style.visuals.window_corner_radius = egui::CornerRadius::same(4);

    ctx.set_style(style);
}
