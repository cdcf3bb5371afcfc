use std::fmt::Display;
use std::sync::Arc;

use bevy::prelude::*;

use crate::error::OperatorError;
use crate::overlay::{
    to_overlay_pos, OverlayRenderer, CX_OVERLAY_COLOR, DEBUG_ADJ_POINT_COLOR,
    DEBUG_END_POINT_COLOR, DEBUG_MARKER_RADIUS, DEBUG_MIDPOINT_COLOR, HIGHLIGHT_COLOR,
    OVERLAY_COLOR,
};
use crate::road_builder::{snap_to_grid, BuildPoint, RoadBuilder};
use crate::road_type::RoadType;
use crate::road_type_library::RoadTypeLibrary;
use crate::scene::RoadScene;
use crate::settings::RoadGeneratorSettings;

use super::types::{BuildRoadsLock, EventKind, EventValue, LockGuard, ModalAction, ModalEvent};

/// Line of the info box, headings are styled apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    pub text: String,
    pub heading: bool,
}

impl TextLine {
    fn heading(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            heading: true,
        }
    }

    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            heading: false,
        }
    }
}

fn display_or_none<T: Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "None".to_string(),
    }
}

/// Interactive session building a road system with the mouse.
///
/// Left click starts a segment and finishes it on the second click. Where the
/// clicks land decides what gets built, see [`RoadBuilder`]. Dropping the
/// operator releases the [`BuildRoadsLock`].
pub struct BuildRoadsOperator {
    builder: RoadBuilder,
    library: RoadTypeLibrary,
    /// Grid scale of the viewport, multiplied by the settings multiplier.
    grid_scale: f32,
    mouse_pos: Option<Vec3>,
    mouse_point: Option<BuildPoint>,
    snapped_point: Option<(Vec3, f32)>,
    first_point: Option<BuildPoint>,
    first_point_position: Option<Vec3>,
    grid_snap: bool,
    is_viewport_movement: bool,
    lock: Option<LockGuard>,
}

impl BuildRoadsOperator {
    /// Start an operator on `scene`.
    ///
    /// Road types are (re)loaded from the settings' roads path into `library`.
    /// On success the scene is moved into the operator, on failure it is left
    /// untouched.
    pub fn invoke(
        lock: &BuildRoadsLock,
        mut settings: RoadGeneratorSettings,
        library: &mut RoadTypeLibrary,
        scene: &mut RoadScene,
        grid_scale: f32,
    ) -> Result<Self, OperatorError> {
        if lock.is_running() {
            error!("Another instance of the operator is already running!");
            return Err(OperatorError::AlreadyRunning);
        }

        let roads_path = settings.roads_path.clone();
        if !roads_path.exists() {
            error!("Road generator files do not exist at {}", roads_path.display());
            return Err(OperatorError::RoadTypesMissing(
                roads_path.display().to_string(),
            ));
        }
        library.load_dir(&roads_path);
        if library.is_empty() {
            return Err(OperatorError::RoadTypesMissing(
                roads_path.display().to_string(),
            ));
        }

        if library
            .get_road_type_by_name(&settings.current_road_type)
            .is_none()
        {
            if let Some(first) = library.next_road_type_name(&settings.current_road_type) {
                settings.current_road_type = first;
            }
        }

        let guard = lock.try_acquire().ok_or(OperatorError::AlreadyRunning)?;
        let mut builder = RoadBuilder::new(std::mem::take(scene), settings);
        builder.clear_collection();
        builder.init_from_scene(library);
        info!("Build roads started with {} road types", library.len());

        Ok(Self {
            builder,
            library: library.clone(),
            grid_scale,
            mouse_pos: None,
            mouse_point: None,
            snapped_point: None,
            first_point: None,
            first_point_position: None,
            grid_snap: false,
            is_viewport_movement: false,
            lock: Some(guard),
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn builder(&self) -> &RoadBuilder {
        &self.builder
    }

    pub fn settings(&self) -> &RoadGeneratorSettings {
        self.builder.settings()
    }

    pub fn is_running(&self) -> bool {
        self.lock.is_some()
    }

    pub fn grid_snap(&self) -> bool {
        self.grid_snap
    }

    pub fn is_viewport_movement(&self) -> bool {
        self.is_viewport_movement
    }

    pub fn mouse_point(&self) -> Option<&BuildPoint> {
        self.mouse_point.as_ref()
    }

    pub fn first_point(&self) -> Option<&BuildPoint> {
        self.first_point.as_ref()
    }

    pub fn set_grid_scale(&mut self, grid_scale: f32) {
        self.grid_scale = grid_scale;
    }

    pub fn current_road_type(&self) -> Option<Arc<RoadType>> {
        self.library
            .get_road_type_by_name(&self.settings().current_road_type)
    }

    /// Give back the edited scene and the settings changed during the session.
    pub fn into_parts(self) -> (RoadScene, RoadGeneratorSettings) {
        let settings = self.builder.settings().clone();
        (self.builder.into_scene(), settings)
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub fn handle_event(&mut self, event: &ModalEvent) -> ModalAction {
        if !self.is_running() {
            return ModalAction::Finished;
        }
        if !event.in_viewport {
            return ModalAction::PassThrough;
        }

        // Only the top view is supported, tilting is left to the host
        if event.kind == EventKind::MiddleMouse && event.shift {
            match event.value {
                EventValue::Press => self.is_viewport_movement = true,
                EventValue::Release => self.is_viewport_movement = false,
                EventValue::Nothing => {}
            }
            return ModalAction::PassThrough;
        }
        if matches!(event.kind, EventKind::WheelUp | EventKind::WheelDown)
            && event.value == EventValue::Press
        {
            return ModalAction::PassThrough;
        }

        self.grid_snap = event.ctrl;
        let mut handled = false;
        if event.kind == EventKind::MouseMove {
            self.handle_snapping(event.cursor);
            handled = true;
        }

        if event.value == EventValue::Press {
            handled = true;
            match event.kind {
                EventKind::Key(KeyCode::KeyQ) => self.cycle_road_type(),
                EventKind::LeftMouse => {
                    let Some(point) = self.mouse_point.clone() else {
                        return ModalAction::PassThrough;
                    };
                    if let Err(e) = self.click(point) {
                        error!("Build roads click failed: {e}");
                    }
                }
                EventKind::Key(KeyCode::Escape) => {
                    self.cleanup();
                    return ModalAction::Finished;
                }
                _ => {}
            }
        }

        if handled {
            ModalAction::RunningModal
        } else {
            ModalAction::PassThrough
        }
    }

    /// Stop the session, e.g. when the host cancels the operator.
    pub fn cancel(&mut self) {
        self.cleanup();
    }

    fn handle_snapping(&mut self, cursor: Option<Vec3>) {
        if cursor.is_some() {
            self.mouse_pos = cursor;
        }
        let Some(mut position) = self.mouse_pos else {
            return;
        };
        if self.grid_snap {
            let grid = self.grid_scale * self.settings().grid_scale_multiplier;
            position = snap_to_grid(position, grid);
        }

        let snap = self.builder.snap(position);
        self.snapped_point = snap.highlight;
        self.builder.update_provisional_end_point(&snap.point);
        self.mouse_point = Some(snap.point);
    }

    fn cycle_road_type(&mut self) {
        let current = self.settings().current_road_type.clone();
        if let Some(next) = self.library.next_road_type_name(&current) {
            info!("Road type changed to {next}");
            self.builder.settings_mut().current_road_type = next;
        }
    }

    fn click(&mut self, point: BuildPoint) -> Result<(), OperatorError> {
        if self.first_point.is_none() {
            let road_type = self.current_road_type().ok_or_else(|| {
                OperatorError::UnknownRoadType(self.settings().current_road_type.clone())
            })?;
            let position = point.position();
            self.builder.start_segment(point.clone(), road_type)?;
            self.first_point = Some(point);
            self.first_point_position = Some(position);
        } else {
            self.first_point = None;
            self.first_point_position = None;
            self.builder.finish_segment(point)?;
        }
        Ok(())
    }

    /// Commit any segment in progress and release the lock.
    fn cleanup(&mut self) {
        if self.builder.is_building() {
            if let Err(e) = self.builder.cancel_segment() {
                warn!("Failed to commit segment in progress: {e}");
                self.builder.reset_state();
            }
        }
        self.first_point = None;
        self.first_point_position = None;
        self.snapped_point = None;
        if self.lock.take().is_some() {
            info!("Build roads finished");
        }
    }

    // -----------------------------------------------------------------------
    // Drawing
    // -----------------------------------------------------------------------

    pub fn draw_overlay(&self, renderer: &mut dyn OverlayRenderer) {
        let network = self.builder.network();
        for (segment, spline) in self.builder.spline_build_points() {
            let point_count = spline.len();
            for (i, point) in spline.points.iter().enumerate() {
                if self.builder.is_active_build_point(segment.id, i) {
                    continue;
                }
                let position = to_overlay_pos(point.co);
                if let Some(next) = spline.points.get(i + 1) {
                    renderer.line(position, to_overlay_pos(next.co), OVERLAY_COLOR);
                }
                if !network.is_crossroad_endpoint(segment.id, i, point_count) {
                    renderer.circle(position, segment.road_type.half_width, OVERLAY_COLOR);
                }
            }
        }

        for cx in self.builder.crossroad_build_points() {
            renderer.circle(to_overlay_pos(cx.position), cx.radius, CX_OVERLAY_COLOR);
        }

        if let Some((center, radius)) = self.snapped_point {
            renderer.circle(to_overlay_pos(center), radius, HIGHLIGHT_COLOR);
        }

        if let (Some(first), Some(mouse)) = (self.first_point_position, &self.mouse_point) {
            renderer.line(
                to_overlay_pos(first),
                to_overlay_pos(mouse.position()),
                OVERLAY_COLOR,
            );
        }

        if self.settings().debug {
            self.draw_debug_markers(renderer);
        }
    }

    fn draw_debug_markers(&self, renderer: &mut dyn OverlayRenderer) {
        let Some(session) = self.builder.state().session() else {
            return;
        };
        let provisional = &session.provisional_segment;
        if let Some(co) = self
            .builder
            .scene()
            .spline(provisional.spline)
            .and_then(|s| s.co(provisional.endpoint_idx))
        {
            renderer.circle(to_overlay_pos(co), DEBUG_MARKER_RADIUS, DEBUG_END_POINT_COLOR);
        }
        if let Some(cx) = &session.provisional_crossroad {
            renderer.circle(
                to_overlay_pos(cx.midpoint),
                DEBUG_MARKER_RADIUS,
                DEBUG_MIDPOINT_COLOR,
            );
            if let Some(adj_point) = cx.adj_point {
                renderer.circle(
                    to_overlay_pos(adj_point),
                    DEBUG_MARKER_RADIUS,
                    DEBUG_ADJ_POINT_COLOR,
                );
            }
        }
    }

    pub fn info_lines(&self) -> Vec<TextLine> {
        let mut lines = vec![
            TextLine::heading("Build Roads Information"),
            TextLine::info(format!(
                "Crossroad Road Offset: {:.2}",
                self.settings().crossroad.points_offset
            )),
            TextLine::heading("Current Road"),
        ];
        match self.current_road_type() {
            Some(road_type) => {
                lines.push(TextLine::info(format!("Road Type: {}", road_type.name)));
                lines.push(TextLine::info(format!(
                    "Total Width: {:.2}",
                    road_type.total_width
                )));
                lines.push(TextLine::info(format!(
                    "Road Width: {:.2}",
                    road_type.road_surface_width
                )));
            }
            None => lines.push(TextLine::info("Road Type: None")),
        }
        lines
    }

    pub fn help_lines(&self) -> Vec<String> {
        let click = if self.first_point.is_none() {
            "Left Click - Start Segment"
        } else {
            "Left Click - Finish Segment"
        };
        let grid = if self.grid_snap {
            "CTRL - Grid Snap is ON"
        } else {
            "CTRL - Snap To Grid (Hold)"
        };
        vec![
            click.to_string(),
            "Q - Change Road Type".to_string(),
            grid.to_string(),
            "ESC - Exit".to_string(),
        ]
    }

    /// Network dump shown with the debug setting, empty otherwise.
    pub fn debug_lines(&self) -> Vec<String> {
        if !self.settings().debug {
            return Vec::new();
        }
        let network = self.builder.network();
        let mut lines = vec![
            format!("First Point: {}", display_or_none(&self.first_point)),
            format!("Mouse Point: {}", display_or_none(&self.mouse_point)),
            format!("Segments Count: {}", network.segment_count()),
            format!("CX Count: {}", network.crossroad_count()),
            "Road Network Debug".to_string(),
            "Segments:".to_string(),
        ];
        lines.extend(network.segments().map(ToString::to_string));
        lines.push("Crossroads:".to_string());
        lines.extend(network.crossroads().map(ToString::to_string));
        lines
    }
}
