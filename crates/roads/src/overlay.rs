//! Viewport overlay primitives emitted by the build-roads operator.
//!
//! The core only decides what to draw. A renderer turns the primitives into
//! gizmos (see the rendering crate) or records them in tests.

use bevy::prelude::*;

pub const HIGHLIGHT_COLOR: LinearRgba = LinearRgba::new(0.991102, 0.258183, 0.0, 1.0);
pub const OVERLAY_COLOR: LinearRgba = LinearRgba::new(0.205079, 1.0, 1.0, 0.1);
pub const CX_OVERLAY_COLOR: LinearRgba = LinearRgba::new(0.012983, 0.174648, 0.982251, 1.0);

pub const DEBUG_END_POINT_COLOR: LinearRgba = LinearRgba::new(0.0, 1.0, 0.0, 1.0);
pub const DEBUG_MIDPOINT_COLOR: LinearRgba = LinearRgba::new(1.0, 0.0, 0.0, 1.0);
pub const DEBUG_ADJ_POINT_COLOR: LinearRgba = LinearRgba::new(0.0, 0.0, 1.0, 1.0);
pub const DEBUG_MARKER_RADIUS: f32 = 5.0;

/// Height every overlay primitive is flattened to. There is no depth
/// information for the generated geometry, so everything is drawn on one plane.
pub const OVERLAY_Z: f32 = 0.0;

pub fn to_overlay_pos(pos: Vec3) -> Vec3 {
    Vec3::new(pos.x, pos.y, OVERLAY_Z)
}

pub trait OverlayRenderer {
    fn line(&mut self, start: Vec3, end: Vec3, color: LinearRgba);

    /// Circle lying in the ground plane.
    fn circle(&mut self, center: Vec3, radius: f32, color: LinearRgba);
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayPrimitive {
    Line {
        start: Vec3,
        end: Vec3,
        color: LinearRgba,
    },
    Circle {
        center: Vec3,
        radius: f32,
        color: LinearRgba,
    },
}

/// Renderer that keeps the primitives, for headless use.
#[derive(Debug, Default, Clone)]
pub struct RecordingOverlay {
    pub primitives: Vec<OverlayPrimitive>,
}

impl RecordingOverlay {
    pub fn circles_with_color(&self, color: LinearRgba) -> Vec<(Vec3, f32)> {
        self.primitives
            .iter()
            .filter_map(|p| match p {
                OverlayPrimitive::Circle {
                    center,
                    radius,
                    color: c,
                } if *c == color => Some((*center, *radius)),
                _ => None,
            })
            .collect()
    }

    pub fn line_count(&self) -> usize {
        self.primitives
            .iter()
            .filter(|p| matches!(p, OverlayPrimitive::Line { .. }))
            .count()
    }
}

impl OverlayRenderer for RecordingOverlay {
    fn line(&mut self, start: Vec3, end: Vec3, color: LinearRgba) {
        self.primitives
            .push(OverlayPrimitive::Line { start, end, color });
    }

    fn circle(&mut self, center: Vec3, radius: f32, color: LinearRgba) {
        self.primitives.push(OverlayPrimitive::Circle {
            center,
            radius,
            color,
        });
    }
}
