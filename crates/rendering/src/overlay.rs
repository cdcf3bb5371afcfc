use bevy::prelude::*;

use roads::build_roads::OverlayGridScale;
use roads::overlay::OverlayRenderer;
use roads::BuildRoadsSession;

const GRID_CELLS: u32 = 200;
const GRID_COLOR: LinearRgba = LinearRgba::new(0.3, 0.3, 0.3, 0.25);

/// Draws overlay primitives as immediate mode gizmos.
pub struct GizmoOverlay<'a, 'w, 's> {
    gizmos: &'a mut Gizmos<'w, 's>,
}

impl<'a, 'w, 's> GizmoOverlay<'a, 'w, 's> {
    pub fn new(gizmos: &'a mut Gizmos<'w, 's>) -> Self {
        Self { gizmos }
    }
}

impl OverlayRenderer for GizmoOverlay<'_, '_, '_> {
    fn line(&mut self, start: Vec3, end: Vec3, color: LinearRgba) {
        self.gizmos.line(start, end, color);
    }

    fn circle(&mut self, center: Vec3, radius: f32, color: LinearRgba) {
        // Gizmo circles lie in the XY plane before the isometry is applied
        self.gizmos
            .circle(Isometry3d::from_translation(center), radius, color);
    }
}

/// Ground grid at the overlay grid scale.
pub fn draw_ground_grid(mut gizmos: Gizmos, grid_scale: Res<OverlayGridScale>) {
    let spacing = grid_scale.0.max(f32::EPSILON) * 10.0;
    gizmos.grid(
        Isometry3d::IDENTITY,
        UVec2::splat(GRID_CELLS),
        Vec2::splat(spacing),
        GRID_COLOR,
    );
}

/// Overlay of the running build roads operator.
pub fn draw_build_roads_overlay(mut gizmos: Gizmos, session: Res<BuildRoadsSession>) {
    let Some(operator) = session.operator() else {
        return;
    };
    let mut overlay = GizmoOverlay::new(&mut gizmos);
    operator.draw_overlay(&mut overlay);
}
