use bevy::prelude::*;

use super::{BuildPoint, RoadBuilder};
use crate::overlay::to_overlay_pos;

/// Build point under the mouse, with the circle to highlight it by.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    pub point: BuildPoint,
    /// Center and radius of the highlight circle.
    pub highlight: Option<(Vec3, f32)>,
}

/// Distance as seen from the top view, on the overlay plane.
fn flat_distance(a: Vec3, b: Vec3) -> f32 {
    to_overlay_pos(a - b).length()
}

impl RoadBuilder {
    /// Snap `mouse` to the nearest existing build point.
    ///
    /// Segment points snap within the half width of their road. Points being
    /// built and endpoints already joined to a crossroad are skipped. A
    /// crossroad within its radius wins over any segment point.
    pub fn snap(&self, mouse: Vec3) -> SnapResult {
        let mut result = SnapResult {
            point: BuildPoint::empty(mouse),
            highlight: None,
        };

        for (segment, spline) in self.spline_build_points() {
            let point_count = spline.len();
            let half_width = segment.road_type.half_width;
            // First matching point of each segment, later segments take over
            for (i, point) in spline.points.iter().enumerate() {
                if self.is_active_build_point(segment.id, i)
                    || self.network.is_crossroad_endpoint(segment.id, i, point_count)
                {
                    continue;
                }
                if flat_distance(point.co, mouse) < half_width {
                    result = SnapResult {
                        point: BuildPoint::Segment {
                            segment: segment.clone(),
                            point_idx: i,
                            point_count,
                            position: point.co,
                        },
                        highlight: Some((point.co, half_width)),
                    };
                    break;
                }
            }
        }

        if let Some(cx) = self
            .crossroad_build_points()
            .find(|cx| flat_distance(cx.position, mouse) < cx.radius)
        {
            result = SnapResult {
                point: BuildPoint::Crossroad {
                    crossroad: cx.id,
                    position: cx.position,
                },
                highlight: Some((cx.position, cx.radius)),
            };
        }
        result
    }
}

/// Round the horizontal components of `position` to multiples of `grid`.
pub fn snap_to_grid(position: Vec3, grid: f32) -> Vec3 {
    if grid <= 0.0 {
        return position;
    }
    Vec3::new(
        (position.x / grid).round() * grid,
        (position.y / grid).round() * grid,
        position.z,
    )
}
