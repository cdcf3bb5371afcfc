use std::collections::BTreeSet;

use bevy::prelude::*;

use crate::config::{
    crossroad_nodegroup, CROSSROAD_POSITION_PROPERTY, ORIGIN_REL_TOL, POSITION_MATCH_REL_TOL,
    ROAD_TYPE_CROSSROAD_VALUE, ROAD_TYPE_PROPERTY,
};
use crate::modifier::InputValue;
use crate::road_network::{Crossroad, CrossroadId, RoadSegment, SegmentAdjacency};
use crate::road_type_library::RoadTypeLibrary;
use crate::scene::{strip_duplicate_suffix, IdProperty, ObjectKind, SceneObject};
use crate::spline::mean_position;

use super::RoadBuilder;

/// Relative closeness, `rel_tol` of the larger magnitude.
fn is_close(a: f32, b: f32, rel_tol: f32) -> bool {
    (a - b).abs() <= rel_tol * a.abs().max(b.abs())
}

fn is_close_vec3(a: Vec3, b: Vec3, rel_tol: f32) -> bool {
    is_close(a.x, b.x, rel_tol) && is_close(a.y, b.y, rel_tol) && is_close(a.z, b.z, rel_tol)
}

fn road_type_name(obj: &SceneObject) -> Option<&str> {
    obj.property(ROAD_TYPE_PROPERTY).and_then(IdProperty::as_str)
}

fn is_crossroad_obj(obj: &SceneObject) -> bool {
    road_type_name(obj) == Some(ROAD_TYPE_CROSSROAD_VALUE)
}

/// Crossroad id from an object named `tq_crossroad-<id>`, duplicate suffix allowed.
fn parse_crossroad_id(name: &str) -> Option<CrossroadId> {
    let (_, id) = name.split_once('-')?;
    strip_duplicate_suffix(id).parse().ok().map(CrossroadId)
}

impl RoadBuilder {
    /// Rebuild the road network from the objects already in the scene.
    ///
    /// Curves with a known road type become segments, one per spline.
    /// Crossroads are matched back to segment endpoints through the positions
    /// stored on their adjacency modifiers.
    pub fn init_from_scene(&mut self, library: &RoadTypeLibrary) {
        self.network.clear();

        let curves: Vec<&SceneObject> = self
            .scene
            .objects
            .values()
            .filter(|o| o.kind == ObjectKind::Curve && !is_crossroad_obj(o))
            .collect();
        let mut segments = Vec::new();
        for obj in curves {
            let Some(type_name) = road_type_name(obj) else {
                continue;
            };
            let Some(road_type) = library.get_road_type_by_name(type_name) else {
                warn!("Unknown road type present on object: '{}'", obj.name);
                continue;
            };
            // Crossroad geometry is only correct for curves at the world origin
            if !is_close_vec3(obj.location, Vec3::ZERO, ORIGIN_REL_TOL) {
                warn!(
                    "Skipping road curve {}, because it is not at center location!",
                    obj.name
                );
                continue;
            }
            for (id, _) in self.scene.splines_of(&obj.name) {
                segments.push(RoadSegment::new(id, obj.name.clone(), road_type.clone()));
            }
        }
        for segment in segments {
            self.network.add_segment(segment);
        }

        let crossroad_objects: Vec<SceneObject> = self
            .scene
            .objects
            .values()
            .filter(|o| o.kind == ObjectKind::Mesh && is_crossroad_obj(o))
            .cloned()
            .collect();
        for obj in &crossroad_objects {
            self.load_crossroad(obj, library);
        }

        info!(
            "Loaded road network with {} segments and {} crossroads",
            self.network.segment_count(),
            self.network.crossroad_count()
        );
    }

    fn load_crossroad(&mut self, obj: &SceneObject, library: &RoadTypeLibrary) {
        let Some(id) = parse_crossroad_id(&obj.name) else {
            warn!("Cannot parse crossroad id from '{}'", obj.name);
            return;
        };
        if !self.scene.has_collection(&obj.name) {
            warn!("Skipping crossroad {}, its collection is missing", obj.name);
            return;
        }

        let mut searched_positions: Vec<Vec3> = Vec::new();
        let mut searched_curves: BTreeSet<&str> = BTreeSet::new();
        for m in obj.modifiers_with_group(crossroad_nodegroup::REGISTER) {
            for input in ["End Point 1", "End Point 2"] {
                if let Some(pos) = m.get_input(input).and_then(InputValue::as_vec3) {
                    if !searched_positions.contains(&pos) {
                        searched_positions.push(pos);
                    }
                }
            }
            for input in ["Road 1", "Road 2"] {
                if let Some(curve) = m.get_input(input).and_then(InputValue::as_name) {
                    searched_curves.insert(curve);
                }
            }
        }

        // Every point of the neighbouring curves is a candidate, only
        // endpoints can become adjacencies
        let mut adjacencies = BTreeSet::new();
        let mut segments = Vec::new();
        for curve_name in searched_curves {
            let Some(curve) = self.scene.object(curve_name) else {
                warn!("Crossroad {} references missing curve '{curve_name}'", obj.name);
                continue;
            };
            let Some(road_type) = road_type_name(curve).and_then(|n| library.get_road_type_by_name(n))
            else {
                warn!("Unknown road type present on curve: '{curve_name}'");
                continue;
            };
            for (spline_id, spline) in self.scene.splines_of(curve_name) {
                for (i, point) in spline.points.iter().enumerate() {
                    if !searched_positions
                        .iter()
                        .any(|pos| is_close_vec3(point.co, *pos, POSITION_MATCH_REL_TOL))
                    {
                        continue;
                    }
                    match SegmentAdjacency::from_point_idx(spline_id, i, spline.len()) {
                        Ok(adj) => {
                            adjacencies.insert(adj);
                            segments.push(RoadSegment::new(
                                spline_id,
                                curve_name,
                                road_type.clone(),
                            ));
                        }
                        Err(e) => debug!("Ignoring crossroad match: {e}"),
                    }
                }
            }
        }

        if adjacencies.len() < 2 {
            error!("Not enough adjacencies found for crossroad {}!", obj.name);
            return;
        }

        // Reuse the stored position, older scenes fall back to the mean
        let position = match obj
            .property(CROSSROAD_POSITION_PROPERTY)
            .and_then(IdProperty::as_vec3)
        {
            Some(position) => position,
            None => mean_position(
                adjacencies
                    .iter()
                    .filter_map(|adj: &SegmentAdjacency| adj.adjacent_point(&self.scene)),
            ),
        };

        let crossroad = match Crossroad::new(
            id,
            &obj.name,
            &obj.name,
            adjacencies,
            position,
            &self.scene,
        ) {
            Ok(crossroad) => crossroad,
            Err(e) => {
                error!("Failed to load crossroad {}: {e}", obj.name);
                return;
            }
        };
        if let Err(e) = self.network.add_crossroad_with_segments(crossroad, segments) {
            error!("Failed to load crossroad {}: {e}", obj.name);
        }
    }
}
