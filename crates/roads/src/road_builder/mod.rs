//! High level API for building road systems.
//!
//! Building is segment based: every segment is one spline of the curve
//! object of its road type. A segment starts with [`RoadBuilder::start_segment`]
//! and ends with [`RoadBuilder::finish_segment`]. In between,
//! [`RoadBuilder::update_provisional_end_point`] drags the loose end around.
//!
//! Depending on where a segment starts and finishes, the builder extends an
//! existing spline, joins two splines, splits a spline to create a crossroad,
//! or merges two road types through a two-way crossroad.
//!
//! Only road curve objects located at the origin are considered.

mod build_point;
mod join;
mod scene_init;
mod snap;

pub use build_point::{
    BuildPoint, BuildSession, BuilderState, ProvisionalCrossroad, ProvisionalSegment,
};
pub use snap::{snap_to_grid, SnapResult};

use std::sync::Arc;

use bevy::prelude::*;

use crate::config::ROAD_COLLECTION_NAME;
use crate::crossroad_builder::{AdjacentSegment, CrossroadBuilder};
use crate::error::BuilderError;
use crate::road_network::{Crossroad, CrossroadId, RoadNetwork, RoadSegment};
use crate::road_type::RoadType;
use crate::scene::RoadScene;
use crate::settings::RoadGeneratorSettings;
use crate::spline::{endpoint_neighbor_idx, mean_position, move_point_towards_other_point, Spline, SplineId};

pub struct RoadBuilder {
    scene: RoadScene,
    network: RoadNetwork,
    cx_builder: CrossroadBuilder,
    settings: RoadGeneratorSettings,
    state: BuilderState,
}

impl RoadBuilder {
    pub fn new(mut scene: RoadScene, settings: RoadGeneratorSettings) -> Self {
        scene.ensure_collection(ROAD_COLLECTION_NAME, None);
        Self {
            scene,
            network: RoadNetwork::new(),
            cx_builder: CrossroadBuilder::new(ROAD_COLLECTION_NAME),
            settings,
            state: BuilderState::Idle,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn scene(&self) -> &RoadScene {
        &self.scene
    }

    pub fn into_scene(self) -> RoadScene {
        self.scene
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    pub fn settings(&self) -> &RoadGeneratorSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut RoadGeneratorSettings {
        &mut self.settings
    }

    pub fn state(&self) -> &BuilderState {
        &self.state
    }

    pub fn is_building(&self) -> bool {
        self.state.is_building()
    }

    pub fn main_collection(&self) -> &str {
        &self.cx_builder.main_collection
    }

    fn crossroad_point_offset(&self) -> f32 {
        self.settings.crossroad_points_offset()
    }

    /// Remove empty child collections of the road collection.
    pub fn clear_collection(&mut self) -> usize {
        let main = self.cx_builder.main_collection.clone();
        self.scene.remove_empty_child_collections(&main)
    }

    // -----------------------------------------------------------------------
    // Building
    // -----------------------------------------------------------------------

    /// Start building a segment of `road_type` at `start`.
    pub fn start_segment(
        &mut self,
        start: BuildPoint,
        road_type: Arc<RoadType>,
    ) -> Result<(), BuilderError> {
        if self.state.is_building() {
            return Err(BuilderError::InvalidState("a segment is already being built"));
        }
        self.validate_build_point(&start)?;

        let main = self.cx_builder.main_collection.clone();
        let curve_object = road_type.get_curve_obj(&mut self.scene, &main);

        // Fresh points use the configured height
        let start = match start {
            BuildPoint::Empty { mut position } => {
                position.z = self.settings.current_road_height;
                BuildPoint::Empty { position }
            }
            other => other,
        };

        let (provisional_segment, provisional_crossroad) = match &start {
            BuildPoint::Empty { position } => {
                let segment = self.start_fresh_segment(*position, curve_object, road_type);
                (segment, None)
            }
            BuildPoint::Segment {
                segment,
                point_idx,
                position,
                ..
            } => {
                let (point_idx, position) = (*point_idx, *position);
                let point_count = self.point_count(segment.id)?;
                let is_any_endpoint = point_idx == 0 || point_idx + 1 == point_count;
                if !is_any_endpoint {
                    let (provisional, cx) =
                        self.start_crossroad(segment, point_idx, position, curve_object, road_type)?;
                    (provisional, Some(cx))
                } else if *segment.road_type == *road_type {
                    let provisional =
                        self.start_followup_segment(segment, point_idx, position, road_type)?;
                    (provisional, None)
                } else {
                    let (provisional, cx) = self.start_road_type_merge(
                        segment,
                        point_idx,
                        position,
                        curve_object,
                        road_type,
                    )?;
                    (provisional, Some(cx))
                }
            }
            BuildPoint::Crossroad {
                crossroad,
                position,
            } => {
                let (provisional, cx) =
                    self.start_new_crossroad_input(*crossroad, *position, curve_object, road_type)?;
                (provisional, Some(cx))
            }
        };

        debug!("Started segment at {start}");
        self.state = BuilderState::Building(BuildSession {
            start_point: start,
            provisional_segment,
            provisional_crossroad,
        });
        Ok(())
    }

    /// Move the loose end of the segment being built to `point`.
    pub fn update_provisional_end_point(&mut self, point: &BuildPoint) {
        let offset = self.crossroad_point_offset();
        let height = self.settings.current_road_height;
        let BuilderState::Building(session) = &mut self.state else {
            return;
        };

        let mut position = point.position();
        if matches!(point, BuildPoint::Empty { .. }) {
            position.z = height;
        }

        let idx = session.provisional_segment.endpoint_idx;
        let Some(spline) = self.scene.spline_mut(session.provisional_segment.spline) else {
            warn!("Provisional segment spline is missing");
            return;
        };
        spline.set_co(idx, position);

        if let Some(cx) = &mut session.provisional_crossroad {
            let adj_point = move_point_towards_other_point(cx.midpoint, position, offset);
            cx.adj_point = Some(adj_point);
            let other_end = if idx == 0 { spline.last_idx() } else { 0 };
            spline.set_co(other_end, adj_point);
        }
    }

    /// True if point `i` of `spline` is being built: the loose end of the
    /// provisional segment or an endpoint of the provisional crossroad.
    pub fn is_active_build_point(&self, spline: SplineId, i: usize) -> bool {
        let Some(session) = self.state.session() else {
            return false;
        };

        if let Some(cx) = &session.provisional_crossroad {
            let point_count = self.scene.spline(spline).map_or(0, Spline::len);
            for adj in &cx.adjacencies {
                if adj.segment.id != spline {
                    continue;
                }
                if adj.is_first_point && i == 0 {
                    return true;
                }
                if !adj.is_first_point && i + 1 == point_count {
                    return true;
                }
            }
        }

        (spline, i)
            == (
                session.provisional_segment.spline,
                session.provisional_segment.endpoint_idx,
            )
    }

    /// Segments that can be snapped to, with their splines. The segment the
    /// current build started from is left out.
    pub fn spline_build_points(&self) -> impl Iterator<Item = (&RoadSegment, &Spline)> + '_ {
        let excluded = self
            .state
            .session()
            .and_then(|s| s.start_point.segment())
            .map(|s| s.id);
        self.network
            .segments()
            .filter(move |segment| Some(segment.id) != excluded)
            .filter_map(|segment| match self.scene.spline(segment.id) {
                Some(spline) => Some((segment, spline)),
                None => {
                    warn!("Skipping corrupted segment {segment}");
                    None
                }
            })
    }

    pub fn crossroad_build_points(&self) -> impl Iterator<Item = &Crossroad> {
        self.network.crossroads()
    }

    pub fn reset_state(&mut self) {
        self.state = BuilderState::Idle;
    }

    /// Finish the segment being built at `end`.
    pub fn finish_segment(&mut self, end: BuildPoint) -> Result<(), BuilderError> {
        if !self.state.is_building() {
            return Err(BuilderError::InvalidState("no segment is being built"));
        }
        self.validate_build_point(&end)?;
        let BuilderState::Building(mut session) = std::mem::take(&mut self.state) else {
            return Err(BuilderError::InvalidState("no segment is being built"));
        };

        let result = self.finish_session(&mut session, &end);
        if let Err(e) = &result {
            error!("Failed to finish segment at {end}: {e}");
        }
        self.reset_state();
        result
    }

    /// Commit the segment being built at its current loose end.
    pub fn cancel_segment(&mut self) -> Result<(), BuilderError> {
        let Some(session) = self.state.session() else {
            return Err(BuilderError::InvalidState("no segment is being built"));
        };
        let provisional = &session.provisional_segment;
        let position = self
            .scene
            .spline(provisional.spline)
            .and_then(|s| s.co(provisional.endpoint_idx))
            .ok_or(BuilderError::StaleBuildPoint)?;
        self.finish_segment(BuildPoint::Empty { position })
    }

    fn finish_session(
        &mut self,
        session: &mut BuildSession,
        end: &BuildPoint,
    ) -> Result<(), BuilderError> {
        match end {
            BuildPoint::Empty { .. } => {
                // The end position was updated by `update_provisional_end_point`
                self.network
                    .add_segment(session.provisional_segment.segment());
            }
            BuildPoint::Segment {
                segment, point_idx, ..
            } => {
                let point_count = self.point_count(segment.id)?;
                let is_any_endpoint = *point_idx == 0 || point_idx + 1 == point_count;
                if is_any_endpoint {
                    if *segment.road_type == *session.provisional_segment.road_type {
                        self.end_join_same_segments(session, segment, *point_idx)?;
                    } else {
                        self.end_road_type_merge(session, segment, *point_idx)?;
                    }
                } else {
                    self.end_create_crossroad(session, segment, *point_idx)?;
                }
            }
            BuildPoint::Crossroad { crossroad, .. } => {
                self.end_add_new_crossroad_input(session, *crossroad)?;
            }
        }

        if let Some(cx) = session.provisional_crossroad.take() {
            self.commit_crossroad(&cx.adjacencies, Some(cx.midpoint))?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Start cases
    // -----------------------------------------------------------------------

    fn start_fresh_segment(
        &mut self,
        position: Vec3,
        curve_object: String,
        road_type: Arc<RoadType>,
    ) -> ProvisionalSegment {
        let mut spline = Spline::new(curve_object.clone(), position);
        spline.add_point(position, false);
        let id = self.scene.add_spline(spline);
        ProvisionalSegment {
            curve_object,
            spline: id,
            endpoint_idx: 1,
            road_type,
        }
    }

    /// Extend an existing segment of the same road type from one of its ends.
    fn start_followup_segment(
        &mut self,
        segment: &RoadSegment,
        point_idx: usize,
        position: Vec3,
        road_type: Arc<RoadType>,
    ) -> Result<ProvisionalSegment, BuilderError> {
        let spline = self
            .scene
            .spline_mut(segment.id)
            .ok_or(BuilderError::StaleBuildPoint)?;
        let prepend = point_idx == 0;
        spline.add_point(position, prepend);
        // A prepended point becomes index 0
        let endpoint_idx = if prepend { 0 } else { point_idx + 1 };
        Ok(ProvisionalSegment {
            curve_object: segment.curve_object.clone(),
            spline: segment.id,
            endpoint_idx,
            road_type,
        })
    }

    /// Start a connector of another road type at an endpoint. The two meet in
    /// a crossroad once the connector is finished.
    fn start_road_type_merge(
        &mut self,
        segment: &RoadSegment,
        point_idx: usize,
        position: Vec3,
        curve_object: String,
        road_type: Arc<RoadType>,
    ) -> Result<(ProvisionalSegment, ProvisionalCrossroad), BuilderError> {
        let offset = self.crossroad_point_offset();
        let spline = self
            .scene
            .spline_mut(segment.id)
            .ok_or(BuilderError::StaleBuildPoint)?;
        let point_count = spline.len();
        let neighbor_co = spline
            .co(endpoint_neighbor_idx(point_idx))
            .ok_or(BuilderError::StaleBuildPoint)?;
        let start_co = spline.co(point_idx).ok_or(BuilderError::StaleBuildPoint)?;
        let moved = move_point_towards_other_point(start_co, neighbor_co, offset);
        spline.set_co(point_idx, moved);

        // Twice backwards, so the future crossroad lands exactly in the middle
        let connector_start = move_point_towards_other_point(moved, neighbor_co, -2.0 * offset);
        let mut connector = Spline::new(curve_object.clone(), connector_start);
        connector.add_point(position, false);
        let connector_id = self.scene.add_spline(connector);

        let provisional = ProvisionalSegment {
            curve_object,
            spline: connector_id,
            endpoint_idx: 1,
            road_type,
        };
        let cx = self.begin_provisional_cx(
            vec![
                AdjacentSegment::from_point_idx(segment.clone(), point_idx, point_count)?,
                AdjacentSegment::new(provisional.segment(), true),
            ],
            None,
        )?;
        Ok((provisional, cx))
    }

    /// Split a segment at an interior point and start a third road from there.
    fn start_crossroad(
        &mut self,
        segment: &RoadSegment,
        point_idx: usize,
        position: Vec3,
        curve_object: String,
        road_type: Arc<RoadType>,
    ) -> Result<(ProvisionalSegment, ProvisionalCrossroad), BuilderError> {
        let (seg1, seg2) = self.split_segment_at(segment, point_idx)?;

        let mut connector = Spline::new(curve_object.clone(), position);
        connector.add_point(position, false);
        let connector_id = self.scene.add_spline(connector);
        let provisional = ProvisionalSegment {
            curve_object,
            spline: connector_id,
            endpoint_idx: 1,
            road_type,
        };

        let cx = self.begin_provisional_cx(
            vec![
                AdjacentSegment::new(seg1, false),
                AdjacentSegment::new(seg2, true),
                AdjacentSegment::new(provisional.segment(), true),
            ],
            Some(position),
        )?;
        Ok((provisional, cx))
    }

    /// Reopen an existing crossroad to add one more road to it.
    fn start_new_crossroad_input(
        &mut self,
        crossroad: CrossroadId,
        position: Vec3,
        curve_object: String,
        road_type: Arc<RoadType>,
    ) -> Result<(ProvisionalSegment, ProvisionalCrossroad), BuilderError> {
        let cx = self
            .network
            .crossroad(crossroad)
            .cloned()
            .ok_or(BuilderError::StaleBuildPoint)?;
        let mut adjacencies = self.adjacent_segments(&cx)?;

        let mut connector = Spline::new(curve_object.clone(), position);
        connector.add_point(position, false);
        let connector_id = self.scene.add_spline(connector);
        let provisional = ProvisionalSegment {
            curve_object,
            spline: connector_id,
            endpoint_idx: 1,
            road_type,
        };
        adjacencies.push(AdjacentSegment::new(provisional.segment(), true));

        self.network.remove_crossroad(cx.id);
        self.cx_builder.remove_crossroad_object(&mut self.scene, &cx);

        let provisional_cx = self.begin_provisional_cx(adjacencies, Some(cx.position))?;
        Ok((provisional, provisional_cx))
    }

    fn begin_provisional_cx(
        &self,
        adjacencies: Vec<AdjacentSegment>,
        position: Option<Vec3>,
    ) -> Result<ProvisionalCrossroad, BuilderError> {
        let midpoint = match position {
            Some(position) => position,
            None => {
                let mut points = Vec::with_capacity(adjacencies.len());
                for adj in &adjacencies {
                    points.push(adj.adjacent_point(&self.scene)?);
                }
                mean_position(points)
            }
        };
        Ok(ProvisionalCrossroad {
            adjacencies,
            midpoint,
            adj_point: None,
        })
    }

    // -----------------------------------------------------------------------
    // Finish cases
    // -----------------------------------------------------------------------

    fn end_road_type_merge(
        &mut self,
        session: &BuildSession,
        segment: &RoadSegment,
        point_idx: usize,
    ) -> Result<(), BuilderError> {
        let offset = self.crossroad_point_offset();
        let spline = self
            .scene
            .spline_mut(segment.id)
            .ok_or(BuilderError::StaleBuildPoint)?;
        let point_count = spline.len();
        let position = spline.co(point_idx).ok_or(BuilderError::StaleBuildPoint)?;
        let neighbor_co = spline
            .co(endpoint_neighbor_idx(point_idx))
            .ok_or(BuilderError::StaleBuildPoint)?;
        spline.set_co(
            point_idx,
            move_point_towards_other_point(position, neighbor_co, offset),
        );

        let provisional = &session.provisional_segment;
        let provisional_count = self.pull_in_endpoint(provisional.spline, provisional.endpoint_idx)?;

        self.commit_crossroad(
            &[
                AdjacentSegment::from_point_idx(segment.clone(), point_idx, point_count)?,
                AdjacentSegment::from_point_idx(
                    provisional.segment(),
                    provisional.endpoint_idx,
                    provisional_count,
                )?,
            ],
            Some(position),
        )?;
        Ok(())
    }

    fn end_create_crossroad(
        &mut self,
        session: &mut BuildSession,
        segment: &RoadSegment,
        point_idx: usize,
    ) -> Result<(), BuilderError> {
        let (seg1, seg2) = self.split_segment_at(segment, point_idx)?;

        // A provisional crossroad at either end of the split segment moves to
        // the matching half
        if let Some(cx) = &mut session.provisional_crossroad {
            for adj in cx.adjacencies.iter_mut() {
                if adj.segment.id != segment.id {
                    continue;
                }
                *adj = if adj.is_first_point {
                    AdjacentSegment::new(seg1.clone(), true)
                } else {
                    AdjacentSegment::new(seg2.clone(), false)
                };
            }
        }

        let provisional = &session.provisional_segment;
        let provisional_count = self.pull_in_endpoint(provisional.spline, provisional.endpoint_idx)?;

        self.commit_crossroad(
            &[
                AdjacentSegment::new(seg1, false),
                AdjacentSegment::new(seg2, true),
                AdjacentSegment::from_point_idx(
                    provisional.segment(),
                    provisional.endpoint_idx,
                    provisional_count,
                )?,
            ],
            None,
        )?;
        Ok(())
    }

    fn end_add_new_crossroad_input(
        &mut self,
        session: &BuildSession,
        crossroad: CrossroadId,
    ) -> Result<(), BuilderError> {
        let cx = self
            .network
            .crossroad(crossroad)
            .cloned()
            .ok_or(BuilderError::StaleBuildPoint)?;
        let mut adjacencies = self.adjacent_segments(&cx)?;

        let provisional = &session.provisional_segment;
        let provisional_count = self.pull_in_endpoint(provisional.spline, provisional.endpoint_idx)?;
        adjacencies.push(AdjacentSegment::from_point_idx(
            provisional.segment(),
            provisional.endpoint_idx,
            provisional_count,
        )?);

        self.network.remove_crossroad(cx.id);
        if let Err(e) = self.commit_crossroad(&adjacencies, Some(cx.position)) {
            // Keep the old crossroad registered, its object is still in the scene
            if let Err(restore) = self.network.add_crossroad(cx) {
                error!("Failed to restore crossroad: {restore}");
            }
            return Err(e);
        }
        self.cx_builder.remove_crossroad_object(&mut self.scene, &cx);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn validate_build_point(&self, point: &BuildPoint) -> Result<(), BuilderError> {
        match point {
            BuildPoint::Empty { .. } => Ok(()),
            BuildPoint::Segment {
                segment, point_idx, ..
            } => {
                let point_count = self.point_count(segment.id)?;
                if *point_idx < point_count {
                    Ok(())
                } else {
                    Err(BuilderError::StaleBuildPoint)
                }
            }
            BuildPoint::Crossroad { crossroad, .. } => {
                if self.network.crossroad(*crossroad).is_some() {
                    Ok(())
                } else {
                    Err(BuilderError::StaleBuildPoint)
                }
            }
        }
    }

    fn point_count(&self, spline: SplineId) -> Result<usize, BuilderError> {
        self.scene
            .spline(spline)
            .map(Spline::len)
            .ok_or(BuilderError::StaleBuildPoint)
    }

    /// Pull endpoint `idx` of `spline` towards its neighbour by the crossroad
    /// offset. Returns the spline's point count.
    fn pull_in_endpoint(&mut self, spline: SplineId, idx: usize) -> Result<usize, BuilderError> {
        let offset = self.crossroad_point_offset();
        let spline = self
            .scene
            .spline_mut(spline)
            .ok_or(BuilderError::StaleBuildPoint)?;
        let co = spline.co(idx).ok_or(BuilderError::StaleBuildPoint)?;
        let neighbor_co = spline
            .co(endpoint_neighbor_idx(idx))
            .ok_or(BuilderError::StaleBuildPoint)?;
        spline.set_co(idx, move_point_towards_other_point(co, neighbor_co, offset));
        Ok(spline.len())
    }

    /// Split `segment` at interior point `point_idx` and pull both new ends
    /// away from the split point. Returns the head and the tail.
    fn split_segment_at(
        &mut self,
        segment: &RoadSegment,
        point_idx: usize,
    ) -> Result<(RoadSegment, RoadSegment), BuilderError> {
        let original = self
            .scene
            .spline(segment.id)
            .cloned()
            .ok_or(BuilderError::StaleBuildPoint)?;
        let (head, tail) = original.split(point_idx);
        let head_last = head.last_idx();
        let head_id = self.scene.add_spline(head);
        let tail_id = self.scene.add_spline(tail);

        let seg1 = RoadSegment::new(head_id, segment.curve_object.clone(), segment.road_type.clone());
        let seg2 = RoadSegment::new(tail_id, segment.curve_object.clone(), segment.road_type.clone());
        self.network
            .split_segment(segment.id, seg1.clone(), seg2.clone())?;

        self.pull_in_endpoint(head_id, head_last)?;
        self.pull_in_endpoint(tail_id, 0)?;

        // Drop the original only after the network stopped referencing it
        self.scene.remove_spline(segment.id);
        Ok((seg1, seg2))
    }

    /// Segment ends of `cx`, resolved against the registered segments.
    fn adjacent_segments(&self, cx: &Crossroad) -> Result<Vec<AdjacentSegment>, BuilderError> {
        cx.adjacencies
            .iter()
            .map(|adj| {
                self.network
                    .segment(adj.segment)
                    .cloned()
                    .map(|segment| AdjacentSegment::new(segment, adj.is_first_point))
                    .ok_or(BuilderError::StaleBuildPoint)
            })
            .collect()
    }

    /// Build a crossroad and register it together with its segments.
    fn commit_crossroad(
        &mut self,
        adjacencies: &[AdjacentSegment],
        position: Option<Vec3>,
    ) -> Result<CrossroadId, BuilderError> {
        let cx = self.cx_builder.build_crossroad(
            &mut self.scene,
            &mut self.network,
            &self.settings.crossroad,
            adjacencies,
            position,
        )?;
        let id = cx.id;
        let object = cx.object.clone();
        let segments = adjacencies.iter().map(|adj| adj.segment.clone());
        if let Err(e) = self.network.add_crossroad_with_segments(cx, segments) {
            self.scene.remove_object(&object);
            return Err(e.into());
        }
        Ok(id)
    }
}
