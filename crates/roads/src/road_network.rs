//! Graph of road segments and the crossroads joining their endpoints.
//!
//! The network only tracks connectivity. Geometry lives in the [`RoadScene`]
//! and junction meshes are described by the crossroad builder.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use bevy::prelude::*;

use crate::error::RoadNetworkError;
use crate::road_type::RoadType;
use crate::scene::RoadScene;
use crate::spline::SplineId;

/// A segment is identified by the spline it draws.
pub type SegmentId = SplineId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CrossroadId(pub u32);

impl fmt::Display for CrossroadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One spline of a road curve object, with the road type it is built as.
#[derive(Debug, Clone)]
pub struct RoadSegment {
    pub id: SegmentId,
    pub curve_object: String,
    pub road_type: Arc<RoadType>,
}

impl RoadSegment {
    pub fn new(id: SegmentId, curve_object: impl Into<String>, road_type: Arc<RoadType>) -> Self {
        Self {
            id,
            curve_object: curve_object.into(),
            road_type,
        }
    }

    /// True when the spline this segment points at was removed from the scene.
    pub fn is_corrupted(&self, scene: &RoadScene) -> bool {
        scene.spline(self.id).is_none()
    }
}

impl PartialEq for RoadSegment {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RoadSegment {}

impl std::hash::Hash for RoadSegment {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for RoadSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.splines[{}]; {}", self.curve_object, self.id.0, self.road_type.name)
    }
}

/// Endpoint of a segment that touches a crossroad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentAdjacency {
    pub segment: SegmentId,
    pub is_first_point: bool,
}

impl SegmentAdjacency {
    pub fn new(segment: SegmentId, is_first_point: bool) -> Self {
        Self {
            segment,
            is_first_point,
        }
    }

    /// Adjacency of point `point_idx` of a spline with `point_count` points.
    pub fn from_point_idx(
        segment: SegmentId,
        point_idx: usize,
        point_count: usize,
    ) -> Result<Self, RoadNetworkError> {
        let last_idx = point_count.saturating_sub(1);
        if point_idx != 0 && point_idx != last_idx {
            return Err(RoadNetworkError::NotAnEndpoint {
                segment,
                point_idx,
                point_count,
            });
        }
        Ok(Self::new(segment, point_idx == 0))
    }

    /// Index of the adjacent point on a spline with `point_count` points.
    pub fn point_idx(&self, point_count: usize) -> usize {
        if self.is_first_point {
            0
        } else {
            point_count.saturating_sub(1)
        }
    }

    pub fn adjacent_point(&self, scene: &RoadScene) -> Option<Vec3> {
        let spline = scene.spline(self.segment)?;
        if self.is_first_point {
            spline.first_co()
        } else {
            spline.last_co()
        }
    }
}

impl fmt::Display for SegmentAdjacency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = if self.is_first_point { "first" } else { "last" };
        write!(f, "{}:{end}", self.segment.0)
    }
}

/// Junction of two or more segment endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Crossroad {
    pub id: CrossroadId,
    pub collection: String,
    /// Root mesh object carrying the junction modifier stack
    pub object: String,
    pub adjacencies: BTreeSet<SegmentAdjacency>,
    pub position: Vec3,
    /// Largest distance from `position` to an adjacent endpoint at creation.
    pub radius: f32,
}

impl Crossroad {
    pub fn new(
        id: CrossroadId,
        collection: impl Into<String>,
        object: impl Into<String>,
        adjacencies: impl IntoIterator<Item = SegmentAdjacency>,
        position: Vec3,
        scene: &RoadScene,
    ) -> Result<Self, RoadNetworkError> {
        let adjacencies: BTreeSet<SegmentAdjacency> = adjacencies.into_iter().collect();
        if adjacencies.len() < 2 {
            return Err(RoadNetworkError::TooFewAdjacencies {
                found: adjacencies.len(),
            });
        }

        let mut radius = 0.0_f32;
        for adj in &adjacencies {
            let point = adj
                .adjacent_point(scene)
                .ok_or(RoadNetworkError::StaleSegment(adj.segment))?;
            radius = radius.max(position.distance(point));
        }

        Ok(Self {
            id,
            collection: collection.into(),
            object: object.into(),
            adjacencies,
            position,
            radius,
        })
    }
}

impl fmt::Display for Crossroad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}, {}; [", self.id, self.collection, self.position)?;
        for (i, adj) in self.adjacencies.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{adj}")?;
        }
        write!(f, "]")
    }
}

/// Connectivity state of the roads in a scene.
///
/// Every adjacency of every crossroad is present in the endpoint index and
/// maps back to that crossroad. An endpoint belongs to at most one crossroad.
#[derive(Debug, Clone, Default)]
pub struct RoadNetwork {
    segments: BTreeMap<SegmentId, RoadSegment>,
    crossroads: BTreeMap<CrossroadId, Crossroad>,
    endpoint_cx_map: BTreeMap<SegmentAdjacency, CrossroadId>,
    next_crossroad_id: u32,
}

impl RoadNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_segment(&mut self, segment: RoadSegment) {
        self.segments.entry(segment.id).or_insert(segment);
    }

    /// Register `crossroad` and index its adjacencies.
    ///
    /// Fails without changing the network when an adjacency already belongs
    /// to another crossroad or points at a segment the network does not know.
    /// Use [`Self::add_crossroad_with_segments`] to register both at once.
    pub fn add_crossroad(&mut self, crossroad: Crossroad) -> Result<(), RoadNetworkError> {
        if crossroad.adjacencies.len() < 2 {
            return Err(RoadNetworkError::TooFewAdjacencies {
                found: crossroad.adjacencies.len(),
            });
        }
        for adj in &crossroad.adjacencies {
            if !self.segments.contains_key(&adj.segment) {
                return Err(RoadNetworkError::UnknownSegment(adj.segment));
            }
            if let Some(&owner) = self.endpoint_cx_map.get(adj) {
                if owner != crossroad.id {
                    return Err(RoadNetworkError::AdjacencyClaimed {
                        adjacency: *adj,
                        owner,
                    });
                }
            }
        }

        // Re-adding replaces the old entry, drop its index first
        if let Some(old) = self.crossroads.remove(&crossroad.id) {
            for adj in &old.adjacencies {
                self.endpoint_cx_map.remove(adj);
            }
        }

        debug!("Adding crossroad {crossroad}");
        for adj in &crossroad.adjacencies {
            self.endpoint_cx_map.insert(*adj, crossroad.id);
        }
        self.observe_crossroad_id(crossroad.id);
        self.crossroads.insert(crossroad.id, crossroad);
        Ok(())
    }

    /// Add `crossroad` together with the segments its adjacencies point at.
    pub fn add_crossroad_with_segments(
        &mut self,
        crossroad: Crossroad,
        segments: impl IntoIterator<Item = RoadSegment>,
    ) -> Result<(), RoadNetworkError> {
        let mut added = Vec::new();
        for segment in segments {
            if !self.segments.contains_key(&segment.id) {
                added.push(segment.id);
                self.segments.insert(segment.id, segment);
            }
        }
        if let Err(e) = self.add_crossroad(crossroad) {
            for id in added {
                self.segments.remove(&id);
            }
            return Err(e);
        }
        Ok(())
    }

    pub fn remove_crossroad(&mut self, id: CrossroadId) -> Option<Crossroad> {
        let crossroad = self.crossroads.remove(&id)?;
        for adj in &crossroad.adjacencies {
            if self.endpoint_cx_map.get(adj) == Some(&id) {
                self.endpoint_cx_map.remove(adj);
            }
        }
        debug!("Removed crossroad {}", crossroad.id);
        Some(crossroad)
    }

    /// Crossroads at the first and the last point of `segment`.
    pub fn get_endpoints_connections(
        &self,
        segment: SegmentId,
    ) -> (Option<CrossroadId>, Option<CrossroadId>) {
        (
            self.crossroad_of(SegmentAdjacency::new(segment, true)),
            self.crossroad_of(SegmentAdjacency::new(segment, false)),
        )
    }

    /// Remove `segment` and detach it from the crossroads at its ends.
    ///
    /// A crossroad can be left with fewer than two adjacencies, the caller is
    /// expected to rebuild or remove it.
    pub fn remove_segment(&mut self, segment: SegmentId) -> Option<RoadSegment> {
        let removed = self.segments.remove(&segment);
        for is_first_point in [true, false] {
            let adj = SegmentAdjacency::new(segment, is_first_point);
            let Some(cx_id) = self.endpoint_cx_map.remove(&adj) else {
                continue;
            };
            if let Some(cx) = self.crossroads.get_mut(&cx_id) {
                cx.adjacencies.remove(&adj);
                if cx.adjacencies.len() < 2 {
                    debug!(
                        "Crossroad {} left with {} adjacencies after removing segment {}",
                        cx_id,
                        cx.adjacencies.len(),
                        segment.0
                    );
                }
            }
        }
        removed
    }

    /// Replace `original` with `new`, moving its crossroad connections.
    ///
    /// With `reverse` the first point of `original` corresponds to the last
    /// point of `new` and vice versa.
    pub fn replace_segment(
        &mut self,
        original: SegmentId,
        new: RoadSegment,
        reverse: bool,
    ) -> Result<(), RoadNetworkError> {
        debug!("Replacing segment {} with {new}, reverse: {reverse}", original.0);
        let (start_cx, end_cx) = self.get_endpoints_connections(original);
        if let Some(cx) = start_cx {
            self.replace_crossroad_adjacency(
                cx,
                SegmentAdjacency::new(original, true),
                SegmentAdjacency::new(new.id, !reverse),
            )?;
        }
        if let Some(cx) = end_cx {
            self.replace_crossroad_adjacency(
                cx,
                SegmentAdjacency::new(original, false),
                SegmentAdjacency::new(new.id, reverse),
            )?;
        }

        self.remove_segment(original);
        self.add_segment(new);
        Ok(())
    }

    /// Replace `original` with `head` and `tail`: the crossroad at its start
    /// moves to the start of `head`, the one at its end to the end of `tail`.
    pub fn split_segment(
        &mut self,
        original: SegmentId,
        head: RoadSegment,
        tail: RoadSegment,
    ) -> Result<(), RoadNetworkError> {
        debug!("Splitting segment {} to {head} and {tail}", original.0);
        let (start_cx, end_cx) = self.get_endpoints_connections(original);
        if let Some(cx) = start_cx {
            self.replace_crossroad_adjacency(
                cx,
                SegmentAdjacency::new(original, true),
                SegmentAdjacency::new(head.id, true),
            )?;
        }
        if let Some(cx) = end_cx {
            self.replace_crossroad_adjacency(
                cx,
                SegmentAdjacency::new(original, false),
                SegmentAdjacency::new(tail.id, false),
            )?;
        }

        self.remove_segment(original);
        self.add_segment(head);
        self.add_segment(tail);
        Ok(())
    }

    pub fn add_adjacency(
        &mut self,
        cx: CrossroadId,
        adj: SegmentAdjacency,
    ) -> Result<(), RoadNetworkError> {
        if !self.segments.contains_key(&adj.segment) {
            return Err(RoadNetworkError::UnknownSegment(adj.segment));
        }
        if let Some(&owner) = self.endpoint_cx_map.get(&adj) {
            if owner != cx {
                return Err(RoadNetworkError::AdjacencyClaimed {
                    adjacency: adj,
                    owner,
                });
            }
        }
        let crossroad = self
            .crossroads
            .get_mut(&cx)
            .ok_or(RoadNetworkError::UnknownCrossroad(cx))?;
        crossroad.adjacencies.insert(adj);
        self.endpoint_cx_map.insert(adj, cx);
        Ok(())
    }

    /// Whether point `point_idx` of `segment` is an endpoint connected to a crossroad.
    pub fn is_crossroad_endpoint(
        &self,
        segment: SegmentId,
        point_idx: usize,
        point_count: usize,
    ) -> bool {
        let last_idx = point_count.saturating_sub(1);
        if point_idx == 0
            && self
                .endpoint_cx_map
                .contains_key(&SegmentAdjacency::new(segment, true))
        {
            return true;
        }
        point_idx == last_idx
            && self
                .endpoint_cx_map
                .contains_key(&SegmentAdjacency::new(segment, false))
    }

    /// Move the crossroad connection of `old` to `new`, if `old` has one.
    pub fn repoint_adjacency(
        &mut self,
        old: SegmentAdjacency,
        new: SegmentAdjacency,
    ) -> Result<Option<CrossroadId>, RoadNetworkError> {
        let Some(cx) = self.crossroad_of(old) else {
            return Ok(None);
        };
        if let Some(owner) = self.crossroad_of(new) {
            if owner != cx {
                return Err(RoadNetworkError::AdjacencyClaimed {
                    adjacency: new,
                    owner,
                });
            }
        }
        self.replace_crossroad_adjacency(cx, old, new)?;
        Ok(Some(cx))
    }

    fn replace_crossroad_adjacency(
        &mut self,
        cx: CrossroadId,
        removed: SegmentAdjacency,
        new: SegmentAdjacency,
    ) -> Result<(), RoadNetworkError> {
        if self.endpoint_cx_map.get(&removed) != Some(&cx) {
            return Err(RoadNetworkError::UnmappedAdjacency(removed));
        }
        let crossroad = self
            .crossroads
            .get_mut(&cx)
            .ok_or(RoadNetworkError::UnknownCrossroad(cx))?;
        crossroad.adjacencies.remove(&removed);
        crossroad.adjacencies.insert(new);
        self.endpoint_cx_map.remove(&removed);
        self.endpoint_cx_map.insert(new, cx);
        Ok(())
    }

    pub fn segments(&self) -> impl Iterator<Item = &RoadSegment> {
        self.segments.values()
    }

    pub fn crossroads(&self) -> impl Iterator<Item = &Crossroad> {
        self.crossroads.values()
    }

    pub fn segment(&self, id: SegmentId) -> Option<&RoadSegment> {
        self.segments.get(&id)
    }

    pub fn contains_segment(&self, id: SegmentId) -> bool {
        self.segments.contains_key(&id)
    }

    pub fn crossroad(&self, id: CrossroadId) -> Option<&Crossroad> {
        self.crossroads.get(&id)
    }

    pub fn crossroad_of(&self, adj: SegmentAdjacency) -> Option<CrossroadId> {
        self.endpoint_cx_map.get(&adj).copied()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn crossroad_count(&self) -> usize {
        self.crossroads.len()
    }

    /// Next unused crossroad id.
    ///
    /// Ids held by registered crossroads are skipped, so a counter that has
    /// wrapped past `u32::MAX` still never hands out a live id.
    pub fn allocate_crossroad_id(&mut self) -> CrossroadId {
        let mut id = self.next_crossroad_id;
        while self.crossroads.contains_key(&CrossroadId(id)) {
            id = id.wrapping_add(1);
        }
        self.next_crossroad_id = id.wrapping_add(1);
        CrossroadId(id)
    }

    /// Keep the id counter above `id`, used when crossroads are loaded.
    pub fn observe_crossroad_id(&mut self, id: CrossroadId) {
        self.next_crossroad_id = self.next_crossroad_id.max(id.0.saturating_add(1));
    }

    pub fn clear(&mut self) {
        self.segments.clear();
        self.crossroads.clear();
        self.endpoint_cx_map.clear();
    }

    /// Violations of the network invariants, empty for a consistent network.
    pub fn check_consistency(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for cx in self.crossroads.values() {
            if cx.adjacencies.len() < 2 {
                problems.push(format!(
                    "crossroad {} has {} adjacencies",
                    cx.id,
                    cx.adjacencies.len()
                ));
            }
            for adj in &cx.adjacencies {
                match self.endpoint_cx_map.get(adj) {
                    Some(owner) if *owner == cx.id => {}
                    Some(owner) => problems.push(format!(
                        "adjacency {adj} of crossroad {} is indexed to crossroad {owner}",
                        cx.id
                    )),
                    None => problems.push(format!(
                        "adjacency {adj} of crossroad {} is not indexed",
                        cx.id
                    )),
                }
                if !self.segments.contains_key(&adj.segment) {
                    problems.push(format!(
                        "adjacency {adj} of crossroad {} references an unknown segment",
                        cx.id
                    ));
                }
            }
        }
        for (adj, owner) in &self.endpoint_cx_map {
            let listed = self
                .crossroads
                .get(owner)
                .is_some_and(|cx| cx.adjacencies.contains(adj));
            if !listed {
                problems.push(format!(
                    "index entry {adj} -> {owner} has no matching crossroad adjacency"
                ));
            }
        }
        problems
    }
}
