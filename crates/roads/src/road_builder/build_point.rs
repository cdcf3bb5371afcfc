use std::fmt;
use std::sync::Arc;

use bevy::prelude::*;

use crate::crossroad_builder::AdjacentSegment;
use crate::road_network::{CrossroadId, RoadSegment};
use crate::road_type::RoadType;
use crate::spline::SplineId;

/// Location where a segment can start or finish.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildPoint {
    /// Free position without anything built there.
    Empty { position: Vec3 },
    /// Bezier point `point_idx` of an existing segment's spline.
    Segment {
        segment: RoadSegment,
        point_idx: usize,
        /// Point count of the spline when the build point was taken.
        point_count: usize,
        position: Vec3,
    },
    /// An existing crossroad.
    Crossroad { crossroad: CrossroadId, position: Vec3 },
}

impl BuildPoint {
    pub fn empty(position: Vec3) -> Self {
        BuildPoint::Empty { position }
    }

    pub fn position(&self) -> Vec3 {
        match self {
            BuildPoint::Empty { position }
            | BuildPoint::Segment { position, .. }
            | BuildPoint::Crossroad { position, .. } => *position,
        }
    }

    /// Segment the point lies on, if any.
    pub fn segment(&self) -> Option<&RoadSegment> {
        match self {
            BuildPoint::Segment { segment, .. } => Some(segment),
            _ => None,
        }
    }

    pub fn is_any_endpoint(&self) -> bool {
        match self {
            BuildPoint::Segment {
                point_idx,
                point_count,
                ..
            } => *point_idx == 0 || *point_idx + 1 == *point_count,
            _ => false,
        }
    }

    pub fn is_start_endpoint(&self) -> bool {
        matches!(self, BuildPoint::Segment { point_idx: 0, .. })
    }
}

impl fmt::Display for BuildPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildPoint::Empty { position } => write!(f, "Empty at {position}"),
            BuildPoint::Segment {
                segment,
                point_idx,
                position,
                ..
            } => write!(f, "Segment {segment} point {point_idx} at {position}"),
            BuildPoint::Crossroad {
                crossroad,
                position,
            } => write!(f, "Crossroad {crossroad} at {position}"),
        }
    }
}

/// Segment being drawn, its final end position is not decided yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionalSegment {
    pub curve_object: String,
    pub spline: SplineId,
    /// Index of the point following the mouse.
    pub endpoint_idx: usize,
    pub road_type: Arc<RoadType>,
}

impl ProvisionalSegment {
    pub fn segment(&self) -> RoadSegment {
        RoadSegment::new(self.spline, self.curve_object.clone(), self.road_type.clone())
    }
}

/// Crossroad whose geometry is built once the segment being drawn is finished.
///
/// Used when a segment is split or a crossroad is opened for a new input: the
/// outgoing road is not known until the user decides where it goes.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionalCrossroad {
    pub adjacencies: Vec<AdjacentSegment>,
    pub midpoint: Vec3,
    /// Start of the outgoing road, placed towards the mouse.
    pub adj_point: Option<Vec3>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildSession {
    pub start_point: BuildPoint,
    pub provisional_segment: ProvisionalSegment,
    pub provisional_crossroad: Option<ProvisionalCrossroad>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum BuilderState {
    #[default]
    Idle,
    Building(BuildSession),
}

impl BuilderState {
    pub fn is_building(&self) -> bool {
        matches!(self, BuilderState::Building(_))
    }

    pub fn session(&self) -> Option<&BuildSession> {
        match self {
            BuilderState::Building(session) => Some(session),
            BuilderState::Idle => None,
        }
    }
}
