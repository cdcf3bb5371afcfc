use crate::crossroad_builder::AdjacentSegment;
use crate::error::BuilderError;
use crate::road_network::{RoadSegment, SegmentAdjacency};
use crate::spline::{Spline, SplineId};

use super::{BuildSession, RoadBuilder};

/// How two splines meeting at their ends are merged into one.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct JoinPlan {
    pub first: SplineId,
    pub second: SplineId,
    pub reverse: bool,
    pub prepend: bool,
    /// Free ends of the joined splines and whether each one becomes the
    /// first point of the new spline.
    pub end_mapping: [(SegmentAdjacency, bool); 2],
}

/// Plan joining the provisional spline `s1`, whose point `s1_idx` is being
/// dragged, to an end of `s2`.
pub(super) fn plan_join(
    s1: SplineId,
    s1_idx: usize,
    s1_len: usize,
    s2: SplineId,
    s2_is_end: bool,
) -> Result<JoinPlan, BuilderError> {
    if s1 == s2 {
        return Err(BuilderError::JoinSameSpline);
    }
    let s1_is_end = s1_idx + 1 == s1_len;

    let (first, second, reverse, prepend) = match (s1_is_end, s2_is_end) {
        (true, true) => (s1, s2, true, false),
        (false, true) => (s2, s1, false, false),
        (true, false) => (s1, s2, false, false),
        (false, false) => (s1, s2, true, true),
    };

    // The free end is the one opposite to the joint
    let s1_free = SegmentAdjacency::new(s1, s1_is_end);
    let s2_free = SegmentAdjacency::new(s2, s2_is_end);
    Ok(JoinPlan {
        first,
        second,
        reverse,
        prepend,
        end_mapping: [(s1_free, s1_is_end), (s2_free, !s1_is_end)],
    })
}

impl RoadBuilder {
    /// Merge the provisional segment with the same-typed `segment` it
    /// finishes on. Crossroads at the free ends of both move to the result.
    pub(super) fn end_join_same_segments(
        &mut self,
        session: &mut BuildSession,
        segment: &RoadSegment,
        point_idx: usize,
    ) -> Result<(), BuilderError> {
        let provisional = session.provisional_segment.clone();
        let s1_len = self.point_count(provisional.spline)?;
        let plan = plan_join(
            provisional.spline,
            provisional.endpoint_idx,
            s1_len,
            segment.id,
            point_idx != 0,
        )?;

        let first = self
            .scene
            .spline(plan.first)
            .ok_or(BuilderError::StaleBuildPoint)?;
        let second = self
            .scene
            .spline(plan.second)
            .ok_or(BuilderError::StaleBuildPoint)?;
        let joined = Spline::join(
            provisional.curve_object.clone(),
            first,
            second,
            plan.reverse,
            plan.prepend,
        );
        let new_id = self.scene.add_spline(joined);
        let new_segment = RoadSegment::new(
            new_id,
            provisional.curve_object.clone(),
            provisional.road_type.clone(),
        );
        self.network.add_segment(new_segment.clone());

        // Both free ends can sit on one crossroad when the join closes a loop
        for (old, is_first_point) in plan.end_mapping {
            let new = SegmentAdjacency::new(new_id, is_first_point);
            self.network.repoint_adjacency(old, new)?;
            if let Some(cx) = &mut session.provisional_crossroad {
                for adj in cx.adjacencies.iter_mut() {
                    if adj.adjacency() == old {
                        *adj = AdjacentSegment::new(new_segment.clone(), is_first_point);
                    }
                }
            }
        }

        for id in [provisional.spline, segment.id] {
            self.network.remove_segment(id);
            self.scene.remove_spline(id);
        }
        Ok(())
    }
}
