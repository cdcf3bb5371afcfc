//! Splitting a segment and joining the halves again gives back the original
//! spline, and crossroads follow the half that owns their end.

use std::sync::Arc;

use bevy::prelude::*;

use crate::road_network::{Crossroad, RoadNetwork, RoadSegment, SegmentAdjacency};
use crate::road_type::test_types::city_road;
use crate::road_type::RoadType;
use crate::scene::RoadScene;
use crate::spline::Spline;
use crate::test_harness::TestRoads;

const EPS: f32 = 1e-4;

fn assert_points_near(actual: &[Vec3], expected: &[Vec3]) {
    assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert!(a.distance(*e) < EPS, "{actual:?} vs {expected:?}");
    }
}

fn co(spline: &Spline) -> Vec<Vec3> {
    spline.points.iter().map(|p| p.co).collect()
}

struct Graph {
    scene: RoadScene,
    network: RoadNetwork,
    road_type: Arc<RoadType>,
}

impl Graph {
    fn new() -> Self {
        Self {
            scene: RoadScene::new(),
            network: RoadNetwork::new(),
            road_type: Arc::new(city_road("tq_City")),
        }
    }

    fn add(&mut self, spline: Spline) -> RoadSegment {
        let id = self.scene.add_spline(spline);
        let segment = RoadSegment::new(id, "tq_City", self.road_type.clone());
        self.network.add_segment(segment.clone());
        segment
    }

    fn road(&mut self, points: &[Vec3]) -> RoadSegment {
        let mut spline = Spline::new("tq_City", points[0]);
        for p in &points[1..] {
            spline.add_point(*p, false);
        }
        self.add(spline)
    }

    fn crossroad(&mut self, adjacencies: [SegmentAdjacency; 2], position: Vec3) -> Crossroad {
        let id = self.network.allocate_crossroad_id();
        let cx = Crossroad::new(id, "cx", "cx", adjacencies, position, &self.scene).unwrap();
        self.network.add_crossroad(cx.clone()).unwrap();
        cx
    }
}

#[test]
fn test_split_then_join_restores_spline_and_connections() {
    let mut g = Graph::new();
    let original_points = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(50.0, 10.0, 0.0),
        Vec3::new(100.0, 0.0, 1.0),
        Vec3::new(150.0, -20.0, 0.0),
        Vec3::new(200.0, 0.0, 0.0),
    ];
    let road = g.road(&original_points);
    let west = g.road(&[Vec3::new(-10.0, 0.0, 0.0), Vec3::new(-100.0, 0.0, 0.0)]);
    let east = g.road(&[Vec3::new(210.0, 0.0, 0.0), Vec3::new(300.0, 0.0, 0.0)]);
    let start_cx = g.crossroad(
        [SegmentAdjacency::new(road.id, true), SegmentAdjacency::new(west.id, true)],
        Vec3::new(-5.0, 0.0, 0.0),
    );
    let end_cx = g.crossroad(
        [SegmentAdjacency::new(road.id, false), SegmentAdjacency::new(east.id, true)],
        Vec3::new(205.0, 0.0, 0.0),
    );

    for split_idx in 1..original_points.len() - 1 {
        let original = g.scene.spline(road.id).unwrap().clone();
        let (head_spline, tail_spline) = original.split(split_idx);
        assert_eq!(head_spline.len() + tail_spline.len(), original.len() + 1);

        let mut split = Graph {
            scene: g.scene.clone(),
            network: g.network.clone(),
            road_type: g.road_type.clone(),
        };
        let head = split.add(head_spline.clone());
        let tail = split.add(tail_spline.clone());
        split
            .network
            .split_segment(road.id, head.clone(), tail.clone())
            .unwrap();
        split.scene.remove_spline(road.id);
        assert!(split.network.check_consistency().is_empty());
        assert_eq!(
            split.network.crossroad_of(SegmentAdjacency::new(head.id, true)),
            Some(start_cx.id)
        );
        assert_eq!(
            split.network.crossroad_of(SegmentAdjacency::new(tail.id, false)),
            Some(end_cx.id)
        );

        let joined = Spline::join("tq_City", &head_spline, &tail_spline, false, false);
        assert_points_near(&co(&joined), &co(&original));

        let joined = split.add(joined);
        split
            .network
            .repoint_adjacency(
                SegmentAdjacency::new(head.id, true),
                SegmentAdjacency::new(joined.id, true),
            )
            .unwrap();
        split
            .network
            .repoint_adjacency(
                SegmentAdjacency::new(tail.id, false),
                SegmentAdjacency::new(joined.id, false),
            )
            .unwrap();
        split.network.remove_segment(head.id);
        split.network.remove_segment(tail.id);

        assert!(split.network.check_consistency().is_empty());
        assert_eq!(split.network.segment_count(), 3);
        assert_eq!(
            split.network.get_endpoints_connections(joined.id),
            (Some(start_cx.id), Some(end_cx.id))
        );
    }
}

#[test]
fn test_reversed_join_restores_spline() {
    let points: Vec<Vec3> = (0..6)
        .map(|i| Vec3::new(i as f32 * 20.0, (i * i) as f32, 0.0))
        .collect();
    let mut spline = Spline::new("tq_City", points[0]);
    for p in &points[1..] {
        spline.add_point(*p, false);
    }

    let (head, tail) = spline.split(3);
    let mut reversed_tail = tail.clone();
    reversed_tail.points.reverse();
    let joined = Spline::join("tq_City", &head, &reversed_tail, true, false);
    assert_points_near(&co(&joined), &points);
}

#[test]
fn test_interior_split_moves_far_crossroad_to_tail() {
    let mut roads = TestRoads::new().started();
    roads.draw((0.0, 0.0), (100.0, 0.0));
    roads.draw((100.0, 0.0), (200.0, 0.0));

    // Avenue merge at the east end, then a city T-junction in the middle
    roads.press_key(KeyCode::KeyQ);
    roads.draw((200.0, 0.0), (300.0, 0.0));
    roads.press_key(KeyCode::KeyQ);
    roads.draw((100.0, 0.0), (100.0, 100.0));

    roads.assert_counts(4, 2);
    roads.assert_network_consistent();

    let tail = roads
        .segments()
        .into_iter()
        .find(|s| roads.points(s).first() == Some(&Vec3::new(115.0, 0.0, 0.0)))
        .expect("tail of the split road");
    assert_points_near(
        &roads.points(&tail),
        &[Vec3::new(115.0, 0.0, 0.0), Vec3::new(185.0, 0.0, 0.0)],
    );
    let merge = roads
        .crossroads()
        .into_iter()
        .find(|cx| cx.adjacencies.len() == 2)
        .expect("road type merge crossroad");
    assert!(merge
        .adjacencies
        .contains(&SegmentAdjacency::new(tail.id, false)));
}
