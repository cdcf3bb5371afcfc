//! Crossroad descriptors do not depend on the order adjacencies are given in:
//! the counter-clockwise sort is stable under permutation, and outer profile
//! compatibility is symmetric.

use std::sync::Arc;

use bevy::prelude::*;

use crate::config::{crossroad_nodegroup, ROAD_COLLECTION_NAME};
use crate::crossroad_builder::{sort_adjacencies_ccw, AdjacentSegment, CrossroadBuilder};
use crate::modifier::InputValue;
use crate::road_network::{RoadNetwork, RoadSegment};
use crate::road_type::test_types::{avenue, city_road, road_type, Layer};
use crate::road_type::RoadType;
use crate::scene::RoadScene;
use crate::settings::CrossroadSettings;
use crate::spline::Spline;

fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut result = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let first = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, first.clone());
            result.push(tail);
        }
    }
    result
}

/// Rotate `cycle` so it starts at its smallest element.
fn canonical<T: Ord + Clone>(cycle: &[T]) -> Vec<T> {
    let Some(start) = (0..cycle.len()).min_by_key(|&i| &cycle[i]) else {
        return Vec::new();
    };
    cycle[start..].iter().chain(&cycle[..start]).cloned().collect()
}

/// Roads ending around (50, 50) in uneven directions, one per road type.
fn junction(scene: &mut RoadScene, types: &[Arc<RoadType>]) -> Vec<AdjacentSegment> {
    let center = Vec3::new(50.0, 50.0, 0.0);
    let angles = [0.3_f32, 1.9, 2.6, 4.4, 5.5];
    types
        .iter()
        .zip(angles)
        .map(|(rt, angle)| {
            let dir = Vec3::new(angle.cos(), angle.sin(), 0.0);
            let mut spline = Spline::new(&rt.name, center + dir * 12.0);
            spline.add_point(center + dir * 80.0, false);
            let id = scene.add_spline(spline);
            AdjacentSegment::new(RoadSegment::new(id, rt.name.clone(), rt.clone()), true)
        })
        .collect()
}

#[test]
fn test_ccw_sort_is_permutation_invariant() {
    let mut scene = RoadScene::new();
    let city = Arc::new(city_road("tq_City"));
    let adjacencies = junction(&mut scene, &[city.clone(), city.clone(), city.clone(), city]);
    let with_points: Vec<(AdjacentSegment, Vec3)> = adjacencies
        .iter()
        .map(|a| (a.clone(), a.adjacent_point(&scene).unwrap()))
        .collect();

    let expected = canonical(
        &sort_adjacencies_ccw(with_points.clone())
            .iter()
            .map(|(a, _)| a.segment.id)
            .collect::<Vec<_>>(),
    );
    for input in permutations(&with_points) {
        let sorted = sort_adjacencies_ccw(input);
        let ids: Vec<_> = sorted.iter().map(|(a, _)| a.segment.id).collect();
        assert_eq!(canonical(&ids), expected);

        // Consecutive offsets from the centroid turn left
        let mean = sorted.iter().map(|(_, p)| *p).sum::<Vec3>() / sorted.len() as f32;
        for i in 0..sorted.len() {
            let a = sorted[i].1 - mean;
            let b = sorted[(i + 1) % sorted.len()].1 - mean;
            assert!(a.cross(b).z > 0.0, "not counter-clockwise at {i}");
        }
    }
}

#[test]
fn test_built_crossroad_register_order_is_permutation_invariant() {
    let city = Arc::new(city_road("tq_City"));
    let wide = Arc::new(avenue("tq_Avenue"));
    let types = [city.clone(), wide.clone(), city, wide];

    let mut expected: Option<Vec<[i64; 2]>> = None;
    for order in permutations(&[0usize, 1, 2, 3]) {
        let mut scene = RoadScene::new();
        let mut network = RoadNetwork::new();
        let adjacencies = junction(&mut scene, &types);
        let permuted: Vec<AdjacentSegment> =
            order.iter().map(|&i| adjacencies[i].clone()).collect();
        let cx = CrossroadBuilder::new(ROAD_COLLECTION_NAME)
            .build_crossroad(
                &mut scene,
                &mut network,
                &CrossroadSettings::default(),
                &permuted,
                None,
            )
            .unwrap();

        // End points rounded to centimeters, in register modifier order
        let obj = scene.object(&cx.object).unwrap();
        let cycle: Vec<[i64; 2]> = obj
            .modifiers_with_group(crossroad_nodegroup::REGISTER)
            .map(|m| {
                let p = m
                    .get_input("End Point 1")
                    .and_then(InputValue::as_vec3)
                    .unwrap();
                [(p.x * 100.0).round() as i64, (p.y * 100.0).round() as i64]
            })
            .collect();
        assert_eq!(cycle.len(), 4);
        let cycle = canonical(&cycle);
        match &expected {
            Some(expected) => assert_eq!(&cycle, expected, "order {order:?}"),
            None => expected = Some(cycle),
        }
    }
}

#[test]
fn test_outer_cross_section_compare_is_symmetric() {
    let mut cosmetic = city_road("tq_Cosmetic");
    cosmetic.outer_profiles[0].set("UV Scale", 3.0);
    let mut bevelled = city_road("tq_Bevelled");
    bevelled.outer_profiles[1].set("Height", 0.4);
    let types = [
        city_road("tq_City"),
        avenue("tq_Avenue"),
        cosmetic,
        bevelled,
        road_type("tq_Bare", &[Layer::surface(3.0)], &[]),
        road_type(
            "tq_Wide_Curb",
            &[Layer::surface(3.5), Layer::outer(3.0, 0.2), Layer::outer(1.5, 0.25)],
            &[],
        ),
    ];
    for a in &types {
        for b in &types {
            assert_eq!(
                a.compare_outer_cross_section(b),
                b.compare_outer_cross_section(a),
                "{} vs {}",
                a.name,
                b.name
            );
        }
    }
    assert!(types[0].compare_outer_cross_section(&types[2]));
    assert!(!types[0].compare_outer_cross_section(&types[3]));
    assert!(!types[0].compare_outer_cross_section(&types[5]));
}

#[test]
fn test_profile_modifiers_do_not_depend_on_adjacency_order() {
    let city = Arc::new(city_road("tq_City"));
    let wide_curb = Arc::new(road_type(
        "tq_Wide_Curb",
        &[Layer::surface(3.5), Layer::outer(3.0, 0.2), Layer::outer(1.5, 0.25)],
        &[],
    ));

    let mut counts = Vec::new();
    for types in [
        [city.clone(), city.clone(), wide_curb.clone()],
        [wide_curb.clone(), city.clone(), city.clone()],
        [city.clone(), wide_curb.clone(), city.clone()],
    ] {
        let mut scene = RoadScene::new();
        let mut network = RoadNetwork::new();
        let adjacencies = junction(&mut scene, &types);
        let cx = CrossroadBuilder::new(ROAD_COLLECTION_NAME)
            .build_crossroad(
                &mut scene,
                &mut network,
                &CrossroadSettings::default(),
                &adjacencies,
                None,
            )
            .unwrap();
        let obj = scene.object(&cx.object).unwrap();
        counts.push(obj.modifiers_with_group(crossroad_nodegroup::PROFILE).count());
    }
    // Only the city-city pair continues its two outer profiles
    assert_eq!(counts, vec![2, 2, 2]);
}
