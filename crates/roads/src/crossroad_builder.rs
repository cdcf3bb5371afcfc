//! Describes crossroad geometry as a modifier stack on a new mesh object.
//!
//! The builder does not touch the [`RoadNetwork`] graph apart from taking a
//! fresh crossroad id, registering the result is up to the caller.

use bevy::prelude::*;

use crate::config::{
    crossroad_nodegroup, road_nodegroup, CROSSROAD_POSITION_PROPERTY, CROSSROAD_PREFIX,
    CROSSWALK_POSITION_OFFSET, CROSSWALK_WIDTH, DEFAULT_ROAD_MARKING_WIDTH, ROAD_TYPE_CROSSROAD_VALUE,
    ROAD_TYPE_PROPERTY,
};
use crate::error::RoadNetworkError;
use crate::modifier::{InputValue, NodesModifier};
use crate::road_network::{Crossroad, CrossroadId, RoadNetwork, RoadSegment, SegmentAdjacency};
use crate::road_type::TOTAL_WIDTH_INPUT;
use crate::scene::{IdProperty, ObjectKind, RoadScene, SceneObject};
use crate::settings::CrossroadSettings;
use crate::spline::mean_position;

/// A segment end taking part in a crossroad, with the segment's road type at hand.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjacentSegment {
    pub segment: RoadSegment,
    pub is_first_point: bool,
}

impl AdjacentSegment {
    pub fn new(segment: RoadSegment, is_first_point: bool) -> Self {
        Self {
            segment,
            is_first_point,
        }
    }

    pub fn from_point_idx(
        segment: RoadSegment,
        point_idx: usize,
        point_count: usize,
    ) -> Result<Self, RoadNetworkError> {
        let adj = SegmentAdjacency::from_point_idx(segment.id, point_idx, point_count)?;
        Ok(Self::new(segment, adj.is_first_point))
    }

    pub fn adjacency(&self) -> SegmentAdjacency {
        SegmentAdjacency::new(self.segment.id, self.is_first_point)
    }

    pub fn adjacent_point(&self, scene: &RoadScene) -> Result<Vec3, RoadNetworkError> {
        self.adjacency()
            .adjacent_point(scene)
            .ok_or(RoadNetworkError::StaleSegment(self.segment.id))
    }
}

pub fn crossroad_name(id: CrossroadId) -> String {
    format!("{CROSSROAD_PREFIX}-{}", id.0)
}

#[derive(Debug, Clone)]
pub struct CrossroadBuilder {
    /// Collection every crossroad collection is linked under.
    pub main_collection: String,
}

impl CrossroadBuilder {
    pub fn new(main_collection: impl Into<String>) -> Self {
        Self {
            main_collection: main_collection.into(),
        }
    }

    /// Create the crossroad object for `adjacencies` and describe its geometry.
    ///
    /// Without `position` the crossroad sits at the mean of the adjacent
    /// endpoints. The scene is left untouched when this fails.
    pub fn build_crossroad(
        &self,
        scene: &mut RoadScene,
        network: &mut RoadNetwork,
        settings: &CrossroadSettings,
        adjacencies: &[AdjacentSegment],
        position: Option<Vec3>,
    ) -> Result<Crossroad, RoadNetworkError> {
        if adjacencies.len() < 2 {
            return Err(RoadNetworkError::TooFewAdjacencies {
                found: adjacencies.len(),
            });
        }
        let mut points = Vec::with_capacity(adjacencies.len());
        for adj in adjacencies {
            points.push(adj.adjacent_point(scene)?);
        }

        let ccw = sort_adjacencies_ccw(adjacencies.iter().cloned().zip(points.iter().copied()));
        let position = position.unwrap_or_else(|| mean_position(points.iter().copied()));

        let id = network.allocate_crossroad_id();
        let name = crossroad_name(id);
        scene.ensure_collection(&name, Some(&self.main_collection));
        let mut root = SceneObject::new(&name, ObjectKind::Mesh, &name);
        root.set_property(
            ROAD_TYPE_PROPERTY,
            IdProperty::String(ROAD_TYPE_CROSSROAD_VALUE.to_string()),
        );

        for i in 0..ccw.len() {
            let next = (i + 1) % ccw.len();
            create_adjacency_nodes(&mut root, &ccw[i], &ccw[next], i);
        }

        // Widest road gives the surface material, first one wins on ties
        let mut widest = &ccw[0].0.segment;
        for (adj, _) in &ccw[1..] {
            if adj.segment.road_type.total_width > widest.road_type.total_width {
                widest = &adj.segment;
            }
        }

        let mut build = NodesModifier::new("Build Crossroad", crossroad_nodegroup::BUILD);
        if let Some(material) = widest.road_type.road_surface_materials.first() {
            build.set_material_input("Material", material);
        }
        root.modifiers.push(build);

        add_road_markings(&mut root, &ccw, widest);

        // Plain road type merges get no crosswalks
        if settings.build_crosswalks && ccw.len() > 2 {
            for i in 0..ccw.len() {
                root.modifiers.push(crosswalk(i));
            }
        }

        root.modifiers
            .push(NodesModifier::new("Cleanup", road_nodegroup::CLEANUP));
        root.set_property(
            CROSSROAD_POSITION_PROPERTY,
            IdProperty::Vector(position.to_array()),
        );

        let crossroad = Crossroad::new(
            id,
            &name,
            &name,
            adjacencies.iter().map(AdjacentSegment::adjacency),
            position,
            scene,
        )?;
        let object = scene.add_object(root);
        debug!("Built crossroad {object} with {} adjacencies", ccw.len());
        Ok(Crossroad { object, ..crossroad })
    }

    /// Remove the crossroad's root object. Its collection stays until it is
    /// cleared as empty.
    pub fn remove_crossroad_object(&self, scene: &mut RoadScene, crossroad: &Crossroad) {
        scene.remove_object(&crossroad.object);
    }
}

/// Sort adjacencies counter-clockwise around the mean of their endpoints.
pub fn sort_adjacencies_ccw(
    adjacencies: impl IntoIterator<Item = (AdjacentSegment, Vec3)>,
) -> Vec<(AdjacentSegment, Vec3)> {
    let adjacencies: Vec<(AdjacentSegment, Vec3)> = adjacencies.into_iter().collect();
    let mean = mean_position(adjacencies.iter().map(|(_, p)| *p));

    let mut with_angles: Vec<(f32, (AdjacentSegment, Vec3))> = adjacencies
        .into_iter()
        .map(|(adj, point)| {
            let co = mean - point;
            (Vec3::Y.dot(co).atan2(Vec3::X.dot(co)), (adj, point))
        })
        .collect();
    with_angles.sort_by(|a, b| a.0.total_cmp(&b.0));
    with_angles.into_iter().map(|(_, adj)| adj).collect()
}

fn create_adjacency_nodes(
    root: &mut SceneObject,
    (start, start_co): &(AdjacentSegment, Vec3),
    (end, end_co): &(AdjacentSegment, Vec3),
    adj_idx: usize,
) {
    let road = &start.segment;
    let road_next = &end.segment;

    let mut register = NodesModifier::new(
        format!("Adjacent Road {adj_idx}"),
        crossroad_nodegroup::REGISTER,
    );
    register
        .set_object_input("Road 1", &road.curve_object)
        .set_object_input("Road 2", &road_next.curve_object)
        .set_input("Road 1 Width", road.road_type.road_surface_width)
        .set_input("Road 2 Width", road_next.road_type.road_surface_width)
        .set_input("Road 1 Height", road.road_type.road_surface_height)
        .set_input("Road 2 Height", road_next.road_type.road_surface_height)
        .set_input("End Point 1", *start_co)
        .set_input("End Point 2", *end_co);
    root.modifiers.push(register);

    // Outer profiles only continue through the crossroad when both sides match
    if !road
        .road_type
        .compare_outer_cross_section(&road_next.road_type)
    {
        return;
    }

    for (j, profile) in road.road_type.outer_profiles.iter().enumerate() {
        let mut profile_mod = NodesModifier::new(
            format!("Crossroad Profile {adj_idx}-{j}"),
            crossroad_nodegroup::PROFILE,
        );
        profile_mod
            .set_object_input("Road 1", &road.curve_object)
            .set_object_input("Road 2", &road_next.curve_object);

        let width = profile.get_f32("Width").unwrap_or(0.0);
        let height = profile.get_f32("Height").unwrap_or(0.0);
        profile_mod.set_input("Adjacent Roads Snap", width.min(height));

        for (name, value) in profile.iter() {
            if name == TOTAL_WIDTH_INPUT {
                continue;
            }
            profile_mod.inputs.set(name, value.clone());
        }

        let horizontal_offset = profile.get_f32("Horizontal Offset").unwrap_or(0.0);
        if horizontal_offset.abs() > f32::EPSILON {
            profile_mod.set_input(
                "Horizontal Offset",
                road.road_type.road_surface_width / 2.0 - horizontal_offset,
            );
        }
        root.modifiers.push(profile_mod);
    }
}

/// Continue the widest road's outermost marking through the crossroad, only
/// when every adjacent road has outer markings.
fn add_road_markings(
    root: &mut SceneObject,
    ccw: &[(AdjacentSegment, Vec3)],
    base_segment: &RoadSegment,
) {
    let Some(base_marking) = base_segment.road_type.road_markings.last() else {
        return;
    };
    if !ccw
        .iter()
        .all(|(adj, _)| adj.segment.road_type.has_outer_road_markings())
    {
        return;
    }

    let mut markings = NodesModifier::new("Road Markings", road_nodegroup::MARKINGS);
    markings
        .set_input(
            "Width",
            base_marking
                .get_f32("Width")
                .unwrap_or(DEFAULT_ROAD_MARKING_WIDTH),
        )
        .set_input(
            "Marking Length",
            base_marking.get_f32("Marking Length").unwrap_or(0.0),
        )
        .set_input(
            "Space Length",
            base_marking.get_f32("Space Length").unwrap_or(0.0),
        )
        .set_input(
            "Offset",
            base_segment.road_type.road_surface_width / 2.0
                - base_marking.get_f32("Offset").unwrap_or(0.0),
        )
        .set_input("Mirror", false);
    if let Some(material) = base_marking.get("Material").and_then(InputValue::as_name) {
        markings.set_material_input("Material", material);
    }
    root.modifiers.push(markings);
}

fn crosswalk(i: usize) -> NodesModifier {
    let mut m = NodesModifier::new(format!("Crosswalk {i}"), road_nodegroup::CROSSWALK);
    m.set_input("Crossroad Point Index", i as i32)
        .set_input("Width", CROSSWALK_WIDTH)
        .set_input("Position Offset", CROSSWALK_POSITION_OFFSET);
    m
}
