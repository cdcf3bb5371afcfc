// ---------------------------------------------------------------------------
// Conversion between RoadScene and the Save* structs
// ---------------------------------------------------------------------------

use bevy::prelude::*;

use roads::modifier::{InputValue, ModifierInputs, NodesModifier};
use roads::scene::{IdProperty, ObjectKind, RoadScene, SceneCollection, SceneObject};
use roads::spline::{BezierPoint, HandleType, Spline, SplineId};

use crate::save_types::{
    SaveBezierPoint, SaveCollection, SaveInputValue, SaveModifier, SaveObject, SaveProperty,
    SaveScene, SaveSpline,
};

pub fn object_kind_to_u8(k: ObjectKind) -> u8 {
    match k {
        ObjectKind::Curve => 0,
        ObjectKind::Mesh => 1,
    }
}

pub fn u8_to_object_kind(v: u8) -> ObjectKind {
    match v {
        0 => ObjectKind::Curve,
        _ => ObjectKind::Mesh,
    }
}

pub fn handle_type_to_u8(h: HandleType) -> u8 {
    match h {
        HandleType::Vector => 0,
        HandleType::Free => 1,
    }
}

pub fn u8_to_handle_type(v: u8) -> HandleType {
    match v {
        1 => HandleType::Free,
        _ => HandleType::Vector,
    }
}

fn property_to_save(p: &IdProperty) -> SaveProperty {
    match p {
        IdProperty::String(s) => SaveProperty::String(s.clone()),
        IdProperty::Float(v) => SaveProperty::Float(*v),
        IdProperty::Int(v) => SaveProperty::Int(*v),
        IdProperty::Vector(v) => SaveProperty::Vector(*v),
    }
}

fn property_from_save(p: SaveProperty) -> IdProperty {
    match p {
        SaveProperty::String(s) => IdProperty::String(s),
        SaveProperty::Float(v) => IdProperty::Float(v),
        SaveProperty::Int(v) => IdProperty::Int(v),
        SaveProperty::Vector(v) => IdProperty::Vector(v),
    }
}

fn input_to_save(v: &InputValue) -> SaveInputValue {
    match v {
        InputValue::Float(x) => SaveInputValue::Float(*x),
        InputValue::Int(x) => SaveInputValue::Int(*x),
        InputValue::Bool(x) => SaveInputValue::Bool(*x),
        InputValue::Vector(x) => SaveInputValue::Vector(*x),
        InputValue::Material(s) => SaveInputValue::Material(s.clone()),
        InputValue::Object(s) => SaveInputValue::Object(s.clone()),
    }
}

fn input_from_save(v: SaveInputValue) -> InputValue {
    match v {
        SaveInputValue::Float(x) => InputValue::Float(x),
        SaveInputValue::Int(x) => InputValue::Int(x),
        SaveInputValue::Bool(x) => InputValue::Bool(x),
        SaveInputValue::Vector(x) => InputValue::Vector(x),
        SaveInputValue::Material(s) => InputValue::Material(s),
        SaveInputValue::Object(s) => InputValue::Object(s),
    }
}

fn modifier_to_save(m: &NodesModifier) -> SaveModifier {
    SaveModifier {
        name: m.name.clone(),
        node_group: m.node_group.clone(),
        inputs: m
            .inputs
            .iter()
            .map(|(name, value)| (name.to_string(), input_to_save(value)))
            .collect(),
    }
}

fn modifier_from_save(m: SaveModifier) -> NodesModifier {
    NodesModifier {
        name: m.name,
        node_group: m.node_group,
        inputs: ModifierInputs(
            m.inputs
                .into_iter()
                .map(|(name, value)| (name, input_from_save(value)))
                .collect(),
        ),
    }
}

fn point_to_save(p: &BezierPoint) -> SaveBezierPoint {
    SaveBezierPoint {
        co: p.co.to_array(),
        handle_left: p.handle_left.to_array(),
        handle_right: p.handle_right.to_array(),
        handle_type: handle_type_to_u8(p.handle_type),
        tilt: p.tilt,
        radius: p.radius,
    }
}

fn point_from_save(p: SaveBezierPoint) -> BezierPoint {
    BezierPoint {
        co: Vec3::from_array(p.co),
        handle_left: Vec3::from_array(p.handle_left),
        handle_right: Vec3::from_array(p.handle_right),
        handle_type: u8_to_handle_type(p.handle_type),
        tilt: p.tilt,
        radius: p.radius,
    }
}

impl SaveScene {
    /// Snapshot `scene`. Objects, splines and collections keep their map order.
    pub fn from_scene(scene: &RoadScene) -> Self {
        let objects = scene
            .objects
            .values()
            .map(|o| SaveObject {
                name: o.name.clone(),
                kind: object_kind_to_u8(o.kind),
                collection: o.collection.clone(),
                location: o.location.to_array(),
                properties: o
                    .properties
                    .iter()
                    .map(|(k, v)| (k.clone(), property_to_save(v)))
                    .collect(),
                modifiers: o.modifiers.iter().map(modifier_to_save).collect(),
            })
            .collect();

        let splines = scene
            .splines
            .iter()
            .map(|(id, s)| SaveSpline {
                id: id.0,
                curve_object: s.curve_object.clone(),
                points: s.points.iter().map(point_to_save).collect(),
            })
            .collect();

        let collections = scene
            .collections
            .iter()
            .map(|(name, c)| SaveCollection {
                name: name.clone(),
                parent: c.parent.clone(),
            })
            .collect();

        Self {
            objects,
            splines,
            collections,
            next_spline_id: scene.next_spline_id().0,
        }
    }

    /// Rebuild the scene. Spline ids are kept so ids handed out later never
    /// collide with saved ones.
    pub fn into_scene(self) -> RoadScene {
        let mut scene = RoadScene::new();

        for c in self.collections {
            scene
                .collections
                .insert(c.name, SceneCollection { parent: c.parent });
        }

        for o in self.objects {
            let mut object = SceneObject::new(o.name, u8_to_object_kind(o.kind), o.collection);
            object.location = Vec3::from_array(o.location);
            for (name, value) in o.properties {
                object.set_property(name, property_from_save(value));
            }
            object.modifiers = o.modifiers.into_iter().map(modifier_from_save).collect();
            scene.objects.insert(object.name.clone(), object);
        }

        for s in self.splines {
            let points = s.points.into_iter().map(point_from_save).collect();
            scene.insert_spline(
                SplineId(s.id),
                Spline {
                    curve_object: s.curve_object,
                    points,
                },
            );
        }
        scene.reserve_spline_ids(SplineId(self.next_spline_id));

        scene
    }
}
