//! In-memory stand-in for the host 3D scene.
//!
//! Holds the curve and mesh objects the builders create, the splines of each
//! curve object and the collections they are linked to.

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::modifier::NodesModifier;
use crate::spline::{Spline, SplineId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Curve,
    Mesh,
}

/// Custom property stored on an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IdProperty {
    String(String),
    Float(f32),
    Int(i32),
    Vector([f32; 3]),
}

impl IdProperty {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            IdProperty::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            IdProperty::Vector(v) => Some(Vec3::from_array(*v)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub kind: ObjectKind,
    pub collection: String,
    pub location: Vec3,
    pub properties: BTreeMap<String, IdProperty>,
    pub modifiers: Vec<NodesModifier>,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, kind: ObjectKind, collection: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            collection: collection.into(),
            location: Vec3::ZERO,
            properties: BTreeMap::new(),
            modifiers: Vec::new(),
        }
    }

    pub fn property(&self, name: &str) -> Option<&IdProperty> {
        self.properties.get(name)
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: IdProperty) {
        self.properties.insert(name.into(), value);
    }

    /// Modifiers using node group `node_group`, in stack order.
    pub fn modifiers_with_group<'a>(
        &'a self,
        node_group: &'a str,
    ) -> impl Iterator<Item = &'a NodesModifier> + 'a {
        self.modifiers
            .iter()
            .filter(move |m| m.node_group == node_group)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneCollection {
    pub parent: Option<String>,
}

/// Objects, splines and collections edited by the road builder.
#[derive(Resource, Debug, Clone, Default)]
pub struct RoadScene {
    pub objects: BTreeMap<String, SceneObject>,
    pub splines: BTreeMap<SplineId, Spline>,
    pub collections: BTreeMap<String, SceneCollection>,
    next_spline_id: u32,
}

impl RoadScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link `object` into the scene and return its final name. A taken name
    /// gets a `.001`, `.002`, ... suffix.
    pub fn add_object(&mut self, mut object: SceneObject) -> String {
        if self.objects.contains_key(&object.name) {
            let base = strip_duplicate_suffix(&object.name).to_string();
            let mut n = 1;
            loop {
                let candidate = format!("{base}.{n:03}");
                if !self.objects.contains_key(&candidate) {
                    object.name = candidate;
                    break;
                }
                n += 1;
            }
        }
        let name = object.name.clone();
        self.objects.insert(name.clone(), object);
        name
    }

    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.get(name)
    }

    pub fn object_mut(&mut self, name: &str) -> Option<&mut SceneObject> {
        self.objects.get_mut(name)
    }

    /// Remove an object. Splines of a removed curve object go with it.
    pub fn remove_object(&mut self, name: &str) -> Option<SceneObject> {
        let object = self.objects.remove(name)?;
        if object.kind == ObjectKind::Curve {
            self.splines.retain(|_, s| s.curve_object != name);
        }
        Some(object)
    }

    pub fn add_spline(&mut self, spline: Spline) -> SplineId {
        let id = SplineId(self.next_spline_id);
        self.next_spline_id += 1;
        self.splines.insert(id, spline);
        id
    }

    /// Insert `spline` under a known id, used when restoring saved scenes.
    pub fn insert_spline(&mut self, id: SplineId, spline: Spline) {
        self.next_spline_id = self.next_spline_id.max(id.0 + 1);
        self.splines.insert(id, spline);
    }

    pub fn next_spline_id(&self) -> SplineId {
        SplineId(self.next_spline_id)
    }

    /// Raise the id counter to at least `next`. Never lowers it.
    pub fn reserve_spline_ids(&mut self, next: SplineId) {
        self.next_spline_id = self.next_spline_id.max(next.0);
    }

    pub fn spline(&self, id: SplineId) -> Option<&Spline> {
        self.splines.get(&id)
    }

    pub fn spline_mut(&mut self, id: SplineId) -> Option<&mut Spline> {
        self.splines.get_mut(&id)
    }

    pub fn remove_spline(&mut self, id: SplineId) -> Option<Spline> {
        self.splines.remove(&id)
    }

    /// Splines owned by `curve_object`, in creation order.
    pub fn splines_of<'a>(
        &'a self,
        curve_object: &'a str,
    ) -> impl Iterator<Item = (SplineId, &'a Spline)> + 'a {
        self.splines
            .iter()
            .filter(move |(_, s)| s.curve_object == curve_object)
            .map(|(id, s)| (*id, s))
    }

    pub fn ensure_collection(&mut self, name: &str, parent: Option<&str>) {
        self.collections
            .entry(name.to_string())
            .or_insert_with(|| SceneCollection {
                parent: parent.map(str::to_string),
            });
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    /// Remove a collection and everything linked into it.
    pub fn remove_collection(&mut self, name: &str) {
        for child in self.child_collections(name) {
            self.remove_collection(&child);
        }
        let linked: Vec<String> = self
            .objects
            .values()
            .filter(|o| o.collection == name)
            .map(|o| o.name.clone())
            .collect();
        for object in linked {
            self.remove_object(&object);
        }
        self.collections.remove(name);
    }

    pub fn child_collections(&self, parent: &str) -> Vec<String> {
        self.collections
            .iter()
            .filter(|(_, c)| c.parent.as_deref() == Some(parent))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Number of objects in `collection` and all of its children.
    pub fn all_objects_count(&self, collection: &str) -> usize {
        let own = self
            .objects
            .values()
            .filter(|o| o.collection == collection)
            .count();
        own + self
            .child_collections(collection)
            .iter()
            .map(|c| self.all_objects_count(c))
            .sum::<usize>()
    }

    /// Remove the direct children of `parent` that hold no objects.
    pub fn remove_empty_child_collections(&mut self, parent: &str) -> usize {
        let empty: Vec<String> = self
            .child_collections(parent)
            .into_iter()
            .filter(|c| self.all_objects_count(c) == 0)
            .collect();
        for name in &empty {
            self.remove_collection(name);
        }
        empty.len()
    }
}

/// Drop a trailing `.NNN` duplicate suffix from an object name.
pub fn strip_duplicate_suffix(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((base, suffix))
            if suffix.len() == 3 && suffix.chars().all(|c| c.is_ascii_digit()) =>
        {
            base
        }
        _ => name,
    }
}
