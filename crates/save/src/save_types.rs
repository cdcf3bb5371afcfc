// ---------------------------------------------------------------------------
// Save structs and version constant
// ---------------------------------------------------------------------------

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Current save file version.
/// v1 = objects, splines, collections, modifiers, properties, next spline id
pub const CURRENT_SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct SaveScene {
    pub objects: Vec<SaveObject>,
    pub splines: Vec<SaveSpline>,
    pub collections: Vec<SaveCollection>,
    pub next_spline_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct SaveObject {
    pub name: String,
    pub kind: u8,
    pub collection: String,
    pub location: [f32; 3],
    pub properties: Vec<(String, SaveProperty)>,
    pub modifiers: Vec<SaveModifier>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub enum SaveProperty {
    String(String),
    Float(f32),
    Int(i32),
    Vector([f32; 3]),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct SaveModifier {
    pub name: String,
    pub node_group: String,
    pub inputs: Vec<(String, SaveInputValue)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub enum SaveInputValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Vector([f32; 3]),
    Material(String),
    Object(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct SaveSpline {
    pub id: u32,
    pub curve_object: String,
    pub points: Vec<SaveBezierPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct SaveBezierPoint {
    pub co: [f32; 3],
    pub handle_left: [f32; 3],
    pub handle_right: [f32; 3],
    pub handle_type: u8,
    pub tilt: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct SaveCollection {
    pub name: String,
    pub parent: Option<String>,
}
