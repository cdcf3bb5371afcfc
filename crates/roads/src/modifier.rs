//! Geometry-nodes modifier descriptors.
//!
//! The road and junction meshes are synthesized by externally authored node
//! groups. This code only fills their inputs, addressed by socket name.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Value of one node group input socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Vector([f32; 3]),
    Material(String),
    Object(String),
}

impl InputValue {
    /// Numeric view of the value. Booleans map to 0/1 like host sockets do.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            InputValue::Float(v) => Some(*v),
            InputValue::Int(v) => Some(*v as f32),
            InputValue::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            InputValue::Int(v) => Some(*v),
            InputValue::Float(v) => Some(*v as i32),
            InputValue::Bool(v) => Some(i32::from(*v)),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            InputValue::Bool(v) => Some(*v),
            InputValue::Int(v) => Some(*v != 0),
            InputValue::Float(v) => Some(*v != 0.0),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            InputValue::Vector(v) => Some(Vec3::from_array(*v)),
            _ => None,
        }
    }

    /// Name of the referenced datablock for object and material inputs.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            InputValue::Material(name) | InputValue::Object(name) => Some(name.as_str()),
            _ => None,
        }
    }
}

impl From<f32> for InputValue {
    fn from(v: f32) -> Self {
        InputValue::Float(v)
    }
}

impl From<f64> for InputValue {
    fn from(v: f64) -> Self {
        InputValue::Float(v as f32)
    }
}

impl From<i32> for InputValue {
    fn from(v: i32) -> Self {
        InputValue::Int(v)
    }
}

impl From<bool> for InputValue {
    fn from(v: bool) -> Self {
        InputValue::Bool(v)
    }
}

impl From<Vec3> for InputValue {
    fn from(v: Vec3) -> Self {
        InputValue::Vector(v.to_array())
    }
}

/// Ordered name -> value list of inputs. Order follows the node group
/// interface, which matters for width accumulation of profile layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifierInputs(pub Vec<(String, InputValue)>);

impl ModifierInputs {
    pub fn get(&self, name: &str) -> Option<&InputValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set `name` to `value`, replacing an existing entry in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<InputValue>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get_f32(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(InputValue::as_f32)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InputValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One geometry-nodes modifier on a scene object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodesModifier {
    pub name: String,
    pub node_group: String,
    pub inputs: ModifierInputs,
}

impl NodesModifier {
    pub fn new(name: impl Into<String>, node_group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node_group: node_group.into(),
            inputs: ModifierInputs::default(),
        }
    }

    pub fn set_input(&mut self, name: &str, value: impl Into<InputValue>) -> &mut Self {
        self.inputs.set(name, value);
        self
    }

    pub fn set_object_input(&mut self, name: &str, object: &str) -> &mut Self {
        self.inputs.set(name, InputValue::Object(object.to_string()));
        self
    }

    pub fn set_material_input(&mut self, name: &str, material: &str) -> &mut Self {
        self.inputs.set(name, InputValue::Material(material.to_string()));
        self
    }

    pub fn get_input(&self, name: &str) -> Option<&InputValue> {
        self.inputs.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_in_place() {
        let mut inputs = ModifierInputs::default();
        inputs.set("Width", 1.0);
        inputs.set("Height", 0.2);
        inputs.set("Width", 3.0);
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs.0[0].0, "Width");
        assert_eq!(inputs.get_f32("Width"), Some(3.0));
    }

    #[test]
    fn test_numeric_views() {
        assert_eq!(InputValue::Int(1).as_f32(), Some(1.0));
        assert_eq!(InputValue::Bool(true).as_int(), Some(1));
        assert_eq!(InputValue::Material("Asphalt".into()).as_f32(), None);
        assert_eq!(InputValue::Object("road".into()).as_name(), Some("road"));
    }

    #[test]
    fn test_input_value_json_shape() {
        let inputs = ModifierInputs(vec![
            ("Width".to_string(), InputValue::Float(3.5)),
            ("Material".to_string(), InputValue::Material("Asphalt".to_string())),
        ]);
        let json = serde_json::to_string(&inputs).unwrap();
        assert_eq!(json, r#"[["Width",{"float":3.5}],["Material",{"material":"Asphalt"}]]"#);
        let back: ModifierInputs = serde_json::from_str(&json).unwrap();
        assert_eq!(back, inputs);
    }
}
