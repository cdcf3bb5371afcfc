//! Road types: named road profiles parsed from a geometry-nodes modifier stack.
//!
//! A road type is authored externally (highway, rural road, city street, ...)
//! as a stack of modifiers applied to one curve object: profile layers that
//! are beveled along the curve, road markings, instancers and so on. This
//! module reads the widths, heights, materials and outer cross-section out of
//! that stack so the builders can reason about compatibility between roads.
//!
//! Conventions of the authored stack:
//! - at least one profile layer is marked with `Surface Type == 1`
//! - layers after the last road surface are outer, the rest are inner
//! - road markings offset further than a third of the surface width are outer

use std::collections::BTreeSet;

use crate::config::{road_nodegroup, ROAD_TYPE_PROPERTY};
use crate::error::RoadTypeError;
use crate::modifier::{InputValue, ModifierInputs, NodesModifier};
use crate::scene::{IdProperty, ObjectKind, RoadScene, SceneObject};

/// `Surface Type` value marking a layer as drivable road surface.
pub const ROAD_SURFACE_TYPE: i32 = 1;

/// `Sides Generation Mode` value for layers generated on both sides.
pub const BOTH_SIDES_MODE: i32 = 0;

/// Inputs that only affect shading and never decide whether two outer
/// cross-sections connect.
pub const COSMETIC_PROFILE_INPUTS: [&str; 5] = [
    "Surface Type",
    "UV Scale",
    "UV Offset",
    "Auto Smooth",
    "Ending Length",
];

/// Derived input stored on every parsed profile layer.
pub const TOTAL_WIDTH_INPUT: &str = "Total Width";

#[derive(Debug, Clone)]
pub struct RoadType {
    pub name: String,
    pub filepath: String,
    /// The authored modifier stack, applied 1:1 to road curves of this type.
    pub modifiers: Vec<NodesModifier>,
    pub total_width: f32,
    pub half_width: f32,
    pub road_surface_width: f32,
    pub road_surface_height: f32,
    pub profiles: Vec<ModifierInputs>,
    pub outer_profiles: Vec<ModifierInputs>,
    /// Sorted by `Offset`, ascending.
    pub road_markings: Vec<ModifierInputs>,
    pub road_surface_materials: Vec<String>,
}

impl PartialEq for RoadType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for RoadType {}

fn required(layer: &ModifierInputs, idx: usize, input: &'static str) -> Result<f32, RoadTypeError> {
    layer
        .get_f32(input)
        .ok_or(RoadTypeError::MissingInput { layer: idx, input })
}

impl RoadType {
    pub fn from_modifiers(
        name: impl Into<String>,
        filepath: impl Into<String>,
        modifiers: Vec<NodesModifier>,
    ) -> Result<Self, RoadTypeError> {
        let mut road_type = RoadType {
            name: name.into(),
            filepath: filepath.into(),
            modifiers: Vec::new(),
            total_width: 0.0,
            half_width: 0.0,
            road_surface_width: 0.0,
            road_surface_height: 0.0,
            profiles: Vec::new(),
            outer_profiles: Vec::new(),
            road_markings: Vec::new(),
            road_surface_materials: Vec::new(),
        };

        for modifier in &modifiers {
            match modifier.node_group.as_str() {
                road_nodegroup::ROAD_PROFILE => road_type.parse_profile_input(&modifier.inputs),
                road_nodegroup::MARKINGS => road_type.road_markings.push(modifier.inputs.clone()),
                _ => {}
            }
        }
        if road_type.profiles.is_empty() {
            return Err(RoadTypeError::NoProfiles);
        }

        road_type.modifiers = modifiers;
        road_type.half_width = road_type.total_width / 2.0;
        road_type.calculate_road_surface_properties()?;
        road_type.outer_profiles = road_type.find_outer_profiles()?;
        road_type.road_surface_materials = road_type
            .profiles
            .iter()
            .filter(|p| p.get("Surface Type").and_then(InputValue::as_int) == Some(ROAD_SURFACE_TYPE))
            .filter_map(|p| p.get("Material").and_then(InputValue::as_name))
            .map(str::to_string)
            .collect();
        road_type.road_markings.sort_by(|a, b| {
            let a = a.get_f32("Offset").unwrap_or(0.0);
            let b = b.get_f32("Offset").unwrap_or(0.0);
            a.total_cmp(&b)
        });

        Ok(road_type)
    }

    fn parse_profile_input(&mut self, inputs: &ModifierInputs) {
        let mut layer_width = 0.0;
        let mut is_both_sided = false;
        for (name, value) in inputs.iter() {
            match name {
                "Width" | "Gap" => layer_width += value.as_f32().unwrap_or(0.0),
                "Sides Generation Mode" => {
                    is_both_sided = value.as_int() == Some(BOTH_SIDES_MODE);
                }
                _ => {}
            }
        }

        // The first layer is always generated on one side only
        if is_both_sided && !self.profiles.is_empty() {
            layer_width *= 2.0;
        }

        let mut layer = inputs.clone();
        layer.set(TOTAL_WIDTH_INPUT, layer_width);
        self.profiles.push(layer);
        self.total_width += layer_width;
    }

    /// Surface width is the width of the leading run of road surface layers.
    fn calculate_road_surface_properties(&mut self) -> Result<(), RoadTypeError> {
        self.road_surface_width = 0.0;
        self.road_surface_height = 0.0;
        let mut was_road_surface = false;
        for (i, profile) in self.profiles.iter().enumerate() {
            let is_road_surface = required(profile, i, "Surface Type")? as i32 == ROAD_SURFACE_TYPE;
            let is_both_sided =
                required(profile, i, "Sides Generation Mode")? as i32 == BOTH_SIDES_MODE;
            if was_road_surface && !is_road_surface {
                break;
            }

            let mut profile_width = required(profile, i, "Width")?;
            if is_both_sided && i != 0 {
                profile_width *= 2.0;
            }

            self.road_surface_width += profile_width;
            was_road_surface = is_road_surface;
            self.road_surface_height = required(profile, i, "Height")?;
        }
        Ok(())
    }

    /// Trailing profile layers up to the last road surface, scanning backwards.
    fn find_outer_profiles(&self) -> Result<Vec<ModifierInputs>, RoadTypeError> {
        let mut outer = Vec::new();
        for (i, profile) in self.profiles.iter().enumerate().rev() {
            let excluded = profile
                .get("Exclude From Width Stack")
                .and_then(InputValue::as_bool)
                .unwrap_or(false);
            let horizontal_offset = profile.get_f32("Horizontal Offset").unwrap_or(0.0);
            if excluded && horizontal_offset < self.road_surface_width / 2.0 {
                continue;
            }

            if required(profile, i, "Surface Type")? as i32 == ROAD_SURFACE_TYPE {
                break;
            }

            outer.insert(0, profile.clone());
        }
        Ok(outer)
    }

    /// True if any marking is offset by more than a third of the surface width.
    pub fn has_outer_road_markings(&self) -> bool {
        self.road_markings
            .iter()
            .any(|m| m.get_f32("Offset").unwrap_or(0.0) > self.road_surface_width / 3.0)
    }

    /// Whether this and `other` have the same outer profiles, ignoring
    /// cosmetic inputs. Used to decide if crossroads connect the profiles.
    pub fn compare_outer_cross_section(&self, other: &RoadType) -> bool {
        if self == other {
            return true;
        }

        if self.outer_profiles.len() != other.outer_profiles.len() {
            return false;
        }

        self.outer_profiles
            .iter()
            .zip(&other.outer_profiles)
            .all(|(a, b)| {
                let names: BTreeSet<&str> = a
                    .iter()
                    .chain(b.iter())
                    .map(|(name, _)| name)
                    .filter(|name| !COSMETIC_PROFILE_INPUTS.contains(name))
                    .collect();
                names.into_iter().all(|name| a.get(name) == b.get(name))
            })
    }

    /// Replace the modifiers of `curve_obj` with this road type's stack.
    pub fn apply_to_curve(&self, curve_obj: &mut SceneObject) {
        curve_obj.modifiers.clear();
        curve_obj
            .properties
            .insert(ROAD_TYPE_PROPERTY.to_string(), IdProperty::String(self.name.clone()));
        curve_obj.modifiers.extend(self.modifiers.iter().cloned());
    }

    /// Name of the curve object holding every spline of this road type,
    /// creating and linking it into `collection` when missing.
    pub fn get_curve_obj(&self, scene: &mut RoadScene, collection: &str) -> String {
        if !scene.objects.contains_key(&self.name) {
            let mut obj = SceneObject::new(&self.name, ObjectKind::Curve, collection);
            self.apply_to_curve(&mut obj);
            scene.add_object(obj);
        }
        self.name.clone()
    }
}

impl std::fmt::Display for RoadType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RoadType: '{}'", self.name)
    }
}


#[cfg(test)]
mod tests {
    use super::test_types::*;
    use super::*;

    #[test]
    fn test_total_width_doubles_both_sided_layers_except_first() {
        let rt = city_road("tq_City");
        // 3.5 + 2*2.0 + 2*1.5
        assert!((rt.total_width - 10.5).abs() < 1e-5);
        assert!((rt.half_width - 5.25).abs() < 1e-5);
        assert_eq!(rt.profiles[0].get_f32(TOTAL_WIDTH_INPUT), Some(3.5));
        assert_eq!(rt.profiles[1].get_f32(TOTAL_WIDTH_INPUT), Some(4.0));
    }

    #[test]
    fn test_gap_counts_towards_total_width_only() {
        let mut curb = Layer::outer(1.0, 0.2);
        curb.gap = 0.5;
        let rt = road_type("tq_Gap", &[Layer::surface(3.0), curb], &[]);
        assert!((rt.total_width - 6.0).abs() < 1e-5);
        assert!((rt.road_surface_width - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_road_surface_width_sums_leading_surface_layers() {
        let rt = avenue("tq_Avenue");
        // 4.0 (first layer, single) + 3.0 * 2 (both sided)
        assert!((rt.road_surface_width - 10.0).abs() < 1e-5);
        assert!((rt.road_surface_height - 0.1).abs() < 1e-5);
        assert_eq!(rt.road_surface_materials, vec!["Asphalt", "Asphalt"]);
    }

    #[test]
    fn test_road_surface_stops_after_surface_run() {
        // A later surface layer after an outer one is not part of the surface
        let rt = road_type(
            "tq_Split",
            &[Layer::surface(3.0), Layer::outer(1.0, 0.2), Layer::surface(2.0)],
            &[],
        );
        assert!((rt.road_surface_width - 3.0).abs() < 1e-5);
        // Outer scan stops right away at the trailing surface layer
        assert!(rt.outer_profiles.is_empty());
    }

    #[test]
    fn test_leading_non_surface_layers_count_until_surface_ends() {
        let mut divider = Layer::outer(0.5, 0.3);
        divider.both_sided = false;
        let rt = road_type(
            "tq_Divided",
            &[divider, Layer::surface(3.0), Layer::outer(2.0, 0.2)],
            &[],
        );
        // 0.5 + 3.0 * 2, the curb after the surface ends the run
        assert!((rt.road_surface_width - 6.5).abs() < 1e-5);
        assert!((rt.road_surface_height - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_outer_profiles_are_trailing_run() {
        let rt = city_road("tq_City");
        assert_eq!(rt.outer_profiles.len(), 2);
        assert_eq!(rt.outer_profiles[0].get_f32("Width"), Some(2.0));
        assert_eq!(rt.outer_profiles[1].get_f32("Width"), Some(1.5));
    }

    #[test]
    fn test_outer_profiles_skip_excluded_inner_layers() {
        // Excluded layer offset inside the surface is skipped, the scan continues
        let mut median = Layer::outer(0.3, 0.5);
        median.exclude = true;
        median.horizontal_offset = 1.0;
        let rt = road_type(
            "tq_Median",
            &[Layer::surface(3.5), Layer::outer(2.0, 0.2), median],
            &[],
        );
        assert_eq!(rt.outer_profiles.len(), 1);
        assert_eq!(rt.outer_profiles[0].get_f32("Width"), Some(2.0));
    }

    #[test]
    fn test_outer_profiles_keep_excluded_layers_offset_outside_surface() {
        let mut barrier = Layer::outer(0.3, 1.0);
        barrier.exclude = true;
        barrier.horizontal_offset = 5.0;
        let rt = road_type(
            "tq_Barrier",
            &[Layer::surface(3.5), Layer::outer(2.0, 0.2), barrier],
            &[],
        );
        assert_eq!(rt.outer_profiles.len(), 2);
        assert_eq!(rt.outer_profiles[1].get_f32("Horizontal Offset"), Some(5.0));
    }

    #[test]
    fn test_markings_sorted_and_outer_detection() {
        let rt = road_type("tq_Marked", &[Layer::surface(3.0)], &[2.5, 0.0]);
        assert_eq!(rt.road_markings[0].get_f32("Offset"), Some(0.0));
        assert_eq!(rt.road_markings[1].get_f32("Offset"), Some(2.5));
        // surface width 3.0, a third is 1.0
        assert!(rt.has_outer_road_markings());

        let inner_only = road_type("tq_Center", &[Layer::surface(3.0)], &[0.0]);
        assert!(!inner_only.has_outer_road_markings());
    }

    #[test]
    fn test_compare_outer_cross_section_ignores_cosmetic_inputs() {
        let a = city_road("tq_A");
        let mut b = city_road("tq_B");
        b.outer_profiles[0].set("UV Scale", 4.0);
        b.outer_profiles[1].set("Ending Length", 12.0);
        assert!(a.compare_outer_cross_section(&b));
        assert!(b.compare_outer_cross_section(&a));
    }

    #[test]
    fn test_compare_outer_cross_section_is_symmetric() {
        let a = city_road("tq_A");
        let mut extra = city_road("tq_Extra");
        extra.outer_profiles[0].set("Bevel", 0.2);
        assert_eq!(
            a.compare_outer_cross_section(&extra),
            extra.compare_outer_cross_section(&a)
        );
        assert!(!a.compare_outer_cross_section(&extra));

        let short = road_type("tq_Short", &[Layer::surface(3.0), Layer::outer(2.0, 0.2)], &[]);
        assert!(!a.compare_outer_cross_section(&short));
        assert!(!short.compare_outer_cross_section(&a));

        let avenue = avenue("tq_Avenue");
        assert!(a.compare_outer_cross_section(&avenue));
        assert!(avenue.compare_outer_cross_section(&a));
    }

    #[test]
    fn test_missing_required_input() {
        let mut m = NodesModifier::new("Profile", road_nodegroup::ROAD_PROFILE);
        m.set_input("Width", 3.0).set_input("Surface Type", 1);
        let err = RoadType::from_modifiers("tq_Bad", "", vec![m]).unwrap_err();
        assert!(matches!(
            err,
            RoadTypeError::MissingInput {
                layer: 0,
                input: "Sides Generation Mode"
            }
        ));
    }

    #[test]
    fn test_no_profiles() {
        let err = RoadType::from_modifiers("tq_Empty", "", vec![marking(0.0)]).unwrap_err();
        assert!(matches!(err, RoadTypeError::NoProfiles));
    }

    #[test]
    fn test_apply_to_curve_tags_object() {
        let rt = city_road("tq_City");
        let mut scene = RoadScene::default();
        let name = rt.get_curve_obj(&mut scene, "traffiq roads");
        let obj = &scene.objects[&name];
        assert_eq!(obj.modifiers.len(), rt.modifiers.len());
        assert_eq!(
            obj.properties.get(ROAD_TYPE_PROPERTY),
            Some(&IdProperty::String("tq_City".to_string()))
        );
    }
}
