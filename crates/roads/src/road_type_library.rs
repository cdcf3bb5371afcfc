use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{
    LIBRARY_FILE_PREFIX, ROADS_DIR_NAME, ROAD_TYPE_FILE_EXTENSION, ROAD_TYPE_FILE_PREFIX,
};
use crate::error::RoadTypeError;
use crate::modifier::NodesModifier;
use crate::road_type::RoadType;

/// On-disk form of a road type: the modifier stack of its main curve object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadTypeFile {
    pub modifiers: Vec<NodesModifier>,
}

/// One entry of the road type picker: `(name, nice name, description)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoadTypeEnumItem {
    pub name: String,
    pub nice_name: String,
    pub description: String,
}

/// Road types available to the builder, keyed by name.
#[derive(Resource, Debug, Clone, Default)]
pub struct RoadTypeLibrary {
    road_types: BTreeMap<String, Arc<RoadType>>,
}

impl RoadTypeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every road type file below `dir_path`. Invalid files are logged
    /// and skipped. Returns the number of road types loaded.
    pub fn load_dir(&mut self, dir_path: &Path) -> usize {
        if !dir_path.is_dir() {
            error!("Invalid directory in load_dir {}", dir_path.display());
            return 0;
        }

        let mut loaded = 0;
        let mut pending = vec![dir_path.to_path_buf()];
        while let Some(dir) = pending.pop() {
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Failed to read directory {}: {e}", dir.display());
                    continue;
                }
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    pending.push(path);
                    continue;
                }
                if !is_road_type_file(&path) {
                    continue;
                }
                match self.load_file(&path) {
                    Ok(name) => {
                        debug!("Loaded road type '{name}' from {}", path.display());
                        loaded += 1;
                    }
                    Err(e) => error!("'{}' is not a valid road type file: {e}", path.display()),
                }
            }
        }
        info!("Loaded {loaded} road types from {}", dir_path.display());
        loaded
    }

    /// Load a single road type file, named after the file stem.
    pub fn load_file(&mut self, path: &Path) -> Result<String, RoadTypeError> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| RoadTypeError::Parse(format!("invalid file name {}", path.display())))?
            .to_string();
        let contents = std::fs::read_to_string(path)?;
        let file: RoadTypeFile = serde_json::from_str(&contents)?;
        let road_type =
            RoadType::from_modifiers(name.clone(), path.display().to_string(), file.modifiers)?;
        self.insert(road_type);
        Ok(name)
    }

    pub fn insert(&mut self, road_type: RoadType) -> Arc<RoadType> {
        let road_type = Arc::new(road_type);
        self.road_types
            .insert(road_type.name.clone(), road_type.clone());
        road_type
    }

    pub fn get_road_type_by_name(&self, name: &str) -> Option<Arc<RoadType>> {
        self.road_types.get(name).cloned()
    }

    pub fn get_road_types(&self) -> impl Iterator<Item = &Arc<RoadType>> {
        self.road_types.values()
    }

    pub fn len(&self) -> usize {
        self.road_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.road_types.is_empty()
    }

    pub fn get_road_types_as_enum_items(&self) -> Vec<RoadTypeEnumItem> {
        self.road_types
            .iter()
            .map(|(name, data)| {
                let nice_name = nice_name(name);
                RoadTypeEnumItem {
                    name: name.clone(),
                    description: format!(
                        "Road: '{nice_name}' with road surface width of '{:.0}' and a total width '{:.0}'",
                        data.road_surface_width, data.total_width
                    ),
                    nice_name,
                }
            })
            .collect()
    }

    /// Name of the road type after `current`, wrapping around. An unknown
    /// `current` yields the first road type.
    pub fn next_road_type_name(&self, current: &str) -> Option<String> {
        let names: Vec<&String> = self.road_types.keys().collect();
        if names.is_empty() {
            return None;
        }
        let next = match names.iter().position(|n| n.as_str() == current) {
            Some(i) => (i + 1) % names.len(),
            None => 0,
        };
        Some(names[next].clone())
    }
}

/// Display name of a road type: `tq_Country_Road` -> `Country Road`.
pub fn nice_name(name: &str) -> String {
    name.replace(ROAD_TYPE_FILE_PREFIX, "").replace('_', " ")
}

/// Road type files are `tq_*.json` files in a `roads` directory tree that
/// are not shared node group libraries.
pub fn is_road_type_file(path: &Path) -> bool {
    let Some(file_name) = path.file_name().and_then(|f| f.to_str()) else {
        return false;
    };
    let has_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ROAD_TYPE_FILE_EXTENSION));
    let in_roads_dir = path
        .parent()
        .is_some_and(|p| p.to_string_lossy().contains(ROADS_DIR_NAME));

    has_extension
        && in_roads_dir
        && file_name.starts_with(ROAD_TYPE_FILE_PREFIX)
        && !file_name.starts_with(LIBRARY_FILE_PREFIX)
}
