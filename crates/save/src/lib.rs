//! Road scene persistence.
//!
//! A save file is a [`file_header`] followed by the bitcode encoded
//! [`SaveScene`], lz4 compressed when that makes it smaller.

use std::path::Path;

use bevy::prelude::*;
use roads::RoadScene;

mod atomic_write;
pub mod file_header;
mod save_codec;
mod save_error;
mod save_plugin;
pub mod save_types;

pub use atomic_write::atomic_write;
pub use save_error::SaveError;
pub use save_plugin::{LoadRoadsEvent, SavePath, SavePlugin, SaveRoadsEvent};
pub use save_types::{SaveScene, CURRENT_SAVE_VERSION};

/// Encode `scene` into save file bytes.
pub fn encode_scene(scene: &RoadScene) -> Vec<u8> {
    let encoded = bitcode::encode(&SaveScene::from_scene(scene));
    let compressed = lz4_flex::compress(&encoded);
    if compressed.len() < encoded.len() {
        file_header::wrap_with_header(&compressed, encoded.len(), true)
    } else {
        file_header::wrap_with_header(&encoded, encoded.len(), false)
    }
}

/// LZ4 block output is at most 255 bytes per input byte.
const MAX_LZ4_RATIO: usize = 255;

/// Decode save file bytes back into a scene.
pub fn decode_scene(bytes: &[u8]) -> Result<RoadScene, SaveError> {
    let (header, payload) = file_header::unwrap_header(bytes)?;
    let save: SaveScene = if header.is_compressed() {
        let uncompressed_size = header.uncompressed_size as usize;
        if uncompressed_size > payload.len().saturating_mul(MAX_LZ4_RATIO) {
            return Err(SaveError::Decompress(format!(
                "uncompressed size {uncompressed_size} is too large for a {} byte payload",
                payload.len()
            )));
        }
        let raw = lz4_flex::decompress(payload, uncompressed_size)?;
        bitcode::decode(&raw)?
    } else {
        bitcode::decode(payload)?
    };
    Ok(save.into_scene())
}

pub fn save_scene(scene: &RoadScene, path: &Path) -> Result<usize, SaveError> {
    let bytes = encode_scene(scene);
    atomic_write(path, &bytes)?;
    info!(
        "Saved {} objects and {} splines to {} ({} bytes)",
        scene.objects.len(),
        scene.splines.len(),
        path.display(),
        bytes.len()
    );
    Ok(bytes.len())
}

pub fn load_scene(path: &Path) -> Result<RoadScene, SaveError> {
    let bytes = std::fs::read(path)?;
    let scene = decode_scene(&bytes)?;
    info!(
        "Loaded {} objects and {} splines from {}",
        scene.objects.len(),
        scene.splines.len(),
        path.display()
    );
    Ok(scene)
}
