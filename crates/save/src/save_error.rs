// ---------------------------------------------------------------------------
// SaveError: error type for road scene save/load
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors that can occur while saving or loading a road scene.
#[derive(Debug)]
pub enum SaveError {
    /// I/O error (file not found, permission denied, disk full, etc.)
    Io(std::io::Error),
    /// Bitcode decoding failed.
    Decode(String),
    /// lz4 decompression failed.
    Decompress(String),
    /// The file does not start with the `RDNW` magic bytes.
    NotASaveFile,
    /// The file is shorter than its header claims.
    Truncated { expected: usize, found: usize },
    /// Save file version is newer than this build supports.
    VersionMismatch { expected_max: u32, found: u32 },
    /// Payload checksum does not match the header.
    ChecksumMismatch { expected: u32, found: u32 },
    /// Build roads owns the scene, so it can't be saved or replaced.
    SessionActive,
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "I/O error: {e}"),
            SaveError::Decode(msg) => write!(f, "Decoding error: {msg}"),
            SaveError::Decompress(msg) => write!(f, "Decompression error: {msg}"),
            SaveError::NotASaveFile => write!(f, "Not a road network save file"),
            SaveError::Truncated { expected, found } => write!(
                f,
                "Save file is truncated: expected {expected} bytes, found {found}"
            ),
            SaveError::VersionMismatch {
                expected_max,
                found,
            } => write!(
                f,
                "Version mismatch: save is v{found}, but this build only supports up to v{expected_max}"
            ),
            SaveError::ChecksumMismatch { expected, found } => write!(
                f,
                "Save file is corrupted: checksum mismatch (expected {expected:#010X}, got {found:#010X})"
            ),
            SaveError::SessionActive => write!(f, "Build roads is running"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<bitcode::Error> for SaveError {
    fn from(e: bitcode::Error) -> Self {
        SaveError::Decode(e.to_string())
    }
}

impl From<lz4_flex::block::DecompressError> for SaveError {
    fn from(e: lz4_flex::block::DecompressError) -> Self {
        SaveError::Decompress(e.to_string())
    }
}
