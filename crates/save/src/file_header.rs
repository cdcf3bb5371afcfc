// ---------------------------------------------------------------------------
// file_header – Save file header with magic bytes, version, and checksum
// ---------------------------------------------------------------------------
//
// Header format (24 bytes, fixed-size, little-endian):
//   [0..4]   Magic bytes: "RDNW" (0x52444E57)
//   [4..8]   Save version (u32)
//   [8..12]  Flags (u32: bit 0 = lz4 compressed)
//   [12..16] Uncompressed payload size (u32)
//   [16..20] Stored payload size (u32)
//   [20..24] xxHash32 checksum of the stored payload
//
// On save: encode SaveScene -> maybe compress -> prepend header
// On load: check magic -> check version -> validate checksum -> strip header

use xxhash_rust::xxh32::xxh32;

use crate::save_error::SaveError;
use crate::save_types::CURRENT_SAVE_VERSION;

/// Magic bytes identifying a road network save file.
pub const MAGIC: [u8; 4] = *b"RDNW";

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 24;

/// Flag bit set when the payload is lz4 block compressed.
pub const FLAG_COMPRESSED: u32 = 1;

/// Seed for xxHash32 checksum.
const XXHASH_SEED: u32 = 0;

/// Parsed file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub version: u32,
    pub flags: u32,
    pub uncompressed_size: u32,
    pub payload_size: u32,
    pub checksum: u32,
}

impl FileHeader {
    /// Header for a stored `payload` that decodes to `uncompressed_size` bytes.
    pub fn new(payload: &[u8], uncompressed_size: usize, compressed: bool) -> Self {
        Self {
            version: CURRENT_SAVE_VERSION,
            flags: if compressed { FLAG_COMPRESSED } else { 0 },
            uncompressed_size: uncompressed_size as u32,
            payload_size: payload.len() as u32,
            checksum: xxh32(payload, XXHASH_SEED),
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&MAGIC);
        out[4..8].copy_from_slice(&self.version.to_le_bytes());
        out[8..12].copy_from_slice(&self.flags.to_le_bytes());
        out[12..16].copy_from_slice(&self.uncompressed_size.to_le_bytes());
        out[16..20].copy_from_slice(&self.payload_size.to_le_bytes());
        out[20..24].copy_from_slice(&self.checksum.to_le_bytes());
        out
    }
}

/// Prepend a header to `payload`.
///
/// Returns bytes: [header (24 bytes)] ++ [payload].
pub fn wrap_with_header(payload: &[u8], uncompressed_size: usize, compressed: bool) -> Vec<u8> {
    let header = FileHeader::new(payload, uncompressed_size, compressed);
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(payload);
    out
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Parse and validate the header, returning it with the stored payload.
///
/// # Errors
///
/// - `NotASaveFile` if the magic bytes are missing
/// - `Truncated` if the header or payload is cut short
/// - `VersionMismatch` if the save comes from a newer build
/// - `ChecksumMismatch` if the payload was modified or damaged
pub fn unwrap_header(bytes: &[u8]) -> Result<(FileHeader, &[u8]), SaveError> {
    if bytes.len() < MAGIC.len() || bytes[..4] != MAGIC {
        return Err(SaveError::NotASaveFile);
    }
    if bytes.len() < HEADER_SIZE {
        return Err(SaveError::Truncated {
            expected: HEADER_SIZE,
            found: bytes.len(),
        });
    }

    let header = FileHeader {
        version: read_u32(bytes, 4),
        flags: read_u32(bytes, 8),
        uncompressed_size: read_u32(bytes, 12),
        payload_size: read_u32(bytes, 16),
        checksum: read_u32(bytes, 20),
    };

    if header.version > CURRENT_SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected_max: CURRENT_SAVE_VERSION,
            found: header.version,
        });
    }

    let payload = &bytes[HEADER_SIZE..];
    if payload.len() < header.payload_size as usize {
        return Err(SaveError::Truncated {
            expected: HEADER_SIZE + header.payload_size as usize,
            found: bytes.len(),
        });
    }
    let payload = &payload[..header.payload_size as usize];

    let computed = xxh32(payload, XXHASH_SEED);
    if computed != header.checksum {
        return Err(SaveError::ChecksumMismatch {
            expected: header.checksum,
            found: computed,
        });
    }

    Ok((header, payload))
}
