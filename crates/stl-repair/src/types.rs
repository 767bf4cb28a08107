//! Binary STL record layout and repair configuration.

use byteorder::{ByteOrder, LittleEndian};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{StlError, StlResult};

/// Length of the free-form header comment.
pub const HEADER_COMMENT_SIZE: usize = 80;

/// Header comment plus the little-endian u32 triangle count.
pub const HEADER_SIZE: usize = 84;

/// One triangle record: normal, three vertices, attribute byte count.
pub const RECORD_SIZE: usize = 50;

/// Bytes occupied by the normal at the start of each record.
pub const NORMAL_SIZE: usize = 12;

const VERTEX1_OFFSET: usize = 12;
const VERTEX2_OFFSET: usize = 24;
const VERTEX3_OFFSET: usize = 36;
const ATTRIBUTE_OFFSET: usize = 48;

/// The 84-byte binary STL header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StlHeader {
    /// Raw 80-byte comment, usually space or NUL padded.
    pub comment: [u8; HEADER_COMMENT_SIZE],

    /// Triangle count as declared by the producer. Not trusted.
    pub triangle_count: u32,
}

impl StlHeader {
    /// Parse the header from the start of a file buffer.
    ///
    /// A buffer of 84 bytes or fewer is rejected with [`StlError::FileTooSmall`]:
    /// it cannot hold a header followed by any record data.
    pub fn parse(bytes: &[u8]) -> StlResult<Self> {
        if bytes.len() <= HEADER_SIZE {
            return Err(StlError::FileTooSmall {
                actual_size: bytes.len(),
            });
        }

        let mut comment = [0u8; HEADER_COMMENT_SIZE];
        comment.copy_from_slice(&bytes[..HEADER_COMMENT_SIZE]);
        let triangle_count = LittleEndian::read_u32(&bytes[HEADER_COMMENT_SIZE..HEADER_SIZE]);

        Ok(Self {
            comment,
            triangle_count,
        })
    }

    /// Header comment as text, with NUL and whitespace padding removed.
    pub fn comment_text(&self) -> String {
        String::from_utf8_lossy(&self.comment)
            .trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
            .to_string()
    }

    /// Whether the header begins like an ASCII STL (`solid ...`).
    ///
    /// Many binary exporters also write `solid` here, so this is a hint only.
    pub fn looks_like_ascii(&self) -> bool {
        self.comment_text()
            .trim_start()
            .to_ascii_lowercase()
            .starts_with("solid")
    }

    /// File length implied by the declared triangle count.
    pub fn expected_file_size(&self) -> usize {
        HEADER_SIZE + self.triangle_count as usize * RECORD_SIZE
    }
}

/// A decoded 50-byte triangle record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleRecord {
    /// Stored facet normal.
    pub normal: Vector3<f32>,

    /// Vertex positions in file order.
    pub vertices: [Vector3<f32>; 3],

    /// Opaque trailing field, passed through untouched.
    pub attribute_byte_count: u16,
}

impl TriangleRecord {
    /// Decode a record field by field from its little-endian byte layout.
    pub fn decode(bytes: &[u8; RECORD_SIZE]) -> Self {
        Self {
            normal: read_vector(&bytes[..VERTEX1_OFFSET]),
            vertices: [
                read_vector(&bytes[VERTEX1_OFFSET..VERTEX2_OFFSET]),
                read_vector(&bytes[VERTEX2_OFFSET..VERTEX3_OFFSET]),
                read_vector(&bytes[VERTEX3_OFFSET..ATTRIBUTE_OFFSET]),
            ],
            attribute_byte_count: LittleEndian::read_u16(&bytes[ATTRIBUTE_OFFSET..RECORD_SIZE]),
        }
    }
}

fn read_vector(bytes: &[u8]) -> Vector3<f32> {
    Vector3::new(
        LittleEndian::read_f32(&bytes[0..4]),
        LittleEndian::read_f32(&bytes[4..8]),
        LittleEndian::read_f32(&bytes[8..12]),
    )
}

/// Encode a normal as the 12 bytes that open a record.
pub fn encode_normal(normal: &Vector3<f32>) -> [u8; NORMAL_SIZE] {
    let mut out = [0u8; NORMAL_SIZE];
    LittleEndian::write_f32(&mut out[0..4], normal.x);
    LittleEndian::write_f32(&mut out[4..8], normal.y);
    LittleEndian::write_f32(&mut out[8..12], normal.z);
    out
}

/// Unit the mesh coordinates are expressed in.
///
/// Accepted and reported, but not applied to any computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitScale {
    #[default]
    Meter,
    Millimeter,
}

impl UnitScale {
    /// Scale factor relative to meters.
    pub fn factor(self) -> f32 {
        match self {
            UnitScale::Meter => 1.0,
            UnitScale::Millimeter => 0.001,
        }
    }
}

/// How much the header's triangle count is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Scan every complete record to the end of the buffer, ignore the declared count.
    #[default]
    Lenient,
    /// Reject files whose length disagrees with the declared count.
    Strict,
}

/// How the patched buffer is committed to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Overwrite the target file directly.
    #[default]
    InPlace,
    /// Write a sibling temporary file and rename it over the target.
    AtomicRename,
}

/// Options for [`repair_stl_normals`](crate::repair_stl_normals).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairOptions {
    /// Coordinate unit of the mesh. Currently inert.
    pub unit_scale: UnitScale,

    /// Reserved for print-orientation fixes. Currently inert.
    pub correct_for_printing: bool,

    /// Header triangle count handling.
    pub validation: ValidationMode,

    /// Commit strategy for the patched file.
    pub write_mode: WriteMode,

    /// Scan records on the rayon thread pool.
    pub parallel: bool,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            unit_scale: UnitScale::Meter,
            correct_for_printing: true,
            validation: ValidationMode::Lenient,
            write_mode: WriteMode::InPlace,
            parallel: false,
        }
    }
}

impl RepairOptions {
    /// Parse options from TOML. Missing keys fall back to defaults.
    pub fn from_toml(s: &str) -> StlResult<Self> {
        toml::from_str(s).map_err(|e| StlError::InvalidConfig {
            details: e.to_string(),
        })
    }

    /// Serialize options to TOML.
    pub fn to_toml(&self) -> StlResult<String> {
        toml::to_string_pretty(self).map_err(|e| StlError::InvalidConfig {
            details: e.to_string(),
        })
    }
}
