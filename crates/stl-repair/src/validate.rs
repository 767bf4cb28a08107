//! Header consistency checks and read-only inspection reports.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{StlError, StlResult};
use crate::io::load_stl_bytes;
use crate::normal::is_degenerate_normal;
use crate::scan::{record_count, trailing_bytes, RecordScanner};
use crate::types::{StlHeader, TriangleRecord};

/// Strict check of the declared triangle count against the buffer length.
///
/// A count that disagrees with the number of complete records is reported as
/// [`StlError::TriangleCountMismatch`]. If the count matches but a trailing
/// fragment remains, the length is wrong and [`StlError::UnexpectedFileSize`]
/// is returned.
pub fn check_triangle_count(header: &StlHeader, len: usize) -> StlResult<()> {
    let declared = header.triangle_count as usize;
    let present = record_count(len);

    if declared != present {
        return Err(StlError::TriangleCountMismatch {
            difference: declared as i64 - present as i64,
        });
    }

    let expected = header.expected_file_size();
    if expected != len {
        return Err(StlError::UnexpectedFileSize {
            expected,
            actual: len,
        });
    }

    Ok(())
}

/// Summary of a binary STL file, gathered without modifying it.
#[derive(Debug, Clone, Serialize)]
pub struct StlReport {
    /// Header comment text.
    pub header_text: String,

    /// Total file length in bytes.
    pub file_size: usize,

    /// Triangle count stored in the header.
    pub declared_triangle_count: u32,

    /// Complete 50-byte records actually present.
    pub record_count: usize,

    /// Bytes after the last complete record.
    pub trailing_bytes: usize,

    /// Records whose stored normal is exactly zero.
    pub zero_normal_count: usize,

    /// Header starts with `solid`.
    pub looks_like_ascii: bool,
}

impl StlReport {
    /// Whether a repair pass would patch anything.
    pub fn needs_repair(&self) -> bool {
        self.zero_normal_count > 0
    }

    /// Whether the header count and the file length agree exactly.
    pub fn is_consistent(&self) -> bool {
        self.declared_triangle_count as usize == self.record_count && self.trailing_bytes == 0
    }
}

impl std::fmt::Display for StlReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "STL Report:")?;
        writeln!(f, "  Header: {:?}", self.header_text)?;
        writeln!(f, "  Size: {} bytes", self.file_size)?;
        writeln!(
            f,
            "  Triangles: {} declared, {} present",
            self.declared_triangle_count, self.record_count
        )?;
        if self.trailing_bytes > 0 {
            writeln!(f, "  Trailing bytes: {}", self.trailing_bytes)?;
        }
        writeln!(
            f,
            "  Consistent: {}",
            if self.is_consistent() { "yes" } else { "NO" }
        )?;
        writeln!(f, "  Zero normals: {}", self.zero_normal_count)?;
        if self.looks_like_ascii {
            writeln!(f, "  Note: header starts with \"solid\"")?;
        }
        Ok(())
    }
}

/// Inspect an STL file on disk.
pub fn inspect_stl(path: &Path) -> StlResult<StlReport> {
    let bytes = load_stl_bytes(path)?;
    inspect_stl_bytes(&bytes)
}

/// Inspect an in-memory binary STL buffer.
pub fn inspect_stl_bytes(bytes: &[u8]) -> StlResult<StlReport> {
    let header = StlHeader::parse(bytes)?;

    let zero_normal_count = RecordScanner::new(bytes)
        .filter(|(_, raw)| is_degenerate_normal(&TriangleRecord::decode(raw).normal))
        .count();

    let report = StlReport {
        header_text: header.comment_text(),
        file_size: bytes.len(),
        declared_triangle_count: header.triangle_count,
        record_count: record_count(bytes.len()),
        trailing_bytes: trailing_bytes(bytes.len()),
        zero_normal_count,
        looks_like_ascii: header.looks_like_ascii(),
    };

    if !report.is_consistent() {
        warn!(
            "Header declares {} triangles but {} complete records are present",
            report.declared_triangle_count, report.record_count
        );
    }
    debug!("{} of {} records have zero normals", zero_normal_count, report.record_count);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HEADER_SIZE, RECORD_SIZE};

    fn stl(declared: u32, records: usize, tail: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; HEADER_SIZE + records * RECORD_SIZE + tail];
        bytes[80..84].copy_from_slice(&declared.to_le_bytes());
        bytes
    }

    #[test]
    fn test_consistent_file_passes() {
        let bytes = stl(3, 3, 0);
        let header = StlHeader::parse(&bytes).unwrap();
        assert!(check_triangle_count(&header, bytes.len()).is_ok());
    }

    #[test]
    fn test_count_mismatch() {
        let bytes = stl(5, 3, 0);
        let header = StlHeader::parse(&bytes).unwrap();
        match check_triangle_count(&header, bytes.len()) {
            Err(StlError::TriangleCountMismatch { difference }) => assert_eq!(difference, 2),
            other => panic!("expected TriangleCountMismatch, got {:?}", other),
        }

        let bytes = stl(1, 3, 0);
        let header = StlHeader::parse(&bytes).unwrap();
        match check_triangle_count(&header, bytes.len()) {
            Err(StlError::TriangleCountMismatch { difference }) => assert_eq!(difference, -2),
            other => panic!("expected TriangleCountMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_fragment_is_size_error() {
        let bytes = stl(2, 2, 10);
        let header = StlHeader::parse(&bytes).unwrap();
        match check_triangle_count(&header, bytes.len()) {
            Err(StlError::UnexpectedFileSize { expected, actual }) => {
                assert_eq!(expected, 184);
                assert_eq!(actual, 194);
            }
            other => panic!("expected UnexpectedFileSize, got {:?}", other),
        }
    }

    #[test]
    fn test_inspect_counts_zero_normals() {
        let mut bytes = stl(3, 3, 7);
        // Give the middle record a real normal.
        let off = HEADER_SIZE + RECORD_SIZE;
        bytes[off + 8..off + 12].copy_from_slice(&1.0f32.to_le_bytes());

        let report = inspect_stl_bytes(&bytes).expect("should inspect");
        assert_eq!(report.record_count, 3);
        assert_eq!(report.trailing_bytes, 7);
        assert_eq!(report.zero_normal_count, 2);
        assert!(report.needs_repair());
        assert!(!report.is_consistent());

        let text = report.to_string();
        assert!(text.contains("Zero normals: 2"));
        assert!(text.contains("Trailing bytes: 7"));
    }

    #[test]
    fn test_inspect_rejects_small_buffer() {
        let err = inspect_stl_bytes(&[0u8; 40]).unwrap_err();
        assert!(matches!(err, StlError::FileTooSmall { actual_size: 40 }));
    }
}
