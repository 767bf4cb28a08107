//! Error types for STL repair operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for STL repair operations.
pub type StlResult<T> = Result<T, StlError>;

/// Errors that can occur while loading, validating, or rewriting a binary STL file.
#[derive(Debug, Error)]
pub enum StlError {
    /// File cannot even hold the 84-byte header.
    #[error("file too small to be a binary STL: {actual_size} bytes (need more than 84)")]
    FileTooSmall { actual_size: usize },

    /// File length disagrees with the length implied by the declared triangle count.
    #[error("unexpected file size: expected {expected} bytes, found {actual}")]
    UnexpectedFileSize { expected: usize, actual: usize },

    /// Declared triangle count differs from the number of complete records present.
    /// Positive means the header declares more triangles than the file holds.
    #[error("triangle count mismatch: header differs from records present by {difference}")]
    TriangleCountMismatch { difference: i64 },

    /// Error reading from a file.
    #[error("failed to read STL from {path}: {source}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing to a file.
    #[error("failed to write STL to {path}: {source}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Repair configuration could not be parsed or serialized.
    #[error("invalid repair configuration: {details}")]
    InvalidConfig { details: String },
}

impl StlError {
    /// Whether this error came from the filesystem rather than the file contents.
    pub fn is_io(&self) -> bool {
        matches!(self, StlError::IoRead { .. } | StlError::IoWrite { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StlError::FileTooSmall { actual_size: 12 };
        assert_eq!(
            err.to_string(),
            "file too small to be a binary STL: 12 bytes (need more than 84)"
        );

        let err = StlError::TriangleCountMismatch { difference: -3 };
        assert!(err.to_string().contains("-3"));
    }

    #[test]
    fn test_is_io() {
        let err = StlError::IoRead {
            path: PathBuf::from("missing.stl"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.is_io());
        assert!(!StlError::FileTooSmall { actual_size: 0 }.is_io());
    }
}
