use std::path::PathBuf;
use thiserror::Error;

/// Result type for skullstrip operations
pub type Result<T> = std::result::Result<T, SkullStripError>;

/// Error types for skullstrip operations
#[derive(Error, Debug)]
pub enum SkullStripError {
    /// File extension does not map to a known volume format
    #[error("Unsupported format '{extension}' for {}", .path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// I/O error while reading or writing a file
    #[error("IO error while {operation} {}: {source}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed MINC / NetCDF content
    #[error("Format error: {0}")]
    Format(String),

    /// Volume data does not match its geometry
    #[error("Invalid volume: {0}")]
    InvalidVolume(String),

    /// Mesh topology is inconsistent
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Brain extraction failed
    #[error("Extraction error: {0}")]
    Extraction(String),
}

impl SkullStripError {
    /// Wraps an I/O error with the operation and path it happened on
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SkullStripError::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

// Helper conversions
impl From<String> for SkullStripError {
    fn from(s: String) -> Self {
        SkullStripError::Extraction(s)
    }
}

impl From<&str> for SkullStripError {
    fn from(s: &str) -> Self {
        SkullStripError::Extraction(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_message() {
        let err = SkullStripError::UnsupportedFormat {
            path: PathBuf::from("/data/brain.nii"),
            extension: "nii".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Unsupported format"));
        assert!(msg.contains("nii"));
        assert!(msg.contains("/data/brain.nii"));
    }

    #[test]
    fn test_io_error_keeps_context() {
        let err = SkullStripError::io(
            "reading",
            "missing.mnc",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        let msg = err.to_string();
        assert!(msg.contains("reading"));
        assert!(msg.contains("missing.mnc"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_string_converts_to_extraction_error() {
        let err: SkullStripError = "surface collapsed".into();
        assert!(matches!(err, SkullStripError::Extraction(_)));
    }
}
