//! Error types for mesh-denoise.
//!
//! Structural problems (bad indices, unreadable files, invalid parameters)
//! are reported through [`MeshError`]. Numerical degeneracy during filtering
//! or subdivision is not an error; it is handled locally by the algorithms.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh operations.
#[derive(Error, Debug)]
pub enum MeshError {
    /// A triangle references a vertex that does not exist.
    #[error("triangle {triangle} references invalid vertex index {vertex} (vertex count {vertex_count})")]
    InvalidVertexIndex {
        /// The triangle index.
        triangle: usize,
        /// The invalid vertex index.
        vertex: usize,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A malformed line in a mesh description.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create a parse error for the given 1-based line.
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        MeshError::Parse {
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_param_message() {
        let err = MeshError::invalid_param("sigma_s", -1.0, "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid parameter: sigma_s = -1 (must be positive)"
        );
    }

    #[test]
    fn test_parse_message() {
        let err = MeshError::parse(3, "expected 3 coordinates");
        assert_eq!(err.to_string(), "line 3: expected 3 coordinates");
    }
}
