//! Mesh file I/O.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | Object File Format | `.off` | ✓ | ✓ | ASCII, polygons fan-triangulated |
//!
//! # Usage
//!
//! ```no_run
//! use mesh_denoise::io::{load, save};
//!
//! // Load with automatic format detection
//! let mesh = load("model.off").unwrap();
//!
//! save(&mesh, "output.off").unwrap();
//! ```

pub mod off;

use std::path::Path;

use crate::error::{MeshError, Result};
use crate::mesh::TriangleMesh;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Object File Format.
    Off,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "off" => Some(Format::Off),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

fn detect(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a mesh from a file, choosing the format by extension.
pub fn load<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    let mesh = match detect(path)? {
        Format::Off => off::load(path)?,
    };
    log::info!(
        "loaded {}: {} vertices, {} triangles",
        path.display(),
        mesh.num_vertices(),
        mesh.num_triangles()
    );
    Ok(mesh)
}

/// Save a mesh to a file, choosing the format by extension.
pub fn save<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Off => off::save(mesh, path),
    }
}
