//! Core mesh data structures.
//!
//! The primary type is [`TriangleMesh`], a flat, index-aligned buffer set
//! (positions, normals, texture coordinates and triangle indices) that every
//! algorithm in [`crate::algo`] reads and rewrites in place. It is the same
//! layout a renderer uploads to the GPU, so no conversion step sits between
//! processing and display.
//!
//! [`Edge`] is the canonical `(min, max)` vertex pair used as a hash or
//! ordered-map key whenever edges have to be deduplicated.
//!
//! # Construction
//!
//! ```
//! use mesh_denoise::mesh::TriangleMesh;
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let mesh = TriangleMesh::new(positions, vec![[0, 1, 2]]).unwrap();
//! assert_eq!(mesh.num_triangles(), 1);
//! ```

mod edge;
mod triangle_mesh;

pub use edge::Edge;
pub use triangle_mesh::TriangleMesh;
