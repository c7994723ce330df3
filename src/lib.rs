//! # mesh-denoise
//!
//! Triangle mesh subdivision and feature-preserving bilateral denoising.
//!
//! The library works on a flat, index-aligned [`TriangleMesh`](mesh::TriangleMesh)
//! and provides:
//!
//! - **Subdivision**: linear 1-to-4 split and Loop subdivision
//! - **Noise injection**: isotropic or along vertex normals, from a seedable RNG
//! - **Bilateral denoising**: vertices moved along their normals by a
//!   closeness- and height-weighted average of their neighbours
//! - **Error measurement**: distance to a ground-truth snapshot captured
//!   before the first noise injection
//! - **OFF file I/O**
//!
//! ## Quick Start
//!
//! ```no_run
//! use mesh_denoise::prelude::*;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut mesh = mesh_denoise::io::load("bunny.off").unwrap();
//! let mut rng = StdRng::seed_from_u64(42);
//!
//! add_noise(&mut mesh, &NoiseOptions::default(), &mut rng);
//! let report = bilateral_filter(&mut mesh, &BilateralOptions::default(), &mut rng);
//!
//! if let Some(error) = report.error {
//!     println!("error {} -> {}", error.noisy, error.filtered);
//! }
//! mesh_denoise::io::save(&mesh, "denoised.off").unwrap();
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use mesh_denoise::prelude::*;
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//!
//! let triangles = vec![
//!     [0, 2, 1],  // bottom
//!     [0, 1, 3],  // front
//!     [1, 2, 3],  // right
//!     [2, 0, 3],  // left
//! ];
//!
//! let mut mesh = TriangleMesh::new(positions, triangles).unwrap();
//! linear_subdivide(&mut mesh, &SubdivideOptions::new(1));
//! assert_eq!(mesh.num_vertices(), 10);
//! assert_eq!(mesh.num_triangles(), 16);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use mesh_denoise::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::adjacency::NeighborSearch;
    pub use crate::algo::denoise::{bilateral_filter, BilateralOptions, FilterReport};
    pub use crate::algo::error_metric::{compute_error, ErrorReport};
    pub use crate::algo::noise::{add_noise, add_normal_noise, NoiseOptions};
    pub use crate::algo::subdivide::{linear_subdivide, loop_subdivide, SubdivideOptions};
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{Edge, TriangleMesh};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
