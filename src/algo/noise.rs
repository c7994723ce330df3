//! Synthetic noise injection.
//!
//! Both generators draw integer samples uniformly from
//! `[-half_range, half_range)` and scale them, so the default options give
//! perturbations in `[-0.005, 0.0049]` with a step of `1e-4`. All randomness
//! comes from the caller's RNG; seed it for reproducible runs.
//!
//! # Example
//!
//! ```
//! use mesh_denoise::algo::noise::{add_noise, NoiseOptions};
//! use mesh_denoise::mesh::TriangleMesh;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut mesh = TriangleMesh::plane(1.0);
//! let mut rng = StdRng::seed_from_u64(7);
//!
//! add_noise(&mut mesh, &NoiseOptions::default(), &mut rng);
//! assert!(mesh.ground_truth().is_some());
//! ```

use rand::Rng;

use crate::error::{MeshError, Result};
use crate::mesh::TriangleMesh;

use super::normals::estimate_vertex_normals;

/// Amplitude of the noise samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseOptions {
    half_range: i32,
    scale: f64,
}

impl Default for NoiseOptions {
    fn default() -> Self {
        Self {
            half_range: 50,
            scale: 1e-4,
        }
    }
}

impl NoiseOptions {
    /// Create validated noise options.
    ///
    /// # Errors
    ///
    /// `half_range` must be at least 1 and `scale` finite and non-negative.
    pub fn new(half_range: i32, scale: f64) -> Result<Self> {
        if half_range < 1 {
            return Err(MeshError::invalid_param(
                "half_range",
                half_range,
                "must be at least 1",
            ));
        }
        if !scale.is_finite() || scale < 0.0 {
            return Err(MeshError::invalid_param(
                "scale",
                scale,
                "must be finite and non-negative",
            ));
        }
        Ok(Self { half_range, scale })
    }

    /// Samples are integers in `[-half_range, half_range)`.
    pub fn half_range(&self) -> i32 {
        self.half_range
    }

    /// Multiplier applied to each integer sample.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.random_range(-self.half_range..self.half_range) as f64 * self.scale
    }
}

/// Perturb every coordinate of every vertex by an independent sample.
///
/// The first call on a mesh captures its ground-truth snapshot before
/// perturbing. Render normals and texture coordinates are recomputed.
pub fn add_noise<R: Rng + ?Sized>(mesh: &mut TriangleMesh, options: &NoiseOptions, rng: &mut R) {
    if mesh.capture_ground_truth() {
        log::debug!("captured ground truth ({} vertices)", mesh.num_vertices());
    }

    for p in mesh.positions_mut() {
        p.x += options.sample(rng);
        p.y += options.sample(rng);
        p.z += options.sample(rng);
    }

    mesh.refresh_attributes();
    log::info!("added isotropic noise to {} vertices", mesh.num_vertices());
}

/// Displace every vertex along its area-weighted normal by one sample.
///
/// Vertices whose weighted normal is undefined (isolated vertices, or
/// vertices touching a zero-area triangle) become NaN. Snapshots are not
/// touched.
pub fn add_normal_noise<R: Rng + ?Sized>(
    mesh: &mut TriangleMesh,
    options: &NoiseOptions,
    rng: &mut R,
) {
    let normals = estimate_vertex_normals(mesh.positions(), mesh.triangles());

    for (p, n) in mesh.positions_mut().iter_mut().zip(&normals) {
        *p += n * options.sample(rng);
    }

    mesh.refresh_attributes();
    log::info!("added normal noise to {} vertices", mesh.num_vertices());
}
