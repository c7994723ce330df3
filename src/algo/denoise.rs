//! Bilateral mesh denoising.
//!
//! Each vertex is moved along its area-weighted normal by a weighted average
//! of the signed heights of its spatial neighbours above the tangent plane:
//!
//! ```text
//! t = ‖p − q‖            (closeness)
//! h = (q − p) · n        (height above the tangent plane)
//! w = exp(−t² / 2σ_c²) · exp(−h² / 2σ_s²)
//! p' = p + n · Σ w·h / Σ w
//! ```
//!
//! Neighbours are all vertices within `2σ_c`, not just the one-ring. `σ_s`
//! controls feature preservation: neighbours whose height differs by much
//! more than `σ_s` barely contribute.
//!
//! Vertices are updated in place and in index order, so later vertices of a
//! sweep already see the moved positions of earlier ones.
//!
//! # Example
//!
//! ```
//! use mesh_denoise::algo::denoise::{bilateral_filter, BilateralOptions};
//! use mesh_denoise::algo::noise::{add_noise, NoiseOptions};
//! use mesh_denoise::mesh::TriangleMesh;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut mesh = TriangleMesh::plane(1.0);
//! let mut rng = StdRng::seed_from_u64(0);
//! add_noise(&mut mesh, &NoiseOptions::default(), &mut rng);
//!
//! let options = BilateralOptions::new(3, 0.01).unwrap();
//! let report = bilateral_filter(&mut mesh, &options, &mut rng);
//! assert_eq!(report.iterations, 3);
//! assert!(report.error.is_some());
//! ```
//!
//! # Reference
//!
//! Fleishman, S., Drori, I., & Cohen-Or, D. (2003). "Bilateral mesh denoising."
//! ACM SIGGRAPH 2003.

use nalgebra::{Point3, Vector3};
use rand::Rng;

use crate::error::{MeshError, Result};
use crate::mesh::TriangleMesh;

use super::adjacency::{distance_neighborhood, triangle_incidence, NeighborSearch};
use super::error_metric::{compute_error, ErrorReport};
use super::normals::estimate_vertex_normals;

/// Options for bilateral denoising.
///
/// Every setter validates its argument, so a constructed value is always
/// usable by [`bilateral_filter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BilateralOptions {
    iterations: usize,
    sigma_s: f64,
    sigma_c: Option<f64>,
    search: NeighborSearch,
}

impl Default for BilateralOptions {
    fn default() -> Self {
        Self {
            iterations: 5,
            sigma_s: 0.001,
            sigma_c: None,
            search: NeighborSearch::BruteForce,
        }
    }
}

impl BilateralOptions {
    /// Create options with the given number of sweeps and feature scale.
    ///
    /// ```
    /// use mesh_denoise::algo::denoise::BilateralOptions;
    ///
    /// assert!(BilateralOptions::new(5, 0.001).is_ok());
    /// assert!(BilateralOptions::new(0, 0.001).is_err());
    /// assert!(BilateralOptions::new(5, -1.0).is_err());
    /// ```
    pub fn new(iterations: usize, sigma_s: f64) -> Result<Self> {
        Self::default()
            .with_iterations(iterations)?
            .with_sigma_s(sigma_s)
    }

    /// Set the number of filtering sweeps (must be positive).
    pub fn with_iterations(mut self, iterations: usize) -> Result<Self> {
        if iterations == 0 {
            return Err(MeshError::invalid_param(
                "iterations",
                iterations,
                "must be positive",
            ));
        }
        self.iterations = iterations;
        Ok(self)
    }

    /// Set the feature-preservation scale `σ_s`.
    pub fn with_sigma_s(mut self, sigma_s: f64) -> Result<Self> {
        self.sigma_s = positive("sigma_s", sigma_s)?;
        Ok(self)
    }

    /// Fix the spatial scale `σ_c` instead of estimating it from the mesh.
    pub fn with_sigma_c(mut self, sigma_c: f64) -> Result<Self> {
        self.sigma_c = Some(positive("sigma_c", sigma_c)?);
        Ok(self)
    }

    /// Set how the `2σ_c` neighbourhoods are gathered.
    pub fn with_search(mut self, search: NeighborSearch) -> Self {
        self.search = search;
        self
    }

    /// Number of filtering sweeps.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Feature-preservation scale `σ_s`.
    pub fn sigma_s(&self) -> f64 {
        self.sigma_s
    }

    /// Fixed spatial scale, if any.
    pub fn sigma_c(&self) -> Option<f64> {
        self.sigma_c
    }

    /// Neighbourhood search strategy.
    pub fn search(&self) -> NeighborSearch {
        self.search
    }
}

fn positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(MeshError::invalid_param(
            name,
            value,
            "must be finite and positive",
        ))
    }
}

/// Summary of a [`bilateral_filter`] run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterReport {
    /// Spatial scale used for every sweep.
    pub sigma_c: f64,
    /// Number of sweeps performed.
    pub iterations: usize,
    /// Vertex updates rejected because they produced NaN.
    pub discarded_updates: usize,
    /// Error against the ground truth, when it can be computed.
    pub error: Option<ErrorReport>,
}

/// Result of a single [`denoise_point`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointUpdate {
    /// The vertex was moved along its normal.
    Moved,
    /// The neighbourhood was empty; the vertex was left alone.
    Unchanged,
    /// The computed position had a NaN coordinate and was rejected.
    Discarded,
}

/// Estimate `σ_c` from a single random vertex: the largest distance from it
/// to any corner of its incident triangles.
///
/// Returns `0.0` for an empty mesh or an isolated sample vertex.
pub fn estimate_sigma_c<R: Rng + ?Sized>(
    positions: &[Point3<f64>],
    triangles: &[[usize; 3]],
    incidence: &[Vec<usize>],
    rng: &mut R,
) -> f64 {
    if positions.is_empty() {
        return 0.0;
    }

    let v = rng.random_range(0..positions.len());
    let p = positions[v];

    incidence[v]
        .iter()
        .flat_map(|&t| triangles[t])
        .map(|corner| (positions[corner] - p).norm())
        .fold(0.0, f64::max)
}

/// Move vertex `v` along `normals[v]` using the bilateral weights of
/// `neighbors`.
///
/// Positions are read and written in place. An empty neighbourhood leaves
/// the vertex bit-identical. If the result has a NaN coordinate (zero total
/// weight, or an undefined normal) the old position is kept.
///
/// ```
/// use mesh_denoise::algo::denoise::{denoise_point, PointUpdate};
/// use nalgebra::{Point3, Vector3};
///
/// let mut positions = vec![Point3::new(0.1, 0.2, 0.3)];
/// let normals = vec![Vector3::z()];
/// let update = denoise_point(&mut positions, &normals, &[], 0, 1.0, 1.0);
/// assert_eq!(update, PointUpdate::Unchanged);
/// assert_eq!(positions[0], Point3::new(0.1, 0.2, 0.3));
/// ```
pub fn denoise_point(
    positions: &mut [Point3<f64>],
    normals: &[Vector3<f64>],
    neighbors: &[usize],
    v: usize,
    sigma_c: f64,
    sigma_s: f64,
) -> PointUpdate {
    if neighbors.is_empty() {
        return PointUpdate::Unchanged;
    }

    let p = positions[v];
    let n = normals[v];
    let two_sigma_c_sq = 2.0 * sigma_c * sigma_c;
    let two_sigma_s_sq = 2.0 * sigma_s * sigma_s;

    let mut weighted_sum = 0.0;
    let mut normalizer = 0.0;
    for &j in neighbors {
        let q = positions[j];
        let t = (p - q).norm();
        let h = (q - p).dot(&n);
        let w_c = (-t * t / two_sigma_c_sq).exp();
        let w_s = (-h * h / two_sigma_s_sq).exp();
        weighted_sum += w_c * w_s * h;
        normalizer += w_c * w_s;
    }

    let moved = p + n * (weighted_sum / normalizer);
    if moved.coords.iter().any(|c| c.is_nan()) {
        return PointUpdate::Discarded;
    }

    positions[v] = moved;
    PointUpdate::Moved
}

/// Run the bilateral filter on the current positions.
///
/// The first call captures the noisy snapshot. `σ_c` is taken from the
/// options or estimated once with [`estimate_sigma_c`]. Each sweep rebuilds
/// the `2σ_c` neighbourhoods and the weighted normals from the current
/// positions before updating every vertex. Render attributes are refreshed
/// and the error against the ground truth is computed at the end.
pub fn bilateral_filter<R: Rng + ?Sized>(
    mesh: &mut TriangleMesh,
    options: &BilateralOptions,
    rng: &mut R,
) -> FilterReport {
    log::info!("sigma_s = {}", options.sigma_s);

    if mesh.capture_noisy_initial() {
        log::debug!("captured noisy input ({} vertices)", mesh.num_vertices());
    }

    let incidence = triangle_incidence(mesh.num_vertices(), mesh.triangles());
    let sigma_c = match options.sigma_c {
        Some(sigma_c) => sigma_c,
        None => estimate_sigma_c(mesh.positions(), mesh.triangles(), &incidence, rng),
    };
    log::info!("sigma_c = {sigma_c}");
    if sigma_c == 0.0 && !mesh.is_empty() {
        log::warn!("sigma_c is zero; vertices will not move");
    }

    let mut discarded_updates = 0;
    for iteration in 0..options.iterations {
        let neighborhoods = distance_neighborhood(mesh.positions(), 2.0 * sigma_c, options.search);
        let normals = estimate_vertex_normals(mesh.positions(), mesh.triangles());

        let positions = mesh.positions_mut();
        let mut discarded = 0;
        for (v, neighbors) in neighborhoods.iter().enumerate() {
            let update = denoise_point(positions, &normals, neighbors, v, sigma_c, options.sigma_s);
            if update == PointUpdate::Discarded {
                log::debug!("vertex {v}: NaN update discarded");
                discarded += 1;
            }
        }

        if discarded > 0 {
            log::warn!(
                "iteration {}: discarded {discarded} NaN updates",
                iteration + 1
            );
        }
        log::debug!("iteration {}/{} done", iteration + 1, options.iterations);
        discarded_updates += discarded;
    }

    mesh.refresh_attributes();
    log::info!("bilateral filtering applied");

    FilterReport {
        sigma_c,
        iterations: options.iterations,
        discarded_updates,
        error: compute_error(mesh),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::noise::{add_noise, add_normal_noise, NoiseOptions};
    use crate::algo::subdivide::{linear_subdivide, SubdivideOptions};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn create_tetrahedron() -> TriangleMesh {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let triangles = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        TriangleMesh::new(positions, triangles).unwrap()
    }

    #[test]
    fn test_options_validation() {
        let defaults = BilateralOptions::default();
        assert_eq!(defaults.iterations(), 5);
        assert_eq!(defaults.sigma_s(), 0.001);
        assert_eq!(defaults.sigma_c(), None);

        assert!(BilateralOptions::default().with_sigma_s(0.0).is_err());
        assert!(BilateralOptions::default().with_sigma_s(f64::INFINITY).is_err());
        assert!(BilateralOptions::default().with_sigma_c(-0.5).is_err());
        assert!(BilateralOptions::default().with_sigma_c(f64::NAN).is_err());
        assert!(BilateralOptions::default().with_iterations(0).is_err());

        let options = BilateralOptions::default()
            .with_sigma_c(0.25)
            .unwrap()
            .with_search(NeighborSearch::Grid);
        assert_eq!(options.sigma_c(), Some(0.25));
        assert_eq!(options.search(), NeighborSearch::Grid);
    }

    #[test]
    fn test_empty_neighborhood_is_bit_identical() {
        let p = Point3::new(0.123456789, -9.87654321, 1e-17);
        let mut positions = vec![p];
        let normals = vec![Vector3::new(f64::NAN, 0.0, 0.0)];

        let update = denoise_point(&mut positions, &normals, &[], 0, 0.5, 0.001);

        assert_eq!(update, PointUpdate::Unchanged);
        assert_eq!(positions[0].x.to_bits(), p.x.to_bits());
        assert_eq!(positions[0].y.to_bits(), p.y.to_bits());
        assert_eq!(positions[0].z.to_bits(), p.z.to_bits());
    }

    #[test]
    fn test_raised_vertex_moves_to_plane() {
        let mut positions = vec![
            Point3::new(0.0, 0.0, 0.01),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
        ];
        let normals = vec![Vector3::z(); 5];

        let update = denoise_point(&mut positions, &normals, &[1, 2, 3, 4], 0, 1.0, 0.1);

        assert_eq!(update, PointUpdate::Moved);
        assert!(positions[0].z.abs() < 1e-12);
        assert_eq!(positions[0].x, 0.0);
        assert_eq!(positions[0].y, 0.0);
    }

    #[test]
    fn test_nan_update_is_discarded() {
        let mut positions = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let normals = vec![Vector3::new(f64::NAN, f64::NAN, f64::NAN); 2];

        let update = denoise_point(&mut positions, &normals, &[1], 0, 1.0, 0.1);

        assert_eq!(update, PointUpdate::Discarded);
        assert_eq!(positions[0], Point3::origin());
    }

    #[test]
    fn test_zero_weight_update_is_discarded() {
        // Height 1 with sigma_s 1e-3: the range weight underflows to zero
        let mut positions = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 1.0)];
        let normals = vec![Vector3::z(); 2];

        let update = denoise_point(&mut positions, &normals, &[1], 0, 1.0, 1e-3);

        assert_eq!(update, PointUpdate::Discarded);
        assert_eq!(positions[0], Point3::origin());
    }

    #[test]
    fn test_sigma_c_estimate() {
        let mesh = TriangleMesh::plane(1.0);
        let incidence = triangle_incidence(mesh.num_vertices(), mesh.triangles());
        let mut rng = StdRng::seed_from_u64(11);

        let sigma_c = estimate_sigma_c(mesh.positions(), mesh.triangles(), &incidence, &mut rng);

        // Vertices 1 and 3 see the diagonal, vertices 0 and 2 only the sides
        let side = 2.0;
        let diagonal = 2.0 * 2.0_f64.sqrt();
        assert!((sigma_c - side).abs() < 1e-12 || (sigma_c - diagonal).abs() < 1e-12);

        let empty = estimate_sigma_c(&[], &[], &[], &mut rng);
        assert_eq!(empty, 0.0);
    }

    #[test]
    fn test_tetrahedron_updates_all_discarded() {
        let mut mesh = create_tetrahedron();
        let mut rng = StdRng::seed_from_u64(2024);

        add_noise(&mut mesh, &NoiseOptions::default(), &mut rng);
        let noisy = mesh.positions().to_vec();
        let report = bilateral_filter(&mut mesh, &BilateralOptions::default(), &mut rng);

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_triangles(), 4);
        assert_eq!(report.iterations, 5);

        // Neighbour heights are far above sigma_s, so every range weight
        // underflows and each of the 4 x 5 updates is NaN.
        assert_eq!(report.discarded_updates, 20);
        assert_eq!(mesh.positions(), noisy.as_slice());

        let error = report.error.unwrap();
        assert_eq!(error.filtered, error.noisy);
        assert_eq!(error.skipped, 0);
    }

    #[test]
    fn test_zero_sigma_c_leaves_vertices_unchanged() {
        let positions = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let mut mesh = TriangleMesh::new(positions.clone(), Vec::new()).unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let report = bilateral_filter(&mut mesh, &BilateralOptions::default(), &mut rng);

        // Isolated sample vertex, so the radius is zero and no vertex has neighbours.
        assert_eq!(report.sigma_c, 0.0);
        assert_eq!(report.discarded_updates, 0);
        assert_eq!(mesh.positions(), positions.as_slice());
    }

    #[test]
    fn test_clean_plane_is_fixed_point() {
        let mut mesh = TriangleMesh::plane(1.0);
        let mut rng = StdRng::seed_from_u64(5);
        let zero = NoiseOptions::new(50, 0.0).unwrap();

        add_noise(&mut mesh, &zero, &mut rng);
        let report = bilateral_filter(&mut mesh, &BilateralOptions::default(), &mut rng);

        let error = report.error.unwrap();
        assert_eq!(error.noisy, 0.0);
        assert_eq!(error.filtered, 0.0);
        assert_eq!(report.discarded_updates, 0);
    }

    #[test]
    fn test_noisy_snapshot_taken_once() {
        let mut mesh = create_tetrahedron();
        let mut rng = StdRng::seed_from_u64(8);
        add_noise(&mut mesh, &NoiseOptions::default(), &mut rng);
        let noisy = mesh.positions().to_vec();

        let options = BilateralOptions::new(1, 0.01).unwrap();
        bilateral_filter(&mut mesh, &options, &mut rng);
        add_noise(&mut mesh, &NoiseOptions::default(), &mut rng);
        bilateral_filter(&mut mesh, &options, &mut rng);

        assert_eq!(mesh.noisy_initial().unwrap(), noisy.as_slice());
    }

    #[test]
    fn test_grid_search_matches_brute_force() {
        let mut base = TriangleMesh::plane(1.0);
        linear_subdivide(&mut base, &SubdivideOptions::new(3));
        add_noise(&mut base, &NoiseOptions::default(), &mut StdRng::seed_from_u64(3));

        let options = BilateralOptions::new(2, 0.01)
            .unwrap()
            .with_sigma_c(0.3)
            .unwrap();

        let mut brute = base.clone();
        let mut grid = base.clone();
        bilateral_filter(&mut brute, &options, &mut StdRng::seed_from_u64(1));
        bilateral_filter(
            &mut grid,
            &options.with_search(NeighborSearch::Grid),
            &mut StdRng::seed_from_u64(1),
        );

        assert_eq!(brute.positions(), grid.positions());
    }

    #[test]
    fn test_filter_reduces_error_on_noisy_plane() {
        let mut mesh = TriangleMesh::plane(1.0);
        linear_subdivide(&mut mesh, &SubdivideOptions::new(3));
        let mut rng = StdRng::seed_from_u64(17);

        // Perturb heights only
        mesh.capture_ground_truth();
        add_normal_noise(&mut mesh, &NoiseOptions::default(), &mut rng);

        let options = BilateralOptions::new(3, 0.01)
            .unwrap()
            .with_sigma_c(0.3)
            .unwrap();
        let report = bilateral_filter(&mut mesh, &options, &mut rng);

        let error = report.error.unwrap();
        assert!(error.filtered < error.noisy);
    }
}
