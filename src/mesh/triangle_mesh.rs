//! Indexed triangle mesh buffers.

use nalgebra::{Point2, Point3, Vector3};

use crate::algo::normals::{planar_tex_coords, vertex_normals, NormalWeighting};
use crate::error::{MeshError, Result};

/// An indexed triangle mesh with per-vertex attributes.
///
/// Positions, normals and texture coordinates are index-aligned and always
/// have the same length. Every triangle index is smaller than the vertex
/// count; this is checked by [`TriangleMesh::new`] and preserved by every
/// operation in [`crate::algo`].
///
/// The mesh also owns the two position snapshots used by the denoiser:
/// the ground truth (taken by the first [`add_noise`](crate::algo::noise::add_noise))
/// and the noisy input (taken by the first
/// [`bilateral_filter`](crate::algo::denoise::bilateral_filter)). Once
/// captured they are never refreshed.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    positions: Vec<Point3<f64>>,
    normals: Vec<Vector3<f64>>,
    tex_coords: Vec<Point2<f64>>,
    triangles: Vec<[usize; 3]>,
    ground_truth: Option<Vec<Point3<f64>>>,
    noisy_initial: Option<Vec<Point3<f64>>>,
}

impl TriangleMesh {
    /// Build a mesh from raw position and triangle buffers.
    ///
    /// Normals and texture coordinates are computed from the positions.
    /// Degenerate and non-manifold triangles are accepted as-is.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidVertexIndex`] if a triangle references a
    /// vertex outside `positions`.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_denoise::mesh::TriangleMesh;
    /// use nalgebra::Point3;
    ///
    /// let positions = vec![
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.5, 1.0, 0.0),
    /// ];
    /// let mesh = TriangleMesh::new(positions, vec![[0, 1, 2]]).unwrap();
    /// assert_eq!(mesh.num_vertices(), 3);
    /// assert_eq!(mesh.normals().len(), 3);
    ///
    /// assert!(TriangleMesh::new(vec![Point3::origin()], vec![[0, 1, 2]]).is_err());
    /// ```
    pub fn new(positions: Vec<Point3<f64>>, triangles: Vec<[usize; 3]>) -> Result<Self> {
        let vertex_count = positions.len();
        for (ti, triangle) in triangles.iter().enumerate() {
            if let Some(&vertex) = triangle.iter().find(|&&v| v >= vertex_count) {
                return Err(MeshError::InvalidVertexIndex {
                    triangle: ti,
                    vertex,
                    vertex_count,
                });
            }
        }

        let mut mesh = Self {
            positions,
            triangles,
            ..Self::default()
        };
        mesh.refresh_attributes();
        Ok(mesh)
    }

    /// A square of two triangles in the `z = 0` plane, centred at the origin.
    ///
    /// ```
    /// use mesh_denoise::mesh::TriangleMesh;
    ///
    /// let plane = TriangleMesh::plane(1.0);
    /// assert_eq!(plane.num_vertices(), 4);
    /// assert_eq!(plane.num_triangles(), 2);
    /// ```
    pub fn plane(half_side: f64) -> Self {
        let s = half_side;
        let positions = vec![
            Point3::new(-s, -s, 0.0),
            Point3::new(s, -s, 0.0),
            Point3::new(s, s, 0.0),
            Point3::new(-s, s, 0.0),
        ];
        let mut mesh = Self {
            positions,
            triangles: vec![[0, 1, 3], [1, 2, 3]],
            ..Self::default()
        };
        mesh.refresh_attributes();
        mesh
    }

    // ==================== Counts ====================

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the mesh has no vertices.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    // ==================== Buffers ====================

    /// Vertex positions.
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub(crate) fn positions_mut(&mut self) -> &mut [Point3<f64>] {
        &mut self.positions
    }

    /// Per-vertex render normals (unit length, zero for isolated vertices).
    pub fn normals(&self) -> &[Vector3<f64>] {
        &self.normals
    }

    /// Per-vertex texture coordinates.
    pub fn tex_coords(&self) -> &[Point2<f64>] {
        &self.tex_coords
    }

    /// Triangle vertex indices.
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Positions as `f32` triples, ready for a vertex buffer upload.
    pub fn position_buffer(&self) -> Vec<[f32; 3]> {
        self.positions
            .iter()
            .map(|p| [p.x as f32, p.y as f32, p.z as f32])
            .collect()
    }

    /// Normals as `f32` triples, ready for a vertex buffer upload.
    pub fn normal_buffer(&self) -> Vec<[f32; 3]> {
        self.normals
            .iter()
            .map(|n| [n.x as f32, n.y as f32, n.z as f32])
            .collect()
    }

    /// Texture coordinates as `f32` pairs, ready for a vertex buffer upload.
    pub fn tex_coord_buffer(&self) -> Vec<[f32; 2]> {
        self.tex_coords
            .iter()
            .map(|uv| [uv.x as f32, uv.y as f32])
            .collect()
    }

    /// Flattened `u32` index buffer, three entries per triangle.
    pub fn index_buffer(&self) -> Vec<u32> {
        self.triangles
            .iter()
            .flat_map(|t| t.iter().map(|&v| v as u32))
            .collect()
    }

    // ==================== Denoise snapshots ====================

    /// Positions captured before the first noise injection, if any.
    pub fn ground_truth(&self) -> Option<&[Point3<f64>]> {
        self.ground_truth.as_deref()
    }

    /// Positions captured at the start of the first filtering pass, if any.
    pub fn noisy_initial(&self) -> Option<&[Point3<f64>]> {
        self.noisy_initial.as_deref()
    }

    /// Capture the ground truth unless it already exists.
    ///
    /// [`add_noise`](crate::algo::noise::add_noise) does this on its own;
    /// call it directly before other perturbations (such as
    /// [`add_normal_noise`](crate::algo::noise::add_normal_noise)) to make
    /// the error measurable afterwards.
    ///
    /// Returns `true` if the snapshot was taken by this call.
    pub fn capture_ground_truth(&mut self) -> bool {
        if self.ground_truth.is_some() {
            return false;
        }
        self.ground_truth = Some(self.positions.clone());
        true
    }

    /// Capture the noisy input unless it already exists.
    ///
    /// Returns `true` if the snapshot was taken by this call.
    pub(crate) fn capture_noisy_initial(&mut self) -> bool {
        if self.noisy_initial.is_some() {
            return false;
        }
        self.noisy_initial = Some(self.positions.clone());
        true
    }

    // ==================== Rewrites ====================

    /// Swap in new geometry produced by a subdivision pass and recompute
    /// normals and texture coordinates. Snapshots are left untouched.
    pub(crate) fn replace_geometry(
        &mut self,
        positions: Vec<Point3<f64>>,
        triangles: Vec<[usize; 3]>,
    ) {
        debug_assert!(triangles
            .iter()
            .all(|t| t.iter().all(|&v| v < positions.len())));
        self.positions = positions;
        self.triangles = triangles;
        self.refresh_attributes();
    }

    /// Recompute per-vertex render normals from the current positions.
    pub fn recompute_vertex_normals(&mut self, weighting: NormalWeighting) {
        self.normals = vertex_normals(&self.positions, &self.triangles, weighting);
    }

    /// Recompute planar texture coordinates from the current positions.
    pub fn recompute_tex_coords(&mut self) {
        self.tex_coords = planar_tex_coords(&self.positions);
    }

    /// Recompute every derived attribute after positions changed.
    pub(crate) fn refresh_attributes(&mut self) {
        self.recompute_vertex_normals(NormalWeighting::Uniform);
        self.recompute_tex_coords();
    }

    /// Remove all geometry and snapshots.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    // ==================== Geometry ====================

    /// A sphere bounding every vertex: the centroid and the largest distance
    /// from it. Returns `None` for an empty mesh.
    pub fn bounding_sphere(&self) -> Option<(Point3<f64>, f64)> {
        if self.positions.is_empty() {
            return None;
        }

        let sum: Vector3<f64> = self.positions.iter().map(|p| p.coords).sum();
        let center = Point3::from(sum / self.positions.len() as f64);
        let radius = self
            .positions
            .iter()
            .map(|p| (p - center).norm())
            .fold(0.0_f64, f64::max);

        Some((center, radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_new_rejects_out_of_range_index() {
        let positions = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        let err = TriangleMesh::new(positions, vec![[0, 1, 2]]).unwrap_err();
        match err {
            MeshError::InvalidVertexIndex {
                triangle,
                vertex,
                vertex_count,
            } => {
                assert_eq!(triangle, 0);
                assert_eq!(vertex, 2);
                assert_eq!(vertex_count, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_attributes_are_index_aligned() {
        let mesh = create_tetrahedron();
        assert_eq!(mesh.normals().len(), mesh.num_vertices());
        assert_eq!(mesh.tex_coords().len(), mesh.num_vertices());
    }

    #[test]
    fn test_empty_mesh_is_allowed() {
        let mesh = TriangleMesh::new(Vec::new(), Vec::new()).unwrap();
        assert!(mesh.is_empty());
        assert_eq!(mesh.num_triangles(), 0);
        assert!(mesh.bounding_sphere().is_none());
    }

    #[test]
    fn test_plane_normals_point_up() {
        let plane = TriangleMesh::plane(2.0);
        for n in plane.normals() {
            assert!((n - Vector3::z()).norm() < 1e-12);
        }
        let uv = plane.tex_coords();
        assert!((uv[0] - Point2::new(0.0, 0.0)).norm() < 1e-12);
        assert!((uv[2] - Point2::new(1.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_snapshots_are_captured_once() {
        let mut mesh = create_tetrahedron();
        assert!(mesh.ground_truth().is_none());

        assert!(mesh.capture_ground_truth());
        mesh.positions_mut()[0] = Point3::new(9.0, 9.0, 9.0);
        assert!(!mesh.capture_ground_truth());

        assert_eq!(mesh.ground_truth().unwrap()[0], Point3::origin());
    }

    #[test]
    fn test_gpu_buffers() {
        let mesh = create_tetrahedron();
        assert_eq!(mesh.index_buffer(), vec![0, 2, 1, 0, 1, 3, 1, 2, 3, 2, 0, 3]);
        assert_eq!(mesh.position_buffer()[3], [0.5, 0.5, 1.0]);
        assert_eq!(mesh.normal_buffer().len(), 4);
        assert_eq!(mesh.tex_coord_buffer().len(), 4);
    }

    #[test]
    fn test_bounding_sphere() {
        let mesh = TriangleMesh::plane(1.0);
        let (center, radius) = mesh.bounding_sphere().unwrap();
        assert!((center - Point3::origin()).norm() < 1e-12);
        assert!((radius - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_clear() {
        let mut mesh = create_tetrahedron();
        mesh.capture_ground_truth();
        mesh.clear();
        assert!(mesh.is_empty());
        assert!(mesh.normals().is_empty());
        assert!(mesh.ground_truth().is_none());
    }
}
