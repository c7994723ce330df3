//! Uniform linear 1-to-4 split.

use crate::mesh::TriangleMesh;

use super::{midpoint, split_one_to_four, EdgeVisit, SubdivideOptions};

/// Performs `options.iterations` linear split passes.
///
/// Each pass inserts a vertex at the midpoint of every edge and replaces each
/// triangle by four. Original vertices do not move.
///
/// # Example
///
/// ```
/// use mesh_denoise::algo::subdivide::{linear_subdivide, SubdivideOptions};
/// use mesh_denoise::mesh::TriangleMesh;
/// use nalgebra::Point3;
///
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let mut mesh = TriangleMesh::new(positions, vec![[0, 1, 2]]).unwrap();
///
/// linear_subdivide(&mut mesh, &SubdivideOptions::new(2));
/// assert_eq!(mesh.num_triangles(), 16);
/// assert_eq!(mesh.num_vertices(), 15);
/// ```
pub fn linear_subdivide(mesh: &mut TriangleMesh, options: &SubdivideOptions) {
    for _ in 0..options.iterations {
        linear_subdivide_once(mesh);
    }
}

/// Perform a single linear split pass.
pub fn linear_subdivide_once(mesh: &mut TriangleMesh) {
    let old_positions = mesh.positions();
    let mut positions = old_positions.to_vec();

    let triangles = split_one_to_four(mesh.triangles(), &mut positions, |visit, odd| {
        if let EdgeVisit::First { edge, .. } = visit {
            *odd = midpoint(old_positions, edge);
        }
    });

    log::debug!(
        "linear split: {} -> {} vertices, {} -> {} triangles",
        mesh.num_vertices(),
        positions.len(),
        mesh.num_triangles(),
        triangles.len()
    );

    mesh.replace_geometry(positions, triangles);
}
