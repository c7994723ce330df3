//! Loop subdivision for triangle meshes.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use nalgebra::Point3;

use crate::mesh::{Edge, TriangleMesh};

use super::{midpoint, split_one_to_four, EdgeVisit, SubdivideOptions};

/// Performs Loop subdivision on a triangle mesh.
///
/// Each pass quadruples the number of triangles. All weights are evaluated
/// against the positions from before the pass.
///
/// # Vertex Rules
///
/// - **Interior edge vertex**: `3/8 * (v0 + v1) + 1/8 * (v_left + v_right)`
/// - **Boundary edge vertex**: `1/2 * (v0 + v1)`
/// - **Interior vertex of valence n**: `(1 - α) * v + α/n * Σ(neighbors)`
/// - **Boundary vertex**: `3/4 * v + 1/8 * Σ(boundary neighbors)`
///
/// An edge is "interior" for a vertex if two of the vertex's incident
/// triangles contain it. The first boundary edge met (in ascending edge
/// order) switches the vertex to the boundary rule; interior neighbours
/// already accumulated are dropped at that point, later ones are ignored.
pub fn loop_subdivide(mesh: &mut TriangleMesh, options: &SubdivideOptions) {
    for _ in 0..options.iterations {
        loop_subdivide_once(mesh);
    }
}

/// Perform one iteration of Loop subdivision.
pub fn loop_subdivide_once(mesh: &mut TriangleMesh) {
    let old = mesh.positions();

    // Even vertices
    let rings = edge_rings(old.len(), mesh.triangles());
    let mut positions: Vec<Point3<f64>> = rings
        .iter()
        .enumerate()
        .map(|(i, ring)| relax_even_vertex(old, i, ring))
        .collect();

    // Odd vertices
    let triangles = split_one_to_four(mesh.triangles(), &mut positions, |visit, odd| match visit {
        EdgeVisit::First { edge, .. } => *odd = midpoint(old, edge),
        EdgeVisit::Repeat {
            first_opposite,
            opposite,
        } => {
            *odd = Point3::from(
                odd.coords * 0.75 + old[first_opposite].coords / 8.0 + old[opposite].coords / 8.0,
            );
        }
    });

    log::info!("loop subdivision: {} vertices", positions.len());

    mesh.replace_geometry(positions, triangles);
}

/// Loop vertex weight `α(n) = (40 − (3 + 2·cos(2π/n))²) / 64`.
///
/// `α(3) = 9/16` and `α(6) = 3/8`.
///
/// ```
/// use mesh_denoise::algo::subdivide::loop_alpha;
///
/// assert!((loop_alpha(6) - 0.375).abs() < 1e-12);
/// ```
pub fn loop_alpha(valence: usize) -> f64 {
    let c = 3.0 + 2.0 * (2.0 * PI / valence as f64).cos();
    (40.0 - c * c) / 64.0
}

/// Per-neighbour weight `β(n) = α(n) / n`. For the regular valence 6 this is `1/16`.
pub fn loop_beta(valence: usize) -> f64 {
    loop_alpha(valence) / valence as f64
}

/// For every vertex, the edges of its incident triangles that contain it,
/// each mapped to `1` if seen in one triangle and `2` if seen in more.
fn edge_rings(vertex_count: usize, triangles: &[[usize; 3]]) -> Vec<BTreeMap<Edge, u8>> {
    let mut rings = vec![BTreeMap::new(); vertex_count];

    for &[a, b, c] in triangles {
        let ab = Edge::new(a, b);
        let bc = Edge::new(b, c);
        let ca = Edge::new(c, a);

        for (v, edges) in [(a, [ab, ca]), (b, [ab, bc]), (c, [ca, bc])] {
            for edge in edges {
                rings[v]
                    .entry(edge)
                    .and_modify(|count| *count = 2)
                    .or_insert(1_u8);
            }
        }
    }

    rings
}

fn relax_even_vertex(old: &[Point3<f64>], i: usize, ring: &BTreeMap<Edge, u8>) -> Point3<f64> {
    let n = ring.len();
    if n == 0 {
        return old[i];
    }

    let alpha = loop_alpha(n);
    let beta = alpha / n as f64;
    let mut pos = old[i].coords * (1.0 - alpha);
    let mut on_boundary = false;

    for (edge, &count) in ring {
        let neighbor = old[edge.other(i)].coords;
        if !on_boundary {
            if count == 2 {
                pos += neighbor * beta;
            } else {
                on_boundary = true;
                pos = old[i].coords * 0.75 + neighbor * 0.125;
            }
        } else if count != 2 {
            pos += neighbor * 0.125;
        }
    }

    Point3::from(pos)
}
