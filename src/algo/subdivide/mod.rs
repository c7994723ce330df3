//! Mesh subdivision algorithms.
//!
//! Both schemes split every triangle into four: one triangle per original
//! corner plus a central triangle connecting the three edge midpoints.
//! Midpoints ("odd" vertices) are shared between the two triangles of an
//! edge through a canonical [`Edge`] key, so the refined mesh has no cracks
//! and a pass over `V` vertices, `E` distinct edges and `T` triangles always
//! yields `V + E` vertices and `4T` triangles.
//!
//! # Linear split
//!
//! Odd vertices sit exactly at edge midpoints and original ("even") vertices
//! keep their positions. The shape is unchanged; only the sampling density
//! grows.
//!
//! # Loop subdivision
//!
//! Loop subdivision (Loop, 1987) is an approximating scheme. Even vertices
//! are relaxed towards their one-ring and odd vertices are placed with the
//! `3/8, 3/8, 1/8, 1/8` edge stencil, so repeated passes converge to a smooth
//! limit surface.
//!
//! Both schemes read the old buffers only and write into fresh ones. Normals
//! and texture coordinates are recomputed from scratch afterwards.
//!
//! # Example
//!
//! ```
//! use mesh_denoise::algo::subdivide::{loop_subdivide, SubdivideOptions};
//! use mesh_denoise::mesh::TriangleMesh;
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//! let triangles = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
//! let mut mesh = TriangleMesh::new(positions, triangles).unwrap();
//!
//! loop_subdivide(&mut mesh, &SubdivideOptions::new(2));
//! assert_eq!(mesh.num_triangles(), 64);
//! ```
//!
//! # References
//!
//! - Loop, C. (1987). "Smooth Subdivision Surfaces Based on Triangles."
//!   Master's thesis, University of Utah.

mod linear;
mod loop_subdivision;

use std::collections::HashMap;

use nalgebra::Point3;

use crate::mesh::Edge;

pub use linear::{linear_subdivide, linear_subdivide_once};
pub use loop_subdivision::{loop_alpha, loop_beta, loop_subdivide, loop_subdivide_once};

/// Options for subdivision algorithms.
#[derive(Debug, Clone)]
pub struct SubdivideOptions {
    /// Number of subdivision passes.
    pub iterations: usize,
}

impl SubdivideOptions {
    /// Create options with the specified number of passes.
    pub fn new(iterations: usize) -> Self {
        Self { iterations }
    }
}

impl Default for SubdivideOptions {
    fn default() -> Self {
        Self::new(1)
    }
}

/// How an edge is reached while walking the triangles of a split pass.
#[derive(Debug, Clone, Copy)]
pub(crate) enum EdgeVisit {
    /// First triangle to reference the edge. The odd vertex was just appended.
    First {
        /// The edge being split.
        edge: Edge,
        /// Corner of the current triangle opposite to the edge.
        opposite: usize,
    },
    /// A later triangle referencing an edge that already has an odd vertex.
    Repeat {
        /// Corner of the first triangle opposite to the edge.
        first_opposite: usize,
        /// Corner of the current triangle opposite to the edge.
        opposite: usize,
    },
}

struct OddVertex {
    index: usize,
    first_opposite: usize,
}

/// Split every triangle 1-to-4, appending one odd vertex per distinct edge to
/// `positions`.
///
/// Triangles are walked in order and their edges in the order `ab`, `bc`,
/// `ca`. On the first visit of an edge a placeholder vertex is appended and
/// `place` fills it in; on every later visit `place` may refine it. Returns
/// the new triangle list.
pub(crate) fn split_one_to_four<F>(
    triangles: &[[usize; 3]],
    positions: &mut Vec<Point3<f64>>,
    mut place: F,
) -> Vec<[usize; 3]>
where
    F: FnMut(EdgeVisit, &mut Point3<f64>),
{
    let mut odd_vertices: HashMap<Edge, OddVertex> = HashMap::with_capacity(triangles.len() * 3 / 2);
    let mut new_triangles = Vec::with_capacity(triangles.len() * 4);

    for triangle in triangles {
        let [a, b, c] = *triangle;
        let [m_ab, m_bc, m_ca] = Edge::of_triangle(triangle).map(|(edge, opposite)| {
            if let Some(odd) = odd_vertices.get(&edge) {
                let visit = EdgeVisit::Repeat {
                    first_opposite: odd.first_opposite,
                    opposite,
                };
                place(visit, &mut positions[odd.index]);
                odd.index
            } else {
                let index = positions.len();
                positions.push(Point3::origin());
                place(EdgeVisit::First { edge, opposite }, &mut positions[index]);
                odd_vertices.insert(
                    edge,
                    OddVertex {
                        index,
                        first_opposite: opposite,
                    },
                );
                index
            }
        });

        new_triangles.push([a, m_ab, m_ca]);
        new_triangles.push([m_ab, b, m_bc]);
        new_triangles.push([m_ca, m_bc, c]);
        new_triangles.push([m_ab, m_bc, m_ca]);
    }

    new_triangles
}

/// Midpoint of an edge.
#[inline]
pub(crate) fn midpoint(positions: &[Point3<f64>], edge: Edge) -> Point3<f64> {
    Point3::from((positions[edge.first()].coords + positions[edge.second()].coords) / 2.0)
}
