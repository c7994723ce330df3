//! Adjacency queries over raw index buffers.
//!
//! Every function here is a full recompute over the buffers it is given.
//! Nothing is cached between calls: callers rebuild whatever they need each
//! time the geometry or topology changes.

use std::collections::{HashMap, HashSet};

use nalgebra::Point3;

use crate::mesh::Edge;

/// Strategy used to gather the vertices within a radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NeighborSearch {
    /// Compare every pair of vertices (O(V²)).
    #[default]
    BruteForce,
    /// Bin vertices into a uniform grid with cells as large as the radius and
    /// only compare vertices in adjacent cells.
    Grid,
}

/// For every vertex, the ascending list of triangles that reference it.
///
/// A triangle that references the same vertex more than once is listed once.
///
/// # Example
///
/// ```
/// use mesh_denoise::algo::adjacency::triangle_incidence;
///
/// let incidence = triangle_incidence(4, &[[0, 1, 2], [0, 2, 3]]);
/// assert_eq!(incidence[0], vec![0, 1]);
/// assert_eq!(incidence[1], vec![0]);
/// assert_eq!(incidence[3], vec![1]);
/// ```
pub fn triangle_incidence(vertex_count: usize, triangles: &[[usize; 3]]) -> Vec<Vec<usize>> {
    let mut incidence = vec![Vec::new(); vertex_count];
    for (t, triangle) in triangles.iter().enumerate() {
        for &v in triangle {
            let list: &mut Vec<usize> = &mut incidence[v];
            if list.last() != Some(&t) {
                list.push(t);
            }
        }
    }
    incidence
}

/// For every vertex, the ascending list of *other* vertices whose Euclidean
/// distance is at most `radius`.
///
/// Both search strategies return exactly the same lists.
///
/// # Example
///
/// ```
/// use mesh_denoise::algo::adjacency::{distance_neighborhood, NeighborSearch};
/// use nalgebra::Point3;
///
/// let positions = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(3.0, 0.0, 0.0),
/// ];
/// let neighbors = distance_neighborhood(&positions, 1.0, NeighborSearch::BruteForce);
/// assert_eq!(neighbors[0], vec![1]);
/// assert_eq!(neighbors[1], vec![0]);
/// assert!(neighbors[2].is_empty());
/// ```
pub fn distance_neighborhood(
    positions: &[Point3<f64>],
    radius: f64,
    search: NeighborSearch,
) -> Vec<Vec<usize>> {
    match search {
        NeighborSearch::Grid if radius.is_finite() && radius > 0.0 => {
            grid_neighborhood(positions, radius)
                .unwrap_or_else(|| brute_force_neighborhood(positions, radius))
        }
        _ => brute_force_neighborhood(positions, radius),
    }
}

fn brute_force_neighborhood(positions: &[Point3<f64>], radius: f64) -> Vec<Vec<usize>> {
    positions
        .iter()
        .enumerate()
        .map(|(i, p)| {
            positions
                .iter()
                .enumerate()
                .filter(|&(j, q)| i != j && (p - q).norm() <= radius)
                .map(|(j, _)| j)
                .collect()
        })
        .collect()
}

type CellKey = (i64, i64, i64);

/// Largest cell coordinate magnitude; keeps `key ± 1` inside `i64`.
const MAX_CELL_COORD: f64 = (1_i64 << 62) as f64;

/// Bins points into cells of side `radius`. Returns `None` when a cell
/// coordinate is not finite or too large for an `i64` key.
fn grid_neighborhood(positions: &[Point3<f64>], radius: f64) -> Option<Vec<Vec<usize>>> {
    // Pad the cell so a pair exactly `radius` apart never lands two cells apart
    // after rounding.
    let inv_cell_size = 1.0 / (radius * (1.0 + 1e-6));
    let axis = |c: f64| -> Option<i64> {
        let cell = (c * inv_cell_size).floor();
        (cell.abs() < MAX_CELL_COORD).then_some(cell as i64)
    };
    let keys = positions
        .iter()
        .map(|p| Some((axis(p.x)?, axis(p.y)?, axis(p.z)?)))
        .collect::<Option<Vec<CellKey>>>()?;

    let mut grid: HashMap<CellKey, Vec<usize>> = HashMap::new();
    for (i, key) in keys.iter().enumerate() {
        grid.entry(*key).or_default().push(i);
    }

    let neighborhoods = positions
        .iter()
        .zip(&keys)
        .enumerate()
        .map(|(i, (p, &(cx, cy, cz)))| {
            let mut neighbors = Vec::new();
            for dx in -1..=1_i64 {
                for dy in -1..=1_i64 {
                    for dz in -1..=1_i64 {
                        let Some(cell) = grid.get(&(cx + dx, cy + dy, cz + dz)) else {
                            continue;
                        };
                        neighbors.extend(
                            cell.iter()
                                .copied()
                                .filter(|&j| i != j && (p - positions[j]).norm() <= radius),
                        );
                    }
                }
            }
            neighbors.sort_unstable();
            neighbors
        })
        .collect();
    Some(neighborhoods)
}

/// Number of distinct undirected edges in a triangle list.
///
/// ```
/// use mesh_denoise::algo::adjacency::edge_count;
///
/// // Closed tetrahedron
/// assert_eq!(edge_count(&[[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]]), 6);
/// ```
pub fn edge_count(triangles: &[[usize; 3]]) -> usize {
    triangles
        .iter()
        .flat_map(|t| Edge::of_triangle(t).map(|(edge, _)| edge))
        .collect::<HashSet<Edge>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_grid_positions(n: usize, spacing: f64) -> Vec<Point3<f64>> {
        let mut positions = Vec::new();
        for k in 0..n {
            for j in 0..n {
                for i in 0..n {
                    // Slight jitter so distances are not all equal
                    let jitter = ((i * 7 + j * 13 + k * 29) % 11) as f64 * 0.01;
                    positions.push(Point3::new(
                        i as f64 * spacing + jitter,
                        j as f64 * spacing - jitter,
                        k as f64 * spacing,
                    ));
                }
            }
        }
        positions
    }

    #[test]
    fn test_incidence_lists_each_triangle_once() {
        // Degenerate triangle referencing vertex 0 twice
        let incidence = triangle_incidence(3, &[[0, 0, 1], [1, 2, 0]]);
        assert_eq!(incidence[0], vec![0, 1]);
        assert_eq!(incidence[1], vec![0, 1]);
        assert_eq!(incidence[2], vec![1]);
    }

    #[test]
    fn test_incidence_isolated_vertex() {
        let incidence = triangle_incidence(4, &[[0, 1, 2]]);
        assert!(incidence[3].is_empty());
    }

    #[test]
    fn test_distance_neighborhood_is_inclusive_and_excludes_self() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.5, 0.0, 0.0),
            Point3::new(0.0, 0.5, 0.0),
        ];
        let neighbors = distance_neighborhood(&positions, 0.5, NeighborSearch::BruteForce);
        assert_eq!(neighbors[0], vec![1, 2]);
        // (0.5, 0) to (0, 0.5) is ~0.707 > 0.5
        assert_eq!(neighbors[1], vec![0]);
        assert_eq!(neighbors[2], vec![0]);
    }

    #[test]
    fn test_grid_matches_brute_force() {
        let positions = create_grid_positions(5, 0.37);
        for radius in [0.1, 0.37, 0.45, 1.0] {
            let brute = distance_neighborhood(&positions, radius, NeighborSearch::BruteForce);
            let grid = distance_neighborhood(&positions, radius, NeighborSearch::Grid);
            assert_eq!(brute, grid, "mismatch at radius {radius}");
        }
    }

    #[test]
    fn test_grid_handles_negative_coordinates() {
        let positions = vec![
            Point3::new(-0.05, 0.0, 0.0),
            Point3::new(0.05, 0.0, 0.0),
            Point3::new(-1.0, -1.0, -1.0),
        ];
        let neighbors = distance_neighborhood(&positions, 0.2, NeighborSearch::Grid);
        assert_eq!(neighbors[0], vec![1]);
        assert_eq!(neighbors[1], vec![0]);
        assert!(neighbors[2].is_empty());
    }

    #[test]
    fn test_grid_falls_back_for_zero_radius() {
        let positions = vec![Point3::new(1.0, 1.0, 1.0), Point3::new(1.0, 1.0, 1.0)];
        let neighbors = distance_neighborhood(&positions, 0.0, NeighborSearch::Grid);
        assert_eq!(neighbors[0], vec![1]);
        assert_eq!(neighbors[1], vec![0]);
    }

    #[test]
    fn test_grid_falls_back_for_huge_coordinates() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1e300, 0.0, 0.0),
            Point3::new(1e300, 0.5, 0.0),
            Point3::new(0.5, 0.0, 0.0),
        ];
        let grid = distance_neighborhood(&positions, 1.0, NeighborSearch::Grid);
        let brute = distance_neighborhood(&positions, 1.0, NeighborSearch::BruteForce);
        assert_eq!(grid, brute);
        assert_eq!(grid[0], vec![3]);
        assert_eq!(grid[1], vec![2]);
    }

    #[test]
    fn test_edge_count_open_strip() {
        // Two triangles sharing one edge: 5 distinct edges
        assert_eq!(edge_count(&[[0, 1, 2], [0, 3, 1]]), 5);
        assert_eq!(edge_count(&[]), 0);
    }
}
