//! Triangle and vertex normal estimation.
//!
//! Two families of normals live here:
//!
//! - **Estimator normals** ([`triangle_frames`], [`weighted_vertex_normals`]):
//!   the area-weighted vertex normals that drive the bilateral filter and the
//!   normal-direction noise. They are *not* guarded against degeneracy: a
//!   zero-area triangle produces a NaN normal, and that NaN propagates into
//!   every vertex normal it touches. The denoiser then discards the affected
//!   updates instead of moving a vertex to NaN.
//! - **Render normals** ([`vertex_normals`]): unit-length normals recomputed
//!   after every mesh rewrite for display. Degenerate triangles are skipped.
//!
//! [`planar_tex_coords`] rebuilds texture coordinates the same way after
//! every rewrite.

use nalgebra::{Point2, Point3, Vector3};

use super::adjacency::triangle_incidence;

/// Per-triangle unit normals and areas.
#[derive(Debug, Clone, Default)]
pub struct TriangleFrames {
    /// Unit normal of each triangle (NaN for zero-area triangles).
    pub normals: Vec<Vector3<f64>>,
    /// Area of each triangle.
    pub areas: Vec<f64>,
}

/// How face normals are weighted when accumulated into render normals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalWeighting {
    /// Every incident face contributes its unit normal equally.
    #[default]
    Uniform,
    /// Each incident face contributes its unit normal scaled by the corner angle.
    Angle,
}

/// Compute the unit normal and area of every triangle.
///
/// For a triangle `(a, b, c)` the normal is `normalize(cross(b − a, c − a))`
/// and the area is half the cross product length.
///
/// # Example
///
/// ```
/// use mesh_denoise::algo::normals::triangle_frames;
/// use nalgebra::{Point3, Vector3};
///
/// let positions = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(2.0, 0.0, 0.0),
///     Point3::new(0.0, 2.0, 0.0),
/// ];
/// let frames = triangle_frames(&positions, &[[0, 1, 2]]);
/// assert_eq!(frames.normals[0], Vector3::z());
/// assert_eq!(frames.areas[0], 2.0);
/// ```
pub fn triangle_frames(positions: &[Point3<f64>], triangles: &[[usize; 3]]) -> TriangleFrames {
    let mut frames = TriangleFrames {
        normals: Vec::with_capacity(triangles.len()),
        areas: Vec::with_capacity(triangles.len()),
    };

    for &[a, b, c] in triangles {
        let pa = positions[a];
        let cross = (positions[b] - pa).cross(&(positions[c] - pa));
        let length = cross.norm();
        frames.normals.push(cross / length);
        frames.areas.push(length / 2.0);
    }

    frames
}

/// Area-weighted vertex normals: `Σ area_i · normal_i / Σ area_i` over the
/// triangles incident to each vertex.
///
/// The result is not renormalised. Vertices with no incident triangle get
/// `0 / 0`, i.e. NaN components.
pub fn weighted_vertex_normals(
    incidence: &[Vec<usize>],
    frames: &TriangleFrames,
) -> Vec<Vector3<f64>> {
    incidence
        .iter()
        .map(|triangles| {
            let mut total_area = 0.0;
            let mut weighted = Vector3::zeros();
            for &t in triangles {
                total_area += frames.areas[t];
                weighted += frames.normals[t] * frames.areas[t];
            }
            weighted / total_area
        })
        .collect()
}

/// Rebuild incidence and triangle frames from scratch and return the
/// area-weighted vertex normals of the current geometry.
pub fn estimate_vertex_normals(
    positions: &[Point3<f64>],
    triangles: &[[usize; 3]],
) -> Vec<Vector3<f64>> {
    let incidence = triangle_incidence(positions.len(), triangles);
    let frames = triangle_frames(positions, triangles);
    weighted_vertex_normals(&incidence, &frames)
}

/// Unit-length render normals.
///
/// Unit face normals are accumulated at each corner (optionally scaled by the
/// corner angle) and normalised. Degenerate triangles are skipped, and a
/// vertex without any usable face keeps a zero normal.
pub fn vertex_normals(
    positions: &[Point3<f64>],
    triangles: &[[usize; 3]],
    weighting: NormalWeighting,
) -> Vec<Vector3<f64>> {
    let mut normals = vec![Vector3::zeros(); positions.len()];

    for triangle in triangles {
        let [p0, p1, p2] = triangle.map(|v| positions[v]);
        let Some(face_normal) = (p1 - p0).cross(&(p2 - p0)).try_normalize(1e-20) else {
            continue;
        };

        for corner in 0..3 {
            let weight = match weighting {
                NormalWeighting::Uniform => 1.0,
                NormalWeighting::Angle => {
                    let p = positions[triangle[corner]];
                    let next = positions[triangle[(corner + 1) % 3]];
                    let prev = positions[triangle[(corner + 2) % 3]];
                    (next - p).angle(&(prev - p))
                }
            };
            normals[triangle[corner]] += face_normal * weight;
        }
    }

    for n in &mut normals {
        *n = n.try_normalize(1e-20).unwrap_or_else(Vector3::zeros);
    }

    normals
}

/// Planar texture coordinates: `x` and `y` mapped onto `[0, 1]` over the
/// bounding box of the positions. An axis with zero extent maps to `0`.
pub fn planar_tex_coords(positions: &[Point3<f64>]) -> Vec<Point2<f64>> {
    let Some(first) = positions.first() else {
        return Vec::new();
    };

    let (mut min_x, mut max_x) = (first.x, first.x);
    let (mut min_y, mut max_y) = (first.y, first.y);
    for p in positions {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }

    let extent_x = max_x - min_x;
    let extent_y = max_y - min_y;
    let normalize = |value: f64, min: f64, extent: f64| {
        if extent > 0.0 {
            (value - min) / extent
        } else {
            0.0
        }
    };

    positions
        .iter()
        .map(|p| Point2::new(normalize(p.x, min_x, extent_x), normalize(p.y, min_y, extent_y)))
        .collect()
}
