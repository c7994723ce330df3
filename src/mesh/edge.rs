//! Canonical undirected edge key.

use std::fmt;

/// An undirected edge between two vertices, stored as `(min, max)`.
///
/// Two triangles sharing an edge produce equal keys regardless of winding,
/// which is what keeps subdivision from creating duplicate midpoints. The
/// derived ordering is lexicographic on `(first, second)`.
///
/// # Example
///
/// ```
/// use mesh_denoise::mesh::Edge;
///
/// assert_eq!(Edge::new(7, 2), Edge::new(2, 7));
/// assert_eq!(Edge::new(7, 2).first(), 2);
/// assert!(Edge::new(0, 9) < Edge::new(1, 2));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    first: usize,
    second: usize,
}

impl Edge {
    /// Create the canonical edge between `a` and `b`.
    #[inline]
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            first: a.min(b),
            second: a.max(b),
        }
    }

    /// The smaller vertex index.
    #[inline]
    pub fn first(&self) -> usize {
        self.first
    }

    /// The larger vertex index.
    #[inline]
    pub fn second(&self) -> usize {
        self.second
    }

    /// Whether `v` is an endpoint of this edge.
    #[inline]
    pub fn contains(&self, v: usize) -> bool {
        self.first == v || self.second == v
    }

    /// The endpoint opposite to `v`.
    ///
    /// If `v` is not an endpoint, `first` is returned.
    #[inline]
    pub fn other(&self, v: usize) -> usize {
        if self.first == v {
            self.second
        } else {
            self.first
        }
    }

    /// The three edges of a triangle `(a, b, c)` in the order `ab`, `bc`, `ca`,
    /// each paired with the corner opposite to it.
    #[inline]
    pub fn of_triangle(triangle: &[usize; 3]) -> [(Edge, usize); 3] {
        let [a, b, c] = *triangle;
        [
            (Edge::new(a, b), c),
            (Edge::new(b, c), a),
            (Edge::new(c, a), b),
        ]
    }
}

impl From<(usize, usize)> for Edge {
    #[inline]
    fn from((a, b): (usize, usize)) -> Self {
        Edge::new(a, b)
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({}, {})", self.first, self.second)
    }
}
