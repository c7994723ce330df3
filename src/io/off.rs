//! OFF (Object File Format) support.
//!
//! The accepted layout is:
//!
//! ```text
//! OFF                # optional keyword line
//! V F E              # vertex, face and (ignored) edge counts
//! x y z              # V vertex lines
//! k i0 i1 ... ik-1   # F face lines
//! ```
//!
//! Text after `#` and blank lines are ignored. Extra tokens on vertex and
//! face lines (colours) are skipped. Faces with more than three vertices are
//! fan-triangulated around their first vertex.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::TriangleMesh;

/// Load a mesh from an OFF file.
///
/// # Example
///
/// ```no_run
/// use mesh_denoise::io::off;
///
/// let mesh = off::load("bunny.off").unwrap();
/// println!("{} vertices", mesh.num_vertices());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    let file = File::open(path)?;

    read(BufReader::new(file)).map_err(|e| match e {
        MeshError::Io(e) => MeshError::Io(e),
        other => MeshError::LoadError {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    })
}

/// Save a mesh to an OFF file.
pub fn save<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Parse an OFF document held in memory.
///
/// ```
/// use mesh_denoise::io::off;
///
/// let text = "OFF\n4 1 0\n0 0 0\n1 0 0\n1 1 0\n0 1 0\n4 0 1 2 3\n";
/// let mesh = off::parse(text).unwrap();
/// assert_eq!(mesh.num_vertices(), 4);
/// assert_eq!(mesh.triangles(), &[[0, 1, 2], [0, 2, 3]]);
/// ```
pub fn parse(text: &str) -> Result<TriangleMesh> {
    read(text.as_bytes())
}

const MAX_PREALLOCATION: usize = 1 << 16;

/// Read an OFF document from any buffered reader.
pub fn read<R: BufRead>(reader: R) -> Result<TriangleMesh> {
    let mut lines = ContentLines::new(reader);

    let (mut line_no, mut counts) = lines.expect("header")?;
    if let Some(rest) = counts.strip_prefix("OFF") {
        let rest = rest.trim().to_string();
        if rest.is_empty() {
            (line_no, counts) = lines.expect("vertex and face counts")?;
        } else {
            counts = rest;
        }
    }

    let tokens: Vec<&str> = counts.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(MeshError::parse(line_no, "expected vertex and face counts"));
    }
    let vertex_count: usize = parse_token(tokens[0], line_no, "vertex count")?;
    let face_count: usize = parse_token(tokens[1], line_no, "face count")?;

    // Header counts are untrusted; cap the preallocation.
    let mut positions = Vec::with_capacity(vertex_count.min(MAX_PREALLOCATION));
    for _ in 0..vertex_count {
        let (line_no, line) = lines.expect("vertex")?;
        let coords: Vec<&str> = line.split_whitespace().take(3).collect();
        if coords.len() < 3 {
            return Err(MeshError::parse(line_no, "expected 3 coordinates"));
        }
        positions.push(Point3::new(
            parse_token(coords[0], line_no, "coordinate")?,
            parse_token(coords[1], line_no, "coordinate")?,
            parse_token(coords[2], line_no, "coordinate")?,
        ));
    }

    let mut triangles = Vec::with_capacity(face_count.min(MAX_PREALLOCATION));
    for _ in 0..face_count {
        let (line_no, line) = lines.expect("face")?;
        let mut tokens = line.split_whitespace();
        let k: usize = match tokens.next() {
            Some(token) => parse_token(token, line_no, "face size")?,
            None => return Err(MeshError::parse(line_no, "expected face size")),
        };
        if k < 3 {
            return Err(MeshError::parse(
                line_no,
                format!("face has {k} vertices, at least 3 required"),
            ));
        }

        let indices = tokens
            .take(k)
            .map(|token| parse_token::<usize>(token, line_no, "vertex index"))
            .collect::<Result<Vec<_>>>()?;
        if indices.len() < k {
            return Err(MeshError::parse(
                line_no,
                format!("expected {k} vertex indices, found {}", indices.len()),
            ));
        }

        for i in 1..k - 1 {
            triangles.push([indices[0], indices[i], indices[i + 1]]);
        }
    }

    log::debug!(
        "parsed OFF: {} vertices, {} faces, {} triangles",
        positions.len(),
        face_count,
        triangles.len()
    );

    TriangleMesh::new(positions, triangles)
}

/// Write a mesh as an ASCII OFF document.
pub fn write<W: Write>(mesh: &TriangleMesh, writer: &mut W) -> Result<()> {
    writeln!(writer, "OFF")?;
    writeln!(writer, "{} {} 0", mesh.num_vertices(), mesh.num_triangles())?;

    for p in mesh.positions() {
        writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
    }

    for [a, b, c] in mesh.triangles() {
        writeln!(writer, "3 {a} {b} {c}")?;
    }

    Ok(())
}

/// Non-empty lines with comments stripped, tagged with 1-based line numbers.
struct ContentLines<R> {
    inner: std::io::Lines<R>,
    line: usize,
}

impl<R: BufRead> ContentLines<R> {
    fn new(reader: R) -> Self {
        Self {
            inner: reader.lines(),
            line: 0,
        }
    }

    fn next_content(&mut self) -> Result<Option<(usize, String)>> {
        for line in self.inner.by_ref() {
            self.line += 1;
            let line = line?;
            let content = match line.find('#') {
                Some(pos) => &line[..pos],
                None => line.as_str(),
            }
            .trim();
            if !content.is_empty() {
                return Ok(Some((self.line, content.to_string())));
            }
        }
        Ok(None)
    }

    fn expect(&mut self, what: &str) -> Result<(usize, String)> {
        let next = self.next_content()?;
        next.ok_or_else(|| {
            MeshError::parse(self.line + 1, format!("unexpected end of file, expected {what}"))
        })
    }
}

fn parse_token<T: FromStr>(token: &str, line: usize, what: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| MeshError::parse(line, format!("invalid {what} `{token}`")))
}
