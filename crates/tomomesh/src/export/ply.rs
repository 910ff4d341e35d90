//! ASCII PLY writer and matching reader.
//!
//! Header declares `element vertex N` with x/y/z float properties and
//! `element face M` with a vertex-index list, followed by the two data
//! blocks in that order.

use glam::Vec3;

use crate::error::{ReconError, Result};
use crate::types::Mesh;

use super::fmt_f32;

pub fn serialize(mesh: &Mesh) -> String {
    let mut out = String::with_capacity(192 + mesh.vertices.len() * 40 + mesh.faces.len() * 16);
    out.push_str("ply\n");
    out.push_str("format ascii 1.0\n");
    out.push_str("comment tomomesh reconstruction\n");
    out.push_str(&format!("element vertex {}\n", mesh.vertices.len()));
    out.push_str("property float x\n");
    out.push_str("property float y\n");
    out.push_str("property float z\n");
    out.push_str(&format!("element face {}\n", mesh.faces.len()));
    out.push_str("property list uchar uint vertex_indices\n");
    out.push_str("end_header\n");
    for v in &mesh.vertices {
        out.push_str(&format!(
            "{} {} {}\n",
            fmt_f32(v.x),
            fmt_f32(v.y),
            fmt_f32(v.z)
        ));
    }
    for f in &mesh.faces {
        out.push_str(&format!("3 {} {} {}\n", f[0], f[1], f[2]));
    }
    out
}

/// Parse the ASCII PLY that [`serialize`] emits.
pub fn parse(text: &str) -> Result<Mesh> {
    let malformed = |what: &str| ReconError::InvalidInput(format!("ply: {what}"));

    let mut lines = text.lines();
    let mut vertex_count = None;
    let mut face_count = None;

    if lines.next() != Some("ply") {
        return Err(malformed("missing magic line"));
    }
    for line in lines.by_ref() {
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("element"), Some("vertex")) => {
                vertex_count = parts.next().and_then(|n| n.parse::<usize>().ok());
            }
            (Some("element"), Some("face")) => {
                face_count = parts.next().and_then(|n| n.parse::<usize>().ok());
            }
            (Some("end_header"), _) => break,
            _ => {} // format, comment, property lines
        }
    }
    let vertex_count = vertex_count.ok_or_else(|| malformed("no vertex element"))?;
    let face_count = face_count.ok_or_else(|| malformed("no face element"))?;

    let mut mesh = Mesh::default();
    for _ in 0..vertex_count {
        let line = lines.next().ok_or_else(|| malformed("truncated vertices"))?;
        let coords: Vec<f32> = line
            .split_whitespace()
            .filter_map(|p| p.parse().ok())
            .collect();
        if coords.len() != 3 {
            return Err(malformed("malformed vertex row"));
        }
        mesh.vertices.push(Vec3::new(coords[0], coords[1], coords[2]));
    }
    for _ in 0..face_count {
        let line = lines.next().ok_or_else(|| malformed("truncated faces"))?;
        let idx: Vec<u32> = line
            .split_whitespace()
            .filter_map(|p| p.parse().ok())
            .collect();
        if idx.len() != 4 || idx[0] != 3 {
            return Err(malformed("only triangle faces are supported"));
        }
        mesh.faces.push([idx[1], idx[2], idx[3]]);
    }
    mesh.recompute_bounds();
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::super::testmesh::tetrahedron;
    use super::*;

    #[test]
    fn round_trip_preserves_counts_and_coordinates() {
        let mesh = tetrahedron();
        let parsed = parse(&serialize(&mesh)).unwrap();
        assert_eq!(parsed.vertices.len(), mesh.vertices.len());
        assert_eq!(parsed.faces, mesh.faces);
        for (a, b) in parsed.vertices.iter().zip(&mesh.vertices) {
            assert!((*a - *b).length() < 1e-5);
        }
    }

    #[test]
    fn header_declares_element_counts() {
        let mesh = tetrahedron();
        let text = serialize(&mesh);
        assert!(text.contains("element vertex 4\n"));
        assert!(text.contains("element face 4\n"));
        assert!(text.contains("end_header\n"));
    }

    #[test]
    fn empty_mesh_round_trips() {
        let parsed = parse(&serialize(&Mesh::default())).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn non_triangle_face_is_rejected() {
        let mut text = serialize(&tetrahedron());
        text = text.replacen("3 0 2 1", "4 0 2 1", 1);
        assert!(parse(&text).is_err());
    }

    #[test]
    fn missing_magic_is_rejected() {
        assert!(parse("format ascii 1.0\nend_header\n").is_err());
    }
}
