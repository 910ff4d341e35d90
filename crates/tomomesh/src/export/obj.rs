//! Wavefront OBJ writer and matching reader.
//!
//! Layout: a header comment, all `v` lines, then all `f` lines with
//! 1-based vertex indices. Normals are not written; OBJ consumers
//! recompute them from winding.

use glam::Vec3;

use crate::error::{ReconError, Result};
use crate::types::Mesh;

use super::fmt_f32;

pub fn serialize(mesh: &Mesh) -> String {
    let mut out = String::with_capacity(32 + mesh.vertices.len() * 40 + mesh.faces.len() * 16);
    out.push_str("# tomomesh reconstruction\n");
    for v in &mesh.vertices {
        out.push_str(&format!(
            "v {} {} {}\n",
            fmt_f32(v.x),
            fmt_f32(v.y),
            fmt_f32(v.z)
        ));
    }
    for f in &mesh.faces {
        // OBJ indices are 1-based.
        out.push_str(&format!("f {} {} {}\n", f[0] + 1, f[1] + 1, f[2] + 1));
    }
    out
}

/// Parse the subset of OBJ that [`serialize`] emits.
pub fn parse(text: &str) -> Result<Mesh> {
    let mut mesh = Mesh::default();
    for (line_no, line) in text.lines().enumerate() {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                let coords: Vec<f32> = parts.filter_map(|p| p.parse().ok()).collect();
                if coords.len() != 3 {
                    return Err(ReconError::InvalidInput(format!(
                        "obj line {}: malformed vertex",
                        line_no + 1
                    )));
                }
                mesh.vertices.push(Vec3::new(coords[0], coords[1], coords[2]));
            }
            Some("f") => {
                let idx: Vec<u32> = parts
                    .filter_map(|p| p.split('/').next())
                    .filter_map(|p| p.parse::<u32>().ok())
                    .collect();
                if idx.len() != 3 || idx.iter().any(|&i| i == 0) {
                    return Err(ReconError::InvalidInput(format!(
                        "obj line {}: malformed face",
                        line_no + 1
                    )));
                }
                mesh.faces.push([idx[0] - 1, idx[1] - 1, idx[2] - 1]);
            }
            _ => {} // comments, blank lines
        }
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
    fn indices_are_one_based_on_disk() {
        let text = serialize(&tetrahedron());
        for line in text.lines().filter(|l| l.starts_with("f ")) {
            for idx in line.split_whitespace().skip(1) {
                assert!(idx.parse::<u32>().unwrap() >= 1);
            }
        }
    }

    #[test]
    fn empty_mesh_serializes_to_header_only() {
        let text = serialize(&Mesh::default());
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with('#'));
        assert!(parse(&text).unwrap().is_empty());
    }

    #[test]
    fn malformed_face_is_rejected() {
        assert!(parse("f 1 2\n").is_err());
        assert!(parse("v 1.0 2.0\n").is_err());
        assert!(parse("f 0 1 2\n").is_err());
    }
}
