//! ASCII STL writer and matching reader.
//!
//! STL carries no shared vertices: every facet repeats its three corner
//! positions, preceded by the stored per-face normal.

use glam::Vec3;

use crate::error::{ReconError, Result};
use crate::types::Mesh;

use super::fmt_f32;

const SOLID_NAME: &str = "tomomesh";

pub fn serialize(mesh: &Mesh) -> String {
    let mut out = String::with_capacity(64 + mesh.faces.len() * 256);
    out.push_str(&format!("solid {SOLID_NAME}\n"));
    for (face, normal) in mesh.faces.iter().zip(&mesh.normals) {
        out.push_str(&format!(
            "  facet normal {} {} {}\n",
            fmt_f32(normal.x),
            fmt_f32(normal.y),
            fmt_f32(normal.z)
        ));
        out.push_str("    outer loop\n");
        for &i in face {
            let v = mesh.vertices[i as usize];
            out.push_str(&format!(
                "      vertex {} {} {}\n",
                fmt_f32(v.x),
                fmt_f32(v.y),
                fmt_f32(v.z)
            ));
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    }
    out.push_str(&format!("endsolid {SOLID_NAME}\n"));
    out
}

/// Parse the ASCII STL that [`serialize`] emits.
///
/// Vertices are not re-deduplicated; the parsed mesh has `3 * facets`
/// vertices, which is all the round-trip check needs.
pub fn parse(text: &str) -> Result<Mesh> {
    let mut mesh = Mesh::default();
    let mut pending_normal = Vec3::ZERO;
    let mut loop_vertices: Vec<Vec3> = Vec::with_capacity(3);

    for (line_no, line) in text.lines().enumerate() {
        let malformed = || {
            ReconError::InvalidInput(format!("stl line {}: malformed record", line_no + 1))
        };
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("facet") => {
                let coords: Vec<f32> =
                    parts.skip(1).filter_map(|p| p.parse().ok()).collect();
                if coords.len() != 3 {
                    return Err(malformed());
                }
                pending_normal = Vec3::new(coords[0], coords[1], coords[2]);
            }
            Some("vertex") => {
                let coords: Vec<f32> = parts.filter_map(|p| p.parse().ok()).collect();
                if coords.len() != 3 {
                    return Err(malformed());
                }
                loop_vertices.push(Vec3::new(coords[0], coords[1], coords[2]));
            }
            Some("endfacet") => {
                if loop_vertices.len() != 3 {
                    return Err(malformed());
                }
                let base = mesh.vertices.len() as u32;
                mesh.vertices.extend(loop_vertices.drain(..));
                mesh.faces.push([base, base + 1, base + 2]);
                mesh.normals.push(pending_normal);
            }
            _ => {} // solid/endsolid, outer loop, endloop
        }
    }
    mesh.recompute_bounds();
    Ok(mesh)
}
