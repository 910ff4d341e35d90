//! Stage 4: Surface Extractor.
//!
//! Full case-table marching cubes over the segmented scalar field.
//!
//! # Processing pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    PHASE 1: Cell Classification                 │
//! │  For each unit cell of 8 adjacent voxels:                       │
//! │    Build 8-bit cube index from per-corner iso comparisons       │
//! │    Early-out if homogeneous (index == 0 or index == 255)        │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    PHASE 2: Edge Interpolation                  │
//! │    Lookup crossed edges from EDGE_TABLE[cube_index]             │
//! │    Linearly interpolate the crossing point along each edge      │
//! │    Deduplicate vertices by canonical edge key (crack-free)      │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    PHASE 3: Triangulation                       │
//! │    Emit TRI_TABLE[cube_index] triangles (≤ 5 per cell)          │
//! │    Per-face normal from edge cross product (zero-safe)          │
//! │    Accumulate bounding box                                      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The scan visits each cell exactly once — `O(width·height·depth)` — and
//! never re-reads the volume per triangle. Adjacent cells share vertices
//! through the edge-key map, so shared cell faces cannot crack.

pub mod tables;

use std::collections::HashMap;

use glam::Vec3;

use crate::error::{ReconError, Result};
use crate::types::{Aabb, MedicalVolume, Mesh, SegmentedVolume, TissueClass};

use tables::{CORNER_OFFSETS, EDGE_CORNERS, EDGE_TABLE, TRI_TABLE};

/// Default iso-value for the reconstruction pipeline: the midpoint between
/// the background and soft-tissue class levels, i.e. the outer tissue
/// envelope.
pub fn default_iso_value() -> f32 {
    (TissueClass::Background.level() + TissueClass::SoftTissue.level()) / 2.0
}

/// Extract the iso-surface of a segmented volume.
pub fn extract_surface(segmented: &SegmentedVolume, iso: f32) -> Result<Mesh> {
    extract_isosurface(&segmented.volume, iso)
}

/// Canonical identifier of a lattice edge: the grid coordinates of its
/// lower corner plus the axis it runs along. Both cells sharing an edge
/// derive the same key, which is what deduplicates their vertices.
type EdgeKey = (usize, usize, usize, u8);

/// Extract a triangulated iso-surface from any scalar volume.
///
/// An iso-value outside the volume's value range produces an empty mesh
/// with a degenerate bounding box at the origin; this is not an error.
pub fn extract_isosurface(volume: &MedicalVolume, iso: f32) -> Result<Mesh> {
    let (w, h, d) = (volume.width, volume.height, volume.depth);

    let mut vertices: Vec<Vec3> = Vec::new();
    let mut faces: Vec<[u32; 3]> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    let mut edge_vertices: HashMap<EdgeKey, u32> = HashMap::new();

    if w >= 2 && h >= 2 && d >= 2 {
        for z in 0..d - 1 {
            for y in 0..h - 1 {
                for x in 0..w - 1 {
                    march_cell(
                        volume,
                        (x, y, z),
                        iso,
                        &mut vertices,
                        &mut faces,
                        &mut normals,
                        &mut edge_vertices,
                    );
                }
            }
        }
    }

    if vertices.iter().any(|v| !v.is_finite()) {
        return Err(ReconError::NumericDegeneracy {
            stage: "surface extraction",
        });
    }

    let mut bounds = Aabb::empty();
    for &v in &vertices {
        bounds.encapsulate(v);
    }
    if vertices.is_empty() {
        bounds = Aabb::degenerate();
    }

    Ok(Mesh {
        vertices,
        faces,
        normals,
        bounds,
    })
}

/// Classify and triangulate a single unit cell.
#[allow(clippy::too_many_arguments)]
fn march_cell(
    volume: &MedicalVolume,
    cell: (usize, usize, usize),
    iso: f32,
    vertices: &mut Vec<Vec3>,
    faces: &mut Vec<[u32; 3]>,
    normals: &mut Vec<Vec3>,
    edge_vertices: &mut HashMap<EdgeKey, u32>,
) {
    let (x, y, z) = cell;

    let mut corner_values = [0.0f32; 8];
    let mut cube_index = 0usize;
    for (i, &(dx, dy, dz)) in CORNER_OFFSETS.iter().enumerate() {
        let v = volume.at(x + dx, y + dy, z + dz);
        corner_values[i] = v;
        // A corner exactly at the iso-value belongs to the at/below side:
        // a cell straddles the surface when one corner is at/below the
        // iso-value and another is above.
        if v <= iso {
            cube_index |= 1 << i;
        }
    }

    // Entirely inside or entirely outside: no surface here.
    if cube_index == 0 || cube_index == 255 {
        return;
    }

    // Interpolate one vertex per crossed edge, reusing vertices already
    // created by a neighboring cell.
    let edge_mask = EDGE_TABLE[cube_index];
    let mut cell_edge_index = [u32::MAX; 12];
    for edge in 0..12usize {
        if edge_mask & (1 << edge) == 0 {
            continue;
        }
        let key = edge_key(cell, edge);
        let index = *edge_vertices.entry(key).or_insert_with(|| {
            let position = interpolate_edge(volume, cell, edge, iso, &corner_values);
            let index = vertices.len() as u32;
            vertices.push(position);
            index
        });
        cell_edge_index[edge] = index;
    }

    let case = &TRI_TABLE[cube_index];
    for triangle in case.chunks_exact(3) {
        if triangle[0] < 0 {
            break;
        }
        let a = cell_edge_index[triangle[0] as usize];
        let b = cell_edge_index[triangle[1] as usize];
        let c = cell_edge_index[triangle[2] as usize];
        faces.push([a, b, c]);
        normals.push(face_normal(
            vertices[a as usize],
            vertices[b as usize],
            vertices[c as usize],
        ));
    }
}

/// Canonical key for the `edge`-th edge of `cell`.
fn edge_key(cell: (usize, usize, usize), edge: usize) -> EdgeKey {
    let [c0, c1] = EDGE_CORNERS[edge];
    let a = CORNER_OFFSETS[c0 as usize];
    let b = CORNER_OFFSETS[c1 as usize];
    let low = (a.0.min(b.0), a.1.min(b.1), a.2.min(b.2));
    let axis = if a.0 != b.0 {
        0u8
    } else if a.1 != b.1 {
        1
    } else {
        2
    };
    (cell.0 + low.0, cell.1 + low.1, cell.2 + low.2, axis)
}

/// Linear interpolation of the surface crossing along one cell edge,
/// mapped into physical coordinates (spacing applied, origin added).
fn interpolate_edge(
    volume: &MedicalVolume,
    cell: (usize, usize, usize),
    edge: usize,
    iso: f32,
    corner_values: &[f32; 8],
) -> Vec3 {
    let [c0, c1] = EDGE_CORNERS[edge];
    let v0 = corner_values[c0 as usize];
    let v1 = corner_values[c1 as usize];

    let t = if (v1 - v0).abs() < 1e-6 {
        0.5
    } else {
        ((iso - v0) / (v1 - v0)).clamp(0.0, 1.0)
    };

    let o0 = CORNER_OFFSETS[c0 as usize];
    let o1 = CORNER_OFFSETS[c1 as usize];
    let p0 = Vec3::new(
        (cell.0 + o0.0) as f32,
        (cell.1 + o0.1) as f32,
        (cell.2 + o0.2) as f32,
    );
    let p1 = Vec3::new(
        (cell.0 + o1.0) as f32,
        (cell.1 + o1.1) as f32,
        (cell.2 + o1.2) as f32,
    );
    let grid = p0 + (p1 - p0) * t;

    Vec3::new(
        volume.origin[0] + grid.x * volume.spacing[0],
        volume.origin[1] + grid.y * volume.spacing[1],
        volume.origin[2] + grid.z * volume.spacing[2],
    )
}

/// Unit face normal from the cross product of two edge vectors.
///
/// Numerically coincident vertices yield a zero-area triangle; those get
/// the zero-safe fallback `Vec3::ZERO` instead of a NaN normal.
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let cross = (b - a).cross(c - a);
    let len = cross.length();
    if len > 1e-12 {
        cross / len
    } else {
        Vec3::ZERO
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;
