//! Optional mesh optimization stage.
//!
//! Runs only when `ProcessingOptions::mesh_optimization` is set: drops
//! zero-area faces, then applies Laplacian smoothing (each vertex moves
//! toward the average of its face-connected neighbors), and finally
//! recomputes normals and bounds.

use glam::Vec3;
use smallvec::SmallVec;
use tracing::debug;

use crate::marching_cubes::face_normal;
use crate::types::Mesh;

/// Neighbor lists per vertex; marching-cubes vertices rarely exceed 8
/// face-connected neighbors.
type NeighborList = SmallVec<[u32; 8]>;

/// Smooth and lightly decimate an extracted mesh.
///
/// Pure: returns a new mesh, the input is untouched. An empty mesh passes
/// through unchanged.
pub fn optimize_mesh(mesh: &Mesh, iterations: usize) -> Mesh {
    if mesh.is_empty() {
        return mesh.clone();
    }

    let mut out = drop_degenerate_faces(mesh);

    let neighbors = vertex_neighbors(out.vertices.len(), &out.faces);
    for _ in 0..iterations {
        out.vertices = smooth_once(&out.vertices, &neighbors);
    }

    out.normals = out
        .faces
        .iter()
        .map(|f| {
            face_normal(
                out.vertices[f[0] as usize],
                out.vertices[f[1] as usize],
                out.vertices[f[2] as usize],
            )
        })
        .collect();
    out.recompute_bounds();

    debug!(
        faces_in = mesh.faces.len(),
        faces_out = out.faces.len(),
        iterations,
        "mesh optimization"
    );
    out
}

/// Remove faces whose area is numerically zero.
fn drop_degenerate_faces(mesh: &Mesh) -> Mesh {
    let mut out = Mesh {
        vertices: mesh.vertices.clone(),
        ..Default::default()
    };
    for face in &mesh.faces {
        let a = mesh.vertices[face[0] as usize];
        let b = mesh.vertices[face[1] as usize];
        let c = mesh.vertices[face[2] as usize];
        if (b - a).cross(c - a).length() > 1e-12 {
            out.faces.push(*face);
        }
    }
    out
}

/// Build face-connected neighbor lists.
fn vertex_neighbors(vertex_count: usize, faces: &[[u32; 3]]) -> Vec<NeighborList> {
    let mut neighbors: Vec<NeighborList> = vec![NeighborList::new(); vertex_count];
    let add = |a: u32, b: u32, neighbors: &mut Vec<NeighborList>| {
        let list = &mut neighbors[a as usize];
        if !list.contains(&b) {
            list.push(b);
        }
    };
    for face in faces {
        let [a, b, c] = *face;
        add(a, b, &mut neighbors);
        add(a, c, &mut neighbors);
        add(b, a, &mut neighbors);
        add(b, c, &mut neighbors);
        add(c, a, &mut neighbors);
        add(c, b, &mut neighbors);
    }
    neighbors
}

/// One Laplacian relaxation step. Vertices with no neighbors stay put.
fn smooth_once(vertices: &[Vec3], neighbors: &[NeighborList]) -> Vec<Vec3> {
    vertices
        .iter()
        .zip(neighbors)
        .map(|(&v, adjacent)| {
            if adjacent.is_empty() {
                return v;
            }
            let sum: Vec3 = adjacent.iter().map(|&i| vertices[i as usize]).sum();
            sum / adjacent.len() as f32
        })
        .collect()
}
