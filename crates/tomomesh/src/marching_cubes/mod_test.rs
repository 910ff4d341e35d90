use glam::Vec3;

use super::*;

fn sphere_volume(n: usize, radius: f32) -> MedicalVolume {
    // Bright sphere (200) in dark background (0); surface at iso between.
    let center = (n as f32 - 1.0) / 2.0;
    let mut voxels = vec![0.0f32; n * n * n];
    for z in 0..n {
        for y in 0..n {
            for x in 0..n {
                let dx = x as f32 - center;
                let dy = y as f32 - center;
                let dz = z as f32 - center;
                if (dx * dx + dy * dy + dz * dz).sqrt() <= radius {
                    voxels[z * n * n + y * n + x] = 200.0;
                }
            }
        }
    }
    MedicalVolume::new(n, n, n, voxels, [1.0, 1.0, 1.0], [0.0; 3])
}

#[test]
fn sphere_produces_closed_looking_surface() {
    let vol = sphere_volume(16, 5.0);
    let mesh = extract_isosurface(&vol, 100.0).unwrap();

    assert!(!mesh.is_empty());
    assert!(mesh.triangle_count() > 0);
    assert!(mesh.is_well_formed());

    // Every vertex should sit near the sphere shell.
    let center = Vec3::splat(7.5);
    for &v in &mesh.vertices {
        let r = (v - center).length();
        assert!(
            (4.0..=6.5).contains(&r),
            "vertex {v:?} at radius {r} far from shell"
        );
    }
}

#[test]
fn normals_are_unit_or_zero_fallback() {
    let vol = sphere_volume(12, 4.0);
    let mesh = extract_isosurface(&vol, 100.0).unwrap();

    assert_eq!(mesh.normals.len(), mesh.faces.len());
    for &n in &mesh.normals {
        let len = n.length();
        assert!(
            (len - 1.0).abs() < 1e-4 || len == 0.0,
            "normal {n:?} has length {len}"
        );
    }
}

#[test]
fn normals_point_away_from_dense_interior() {
    let vol = sphere_volume(16, 5.0);
    let mesh = extract_isosurface(&vol, 100.0).unwrap();
    let center = Vec3::splat(7.5);

    let mut outward = 0usize;
    let mut total = 0usize;
    for (face, normal) in mesh.faces.iter().zip(&mesh.normals) {
        if normal.length() == 0.0 {
            continue;
        }
        let centroid = (mesh.vertices[face[0] as usize]
            + mesh.vertices[face[1] as usize]
            + mesh.vertices[face[2] as usize])
            / 3.0;
        if normal.dot(centroid - center) > 0.0 {
            outward += 1;
        }
        total += 1;
    }
    assert!(
        outward == total,
        "{outward}/{total} faces wind outward; winding is inconsistent"
    );
}

#[test]
fn shared_cell_faces_share_vertices() {
    // With edge-keyed dedup, the vertex count must be far below 3 * faces
    // on any surface spanning many cells (each interior vertex is shared).
    let vol = sphere_volume(16, 5.0);
    let mesh = extract_isosurface(&vol, 100.0).unwrap();
    assert!(mesh.vertices.len() < mesh.faces.len() * 3 / 2);
}

#[test]
fn iso_outside_range_yields_empty_mesh() {
    let vol = sphere_volume(8, 3.0);
    let mesh = extract_isosurface(&vol, 1000.0).unwrap();
    assert!(mesh.is_empty());
    assert_eq!(mesh.faces.len(), 0);
    assert_eq!(mesh.bounds, crate::types::Aabb::degenerate());
}

#[test]
fn uniform_volume_emits_nothing() {
    let vol = MedicalVolume::new(6, 6, 6, vec![50.0; 216], [1.0; 3], [0.0; 3]);
    assert!(extract_isosurface(&vol, 100.0).unwrap().is_empty());
    assert!(extract_isosurface(&vol, 10.0).unwrap().is_empty());
}

#[test]
fn corner_exactly_at_iso_straddles() {
    // One corner at the iso-value, the rest above: the cell straddles
    // (at/below vs above), so a triangle is emitted around that corner.
    let mut voxels = vec![200.0f32; 8];
    voxels[0] = 100.0;
    let vol = MedicalVolume::new(2, 2, 2, voxels, [1.0; 3], [0.0; 3]);
    let mesh = extract_isosurface(&vol, 100.0).unwrap();
    assert_eq!(mesh.faces.len(), 1);
    assert!(mesh.is_well_formed());
}

#[test]
fn too_thin_volume_emits_nothing() {
    // A single-slice volume has no unit cells.
    let vol = MedicalVolume::new(4, 4, 1, vec![200.0; 16], [1.0; 3], [0.0; 3]);
    let mesh = extract_isosurface(&vol, 100.0).unwrap();
    assert!(mesh.is_empty());
}

#[test]
fn spacing_and_origin_are_applied() {
    let mut vol = sphere_volume(8, 2.5);
    vol.spacing = [0.5, 0.5, 2.0];
    vol.origin = [10.0, 0.0, -5.0];
    let mesh = extract_isosurface(&vol, 100.0).unwrap();

    assert!(!mesh.is_empty());
    for &v in &mesh.vertices {
        assert!(v.x >= 10.0 && v.x <= 10.0 + 7.0 * 0.5);
        assert!(v.z >= -5.0 && v.z <= -5.0 + 7.0 * 2.0);
    }
}

#[test]
fn bounding_box_contains_every_vertex() {
    let vol = sphere_volume(12, 4.0);
    let mesh = extract_isosurface(&vol, 100.0).unwrap();
    for &v in &mesh.vertices {
        assert!(mesh.bounds.contains(v));
    }
}

#[test]
fn face_normal_degenerate_is_zero() {
    let p = Vec3::new(1.0, 2.0, 3.0);
    assert_eq!(face_normal(p, p, p), Vec3::ZERO);
    let n = face_normal(Vec3::ZERO, Vec3::X, Vec3::Y);
    assert!((n.length() - 1.0).abs() < 1e-6);
    assert!((n - Vec3::Z).length() < 1e-6);
}

#[test]
fn default_iso_sits_between_background_and_soft_tissue() {
    let iso = default_iso_value();
    assert!(iso > TissueClass::Background.level());
    assert!(iso < TissueClass::SoftTissue.level());
}

#[test]
fn segmented_wrapper_delegates() {
    let vol = sphere_volume(10, 3.0);
    let segmented = SegmentedVolume {
        volume: vol.clone(),
        threshold: 100.0,
    };
    let a = extract_surface(&segmented, 100.0).unwrap();
    let b = extract_isosurface(&vol, 100.0).unwrap();
    assert_eq!(a.vertices.len(), b.vertices.len());
    assert_eq!(a.faces, b.faces);
}
