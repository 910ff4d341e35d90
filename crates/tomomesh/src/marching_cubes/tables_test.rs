use super::*;

#[test]
fn homogeneous_cells_have_no_edges() {
    assert_eq!(EDGE_TABLE[0], 0, "all corners above iso: no crossings");
    assert_eq!(EDGE_TABLE[255], 0, "all corners below iso: no crossings");
}

#[test]
fn edge_table_is_symmetric_under_complement() {
    // Flipping which side each corner lies on leaves the crossed-edge set
    // unchanged.
    for index in 0..256usize {
        assert_eq!(EDGE_TABLE[index], EDGE_TABLE[255 - index]);
    }
}

#[test]
fn single_corner_crosses_three_edges() {
    for corner in 0..8usize {
        let mask = EDGE_TABLE[1 << corner];
        assert_eq!(
            mask.count_ones(),
            3,
            "corner {corner} should cross exactly its 3 incident edges"
        );
    }
}

#[test]
fn edge_corners_each_appear_three_times() {
    // Every cube corner is an endpoint of exactly 3 edges.
    let mut counts = [0usize; 8];
    for pair in EDGE_CORNERS {
        counts[pair[0] as usize] += 1;
        counts[pair[1] as usize] += 1;
    }
    assert_eq!(counts, [3; 8]);
}

#[test]
fn tri_table_terminators_and_bounds() {
    for (index, row) in TRI_TABLE.iter().enumerate() {
        let mut seen_terminator = false;
        let mut count = 0usize;
        for &e in row {
            if e < 0 {
                seen_terminator = true;
            } else {
                assert!(
                    !seen_terminator,
                    "case {index}: edge entry after terminator"
                );
                assert!((e as usize) < 12, "case {index}: edge {e} out of range");
                count += 1;
            }
        }
        assert_eq!(count % 3, 0, "case {index}: partial triangle");
        assert!(count <= 15, "case {index}: more than 5 triangles");
    }
}

#[test]
fn tri_table_uses_only_crossed_edges() {
    // Every edge a case triangulates must be an edge the surface crosses
    // per the edge table — otherwise interpolation would be undefined.
    for index in 0..256usize {
        let edge_mask = EDGE_TABLE[index];
        for &e in TRI_TABLE[index].iter().take_while(|&&e| e >= 0) {
            assert!(
                edge_mask & (1 << e) != 0,
                "case {index}: triangle references uncrossed edge {e}"
            );
        }
    }
}

#[test]
fn tri_table_empty_only_for_homogeneous_cases() {
    for index in 1..255usize {
        assert!(
            TRI_TABLE[index][0] >= 0,
            "mixed case {index} must emit at least one triangle"
        );
    }
    assert_eq!(TRI_TABLE[0][0], -1);
    assert_eq!(TRI_TABLE[255][0], -1);
}

#[test]
fn corner_offsets_match_edge_endpoints() {
    // Each edge must connect two corners that differ along exactly one axis.
    for pair in EDGE_CORNERS {
        let a = CORNER_OFFSETS[pair[0] as usize];
        let b = CORNER_OFFSETS[pair[1] as usize];
        let diff = (a.0 != b.0) as u8 + (a.1 != b.1) as u8 + (a.2 != b.2) as u8;
        assert_eq!(diff, 1);
    }
}
