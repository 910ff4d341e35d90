use super::*;

fn volume_from(values: Vec<f32>) -> MedicalVolume {
    let len = values.len();
    MedicalVolume::new(len, 1, 1, values, [0.5, 0.5, 1.0], [0.0; 3])
}

#[test]
fn histogram_counts_and_clamps() {
    let vol = volume_from(vec![-10.0, 0.0, 127.9, 255.0, 300.0]);
    let hist = intensity_histogram(&vol);
    assert_eq!(hist[0], 2); // -10 clamps to 0
    assert_eq!(hist[127], 1);
    assert_eq!(hist[255], 2); // 300 clamps to 255
    assert_eq!(hist.iter().sum::<u64>(), 5);
}

#[test]
fn otsu_separates_bimodal_histogram() {
    let mut hist = [0u64; 256];
    hist[20] = 1000;
    hist[200] = 1000;
    let t = otsu_threshold(&hist);
    // The threshold must fall strictly between the two modes.
    assert!(t >= 20 && t < 200, "threshold {t} outside modes");
}

#[test]
fn otsu_flat_histogram_is_deterministic() {
    // A single-bin histogram has no two-class partition; the search must
    // terminate at a boundary level without panicking.
    let mut hist = [0u64; 256];
    hist[128] = 10_000;
    assert_eq!(otsu_threshold(&hist), 0);

    let empty = [0u64; 256];
    assert_eq!(otsu_threshold(&empty), 0);
}

#[test]
fn otsu_prefers_first_maximizing_level() {
    // Symmetric two-spike histogram: several levels between the spikes give
    // identical inter-class variance; the first one must win.
    let mut hist = [0u64; 256];
    hist[100] = 500;
    hist[104] = 500;
    assert_eq!(otsu_threshold(&hist), 100);
}

#[test]
fn threshold_always_in_byte_range() {
    for spread in [0usize, 1, 50, 255] {
        let mut hist = [0u64; 256];
        hist[0] = 10;
        hist[spread] += 10;
        let t = otsu_threshold(&hist);
        assert!(usize::from(t) <= 255);
    }
}

#[test]
fn classify_band_boundaries() {
    let t = 100.0;
    assert_eq!(classify(0.0, t), TissueClass::Background);
    assert_eq!(classify(29.9, t), TissueClass::Background);
    assert_eq!(classify(30.0, t), TissueClass::SoftTissue);
    assert_eq!(classify(69.9, t), TissueClass::SoftTissue);
    assert_eq!(classify(70.0, t), TissueClass::DenseTissue);
    assert_eq!(classify(99.9, t), TissueClass::DenseTissue);
    assert_eq!(classify(100.0, t), TissueClass::Bone);
    assert_eq!(classify(255.0, t), TissueClass::Bone);
}

#[test]
fn classify_cut_offs_are_exact_for_integral_thresholds() {
    // A value exactly on a band cut-off belongs to the upper band. The
    // fixtures use thresholds whose tenths are whole numbers, where the
    // scaled comparison is exact.
    for (t, low, mid) in [(10.0, 3.0, 7.0), (50.0, 15.0, 35.0), (200.0, 60.0, 140.0)] {
        assert_eq!(classify(low, t), TissueClass::SoftTissue);
        assert_eq!(classify(mid, t), TissueClass::DenseTissue);
        assert_eq!(classify(t, t), TissueClass::Bone);
    }
}

#[test]
fn segment_restricts_values_to_class_levels() {
    let vol = volume_from((0..=255).map(|v| v as f32).collect());
    let seg = segment_volume(&vol).unwrap();

    let levels: Vec<f32> = TissueClass::ALL.iter().map(|c| c.level()).collect();
    for &v in &seg.volume.voxels {
        assert!(levels.contains(&v), "value {v} not a class level");
    }
    assert_eq!(seg.volume.voxels.len(), vol.voxels.len());
    assert!((0.0..=255.0).contains(&seg.threshold));
}

#[test]
fn uniform_volume_collapses_into_one_class() {
    let vol = volume_from(vec![128.0; 64]);
    let seg = segment_volume(&vol).unwrap();
    let first = seg.volume.voxels[0];
    assert!(seg.volume.voxels.iter().all(|&v| v == first));
}
