//! Stage 3: Segmentation Engine.
//!
//! Classifies voxels into four tissue bands using an automatically
//! computed threshold: intensities are clamped to `[0, 255]`, collected
//! into a 256-bin histogram, and the threshold maximizing inter-class
//! variance between the two induced partitions is selected (Otsu's
//! method). Band boundaries are fixed fractions of that single threshold.

use tracing::debug;

use crate::constants::{HISTOGRAM_BINS, LOW_BAND_TENTHS, MID_BAND_TENTHS};
use crate::error::Result;
use crate::types::{MedicalVolume, SegmentedVolume, TissueClass};

/// Build a 256-bin histogram of intensities clamped to `[0, 255]`.
pub fn intensity_histogram(volume: &MedicalVolume) -> [u64; HISTOGRAM_BINS] {
    let mut histogram = [0u64; HISTOGRAM_BINS];
    for &v in &volume.voxels {
        let bin = v.clamp(0.0, 255.0) as usize;
        histogram[bin] += 1;
    }
    histogram
}

/// Variance-maximizing threshold search over all 256 candidate levels.
///
/// Deterministic and exact for the given histogram; ties resolve to the
/// first maximizing level. A flat histogram (uniform volume) yields a
/// boundary threshold and never panics: the search skips partitions with
/// an empty class.
pub fn otsu_threshold(histogram: &[u64; HISTOGRAM_BINS]) -> u8 {
    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 0;
    }

    let weighted_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(level, &count)| level as f64 * count as f64)
        .sum();

    let mut best_level = 0u8;
    let mut best_variance = f64::NEG_INFINITY;

    let mut background_count = 0u64;
    let mut background_sum = 0.0f64;

    for level in 0..HISTOGRAM_BINS {
        background_count += histogram[level];
        background_sum += level as f64 * histogram[level] as f64;

        let foreground_count = total - background_count;
        if background_count == 0 || foreground_count == 0 {
            continue;
        }

        let w_b = background_count as f64;
        let w_f = foreground_count as f64;
        let mean_b = background_sum / w_b;
        let mean_f = (weighted_total - background_sum) / w_f;
        let diff = mean_b - mean_f;
        let variance = w_b * w_f * diff * diff;

        // Strict comparison keeps the first maximizing level on ties.
        if variance > best_variance {
            best_variance = variance;
            best_level = level as u8;
        }
    }

    best_level
}

/// Quantize one intensity into its tissue band.
///
/// Cut-offs sit at 3/10 and 7/10 of the threshold. The comparison scales
/// both sides by ten so a value exactly on a cut-off lands in the upper
/// band (0.3 and 0.7 are not exact in binary; `0.3 * 100.0` would push
/// the boundary above 30).
#[inline]
pub fn classify(value: f32, threshold: f32) -> TissueClass {
    let v = value.clamp(0.0, 255.0);
    if 10.0 * v < LOW_BAND_TENTHS * threshold {
        TissueClass::Background
    } else if 10.0 * v < MID_BAND_TENTHS * threshold {
        TissueClass::SoftTissue
    } else if v < threshold {
        TissueClass::DenseTissue
    } else {
        TissueClass::Bone
    }
}

/// Segment a filtered volume into the four-class level set.
pub fn segment_volume(volume: &MedicalVolume) -> Result<SegmentedVolume> {
    let histogram = intensity_histogram(volume);
    let threshold = otsu_threshold(&histogram) as f32;

    let voxels: Vec<f32> = volume
        .voxels
        .iter()
        .map(|&v| classify(v, threshold).level())
        .collect();

    debug!(threshold, "segmentation threshold selected");

    Ok(SegmentedVolume {
        volume: volume.like(voxels),
        threshold,
    })
}

#[cfg(test)]
#[path = "segment_test.rs"]
mod segment_test;
