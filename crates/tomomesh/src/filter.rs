//! Stage 2: Enhancement Filter.
//!
//! Discrete Gaussian smoothing over each voxel's 3×3×3 neighborhood,
//! implemented as three separable 3-tap passes (X, then Y, then Z). The
//! separable form visits 9 taps per voxel instead of 27 and is equivalent
//! to the full kernel up to floating-point rounding.
//!
//! Boundary voxels use only in-bounds taps with the weight sum
//! renormalized, so edges are not artificially darkened.

use rayon::prelude::*;
use tracing::debug;

use crate::error::{ReconError, Result};
use crate::types::MedicalVolume;

/// Axis along which a separable pass runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    X,
    Y,
    Z,
}

/// 3-tap kernel weights for a given sigma: `[side, center, side]`.
///
/// Computed from the continuous Gaussian at offsets -1, 0, +1 and
/// normalized to sum to one.
fn kernel_3tap(sigma: f32) -> [f32; 3] {
    let side = (-1.0 / (2.0 * sigma * sigma)).exp();
    let sum = 1.0 + 2.0 * side;
    [side / sum, 1.0 / sum, side / sum]
}

/// Smooth a volume with `passes` separable Gaussian applications.
///
/// Purely a function of the input voxels and `sigma`; no randomness. The
/// output is checked for finiteness and [`ReconError::NumericDegeneracy`]
/// is raised rather than propagating NaN/Inf downstream.
pub fn gaussian_smooth(
    volume: &MedicalVolume,
    sigma: f32,
    passes: usize,
) -> Result<MedicalVolume> {
    let kernel = kernel_3tap(sigma);

    let mut voxels = volume.voxels.clone();
    for _ in 0..passes.max(1) {
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            voxels = blur_axis(&voxels, volume, axis, kernel);
        }
    }

    let out = volume.like(voxels);
    if !out.all_finite() {
        return Err(ReconError::NumericDegeneracy { stage: "filter" });
    }
    debug!(sigma, passes, "enhancement filter applied");
    Ok(out)
}

/// One separable pass along `axis`, producing a fresh buffer.
///
/// Parallelized over z-slices; each output slice reads only the immutable
/// input buffer, so slices are independent.
fn blur_axis(input: &[f32], shape: &MedicalVolume, axis: Axis, kernel: [f32; 3]) -> Vec<f32> {
    let (w, h, d) = (shape.width, shape.height, shape.depth);
    let slice_len = w * h;

    let mut output = vec![0.0f32; input.len()];
    output
        .par_chunks_mut(slice_len)
        .enumerate()
        .for_each(|(z, out_slice)| {
            for y in 0..h {
                for x in 0..w {
                    let mut acc = 0.0f32;
                    let mut weight = 0.0f32;
                    for (tap, &k) in kernel.iter().enumerate() {
                        let offset = tap as isize - 1;
                        let (tx, ty, tz) = match axis {
                            Axis::X => (x as isize + offset, y as isize, z as isize),
                            Axis::Y => (x as isize, y as isize + offset, z as isize),
                            Axis::Z => (x as isize, y as isize, z as isize + offset),
                        };
                        if tx < 0 || ty < 0 || tz < 0 {
                            continue;
                        }
                        let (tx, ty, tz) = (tx as usize, ty as usize, tz as usize);
                        if tx >= w || ty >= h || tz >= d {
                            continue;
                        }
                        acc += k * input[tz * slice_len + ty * w + tx];
                        weight += k;
                    }
                    // weight > 0 always: the center tap is in bounds.
                    out_slice[y * w + x] = acc / weight;
                }
            }
        });

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_volume(w: usize, h: usize, d: usize, fill: f32) -> MedicalVolume {
        MedicalVolume::new(w, h, d, vec![fill; w * h * d], [0.5, 0.5, 1.0], [0.0; 3])
    }

    #[test]
    fn kernel_is_normalized() {
        let k = kernel_3tap(1.0);
        let sum: f32 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(k[1] > k[0]);
        assert_eq!(k[0], k[2]);
    }

    #[test]
    fn uniform_volume_is_unchanged() {
        let vol = test_volume(8, 8, 8, 77.0);
        let out = gaussian_smooth(&vol, 1.0, 1).unwrap();
        for &v in &out.voxels {
            assert!((v - 77.0).abs() < 1e-3);
        }
    }

    #[test]
    fn output_shape_matches_input() {
        let vol = test_volume(5, 7, 3, 1.0);
        let out = gaussian_smooth(&vol, 1.0, 2).unwrap();
        assert_eq!(out.width, vol.width);
        assert_eq!(out.height, vol.height);
        assert_eq!(out.depth, vol.depth);
        assert_eq!(out.voxels.len(), vol.voxels.len());
        assert_eq!(out.spacing, vol.spacing);
    }

    #[test]
    fn impulse_spreads_to_neighbors() {
        let mut vol = test_volume(5, 5, 5, 0.0);
        let center = vol.index(2, 2, 2);
        vol.voxels[center] = 100.0;

        let out = gaussian_smooth(&vol, 1.0, 1).unwrap();
        assert!(out.at(2, 2, 2) < 100.0);
        assert!(out.at(1, 2, 2) > 0.0);
        assert!(out.at(2, 3, 2) > 0.0);
        assert!(out.at(2, 2, 1) > 0.0);
        // Smoothing does not create intensity out of nothing.
        assert!(out.at(2, 2, 2) > out.at(1, 2, 2));
    }

    #[test]
    fn edges_are_not_darkened() {
        // With renormalized boundary weights, a constant field stays
        // constant even at corners.
        let vol = test_volume(4, 4, 4, 50.0);
        let out = gaussian_smooth(&vol, 1.0, 1).unwrap();
        assert!((out.at(0, 0, 0) - 50.0).abs() < 1e-3);
        assert!((out.at(3, 3, 3) - 50.0).abs() < 1e-3);
    }

    #[test]
    fn nan_input_is_detected() {
        let mut vol = test_volume(3, 3, 3, 1.0);
        vol.voxels[0] = f32::NAN;
        let err = gaussian_smooth(&vol, 1.0, 1).unwrap_err();
        assert!(matches!(err, ReconError::NumericDegeneracy { stage: "filter" }));
    }

    #[test]
    fn deterministic_across_runs() {
        let mut vol = test_volume(6, 6, 6, 0.0);
        for (i, v) in vol.voxels.iter_mut().enumerate() {
            *v = (i % 13) as f32;
        }
        let a = gaussian_smooth(&vol, 1.0, 1).unwrap();
        let b = gaussian_smooth(&vol, 1.0, 1).unwrap();
        assert_eq!(a.voxels, b.voxels);
    }
}
