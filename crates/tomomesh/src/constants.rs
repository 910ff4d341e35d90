//! Volume layout and pipeline constants.
//!
//! # Synthetic volume layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    SYNTHESIZED VOLUME LAYOUT                        │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │                                                                     │
//! │  Slice z:   0 ....... D/2 ....... D-1                              │
//! │             │          │           │                                │
//! │             │          │           └─ dimmest (attenuation → min)   │
//! │             │          └─ center plane, full luminance              │
//! │             └─ dimmest                                              │
//! │                                                                     │
//! │  Depth D is a bounded function of the image area so that very       │
//! │  small and very large rasters both land in [MIN_DEPTH, MAX_DEPTH].  │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Memory layout
//!
//! Voxels are stored row-major with X fastest, then Y, then Z:
//!
//! ```text
//! index = z * (width * height) + y * width + x
//! ```
//!
//! One z-slice is a contiguous `width * height` block, which is what the
//! enhancement filter parallelizes over.

/// Smallest synthesized depth (slices).
pub const MIN_DEPTH: usize = 32;

/// Largest synthesized depth (slices). Caps voxel count for huge rasters.
pub const MAX_DEPTH: usize = 64;

/// In-plane voxel spacing (x and y), nominal millimetres.
pub const IN_PLANE_SPACING: f32 = 0.5;

/// Through-plane voxel spacing (z). Conventionally coarser than in-plane.
pub const THROUGH_PLANE_SPACING: f32 = 1.0;

/// Number of intensity histogram bins used by threshold selection.
pub const HISTOGRAM_BINS: usize = 256;

/// Band boundary in tenths of the threshold: below 3/10 → background.
///
/// Cut-offs are expressed in tenths because 0.3 and 0.7 have no exact
/// binary representation; comparing `10·v` against `tenths·t` keeps the
/// band boundaries exact for integral thresholds.
pub const LOW_BAND_TENTHS: f32 = 3.0;

/// Band boundary in tenths of the threshold: below 7/10 → soft tissue.
pub const MID_BAND_TENTHS: f32 = 7.0;

/// Default smoothing sigma for the 3-tap Gaussian kernel.
pub const DEFAULT_SIGMA: f32 = 1.0;

/// Convert 3D voxel coordinates to a linear index.
///
/// Layout: X is minor (stride 1), Y is middle (stride `width`), Z is major
/// (stride `width * height`).
#[inline(always)]
pub const fn voxel_index(x: usize, y: usize, z: usize, width: usize, height: usize) -> usize {
    z * width * height + y * width + x
}

/// Select a synthesized depth from the raster dimensions.
///
/// Grows with the image area but is clamped to `[MIN_DEPTH, MAX_DEPTH]` so
/// the voxel count stays bounded as a function of the input.
#[inline]
pub fn depth_for_image(width: u32, height: u32) -> usize {
    let area = (width as f64) * (height as f64);
    let d = (area.sqrt() / 4.0).round() as usize;
    d.clamp(MIN_DEPTH, MAX_DEPTH)
}
