//! Stage 1: Volume Synthesizer.
//!
//! Builds a pseudo-3D scalar field from a flat 2D raster. Each pixel's
//! luminance is replicated along the depth axis and scaled by a Gaussian
//! attenuation that peaks at the center plane, so slices near the image
//! plane are brightest and slices toward the extremes fade out.

use image::GrayImage;
use tracing::debug;

use crate::constants::{depth_for_image, IN_PLANE_SPACING, THROUGH_PLANE_SPACING};
use crate::error::{ReconError, Result};
use crate::types::MedicalVolume;

/// Decode an uploaded byte stream into a luminance raster.
///
/// Color inputs are converted with the standard perceptual weighting
/// (Rec. 601: 0.299 R + 0.587 G + 0.114 B), which is what `image`'s
/// `to_luma8` applies. Undecodable bytes and zero-sized rasters are
/// rejected with [`ReconError::InvalidInput`] before any volume memory is
/// allocated.
pub fn decode_image(bytes: &[u8]) -> Result<GrayImage> {
    let dynamic = image::load_from_memory(bytes)?;
    let gray = dynamic.to_luma8();
    if gray.width() == 0 || gray.height() == 0 {
        return Err(ReconError::InvalidInput(
            "image decoded to zero width/height".into(),
        ));
    }
    Ok(gray)
}

/// Synthesize a `width × height × D` volume from a luminance raster.
///
/// `D` is selected by [`depth_for_image`] and always lands in the bounded
/// depth range, which caps the voxel count regardless of the raster size.
pub fn synthesize_volume(image: &GrayImage) -> Result<MedicalVolume> {
    let width = image.width() as usize;
    let height = image.height() as usize;
    if width == 0 || height == 0 {
        return Err(ReconError::InvalidInput("empty raster".into()));
    }

    let depth = depth_for_image(image.width(), image.height());
    let slice_len = width * height;

    // Attenuation per slice: Gaussian falloff from the center plane.
    let center = (depth as f32 - 1.0) / 2.0;
    let sigma_z = depth as f32 / 3.0;
    let attenuation: Vec<f32> = (0..depth)
        .map(|z| {
            let dz = (z as f32 - center) / sigma_z;
            (-dz * dz).exp()
        })
        .collect();

    let mut voxels = Vec::with_capacity(slice_len * depth);
    for &a in &attenuation {
        for pixel in image.pixels() {
            voxels.push(pixel.0[0] as f32 * a);
        }
    }

    debug!(width, height, depth, "synthesized volume");

    Ok(MedicalVolume::new(
        width,
        height,
        depth,
        voxels,
        [IN_PLANE_SPACING, IN_PLANE_SPACING, THROUGH_PLANE_SPACING],
        [0.0; 3],
    ))
}
