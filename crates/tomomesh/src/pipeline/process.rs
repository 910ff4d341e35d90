//! Synchronous stage driver.
//!
//! Runs the full reconstruction — source acquisition through export — on
//! the calling thread, emitting a stage event at each milestone. The
//! orchestrator wraps this in a background task; tests call it directly.

use std::fs;
use std::path::Path;

use tracing::{debug, info};
use web_time::Instant;

use crate::constants::DEFAULT_SIGMA;
use crate::error::{ReconError, Result};
use crate::export::write_mesh;
use crate::filter::gaussian_smooth;
use crate::marching_cubes::{default_iso_value, extract_surface};
use crate::optimize::optimize_mesh;
use crate::segment::segment_volume;
use crate::synthesize::{decode_image, synthesize_volume};
use crate::types::ProcessingOptions;

use super::types::{ImageSource, JobId, JobStage, ReconstructionOutput};

/// Run every stage for one job, in order.
///
/// `emit` is called with each non-terminal stage as it begins; terminal
/// notification is the caller's responsibility. On failure, any artifacts
/// already written for this job are removed before the error is returned.
pub fn run_stages(
    job_id: JobId,
    source: ImageSource,
    options: &ProcessingOptions,
    output_dir: &Path,
    emit: &mut dyn FnMut(JobStage),
) -> Result<ReconstructionOutput> {
    let started = Instant::now();
    emit(JobStage::Initializing);

    emit(JobStage::Validating);
    if options.output_formats.is_empty() {
        return Err(ReconError::InvalidInput(
            "at least one output format is required".into(),
        ));
    }

    emit(JobStage::Downloading);
    let bytes = match source {
        ImageSource::Bytes(bytes) => bytes,
        ImageSource::Path(path) => fs::read(&path)?,
    };
    if bytes.is_empty() {
        return Err(ReconError::InvalidInput("image source is empty".into()));
    }

    emit(JobStage::Preprocessing);
    let image = decode_image(&bytes)?;
    debug!(job = %job_id, width = image.width(), height = image.height(), "decoded input raster");

    emit(JobStage::VolumeGeneration);
    let volume = synthesize_volume(&image)?;

    emit(JobStage::Filtering);
    let filtered = gaussian_smooth(&volume, DEFAULT_SIGMA, options.quality.filter_passes())?;

    emit(JobStage::Segmentation);
    let segmented = segment_volume(&filtered)?;
    debug!(job = %job_id, threshold = segmented.threshold, "segmented volume");

    emit(JobStage::MeshGeneration);
    let mut mesh = extract_surface(&segmented, default_iso_value())?;

    // Optional stage: skipped entirely (milestone included) when disabled.
    if options.mesh_optimization {
        emit(JobStage::Optimization);
        mesh = optimize_mesh(&mesh, options.quality.smoothing_iterations());
    }

    emit(JobStage::Export);
    let stem = job_id.to_string();
    let mut artifacts = Vec::with_capacity(options.output_formats.len());
    for &format in &options.output_formats {
        match write_mesh(&mesh, format, output_dir, &stem) {
            Ok(path) => artifacts.push((format, path)),
            Err(err) => {
                // Partial exports must not linger on disk.
                for (_, path) in &artifacts {
                    fs::remove_file(path).ok();
                }
                return Err(err);
            }
        }
    }

    let elapsed_ms = started.elapsed().as_millis() as u64;
    info!(
        job = %job_id,
        vertices = mesh.vertices.len(),
        faces = mesh.faces.len(),
        elapsed_ms,
        "reconstruction complete"
    );

    Ok(ReconstructionOutput {
        job_id,
        artifacts,
        vertex_count: mesh.vertices.len(),
        face_count: mesh.faces.len(),
        bounds: mesh.bounds,
        threshold: segmented.threshold,
        elapsed_ms,
    })
}

#[cfg(test)]
#[path = "process_test.rs"]
mod process_test;
