//! Job identifiers, stage milestones and progress events.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::{Aabb, OutputFormat};

/// Unique identifier for a reconstruction job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl JobId {
    /// Generate a process-unique job id.
    pub fn generate() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw counter value, used for artifact file stems.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// Pipeline stages in execution order, each pinned to a progress milestone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JobStage {
    Initializing,
    Validating,
    Downloading,
    Preprocessing,
    VolumeGeneration,
    Filtering,
    Segmentation,
    MeshGeneration,
    Optimization,
    Export,
    Completed,
    Failed,
}

impl JobStage {
    /// All non-terminal stages plus `Completed`, in execution order.
    pub const MILESTONES: [JobStage; 11] = [
        JobStage::Initializing,
        JobStage::Validating,
        JobStage::Downloading,
        JobStage::Preprocessing,
        JobStage::VolumeGeneration,
        JobStage::Filtering,
        JobStage::Segmentation,
        JobStage::MeshGeneration,
        JobStage::Optimization,
        JobStage::Export,
        JobStage::Completed,
    ];

    /// Progress milestone in percent.
    ///
    /// `Failed` carries no milestone of its own; failure events report the
    /// furthest milestone the job reached (the registry clamps upward).
    pub fn progress(&self) -> u8 {
        match self {
            JobStage::Initializing => 0,
            JobStage::Validating => 5,
            JobStage::Downloading => 10,
            JobStage::Preprocessing => 15,
            JobStage::VolumeGeneration => 30,
            JobStage::Filtering => 45,
            JobStage::Segmentation => 60,
            JobStage::MeshGeneration => 75,
            JobStage::Optimization => 85,
            JobStage::Export => 95,
            JobStage::Completed => 100,
            JobStage::Failed => 0,
        }
    }

    /// Terminal stages end the job; no events follow them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStage::Completed | JobStage::Failed)
    }
}

/// One progress notification delivered to a job's listener.
#[derive(Clone, Debug)]
pub struct ProgressEvent {
    pub job_id: JobId,
    pub stage: JobStage,
    /// Percent complete, non-decreasing over a job's lifetime.
    pub progress: u8,
    /// Present on failure events: a short error summary.
    pub message: Option<String>,
}

impl ProgressEvent {
    /// Event at the stage's own milestone.
    pub fn at_stage(job_id: JobId, stage: JobStage) -> Self {
        Self {
            job_id,
            stage,
            progress: stage.progress(),
            message: None,
        }
    }

    /// Failure event carrying an error summary.
    pub fn failed(job_id: JobId, message: String) -> Self {
        Self {
            job_id,
            stage: JobStage::Failed,
            progress: JobStage::Failed.progress(),
            message: Some(message),
        }
    }
}

/// Where the input raster comes from.
#[derive(Clone, Debug)]
pub enum ImageSource {
    /// Encoded image bytes already in memory.
    Bytes(Vec<u8>),
    /// Path to an encoded image on disk, read during the download stage.
    Path(PathBuf),
}

/// Everything a completed job hands back.
#[derive(Clone, Debug)]
pub struct ReconstructionOutput {
    pub job_id: JobId,
    /// One artifact per requested format, named `<job>.<ext>`.
    pub artifacts: Vec<(OutputFormat, PathBuf)>,
    pub vertex_count: usize,
    pub face_count: usize,
    pub bounds: Aabb,
    /// Otsu threshold chosen during segmentation.
    pub threshold: f32,
    pub elapsed_ms: u64,
}

/// Terminal state of a job, retrieved by polling its handle.
#[derive(Debug)]
pub enum JobOutcome {
    Completed(ReconstructionOutput),
    Failed(crate::error::ReconError),
}

impl JobOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, JobOutcome::Completed(_))
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
