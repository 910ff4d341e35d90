//! Error taxonomy for the reconstruction pipeline.
//!
//! Every numeric stage surfaces a typed error to the orchestrator; the
//! orchestrator never retries (the pipeline is deterministic) and instead
//! transitions the job to `Failed`, cleans up and notifies listeners once.

use crate::pipeline::JobId;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ReconError>;

/// Typed pipeline error.
#[derive(Debug, thiserror::Error)]
pub enum ReconError {
    /// Image bytes cannot be decoded, or decode to zero width/height.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Staging download/read/write failure.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// A stage produced non-finite values that cannot be corrected in place.
    #[error("numeric degeneracy in {stage}")]
    NumericDegeneracy {
        /// Pipeline stage that detected the degeneracy.
        stage: &'static str,
    },

    /// Duplicate start request for a job identifier currently non-terminal.
    #[error("job {0} is already in progress")]
    AlreadyInProgress(JobId),
}

impl From<image::ImageError> for ReconError {
    fn from(err: image::ImageError) -> Self {
        ReconError::InvalidInput(err.to_string())
    }
}

impl ReconError {
    /// Short message suitable for listener notifications.
    pub fn summary(&self) -> String {
        self.to_string()
    }
}
