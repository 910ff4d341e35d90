//! Job orchestration for the reconstruction pipeline.
//!
//! ```text
//!                     RECONSTRUCTION TASK GRAPH
//!                     =========================
//!
//!   start_reconstruction(job_id, source, options)
//!                          │ rayon::spawn (fire-and-forget)
//!                          ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │ ACQUIRE                                                     │
//! │   Validating (5%)  : options sanity                         │
//! │   Downloading (10%): resolve ImageSource to encoded bytes   │
//! │   Preprocessing (15%): decode to 8-bit grayscale            │
//! └────────────────────────┬────────────────────────────────────┘
//!                          ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │ RECONSTRUCT                                                 │
//! │   VolumeGeneration (30%): depth-attenuated scalar field     │
//! │   Filtering (45%)       : separable 3³ Gaussian             │
//! │   Segmentation (60%)    : Otsu threshold + tissue bands     │
//! └────────────────────────┬────────────────────────────────────┘
//!                          ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │ MESH                                                        │
//! │   MeshGeneration (75%): marching cubes                      │
//! │   Optimization (85%)  : optional Laplacian smoothing        │
//! │   Export (95%)        : one artifact per requested format   │
//! └────────────────────────┬────────────────────────────────────┘
//!                          ▼
//!        Completed (100%) │ Failed (artifacts removed)
//!            exactly one terminal event per job
//! ```
//!
//! Progress reaches each listener through a [`ListenerRegistry`], which
//! clamps regressions and guarantees a single terminal notification.

mod orchestrator;
mod process;
mod progress;
mod types;

pub use orchestrator::{JobHandle, Reconstructor};
pub use process::run_stages;
pub use progress::{channel_listener, ListenerRegistry, ProgressListener};
pub use types::{
    ImageSource, JobId, JobOutcome, JobStage, ProgressEvent, ReconstructionOutput,
};
