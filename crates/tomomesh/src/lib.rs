//! tomomesh - 2D raster to 3D printable mesh reconstruction
//!
//! This crate turns a single 2D grayscale raster into a triangulated 3D
//! surface, the way a tomography stack would be reconstructed: intensity
//! becomes a depth-attenuated scalar field, the field is smoothed and
//! segmented into tissue bands, and a marching-cubes pass extracts the
//! surface for export to OBJ, STL or PLY.
//!
//! # Stages
//!
//! - **Volume synthesis**: pseudo-3D scalar field from pixel intensity
//!   with Gaussian depth attenuation
//! - **Enhancement filter**: separable 3×3×3 Gaussian smoothing
//! - **Segmentation**: Otsu's automatic threshold plus fixed tissue bands
//! - **Surface extraction**: full case-table marching cubes with
//!   crack-free vertex sharing
//! - **Export**: deterministic ASCII serializers for three mesh formats
//!
//! # Example
//!
//! ```ignore
//! use tomomesh::{ImageSource, JobId, ProcessingOptions, Reconstructor};
//!
//! let reconstructor = Reconstructor::new("out");
//! let job = JobId::generate();
//!
//! // Fire-and-forget: returns immediately, work runs on rayon's pool
//! let handle = reconstructor.start_reconstruction(
//!     job,
//!     ImageSource::Path("scan.png".into()),
//!     ProcessingOptions::default(),
//! )?;
//!
//! match handle.wait(std::time::Duration::from_secs(60)) {
//!     Some(outcome) => println!("{outcome:?}"),
//!     None => println!("still running"),
//! }
//! # Ok::<(), tomomesh::ReconError>(())
//! ```

pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use error::{ReconError, Result};
pub use types::{
    Aabb, MedicalVolume, Mesh, OutputFormat, ProcessingOptions, Quality, SegmentedVolume,
    TissueClass,
};

// Stage 1: raster decoding and volume synthesis
pub mod synthesize;
pub use synthesize::{decode_image, synthesize_volume};

// Stage 2: enhancement filter
pub mod filter;
pub use filter::gaussian_smooth;

// Stage 3: segmentation
pub mod segment;
pub use segment::{classify, otsu_threshold, segment_volume};

// Stage 4: surface extraction
pub mod marching_cubes;
pub use marching_cubes::{default_iso_value, extract_isosurface, extract_surface};

// Optional mesh optimization
pub mod optimize;
pub use optimize::optimize_mesh;

// Stage 5: export serializers
pub mod export;
pub use export::{serialize_mesh, write_mesh};

// Job orchestration
pub mod pipeline;
pub use pipeline::{
    channel_listener, ImageSource, JobHandle, JobId, JobOutcome, JobStage, ProgressEvent,
    Reconstructor, ReconstructionOutput,
};
