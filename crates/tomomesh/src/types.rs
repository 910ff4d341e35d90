//! Core data types for volumes and meshes.

use glam::Vec3;

use crate::constants::voxel_index;

/// A regular 3D scalar grid of intensity samples.
///
/// Each pipeline stage consumes a volume and produces a *new* one with
/// identical shape; stages never mutate their input in place.
#[derive(Clone, Debug)]
pub struct MedicalVolume {
    /// Samples along X.
    pub width: usize,
    /// Samples along Y.
    pub height: usize,
    /// Samples along Z (synthesized slices).
    pub depth: usize,
    /// Flat intensity buffer, `width * height * depth` entries.
    pub voxels: Vec<f32>,
    /// Nominal physical distance per voxel per axis.
    pub spacing: [f32; 3],
    /// Coordinate offset of voxel (0, 0, 0).
    pub origin: [f32; 3],
}

impl MedicalVolume {
    /// Create a volume, checking the shape invariant.
    ///
    /// # Panics
    ///
    /// Panics if `voxels.len() != width * height * depth` or any spacing
    /// component is non-positive. Stage code always constructs volumes from
    /// buffers it just allocated, so a mismatch is a programming error.
    pub fn new(
        width: usize,
        height: usize,
        depth: usize,
        voxels: Vec<f32>,
        spacing: [f32; 3],
        origin: [f32; 3],
    ) -> Self {
        assert_eq!(voxels.len(), width * height * depth, "voxel buffer shape mismatch");
        assert!(spacing.iter().all(|&s| s > 0.0), "spacing must be positive");
        Self {
            width,
            height,
            depth,
            voxels,
            spacing,
            origin,
        }
    }

    /// Total number of voxels.
    #[inline]
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// True when the volume holds no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Linear index of the voxel at `(x, y, z)`.
    #[inline(always)]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        voxel_index(x, y, z, self.width, self.height)
    }

    /// Intensity at `(x, y, z)`. Caller guarantees in-bounds coordinates.
    #[inline(always)]
    pub fn at(&self, x: usize, y: usize, z: usize) -> f32 {
        self.voxels[self.index(x, y, z)]
    }

    /// True when every sample is finite (no NaN/Inf).
    pub fn all_finite(&self) -> bool {
        self.voxels.iter().all(|v| v.is_finite())
    }

    /// Clone the shape (dimensions, spacing, origin) with a fresh buffer.
    pub fn like(&self, voxels: Vec<f32>) -> Self {
        Self::new(
            self.width,
            self.height,
            self.depth,
            voxels,
            self.spacing,
            self.origin,
        )
    }
}

/// Tissue classification band, ordered by density.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum TissueClass {
    /// Air / background.
    Background,
    /// Soft tissue band.
    SoftTissue,
    /// Dense tissue band.
    DenseTissue,
    /// Bone-equivalent band.
    Bone,
}

impl TissueClass {
    /// Representative intensity level stored in a segmented volume.
    #[inline]
    pub const fn level(self) -> f32 {
        match self {
            TissueClass::Background => 0.0,
            TissueClass::SoftTissue => 85.0,
            TissueClass::DenseTissue => 170.0,
            TissueClass::Bone => 255.0,
        }
    }

    /// All classes in ascending density order.
    pub const ALL: [TissueClass; 4] = [
        TissueClass::Background,
        TissueClass::SoftTissue,
        TissueClass::DenseTissue,
        TissueClass::Bone,
    ];
}

/// A volume whose voxel values are restricted to the [`TissueClass`] levels.
#[derive(Clone, Debug)]
pub struct SegmentedVolume {
    /// Quantized volume; same shape as the filtered input.
    pub volume: MedicalVolume,
    /// Scalar threshold selected by the variance-maximizing search.
    pub threshold: f32,
}

/// Axis-aligned bounding box accumulated from mesh vertices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create an AABB with inverted extents (ready for encapsulation).
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    /// Degenerate box at the origin; used for empty meshes.
    pub fn degenerate() -> Self {
        Self {
            min: Vec3::ZERO,
            max: Vec3::ZERO,
        }
    }

    /// Expand to include a point.
    #[inline]
    pub fn encapsulate(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// True when `min <= max` on all axes.
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// True when a point lies inside (inclusive).
    pub fn contains(&self, point: Vec3) -> bool {
        self.min.cmple(point).all() && point.cmple(self.max).all()
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

/// Triangulated iso-surface.
///
/// Normals are per-face: `normals.len() == faces.len()`. Produced once by
/// the surface extractor and read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    /// Vertex positions in physical coordinates (spacing applied).
    pub vertices: Vec<Vec3>,
    /// Index triples into `vertices`.
    pub faces: Vec<[u32; 3]>,
    /// Unit face normals; `Vec3::ZERO` is the zero-safe fallback for
    /// degenerate triangles.
    pub normals: Vec<Vec3>,
    /// Component-wise min/max over all vertices; degenerate at the origin
    /// for an empty mesh.
    pub bounds: Aabb,
}

impl Mesh {
    /// True when no geometry was extracted.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    /// Validate face indices and normal count. Used by tests and the
    /// export serializer's debug assertions.
    pub fn is_well_formed(&self) -> bool {
        let n = self.vertices.len() as u32;
        self.normals.len() == self.faces.len()
            && self.faces.iter().all(|f| f.iter().all(|&i| i < n))
    }

    /// Recompute `bounds` from the vertex list.
    pub fn recompute_bounds(&mut self) {
        if self.vertices.is_empty() {
            self.bounds = Aabb::degenerate();
            return;
        }
        let mut bounds = Aabb::empty();
        for &v in &self.vertices {
            bounds.encapsulate(v);
        }
        self.bounds = bounds;
    }
}

/// Time/resource budget knob. Never affects correctness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Quality {
    /// Single filter pass, minimal smoothing.
    Fast,
    /// Default budget.
    #[default]
    Standard,
    /// Extra filter pass and smoothing iterations.
    High,
}

impl Quality {
    /// Number of separable Gaussian passes run by the enhancement filter.
    pub const fn filter_passes(self) -> usize {
        match self {
            Quality::Fast | Quality::Standard => 1,
            Quality::High => 2,
        }
    }

    /// Laplacian smoothing iterations for the optional optimization stage.
    pub const fn smoothing_iterations(self) -> usize {
        match self {
            Quality::Fast => 1,
            Quality::Standard => 3,
            Quality::High => 5,
        }
    }
}

/// Interchange mesh format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputFormat {
    /// Wavefront OBJ (ASCII).
    Obj,
    /// Stereolithography STL (ASCII).
    Stl,
    /// Polygon File Format (ASCII).
    Ply,
}

impl OutputFormat {
    /// File extension without the dot.
    pub const fn extension(self) -> &'static str {
        match self {
            OutputFormat::Obj => "obj",
            OutputFormat::Stl => "stl",
            OutputFormat::Ply => "ply",
        }
    }
}

/// Immutable configuration passed in at job start.
#[derive(Clone, Debug)]
pub struct ProcessingOptions {
    /// Downstream time/resource budget.
    pub quality: Quality,
    /// Whether to run the decimation/smoothing pass after extraction.
    pub mesh_optimization: bool,
    /// Requested export formats; must be non-empty.
    pub output_formats: Vec<OutputFormat>,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            quality: Quality::Standard,
            mesh_optimization: false,
            output_formats: vec![OutputFormat::Obj],
        }
    }
}

impl ProcessingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_mesh_optimization(mut self, optimize: bool) -> Self {
        self.mesh_optimization = optimize;
        self
    }

    pub fn with_output_formats(mut self, formats: impl Into<Vec<OutputFormat>>) -> Self {
        self.output_formats = formats.into();
        self
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
