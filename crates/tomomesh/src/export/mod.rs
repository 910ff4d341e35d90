//! Stage 5: Export Serializer.
//!
//! Deterministic ASCII serialization of extracted meshes to OBJ, STL and
//! PLY. All three writers format coordinates with six fractional digits,
//! so serializing the same mesh twice yields byte-identical output.
//!
//! Each format module also ships a small ASCII parser. The parsers accept
//! exactly what the writers emit; they exist so the round-trip invariant
//! (parse(serialize(m)) preserves counts and coordinates to within the
//! printed precision) stays testable without external tooling.

pub mod obj;
pub mod ply;
pub mod stl;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::types::{Mesh, OutputFormat};

/// Serialize a mesh into the ASCII text of the requested format.
pub fn serialize_mesh(mesh: &Mesh, format: OutputFormat) -> String {
    match format {
        OutputFormat::Obj => obj::serialize(mesh),
        OutputFormat::Stl => stl::serialize(mesh),
        OutputFormat::Ply => ply::serialize(mesh),
    }
}

/// Serialize a mesh and write it to `<dir>/<stem>.<ext>`.
///
/// Returns the path written. The directory is created if missing.
pub fn write_mesh(mesh: &Mesh, format: OutputFormat, dir: &Path, stem: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{stem}.{}", format.extension()));
    let text = serialize_mesh(mesh, format);
    fs::write(&path, text)?;
    info!(path = %path.display(), format = ?format, faces = mesh.faces.len(), "wrote mesh artifact");
    Ok(path)
}

/// Shared fixed-precision float formatting for all three writers.
pub(crate) fn fmt_f32(v: f32) -> String {
    format!("{v:.6}")
}
