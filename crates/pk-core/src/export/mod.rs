//! STL and neutronics description export

mod neutronics;
mod options;
mod stl;

use crate::shape::ShapeError;
use pk_cad::CadError;

pub use neutronics::{NeutronicsEntry, write_neutronics_description};
pub use options::ExportOptions;
pub use stl::{load_stl_triangle_count, sanitize_filename, save_stl};

/// Export-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Mesh export failed: {0}")]
    MeshExport(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Duplicate STL filename: {0}")]
    DuplicateFilename(String),
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Cad(#[from] CadError),
}

pub type ExportResult<T> = Result<T, ExportError>;
