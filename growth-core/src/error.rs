//! Error types for the growth engine.
//!
//! Every variant is a hard failure: the link graph or the spatial index
//! would be left inconsistent if the caller carried on.

use crate::types::CellId;
use thiserror::Error;

/// Main error type for growth-core operations.
#[derive(Error, Debug)]
pub enum GrowthError {
    /// No triangles were supplied to build a mesh from.
    #[error("cannot build a cell mesh from an empty triangle list")]
    EmptyMesh,

    /// A triangle references the same vertex twice.
    #[error("triangle {triangle} has repeated vertices")]
    DegenerateTriangle { triangle: usize },

    /// A position is NaN or infinite.
    #[error("cell {cell} has a non-finite position")]
    NonFinitePosition { cell: CellId },

    /// Food went below zero.
    #[error("cell {cell} has negative food")]
    NegativeFood { cell: CellId },

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration text could not be parsed.
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Link surgery referenced a neighbor the cell does not have.
    #[error("cell {cell} has no link to {link}")]
    LinkNotFound { cell: CellId, link: CellId },

    /// A link was added twice.
    #[error("cell {cell} is already linked to {link}")]
    DuplicateLink { cell: CellId, link: CellId },

    /// A cell was linked to itself.
    #[error("cell {cell} cannot link to itself")]
    SelfLink { cell: CellId },

    /// `link` is in `cell`'s links but not the other way around.
    #[error("link {cell} -> {link} has no reverse link")]
    AsymmetricLink { cell: CellId, link: CellId },

    /// A split was requested on a cell whose ring is too small to cleave.
    #[error("cell {cell} has a degenerate neighbor ring of {len} links")]
    DegenerateRing { cell: CellId, len: usize },

    /// The spatial index has no entry for the cell at its recorded position.
    #[error("spatial index has no entry for cell {cell}")]
    IndexEntryMissing { cell: CellId },

    /// A buffer of per-cell values does not cover exactly the mesh's cells.
    #[error("expected {expected} per-cell entries, got {found}")]
    CellCountMismatch { expected: usize, found: usize },

    /// A cell id beyond the current cell count.
    #[error("unknown cell {cell}")]
    UnknownCell { cell: CellId },

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type alias for growth-core operations.
pub type Result<T> = std::result::Result<T, GrowthError>;

impl GrowthError {
    /// Creates a new configuration validation error.
    #[must_use]
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
