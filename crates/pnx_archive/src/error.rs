//! Error types that can be emitted from this library

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`quartz_nbt::io::NbtIoError`]
    #[error(transparent)]
    NbtError(#[from] quartz_nbt::io::NbtIoError),

    /// Transparent warpper for [`je_structure::error::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    StructureError(#[from] je_structure::error::Error),

    /// Transparent warpper for [`serde_json::Error`]
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    /// Transparent warpper for [`walkdir::Error`]
    #[error(transparent)]
    WalkError(#[from] walkdir::Error),

    /// The input directory is unusable or holds nothing to pack
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A structure cannot be encoded as given
    #[error("malformed structure: {0}")]
    MalformedStructure(String),

    /// More distinct block states than a signed byte index can address
    #[error("palette has {len} entries, at most {max} fit in a block index")]
    #[diagnostic(help("split the structure or use fewer distinct block states"))]
    PaletteOverflow { len: usize, max: usize },

    /// Writing the archive failed, nothing was published
    #[error("unable to write {}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The archive ended before the compressed stream was complete
    #[error("archive is truncated")]
    Truncated,

    /// The archive decodes but does not follow the expected layout
    #[error("invalid archive: {0}")]
    InvalidArchive(String),
}

impl Error {
    /// Errors that only concern the structure being encoded, not the whole run
    pub fn is_structure_error(&self) -> bool {
        matches!(
            self,
            Error::StructureError(_)
                | Error::NbtError(_)
                | Error::MalformedStructure(_)
                | Error::PaletteOverflow { .. }
        )
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
