//! Error types that can be emitted from this library
//!

use miette::Diagnostic;
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

    /// A required tag is absent from the structure
    #[error("missing tag `{0}`")]
    MissingTag(&'static str),

    /// A tag exists but holds the wrong type of value
    #[error("tag `{tag}` should be {expected}")]
    InvalidTag {
        tag: &'static str,
        expected: &'static str,
    },

    /// A block refers to a palette entry that does not exist
    #[error("block {index} references state {state} but the palette has {len} entries")]
    InvalidState { index: usize, state: i32, len: usize },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
