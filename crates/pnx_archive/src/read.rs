//! Types for reading structure archives
//!

use flate2::read::GzDecoder;
use quartz_nbt::{
    io::{Flavor, NbtIoError},
    NbtCompound,
};
use std::{
    fs::File,
    io::{self, BufReader, Cursor, Read},
    path::Path,
};
use tracing::instrument;

use crate::{
    error::{Error, Result},
    tree::ArchiveNode,
};

/// Structure archive reader
///
/// ```no_run
/// fn list_structures(path: &std::path::Path) -> pnx_archive::error::Result<()> {
///     let root = pnx_archive::ArchiveReader::open(path)?;
///
///     for (name, structure) in root.structures() {
///         println!("{}: {:?}", name, structure.size);
///     }
///
///     Ok(())
/// }
/// ```
pub struct ArchiveReader;

impl ArchiveReader {
    /// Open and decode the archive at `path`.
    #[instrument(err)]
    pub fn open(path: &Path) -> Result<ArchiveNode> {
        Self::decode(BufReader::new(File::open(path)?))
    }

    /// Decode a gzip-compressed archive.
    pub fn decode<R: Read>(reader: R) -> Result<ArchiveNode> {
        ArchiveNode::from_nbt(&Self::decode_nbt(reader)?)
    }

    /// Decompress and parse the archive without interpreting its layout.
    pub fn decode_nbt<R: Read>(reader: R) -> Result<NbtCompound> {
        let data = Self::decompress(reader)?;
        let (root, _) = quartz_nbt::io::read_nbt(&mut Cursor::new(data), Flavor::Uncompressed)
            .map_err(|e| match e {
                NbtIoError::StdIo(e) if e.kind() == io::ErrorKind::UnexpectedEof => Error::Truncated,
                e => Error::InvalidArchive(e.to_string()),
            })?;
        Ok(root)
    }

    fn decompress<R: Read>(reader: R) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        GzDecoder::new(reader)
            .read_to_end(&mut data)
            .map_err(|e| match e.kind() {
                io::ErrorKind::UnexpectedEof => Error::Truncated,
                io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput => {
                    Error::InvalidArchive(format!("corrupt gzip stream: {}", e))
                }
                _ => Error::IOError(e),
            })?;
        Ok(data)
    }
}
