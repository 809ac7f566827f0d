//! Types for writing structure archives
//!

use bon::Builder;
use flate2::{write::GzEncoder, Compression};
use quartz_nbt::io::{Flavor, NbtIoError};
use std::{
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::{
    error::{Error, Result},
    tree::ArchiveNode,
};

/// Default location of the archive, relative to the working directory
pub const DEFAULT_ARCHIVE_NAME: &str = "structures.nbt";

/// Options for how the archive should be written
#[derive(Debug, Clone, Copy, Builder)]
pub struct ArchiveWriterOptions {
    /// Gzip compression level from 0 to 9
    #[builder(default = 6)]
    pub level: u32,

    /// Replace an existing archive at the target path
    #[builder(default)]
    pub overwrite: bool,
}

impl Default for ArchiveWriterOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Structure archive generator
///
/// ```
/// # fn doit() -> pnx_archive::error::Result<()>
/// # {
/// use pnx_archive::{ArchiveNode, ArchiveReader, ArchiveWriter};
/// use pnx_archive::write::ArchiveWriterOptions;
///
/// // We use a buffer here, though you'd normally use `ArchiveWriter::write` with a path
/// let writer = ArchiveWriter::new(ArchiveWriterOptions::builder().level(9).build());
/// let buf = writer.encode(&ArchiveNode::directory(), Vec::new())?;
///
/// let root = ArchiveReader::decode(buf.as_slice())?;
/// assert_eq!(root.structure_count(), 0);
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArchiveWriter {
    options: ArchiveWriterOptions,
}

impl ArchiveWriter {
    pub fn new(options: ArchiveWriterOptions) -> Self {
        Self { options }
    }

    /// Write the compressed tree into `writer`, returning it once the gzip stream is finished.
    pub fn encode<W: Write>(&self, root: &ArchiveNode, writer: W) -> Result<W> {
        let mut encoder = GzEncoder::new(writer, Compression::new(self.options.level.min(9)));
        quartz_nbt::io::write_nbt(&mut encoder, Some(""), &root.to_nbt(), Flavor::Uncompressed)?;
        Ok(encoder.finish()?)
    }

    /// Write the archive to `path`, returning its size in bytes.
    ///
    /// The archive is written to a temporary file in the target directory and only moved into place
    /// once it is complete and synced. On failure nothing is left behind at `path`.
    #[instrument(skip(self, root), fields(path = %path.display()), err)]
    pub fn write(&self, root: &ArchiveNode, path: &Path) -> Result<u64> {
        self.write_atomic(root, path).map_err(|e| write_failure(path, e))
    }

    fn write_atomic(&self, root: &ArchiveNode, path: &Path) -> Result<u64> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut temp = NamedTempFile::new_in(&dir)?;
        debug!("writing to temporary file {}", temp.path().display());

        self.encode(root, BufWriter::new(temp.as_file_mut()))?
            .into_inner()
            .map_err(|e| e.into_error())?;

        temp.as_file().sync_all()?;
        let bytes = temp.as_file().metadata()?.len();

        let persisted = if self.options.overwrite {
            temp.persist(path)
        } else {
            temp.persist_noclobber(path)
        };
        persisted.map_err(|e| e.error)?;

        Ok(bytes)
    }
}

/// I/O errors surface directly or through the NBT encoder, both mean the write failed
fn write_failure(path: &Path, error: Error) -> Error {
    match error {
        Error::IOError(source) | Error::NbtError(NbtIoError::StdIo(source)) => Error::WriteFailure {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    }
}

#[cfg(test)]
mod test {
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use quartz_nbt::io::NbtIoError;
    use std::{fs, io, path::Path};
    use tracing_test::traced_test;

    use crate::{
        error::{Error, Result},
        palette::Palette,
        read::ArchiveReader,
        structure::CompactStructure,
        tree::ArchiveNode,
        write::{write_failure, ArchiveWriter, ArchiveWriterOptions},
    };

    fn sample() -> ArchiveNode {
        ArchiveNode::Directory(IndexMap::from([(
            "hut".to_string(),
            ArchiveNode::Structure(CompactStructure {
                size: [2, 1, 1],
                palette: Palette::from_hashes([-12345]),
                blocks: vec![1, 0],
            }),
        )]))
    }

    #[test]
    fn encoded_stream_is_gzip() -> Result<()> {
        let data = ArchiveWriter::default().encode(&sample(), Vec::new())?;

        assert_eq!(&data[..2], &[0x1F, 0x8B]);
        assert_eq!(ArchiveReader::decode(data.as_slice())?, sample());

        Ok(())
    }

    #[traced_test]
    #[test]
    fn write_publishes_complete_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("structures.nbt");

        let bytes = ArchiveWriter::default().write(&sample(), &path)?;

        assert_eq!(fs::metadata(&path)?.len(), bytes);
        assert_eq!(ArchiveReader::open(&path)?, sample());
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn keep_existing_without_overwrite() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("structures.nbt");
        fs::write(&path, b"previous")?;

        let result = ArchiveWriter::default().write(&sample(), &path);

        assert!(matches!(result, Err(Error::WriteFailure { .. })));
        assert_eq!(fs::read(&path)?, b"previous");
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn replace_existing_with_overwrite() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("structures.nbt");
        fs::write(&path, b"previous")?;

        let writer = ArchiveWriter::new(ArchiveWriterOptions::builder().overwrite(true).build());
        writer.write(&sample(), &path)?;

        assert_eq!(ArchiveReader::open(&path)?, sample());

        Ok(())
    }

    #[traced_test]
    #[test]
    fn missing_target_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing/structures.nbt");

        let result = ArchiveWriter::default().write(&sample(), &path);

        assert!(matches!(result, Err(Error::WriteFailure { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn encoder_io_errors_are_write_failures() {
        let path = Path::new("structures.nbt");
        let full = || io::Error::new(io::ErrorKind::Other, "no space left on device");

        let from_encoder = write_failure(path, Error::NbtError(NbtIoError::StdIo(full())));
        assert!(matches!(from_encoder, Error::WriteFailure { .. }));
        assert!(!from_encoder.is_structure_error());

        assert!(matches!(
            write_failure(path, Error::IOError(full())),
            Error::WriteFailure { .. }
        ));
        assert!(matches!(
            write_failure(path, Error::InvalidArchive("layout".into())),
            Error::InvalidArchive(_)
        ));
    }
}
