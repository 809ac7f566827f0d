//! Read-back check of a written archive

use derive_more::derive::Display;
use std::{fs, io::Read, path::Path};
use tracing::{info, instrument, warn};

use crate::{error::Error, read::ArchiveReader};

/// Result of reading an archive back
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum VerifyOutcome {
    /// The archive parses and holds at least one entry
    #[display("{bytes} bytes, {top_level} top-level entries, {structures} structures")]
    Verified {
        bytes: u64,
        top_level: usize,
        structures: usize,
    },

    /// The archive parses but its top level is empty
    #[display("{bytes} bytes, no entries")]
    Empty { bytes: u64 },

    /// The compressed stream or the NBT inside it ends early
    #[display("truncated after {bytes} bytes")]
    Truncated { bytes: u64 },

    /// The archive is missing or does not decode
    #[display("unreadable: {reason}")]
    Unreadable { reason: String },
}

impl VerifyOutcome {
    /// The archive decoded completely
    pub fn is_success(&self) -> bool {
        matches!(self, VerifyOutcome::Verified { .. } | VerifyOutcome::Empty { .. })
    }

    /// The archive cannot be trusted
    pub fn is_fatal(&self) -> bool {
        !self.is_success()
    }
}

/// Reopen the archive at `path` and report what was found.
///
/// This never fails: every problem is reported as an outcome.
#[instrument(fields(path = %path.display()))]
pub fn verify(path: &Path) -> VerifyOutcome {
    let bytes = match fs::metadata(path) {
        Ok(metadata) => metadata.len(),
        Err(e) => {
            let outcome = VerifyOutcome::Unreadable {
                reason: e.to_string(),
            };
            warn!("{}: {}", path.display(), outcome);
            return outcome;
        }
    };

    let outcome = match fs::File::open(path) {
        Ok(file) => verify_reader(std::io::BufReader::new(file), bytes),
        Err(e) => VerifyOutcome::Unreadable {
            reason: e.to_string(),
        },
    };

    match &outcome {
        VerifyOutcome::Verified { .. } => info!("verified {}: {}", path.display(), outcome),
        _ => warn!("{}: {}", path.display(), outcome),
    }
    outcome
}

/// Decode an archive of `bytes` length from `reader`
pub fn verify_reader<R: Read>(reader: R, bytes: u64) -> VerifyOutcome {
    match ArchiveReader::decode(reader) {
        Ok(root) => {
            let top_level = root.children().map_or(1, |children| children.len());
            if top_level == 0 {
                VerifyOutcome::Empty { bytes }
            } else {
                VerifyOutcome::Verified {
                    bytes,
                    top_level,
                    structures: root.structure_count(),
                }
            }
        }
        Err(Error::Truncated) => VerifyOutcome::Truncated { bytes },
        Err(e) => VerifyOutcome::Unreadable {
            reason: e.to_string(),
        },
    }
}

#[cfg(test)]
mod test {
    use flate2::{write::GzEncoder, Compression};
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use quartz_nbt::io::Flavor;
    use std::{fs, io::Write};
    use tracing_test::traced_test;

    use crate::{
        error::Result,
        palette::Palette,
        structure::CompactStructure,
        tree::ArchiveNode,
        verify::{verify, verify_reader, VerifyOutcome},
        write::ArchiveWriter,
    };

    fn sample() -> ArchiveNode {
        let leaf = ArchiveNode::Structure(CompactStructure {
            size: [1, 1, 2],
            palette: Palette::from_hashes([7, 8]),
            blocks: vec![1, 2],
        });

        ArchiveNode::Directory(IndexMap::from([
            ("hut".to_string(), leaf.clone()),
            (
                "village".to_string(),
                ArchiveNode::Directory(IndexMap::from([("tower".to_string(), leaf)])),
            ),
        ]))
    }

    #[traced_test]
    #[test]
    fn verify_written_archive() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("structures.nbt");
        let bytes = ArchiveWriter::default().write(&sample(), &path)?;

        let outcome = verify(&path);

        assert_eq!(
            outcome,
            VerifyOutcome::Verified {
                bytes,
                top_level: 2,
                structures: 2
            }
        );
        assert!(outcome.is_success());
        assert!(logs_contain("verified"));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn verify_empty_archive() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("structures.nbt");
        ArchiveWriter::default().write(&ArchiveNode::directory(), &path)?;

        let outcome = verify(&path);

        assert!(matches!(outcome, VerifyOutcome::Empty { .. }));
        assert!(!outcome.is_fatal());

        Ok(())
    }

    #[traced_test]
    #[test]
    fn verify_truncated_archive() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("structures.nbt");
        ArchiveWriter::default().write(&sample(), &path)?;

        let data = fs::read(&path)?;
        fs::write(&path, &data[..data.len() / 2])?;

        let outcome = verify(&path);

        assert!(matches!(outcome, VerifyOutcome::Truncated { .. }));
        assert!(outcome.is_fatal());

        Ok(())
    }

    #[test]
    fn verify_cut_off_payload() -> Result<()> {
        let mut payload = Vec::new();
        quartz_nbt::io::write_nbt(&mut payload, Some(""), &sample().to_nbt(), Flavor::Uncompressed)?;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&payload[..payload.len() / 2])?;
        let data = encoder.finish()?;

        let outcome = verify_reader(data.as_slice(), data.len() as u64);

        assert_eq!(
            outcome,
            VerifyOutcome::Truncated {
                bytes: data.len() as u64
            }
        );

        Ok(())
    }

    #[traced_test]
    #[test]
    fn verify_missing_archive() {
        let dir = tempfile::tempdir().unwrap();

        let outcome = verify(&dir.path().join("missing.nbt"));

        assert!(matches!(outcome, VerifyOutcome::Unreadable { .. }));
        assert!(outcome.is_fatal());
    }
}
