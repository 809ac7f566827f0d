//! The whole pipeline: walk, encode, write and verify.

use std::path::Path;
use tracing::{info, instrument};

use crate::{
    aggregate::{AggregateStats, PackOptions, TreeAggregator},
    block_state::BlockStateHasher,
    error::{Error, Result},
    verify::{verify, VerifyOutcome},
    write::{ArchiveWriter, ArchiveWriterOptions},
};

/// Summary of a finished pack run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackReport {
    pub stats: AggregateStats,
    /// Size of the written archive
    pub bytes: u64,
    pub verification: VerifyOutcome,
}

/// Pack every structure below `directory` into the archive at `output`.
///
/// Nothing is written when the directory is unusable or holds no structures. Verification problems
/// are part of the report and left to the caller to judge.
#[instrument(skip(hasher, options, writer_options), fields(directory = %directory.display(), output = %output.display()), err)]
pub fn pack<H: BlockStateHasher + ?Sized>(
    directory: &Path,
    output: &Path,
    hasher: &H,
    options: &PackOptions,
    writer_options: ArchiveWriterOptions,
) -> Result<PackReport> {
    if !directory.exists() {
        return Err(Error::InvalidInput(format!(
            "{} does not exist",
            directory.display()
        )));
    }

    let (root, stats) = TreeAggregator::new(hasher, options).aggregate(directory)?;
    if root.structure_count() == 0 {
        return Err(Error::InvalidInput(format!(
            "no structures found in {}",
            directory.display()
        )));
    }

    info!(
        "writing {} structures ({} skipped, {} failed)",
        stats.structures, stats.skipped, stats.failed
    );
    let bytes = ArchiveWriter::new(writer_options).write(&root, output)?;
    let verification = verify(output);

    Ok(PackReport {
        stats,
        bytes,
        verification,
    })
}
