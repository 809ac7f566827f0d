//! Walking a directory of structure files into an [`ArchiveNode`] tree.

use bon::Builder;
use derive_more::derive::AddAssign;
use indexmap::IndexMap;
use je_structure::StructureReader;
use std::path::Path;
use tracing::{info, instrument, warn};
use walkdir::WalkDir;

use crate::{
    block_state::BlockStateHasher,
    encode::{OverflowPolicy, StructureEncoder},
    error::{Error, Result},
    structure::CompactStructure,
    tree::ArchiveNode,
};

/// Extension of structure files
pub const DEFAULT_EXTENSION: &str = "nbt";

/// What to do with a structure file that cannot be decoded or encoded
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failure and leave the file out of the archive
    #[default]
    Skip,

    /// Stop the whole run
    Abort,
}

/// Options for how a directory is packed
#[derive(Debug, Clone, Builder)]
pub struct PackOptions {
    /// Files without this extension are skipped
    #[builder(default = DEFAULT_EXTENSION.to_string(), into)]
    pub extension: String,

    /// Handling for structures with more than 127 block states
    #[builder(default)]
    pub overflow: OverflowPolicy,

    /// Handling for structure files that fail to decode
    #[builder(default)]
    pub failure: FailurePolicy,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Counters gathered while walking
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, AddAssign)]
pub struct AggregateStats {
    /// Structures placed in the tree
    pub structures: usize,
    /// Files ignored because of their extension
    pub skipped: usize,
    /// Structure files that failed and were left out
    pub failed: usize,
    /// Structures kept despite an oversized palette
    pub overflowed: usize,
}

/// Archive key for a file or directory name: everything before the first `.`
pub fn archive_key(file_name: &str) -> &str {
    file_name
        .split_once('.')
        .map_or(file_name, |(key, _)| key)
}

/// Builds the archive tree of a directory
///
/// Every call returns a freshly built subtree which the caller places under its own key, so no
/// node is ever shared between branches.
pub struct TreeAggregator<'a, H: ?Sized> {
    encoder: StructureEncoder<'a, H>,
    options: &'a PackOptions,
}

impl<'a, H: BlockStateHasher + ?Sized> TreeAggregator<'a, H> {
    pub fn new(hasher: &'a H, options: &'a PackOptions) -> Self {
        Self {
            encoder: StructureEncoder::new(hasher, options.overflow),
            options,
        }
    }

    /// Build the tree for the contents of `root`; `root` itself does not become a key.
    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn aggregate(&self, root: &Path) -> Result<(ArchiveNode, AggregateStats)> {
        if !root.is_dir() {
            return Err(Error::InvalidInput(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        self.visit_directory(root)
    }

    fn visit_directory(&self, dir: &Path) -> Result<(ArchiveNode, AggregateStats)> {
        let mut children = IndexMap::new();
        let mut stats = AggregateStats::default();

        let entries = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in entries {
            let entry = entry?;
            let path = entry.path();

            let Some(name) = entry.file_name().to_str() else {
                warn!("{} does not have a utf-8 name, skipping", path.display());
                stats.skipped += 1;
                continue;
            };
            let key = archive_key(name).to_owned();

            let node = if entry.file_type().is_dir() {
                let (node, child_stats) = self.visit_directory(path)?;
                stats += child_stats;
                node
            } else {
                match self.visit_file(path, name, &mut stats)? {
                    Some(structure) => ArchiveNode::Structure(structure),
                    None => continue,
                }
            };

            if children.insert(key.clone(), node).is_some() {
                warn!(
                    "{} replaces an earlier entry with the key {:?}",
                    path.display(),
                    key
                );
            }
        }

        Ok((ArchiveNode::Directory(children), stats))
    }

    fn visit_file(
        &self,
        path: &Path,
        name: &str,
        stats: &mut AggregateStats,
    ) -> Result<Option<CompactStructure>> {
        let is_structure = name
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext == self.options.extension);

        if !is_structure {
            warn!("{} is not a structure file, skipping", path.display());
            stats.skipped += 1;
            return Ok(None);
        }

        match self.encode_file(path) {
            Ok(structure) => {
                if structure.overflows() {
                    stats.overflowed += 1;
                }
                stats.structures += 1;
                Ok(Some(structure))
            }
            Err(e) if e.is_structure_error() && self.options.failure == FailurePolicy::Skip => {
                warn!("unable to encode {}, skipping: {}", path.display(), e);
                stats.failed += 1;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Decode and encode a single structure file
    #[instrument(skip_all, fields(file = %path.display()), err)]
    pub fn encode_file(&self, path: &Path) -> Result<CompactStructure> {
        let data = std::fs::read(path)?;
        let structure = StructureReader::decode(data.as_slice())?;
        let compact = self.encoder.encode(&structure)?;

        info!(
            "packed {} ({}x{}x{}, {} states)",
            path.display(),
            compact.size_x(),
            compact.size_y(),
            compact.size_z(),
            compact.palette.len()
        );
        Ok(compact)
    }
}
