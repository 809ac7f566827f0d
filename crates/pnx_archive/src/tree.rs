//! Nested archive tree mirroring the packed directory.

use indexmap::IndexMap;
use quartz_nbt::{NbtCompound, NbtTag};

use crate::{
    error::{Error, Result},
    structure::CompactStructure,
};

/// A node of the archive, either a directory of named children or a single structure
#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveNode {
    Directory(IndexMap<String, ArchiveNode>),
    Structure(CompactStructure),
}

impl Default for ArchiveNode {
    fn default() -> Self {
        ArchiveNode::Directory(IndexMap::new())
    }
}

impl ArchiveNode {
    /// An empty directory
    pub fn directory() -> Self {
        Self::default()
    }

    /// Children of a directory node
    pub fn children(&self) -> Option<&IndexMap<String, ArchiveNode>> {
        match self {
            ArchiveNode::Directory(children) => Some(children),
            ArchiveNode::Structure(_) => None,
        }
    }

    pub fn as_structure(&self) -> Option<&CompactStructure> {
        match self {
            ArchiveNode::Structure(structure) => Some(structure),
            ArchiveNode::Directory(_) => None,
        }
    }

    /// Number of structures anywhere below this node
    pub fn structure_count(&self) -> usize {
        match self {
            ArchiveNode::Structure(_) => 1,
            ArchiveNode::Directory(children) => {
                children.values().map(ArchiveNode::structure_count).sum()
            }
        }
    }

    /// Look up a node by its `/` separated key path
    pub fn get(&self, path: &str) -> Option<&ArchiveNode> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, segment| node.children()?.get(segment))
    }

    /// Every structure below this node with its `/` separated key path
    pub fn structures(&self) -> Vec<(String, &CompactStructure)> {
        let mut found = Vec::new();
        self.collect_structures("", &mut found);
        found
    }

    fn collect_structures<'a>(&'a self, prefix: &str, found: &mut Vec<(String, &'a CompactStructure)>) {
        match self {
            ArchiveNode::Structure(structure) => found.push((prefix.to_owned(), structure)),
            ArchiveNode::Directory(children) => {
                for (key, child) in children {
                    let path = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{}/{}", prefix, key)
                    };
                    child.collect_structures(&path, found);
                }
            }
        }
    }

    pub fn to_nbt(&self) -> NbtCompound {
        match self {
            ArchiveNode::Structure(structure) => structure.to_nbt(),
            ArchiveNode::Directory(children) => {
                let mut compound = NbtCompound::new();
                for (key, child) in children {
                    compound.insert(key.clone(), child.to_nbt());
                }
                compound
            }
        }
    }

    pub fn from_nbt(compound: &NbtCompound) -> Result<Self> {
        if CompactStructure::is_structure_compound(compound) {
            return Ok(ArchiveNode::Structure(CompactStructure::from_nbt(compound)?));
        }

        let mut children = IndexMap::with_capacity(compound.len());
        for (key, tag) in compound.inner() {
            let NbtTag::Compound(child) = tag else {
                return Err(Error::InvalidArchive(format!(
                    "entry {} is not a compound",
                    key
                )));
            };
            children.insert(key.clone(), ArchiveNode::from_nbt(child)?);
        }

        Ok(ArchiveNode::Directory(children))
    }
}
