//! Base types for the contents of a structure file.

use derive_more::derive::{Constructor, Display};
use std::collections::BTreeMap;
use std::fmt;

/// A block state as it appears in a structure palette
///
/// Properties are kept sorted by name so two states with the same properties always compare, hash and
/// display identically regardless of the order they were stored in.
#[derive(Constructor, Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JavaBlockState {
    /// Namespaced block id, e.g. `minecraft:stone`
    pub name: String,

    /// Block properties, e.g. `facing=north`
    pub properties: BTreeMap<String, String>,
}

impl JavaBlockState {
    /// A state without any properties
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Add a property, replacing any previous value for the same key
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Formats the state the way the game does in commands: `minecraft:oak_log[axis=y]`
impl fmt::Display for JavaBlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.properties.is_empty() {
            return Ok(());
        }

        f.write_str("[")?;
        for (i, (key, value)) in self.properties.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        f.write_str("]")
    }
}

/// A single stored block
#[derive(Constructor, Display, Debug, Clone, Copy, PartialEq, Eq)]
#[display("state {state} at {pos:?}")]
pub struct JeBlock {
    /// Position relative to the structure origin
    pub pos: [i32; 3],

    /// Index into [`JeStructure::palette`]
    pub state: u32,

    /// Whether the block carried block entity data
    pub has_nbt: bool,
}

/// A decoded structure file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JeStructure {
    /// The data version of the game that saved this structure
    pub data_version: Option<i32>,

    /// Extent of the structure along x, y and z
    pub size: [i32; 3],

    /// The block states referenced by [`JeStructure::blocks`]
    pub palette: Vec<JavaBlockState>,

    /// Blocks in the order they were stored
    pub blocks: Vec<JeBlock>,
}

impl JeStructure {
    /// Number of stored blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the structure stores no blocks at all
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of blocks that carried block entity data
    pub fn block_entities(&self) -> usize {
        self.blocks.iter().filter(|b| b.has_nbt).count()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::types::{JavaBlockState, JeBlock, JeStructure};

    #[test]
    fn display_state_without_properties() {
        assert_eq!(
            JavaBlockState::named("minecraft:stone").to_string(),
            "minecraft:stone"
        );
    }

    #[test]
    fn display_state_sorts_properties() {
        let state = JavaBlockState::named("minecraft:oak_stairs")
            .with_property("half", "bottom")
            .with_property("facing", "north");

        assert_eq!(
            state.to_string(),
            "minecraft:oak_stairs[facing=north,half=bottom]"
        );
    }

    #[test]
    fn count_block_entities() {
        let structure = JeStructure {
            size: [2, 1, 1],
            palette: vec![JavaBlockState::named("minecraft:chest")],
            blocks: vec![JeBlock::new([0, 0, 0], 0, true), JeBlock::new([1, 0, 0], 0, false)],
            ..Default::default()
        };

        assert_eq!(structure.len(), 2);
        assert_eq!(structure.block_entities(), 1);
    }
}
