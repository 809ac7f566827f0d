//! Types for reading structure files
//!

use quartz_nbt::{io::Flavor, NbtCompound, NbtList, NbtTag};
use std::{
    collections::BTreeMap,
    io::{Cursor, Read},
};
use tracing::{debug, instrument};

use crate::{
    error::{Error, Result},
    types::{JavaBlockState, JeBlock, JeStructure},
};

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Structure file reader
///
/// ```no_run
/// use std::fs::File;
///
/// fn count_blocks(path: &str) -> je_structure::error::Result<usize> {
///     let structure = je_structure::StructureReader::decode(File::open(path)?)?;
///     Ok(structure.len())
/// }
/// ```
pub struct StructureReader;

impl StructureReader {
    /// Read a structure file, gzip-compressed or not, and decode it.
    #[instrument(skip_all, err)]
    pub fn decode<R: Read>(mut reader: R) -> Result<JeStructure> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;

        let flavor = if data.starts_with(&GZIP_MAGIC) {
            Flavor::GzCompressed
        } else {
            Flavor::Uncompressed
        };

        let (root, _) = quartz_nbt::io::read_nbt(&mut Cursor::new(data), flavor)?;
        Self::from_nbt(&root)
    }

    /// Decode an already parsed structure compound.
    pub fn from_nbt(root: &NbtCompound) -> Result<JeStructure> {
        let data_version = match root.inner().get("DataVersion") {
            Some(NbtTag::Int(v)) => Some(*v),
            _ => None,
        };

        let size = read_vec3(required(root, "size")?, "size")?;
        let palette = read_palette(root)?;

        let blocks = as_list(required(root, "blocks")?, "blocks")?
            .iter()
            .enumerate()
            .map(|(index, tag)| {
                let block = as_compound(tag, "blocks")?;
                let pos = read_vec3(required(block, "pos")?, "pos")?;
                let state = match required(block, "state")? {
                    NbtTag::Int(v) => *v,
                    _ => {
                        return Err(Error::InvalidTag {
                            tag: "state",
                            expected: "an int",
                        })
                    }
                };

                if state < 0 || state as usize >= palette.len() {
                    return Err(Error::InvalidState {
                        index,
                        state,
                        len: palette.len(),
                    });
                }

                Ok(JeBlock {
                    pos,
                    state: state as u32,
                    has_nbt: block.inner().contains_key("nbt"),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "decoded structure {:?} with {} blocks and {} states",
            size,
            blocks.len(),
            palette.len()
        );

        Ok(JeStructure {
            data_version,
            size,
            palette,
            blocks,
        })
    }
}

fn required<'a>(compound: &'a NbtCompound, tag: &'static str) -> Result<&'a NbtTag> {
    compound.inner().get(tag).ok_or(Error::MissingTag(tag))
}

fn as_list<'a>(tag: &'a NbtTag, name: &'static str) -> Result<&'a NbtList> {
    match tag {
        NbtTag::List(list) => Ok(list),
        _ => Err(Error::InvalidTag {
            tag: name,
            expected: "a list",
        }),
    }
}

fn as_compound<'a>(tag: &'a NbtTag, name: &'static str) -> Result<&'a NbtCompound> {
    match tag {
        NbtTag::Compound(compound) => Ok(compound),
        _ => Err(Error::InvalidTag {
            tag: name,
            expected: "a list of compounds",
        }),
    }
}

/// Positions and sizes are saved as int lists, older tools wrote int arrays
fn read_vec3(tag: &NbtTag, name: &'static str) -> Result<[i32; 3]> {
    let invalid = Error::InvalidTag {
        tag: name,
        expected: "three ints",
    };

    let values = match tag {
        NbtTag::IntArray(values) => values.clone(),
        NbtTag::List(list) => list
            .iter()
            .map(|t| match t {
                NbtTag::Int(v) => Some(*v),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .ok_or(Error::InvalidTag {
                tag: name,
                expected: "three ints",
            })?,
        _ => return Err(invalid),
    };

    match values.as_slice() {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => Err(invalid),
    }
}

fn read_palette(root: &NbtCompound) -> Result<Vec<JavaBlockState>> {
    let list = match (root.inner().get("palette"), root.inner().get("palettes")) {
        (Some(tag), _) => as_list(tag, "palette")?,
        (None, Some(tag)) => match as_list(tag, "palettes")?.iter().next() {
            Some(first) => as_list(first, "palettes")?,
            None => return Ok(Vec::new()),
        },
        (None, None) => return Err(Error::MissingTag("palette")),
    };

    list.iter()
        .map(|tag| {
            let entry = as_compound(tag, "palette")?;
            let name = match required(entry, "Name")? {
                NbtTag::String(name) => name.clone(),
                _ => {
                    return Err(Error::InvalidTag {
                        tag: "Name",
                        expected: "a string",
                    })
                }
            };

            let mut properties = BTreeMap::new();
            if let Some(tag) = entry.inner().get("Properties") {
                for (key, value) in as_compound(tag, "Properties")?.inner() {
                    match value {
                        NbtTag::String(value) => {
                            properties.insert(key.clone(), value.clone());
                        }
                        _ => {
                            return Err(Error::InvalidTag {
                                tag: "Properties",
                                expected: "a compound of strings",
                            })
                        }
                    }
                }
            }

            Ok(JavaBlockState::new(name, properties))
        })
        .collect()
}
