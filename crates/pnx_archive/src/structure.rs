//! Compact structure record and its NBT layout.

use derive_more::derive::Constructor;
use quartz_nbt::{NbtCompound, NbtList, NbtTag};

use crate::{
    error::{Error, Result},
    palette::Palette,
};

/// Name of the int array holding the structure size
pub const TAG_SIZE: &str = "size";
/// Name of the byte flag marking a compound as a packed structure
pub const TAG_FLAG: &str = "PNX";
/// Name of the int list holding the palette
pub const TAG_PALETTE: &str = "palette";
/// Name of the byte array holding the block indices
pub const TAG_BLOCKS: &str = "blocks";

/// Largest palette whose indices still fit in a signed byte once shifted by one
pub const MAX_PALETTE_LEN: usize = i8::MAX as usize;

/// One placed block, identified by its state hash
#[derive(Constructor, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInstance {
    pub x: u32,
    pub y: u32,
    pub z: u32,
    pub type_hash: i32,
}

/// A structure re-encoded as size, palette and a dense index array
///
/// `blocks[x + y * size_x + z * size_x * size_y]` is `palette position + 1`, or `0` when nothing was
/// placed at that coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactStructure {
    pub size: [u32; 3],
    pub palette: Palette,
    pub blocks: Vec<i8>,
}

impl CompactStructure {
    pub fn size_x(&self) -> u32 {
        self.size[0]
    }

    pub fn size_y(&self) -> u32 {
        self.size[1]
    }

    pub fn size_z(&self) -> u32 {
        self.size[2]
    }

    /// Number of cells, `None` when it does not fit in memory
    pub fn volume_of(size: [u32; 3]) -> Option<usize> {
        (size[0] as usize)
            .checked_mul(size[1] as usize)?
            .checked_mul(size[2] as usize)
    }

    /// Linear index of a coordinate, `None` when it lies outside `size`
    pub fn linear_index(size: [u32; 3], x: u32, y: u32, z: u32) -> Option<usize> {
        if x >= size[0] || y >= size[1] || z >= size[2] {
            return None;
        }

        let (sx, sy) = (size[0] as usize, size[1] as usize);
        Some(x as usize + y as usize * sx + z as usize * sx * sy)
    }

    /// State hash placed at a coordinate
    pub fn block_at(&self, x: u32, y: u32, z: u32) -> Option<i32> {
        let index = Self::linear_index(self.size, x, y, z)?;
        match self.blocks.get(index).copied() {
            Some(value) if value > 0 => self.palette.get(value as usize - 1),
            _ => None,
        }
    }

    /// Whether the palette is too large for its indices to be stored correctly
    pub fn overflows(&self) -> bool {
        self.palette.len() > MAX_PALETTE_LEN
    }

    /// Number of coordinates holding a block
    pub fn populated(&self) -> usize {
        self.blocks.iter().filter(|b| **b != 0).count()
    }

    pub fn to_nbt(&self) -> NbtCompound {
        let mut palette = NbtList::new();
        for hash in self.palette.iter() {
            palette.push(hash);
        }

        let mut compound = NbtCompound::new();
        compound.insert(
            TAG_SIZE,
            NbtTag::IntArray(self.size.iter().map(|s| *s as i32).collect()),
        );
        compound.insert(TAG_FLAG, NbtTag::Byte(1));
        compound.insert(TAG_PALETTE, palette);
        compound.insert(TAG_BLOCKS, NbtTag::ByteArray(self.blocks.clone()));
        compound
    }

    /// Whether a compound uses the packed structure layout rather than being a directory
    pub fn is_structure_compound(compound: &NbtCompound) -> bool {
        matches!(compound.inner().get(TAG_FLAG), Some(NbtTag::Byte(_)))
    }

    pub fn from_nbt(compound: &NbtCompound) -> Result<Self> {
        let size = match compound.inner().get(TAG_SIZE) {
            Some(NbtTag::IntArray(values)) => match values.as_slice() {
                [x, y, z] if *x > 0 && *y > 0 && *z > 0 => [*x as u32, *y as u32, *z as u32],
                _ => {
                    return Err(Error::InvalidArchive(format!(
                        "size {:?} is not three positive ints",
                        values
                    )))
                }
            },
            _ => return Err(Error::InvalidArchive("missing structure size".into())),
        };

        let hashes = match compound.inner().get(TAG_PALETTE) {
            Some(NbtTag::List(list)) => list
                .iter()
                .map(|tag| match tag {
                    NbtTag::Int(hash) => Ok(*hash),
                    _ => Err(Error::InvalidArchive("palette holds a non-int entry".into())),
                })
                .collect::<Result<Vec<_>>>()?,
            _ => return Err(Error::InvalidArchive("missing structure palette".into())),
        };

        let palette = Palette::from_hashes(hashes.iter().copied());
        if palette.len() != hashes.len() {
            return Err(Error::InvalidArchive(format!(
                "palette holds {} duplicate entries",
                hashes.len() - palette.len()
            )));
        }

        let blocks = match compound.inner().get(TAG_BLOCKS) {
            Some(NbtTag::ByteArray(blocks)) => blocks.clone(),
            _ => return Err(Error::InvalidArchive("missing structure blocks".into())),
        };

        if Self::volume_of(size) != Some(blocks.len()) {
            return Err(Error::InvalidArchive(format!(
                "{} blocks stored for size {:?}",
                blocks.len(),
                size
            )));
        }

        Ok(Self {
            size,
            palette,
            blocks,
        })
    }
}
