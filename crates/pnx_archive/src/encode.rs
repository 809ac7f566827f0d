//! Re-encoding of structures into the compact palette layout.

use je_structure::JeStructure;
use tracing::{debug, warn};

use crate::{
    block_state::BlockStateHasher,
    error::{Error, Result},
    palette::Palette,
    structure::{BlockInstance, CompactStructure, MAX_PALETTE_LEN},
};

/// What to do with a structure whose palette outgrows [`MAX_PALETTE_LEN`]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Report the overflow and keep the structure, indices past 127 wrap around
    #[default]
    Warn,

    /// Refuse to encode the structure
    Reject,
}

/// Encode block instances into a [`CompactStructure`].
///
/// Instances are processed in the order given. Their first occurrence decides their palette
/// position, and a later instance at an already populated coordinate replaces the earlier one.
pub fn encode_instances(
    size: [u32; 3],
    instances: impl IntoIterator<Item = BlockInstance>,
    overflow: OverflowPolicy,
) -> Result<CompactStructure> {
    if size.contains(&0) {
        return Err(Error::MalformedStructure(format!(
            "size {:?} has an empty axis",
            size
        )));
    }

    let volume = CompactStructure::volume_of(size).ok_or_else(|| {
        Error::MalformedStructure(format!("size {:?} is too large to allocate", size))
    })?;

    let mut palette = Palette::new();
    let mut blocks = vec![0i8; volume];

    for instance in instances {
        let index = CompactStructure::linear_index(size, instance.x, instance.y, instance.z)
            .ok_or_else(|| {
                Error::MalformedStructure(format!(
                    "block at ({}, {}, {}) lies outside size {:?}",
                    instance.x, instance.y, instance.z, size
                ))
            })?;

        let position = palette.get_or_insert(instance.type_hash);
        blocks[index] = (position + 1) as i8;
    }

    if palette.len() > MAX_PALETTE_LEN {
        warn!(
            "palette overflow: {} distinct block states, only {} fit in a block index",
            palette.len(),
            MAX_PALETTE_LEN
        );

        if overflow == OverflowPolicy::Reject {
            return Err(Error::PaletteOverflow {
                len: palette.len(),
                max: MAX_PALETTE_LEN,
            });
        }
    }

    Ok(CompactStructure {
        size,
        palette,
        blocks,
    })
}

/// Turns decoded structure files into compact structures
pub struct StructureEncoder<'a, H: ?Sized> {
    hasher: &'a H,
    overflow: OverflowPolicy,
}

impl<'a, H: BlockStateHasher + ?Sized> StructureEncoder<'a, H> {
    pub fn new(hasher: &'a H, overflow: OverflowPolicy) -> Self {
        Self { hasher, overflow }
    }

    /// Hash every block of `structure`, keeping the stored order
    ///
    /// Each palette state is hashed once no matter how many blocks use it.
    pub fn instances(&self, structure: &JeStructure) -> Result<Vec<BlockInstance>> {
        let hashes = structure
            .palette
            .iter()
            .map(|state| self.hasher.state_hash(state))
            .collect::<Result<Vec<_>>>()?;

        structure
            .blocks
            .iter()
            .map(|block| {
                let [x, y, z] = block.pos;
                if x < 0 || y < 0 || z < 0 {
                    return Err(Error::MalformedStructure(format!(
                        "block {} has a negative position",
                        block
                    )));
                }

                let type_hash = hashes.get(block.state as usize).copied().ok_or_else(|| {
                    Error::MalformedStructure(format!("block {} has no palette state", block))
                })?;

                Ok(BlockInstance::new(x as u32, y as u32, z as u32, type_hash))
            })
            .collect()
    }

    pub fn encode(&self, structure: &JeStructure) -> Result<CompactStructure> {
        let size = match structure.size {
            [x, y, z] if x > 0 && y > 0 && z > 0 => [x as u32, y as u32, z as u32],
            size => {
                return Err(Error::MalformedStructure(format!(
                    "size {:?} is not positive",
                    size
                )))
            }
        };

        if let Some(version) = structure.data_version {
            debug!("structure saved with data version {}", version);
        }
        if structure.block_entities() > 0 {
            debug!(
                "dropping block entity data of {} blocks",
                structure.block_entities()
            );
        }

        let compact = encode_instances(size, self.instances(structure)?, self.overflow)?;
        debug!(
            "encoded {} blocks into {:?} with {} states, {} of {} cells populated",
            structure.len(),
            compact.size,
            compact.palette.len(),
            compact.populated(),
            compact.blocks.len()
        );
        Ok(compact)
    }
}
