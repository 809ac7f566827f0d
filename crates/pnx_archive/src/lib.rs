//! This library packs a directory of structure files into a single **PNX** structure archive.
//!
//! # Structure Archive Format Documentation
//!
//! The archive is one gzip-compressed, big-endian NBT compound with an empty root name. Its layout
//! mirrors the packed directory: every directory becomes a compound keyed by its name, and every
//! structure file becomes a leaf compound keyed by its file name up to the first `.`.
//!
//! ## Leaf Compound
//!
//! | Tag       | Type          | Description                                                         |
//! |-----------|---------------|---------------------------------------------------------------------|
//! | `size`    | Int Array (3) | Extent of the structure along x, y and z                            |
//! | `PNX`     | Byte          | Always `1`, marks the compound as a structure                       |
//! | `palette` | List of Int   | Distinct block state hashes, in the order they were first placed    |
//! | `blocks`  | Byte Array    | One entry per cell, `x·y·z` long                                    |
//!
//! ### Blocks
//!
//! The block at `(x, y, z)` is stored at index `x + y * size_x + z * size_x * size_y`. A value of `0`
//! means nothing was placed there, any other value `n` refers to `palette[n - 1]`.
//!
//! Indices are signed bytes, so a palette holds at most 127 states. Larger palettes still encode by
//! default but their indices wrap around; see [`encode::OverflowPolicy`].
//!
//! ### Block State Hashes
//!
//! Palette entries are 32-bit FNV-1a hashes of the block state written as a little-endian NBT
//! compound `{name, states}`, see [`block_state`].
//!
//! ## Additional Information
//!
//! - **File Extension**: `.nbt`
//! - **Endianness**: Big-endian NBT
//! - **Compression**: gzip
//!

pub mod aggregate;
pub mod block_state;
pub mod encode;
pub mod error;
pub mod pack;
pub mod palette;
pub mod read;
pub mod structure;
pub mod tree;
pub mod verify;
pub mod write;

pub use aggregate::{PackOptions, TreeAggregator};
pub use block_state::{BlockStateHasher, BlockStateRegistry};
pub use encode::StructureEncoder;
pub use pack::{pack, PackReport};
pub use palette::Palette;
pub use read::ArchiveReader;
pub use structure::CompactStructure;
pub use tree::ArchiveNode;
pub use verify::VerifyOutcome;
pub use write::ArchiveWriter;
