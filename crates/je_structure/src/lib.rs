//! This library handles reading the structure files saved by *Minecraft: Java Edition* structure blocks.
//!
//! # Structure File Format Documentation
//!
//! A structure file stores a cuboid of blocks exactly as a structure block saved it. Files use the
//! `.nbt` extension and contain a single gzip-compressed, big-endian NBT compound.
//!
//! ## File Structure
//!
//! | Tag           | Type              | Description                                                   |
//! |---------------|-------------------|---------------------------------------------------------------|
//! | `DataVersion` | Int               | Data version of the game that saved the file (optional)       |
//! | `size`        | List of 3 Int     | Extent of the structure along x, y and z                      |
//! | `palette`     | List of Compound  | Block states referenced by `blocks`                           |
//! | `palettes`    | List of Lists     | Used instead of `palette` by some structures (e.g. shipwrecks)|
//! | `blocks`      | List of Compound  | Every stored block with its position and palette state        |
//! | `entities`    | List of Compound  | Stored entities (ignored by this crate)                       |
//!
//! ### Palette Entry
//!
//! - **Name**: String, the namespaced block id such as `minecraft:oak_stairs`.
//! - **Properties**: Compound of String values, only present for blocks with properties.
//!
//! ### Block Entry
//!
//! - **pos**: List of 3 Int, position relative to the structure origin. Always inside `size`.
//! - **state**: Int, index into the palette.
//! - **nbt**: Compound, block entity data (optional).
//!
//! ## Additional Information
//!
//! - **File Extension**: `.nbt`
//! - **Endianness**: Big-endian NBT
//! - **Compression**: gzip, uncompressed files are accepted as well
//!

pub mod error;
pub mod read;
pub mod types;

pub use read::StructureReader;
pub use types::{JavaBlockState, JeBlock, JeStructure};
