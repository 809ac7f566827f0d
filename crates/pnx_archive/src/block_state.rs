//! Block state identity.
//!
//! Palettes in the archive store block states as 32-bit hashes. A hash is computed the way Bedrock
//! servers compute block state hashes: the state is written as a little-endian NBT compound
//! `{name: String, states: Compound}` with states sorted by key, and the bytes are hashed with
//! 32-bit FNV-1a.
//!
//! Structure files use Java Edition names and properties, which rarely match their Bedrock
//! counterparts. A [`BlockStateRegistry`] translates them through an optional mapping file before
//! hashing. It has to be initialized once, up front, and is then handed to the encoder.

use byteorder::{LittleEndian, WriteBytesExt};
use je_structure::JavaBlockState;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    fs::File,
    io::{self, BufReader, Read, Write},
    path::Path,
};
use tracing::{debug, info, instrument};

use crate::error::Result;

const TAG_END: u8 = 0;
const TAG_BYTE: u8 = 1;
const TAG_INT: u8 = 3;
const TAG_STRING: u8 = 8;
const TAG_COMPOUND: u8 = 10;

const FNV_OFFSET_BASIS: u32 = 0x811C_9DC5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Computes a stable identifier for a block state
pub trait BlockStateHasher {
    /// Hash the full name and property state of a block
    fn state_hash(&self, state: &JavaBlockState) -> Result<i32>;
}

/// A single Bedrock state value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Bool(bool),
    Int(i32),
    String(String),
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        StateValue::String(value.to_owned())
    }
}

/// A block state in the form that gets hashed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedrockBlockState {
    pub name: String,

    #[serde(default)]
    pub states: BTreeMap<String, StateValue>,
}

impl BedrockBlockState {
    /// Carry a Java state over as is, every property becomes a string state
    pub fn from_java(state: &JavaBlockState) -> Self {
        Self {
            name: state.name.clone(),
            states: state
                .properties
                .iter()
                .map(|(k, v)| (k.clone(), StateValue::from(v.as_str())))
                .collect(),
        }
    }

    /// Write the canonical little-endian NBT form of this state
    pub fn write_canonical<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u8(TAG_COMPOUND)?;
        write_string(writer, "")?;

        writer.write_u8(TAG_STRING)?;
        write_string(writer, "name")?;
        write_string(writer, &self.name)?;

        writer.write_u8(TAG_COMPOUND)?;
        write_string(writer, "states")?;
        for (key, value) in &self.states {
            match value {
                StateValue::Bool(b) => {
                    writer.write_u8(TAG_BYTE)?;
                    write_string(writer, key)?;
                    writer.write_u8(u8::from(*b))?;
                }
                StateValue::Int(i) => {
                    writer.write_u8(TAG_INT)?;
                    write_string(writer, key)?;
                    writer.write_i32::<LittleEndian>(*i)?;
                }
                StateValue::String(s) => {
                    writer.write_u8(TAG_STRING)?;
                    write_string(writer, key)?;
                    write_string(writer, s)?;
                }
            }
        }
        writer.write_u8(TAG_END)?;

        writer.write_u8(TAG_END)
    }

    /// Hash of the canonical form
    pub fn state_hash(&self) -> Result<i32> {
        let mut hasher = Fnv1a32::default();
        self.write_canonical(&mut hasher)?;
        Ok(hasher.finish() as i32)
    }
}

fn write_string<W: Write + ?Sized>(writer: &mut W, value: &str) -> io::Result<()> {
    let len = u16::try_from(value.len()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("string of {} bytes does not fit an nbt string", value.len()),
        )
    })?;
    writer.write_u16::<LittleEndian>(len)?;
    writer.write_all(value.as_bytes())
}

/// 32-bit FNV-1a over everything written into it
#[derive(Debug, Clone, Copy)]
pub struct Fnv1a32(u32);

impl Default for Fnv1a32 {
    fn default() -> Self {
        Self(FNV_OFFSET_BASIS)
    }
}

impl Fnv1a32 {
    pub fn finish(&self) -> u32 {
        self.0
    }
}

impl Write for Fnv1a32 {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for byte in buf {
            self.0 ^= u32::from(*byte);
            self.0 = self.0.wrapping_mul(FNV_PRIME);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Translates Java block states and hashes them
///
/// ```
/// # fn doit() -> pnx_archive::error::Result<()>
/// # {
/// use je_structure::JavaBlockState;
/// use pnx_archive::block_state::{BlockStateHasher, BlockStateRegistry};
///
/// let registry = BlockStateRegistry::init(None)?;
/// let stone = registry.state_hash(&JavaBlockState::named("minecraft:stone"))?;
/// assert_eq!(stone, registry.state_hash(&JavaBlockState::named("minecraft:stone"))?);
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct BlockStateRegistry {
    mappings: HashMap<String, BedrockBlockState>,
}

impl BlockStateRegistry {
    /// Initialize the registry, loading the mapping file at `mappings` if one is given.
    #[instrument(err)]
    pub fn init(mappings: Option<&Path>) -> Result<Self> {
        let Some(path) = mappings else {
            debug!("no block mappings given, hashing java states as they are");
            return Ok(Self::default());
        };

        let registry = Self::from_reader(BufReader::new(File::open(path)?))?;
        info!(
            "loaded {} block mappings from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Read a JSON mapping object of `java state -> {name, states}`
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(Self::from_mappings(serde_json::from_reader(reader)?))
    }

    pub fn from_mappings(mappings: HashMap<String, BedrockBlockState>) -> Self {
        Self { mappings }
    }

    /// Number of loaded mappings
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Translate a Java state, trying the full state first and then the bare block name.
    pub fn resolve(&self, state: &JavaBlockState) -> BedrockBlockState {
        self.mappings
            .get(&state.to_string())
            .or_else(|| self.mappings.get(&state.name))
            .cloned()
            .unwrap_or_else(|| BedrockBlockState::from_java(state))
    }
}

impl BlockStateHasher for BlockStateRegistry {
    fn state_hash(&self, state: &JavaBlockState) -> Result<i32> {
        self.resolve(state).state_hash()
    }
}
