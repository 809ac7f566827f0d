//! Block state palette of a single structure.

use indexmap::IndexSet;

/// Deduplicated block state hashes in the order they were first seen
///
/// The position of a hash in the palette is its index in the archive. Lookups are backed by a hash
/// set so resolving a position stays constant time at any palette size.
#[derive(Debug, Clone, Default)]
pub struct Palette(IndexSet<i32>);

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a palette from hashes in enumeration order
    pub fn from_hashes(hashes: impl IntoIterator<Item = i32>) -> Self {
        let mut palette = Self::new();
        for hash in hashes {
            palette.get_or_insert(hash);
        }
        palette
    }

    /// Position of `hash`, appending it first if it is new
    pub fn get_or_insert(&mut self, hash: i32) -> usize {
        self.0.insert_full(hash).0
    }

    /// Position of `hash` if it is part of the palette
    pub fn position(&self, hash: i32) -> Option<usize> {
        self.0.get_index_of(&hash)
    }

    /// Hash stored at `position`
    pub fn get(&self, position: usize) -> Option<i32> {
        self.0.get_index(position).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<i32> {
        self.iter().collect()
    }
}

/// Palettes are equal only when they hold the same hashes in the same order
impl PartialEq for Palette {
    fn eq(&self, other: &Self) -> bool {
        self.0.iter().eq(other.0.iter())
    }
}

impl Eq for Palette {}

impl FromIterator<i32> for Palette {
    fn from_iter<T: IntoIterator<Item = i32>>(iter: T) -> Self {
        Self::from_hashes(iter)
    }
}
