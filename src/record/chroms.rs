use std::collections::HashMap;

use crate::error::{ReadError, Result};

/// Append-only mapping from record index to record identifier
///
/// Indices are dense, starting at 0 in the order records were accepted, and every
/// identifier is unique.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChromMap {
    names: Vec<String>,
    index: HashMap<String, u32>,
}
impl ChromMap {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            names: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Registers the next record under `name`, returning its index
    ///
    /// The caller guarantees that `name` is not yet present.
    pub fn push(&mut self, name: String) -> Result<u32> {
        let idx = u32::try_from(self.names.len()).map_err(|_| ReadError::TooManyRecords)?;
        debug_assert!(!self.index.contains_key(&name));
        self.index.insert(name.clone(), idx);
        self.names.push(name);
        Ok(idx)
    }

    /// Returns the identifier of the record at `idx`
    #[must_use]
    pub fn get(&self, idx: u32) -> Option<&str> {
        self.names.get(idx as usize).map(String::as_str)
    }

    /// Returns the index of the record named `name`
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<u32> {
        self.index.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates over `(index, identifier)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(idx, name)| (idx as u32, name.as_str()))
    }
}
