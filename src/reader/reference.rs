use crate::{ChromMap, CpG, Rename};

/// A fully loaded reference
///
/// Record `i` of `sequences` is named `chroms.get(i)`. Both CpG tables are sorted by
/// `(chrom, pos)` and every entry of `boundary_cpgs` also appears in `cpgs`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Raw sequence of every loaded record, in file order
    pub sequences: Vec<Vec<u8>>,

    /// Every CpG site of the loaded records
    pub cpgs: Vec<CpG>,

    /// CpG sites whose `C` ended one line and whose `G` started the next
    pub boundary_cpgs: Vec<CpG>,

    /// Record index to identifier mapping
    pub chroms: ChromMap,

    /// Duplicate identifiers that were renamed, in file order
    pub renames: Vec<Rename>,
}
impl Reference {
    /// Number of loaded records
    #[must_use]
    pub fn num_records(&self) -> usize {
        self.sequences.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Returns the sequence of the record at `idx`
    #[must_use]
    pub fn sequence(&self, idx: u32) -> Option<&[u8]> {
        self.sequences.get(idx as usize).map(Vec::as_slice)
    }

    /// Returns the identifier of the record at `idx`
    #[must_use]
    pub fn name(&self, idx: u32) -> Option<&str> {
        self.chroms.get(idx)
    }

    /// Returns the index of the record named `name`
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<u32> {
        self.chroms.index_of(name)
    }

    /// Total number of bases over all loaded records
    #[must_use]
    pub fn total_length(&self) -> usize {
        self.sequences.iter().map(Vec::len).sum()
    }
}
