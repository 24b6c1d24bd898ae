/// A single CpG site in the reference
///
/// Ordering is by record index first, then by offset, which is the order in which
/// sites are discovered during a single pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CpG {
    /// Index of the record in the [`ChromMap`](crate::ChromMap)
    pub chrom: u32,

    /// 0-based offset of the `C` within the record's sequence
    pub pos: u32,
}
impl CpG {
    #[must_use]
    pub fn new(chrom: u32, pos: u32) -> Self {
        Self { chrom, pos }
    }

    /// Half-open interval covering both bases of the site
    #[must_use]
    pub fn span(&self) -> std::ops::Range<u64> {
        u64::from(self.pos)..u64::from(self.pos) + 2
    }
}
