//! CpG detection on single sequence lines
//!
//! The reader hands every sequence line of a loaded record to a [`LineScanner`]
//! together with the carry state of the previous line. The scanner reports the CpG
//! sites it found and returns the carry state for the next line.

use auto_impl::auto_impl;
use memchr::memchr2;

/// CpG sites reported for one line
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LineHits {
    /// Offsets of each `C` within the line that is followed by a `G` on the same line
    pub positions: Vec<usize>,
    /// Whether the previous line's final `C` pairs with a `G` opening this line
    pub boundary: bool,
}
impl LineHits {
    pub fn clear(&mut self) {
        self.positions.clear();
        self.boundary = false;
    }
}

/// Line-level CpG detector
///
/// Implementations must be case-insensitive and must report `positions` in
/// increasing order.
#[auto_impl(&mut, Box)]
pub trait LineScanner {
    /// Scans `line` for CpG sites
    ///
    /// `carry` is true when the previous line of the record ended in `C`/`c`.
    /// `hits` is cleared by the caller. Returns the carry state after this line;
    /// an empty line returns `carry` unchanged.
    fn scan(&mut self, line: &[u8], carry: bool, hits: &mut LineHits) -> bool;
}

/// Default [`LineScanner`] jumping between candidate `C` bytes with `memchr`
#[derive(Debug, Default, Clone, Copy)]
pub struct CpgScanner;

#[inline]
fn is_c(b: u8) -> bool {
    (b | 0x20) == b'c'
}

#[inline]
fn is_g(b: u8) -> bool {
    (b | 0x20) == b'g'
}

impl LineScanner for CpgScanner {
    fn scan(&mut self, line: &[u8], carry: bool, hits: &mut LineHits) -> bool {
        let Some(&last) = line.last() else {
            return carry;
        };
        hits.boundary = carry && is_g(line[0]);

        let mut start = 0;
        while let Some(idx) = memchr2(b'C', b'c', &line[start..]) {
            let pos = start + idx;
            if line.get(pos + 1).copied().is_some_and(is_g) {
                hits.positions.push(pos);
            }
            start = pos + 1;
        }

        is_c(last)
    }
}
