//! Header line handling for reference records
//!
//! A header starts with [`MARKER`] and names a record. The identifier is everything
//! after the marker up to the first space or tab; the remainder of the line is ignored.

use memchr::memchr2;

/// The record separator that opens a header line
pub const MARKER: u8 = b'>';

/// Classification of a single (terminator-stripped) input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// A record header
    Header {
        /// The record identifier (never empty)
        id: &'a [u8],
        /// The full header text after the marker
        text: &'a [u8],
    },
    /// A line starting with the marker but carrying no identifier
    ///
    /// Either a lone `>` or a marker directly followed by whitespace.
    Malformed,
    /// Any other line, including empty lines
    Sequence(&'a [u8]),
}
impl<'a> Line<'a> {
    /// Classifies a line with its line terminator already removed
    #[must_use]
    pub fn classify(line: &'a [u8]) -> Self {
        match line.split_first() {
            Some((&MARKER, text)) => match identifier(text) {
                [] => Self::Malformed,
                id => Self::Header { id, text },
            },
            _ => Self::Sequence(line),
        }
    }
}

/// Extracts the identifier from the header text following the marker
#[must_use]
pub fn identifier(text: &[u8]) -> &[u8] {
    match memchr2(b' ', b'\t', text) {
        Some(end) => &text[..end],
        None => text,
    }
}

/// Removes a trailing `\n` or `\r\n` from a raw line
#[must_use]
pub fn trim_terminator(mut line: &[u8]) -> &[u8] {
    if let Some(rest) = line.strip_suffix(b"\n") {
        line = rest;
    }
    if let Some(rest) = line.strip_suffix(b"\r") {
        line = rest;
    }
    line
}
