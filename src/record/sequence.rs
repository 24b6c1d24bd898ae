/// The live sequence buffer of the record currently being read
///
/// Bytes are stored exactly as found in the reference, keeping soft-masked (lowercase)
/// bases and ambiguity codes.
#[derive(Debug, Default)]
pub struct SequenceRecord {
    seq: Vec<u8>,
}
impl SequenceRecord {
    /// Creates an empty record with room for `capacity` bases
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            seq: Vec::with_capacity(capacity),
        }
    }

    /// Appends one (terminator-stripped) sequence line
    pub fn push_line(&mut self, line: &[u8]) {
        self.seq.extend_from_slice(line);
    }

    /// Number of bases read so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// Finalizes the record, trimming the buffer to its exact size
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        let mut seq = self.seq;
        seq.shrink_to_fit();
        seq
    }
}
