use crate::resolver::is_primary;

/// Policy for selecting which records of a reference are loaded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Policy {
    /// Load every record in the reference
    #[default]
    All,
    /// Only load the primary human assembly (plus common spike-ins)
    ///
    /// See [`is_primary`] for the exact set of identifiers.
    PrimaryHuman,
}
impl Policy {
    /// Returns whether whitelist filtering is active under this policy
    #[must_use]
    pub fn filters(&self) -> bool {
        matches!(self, Self::PrimaryHuman)
    }

    /// Returns whether a record with the given identifier should be loaded
    #[must_use]
    pub fn accepts(&self, id: &str) -> bool {
        match self {
            Self::All => true,
            Self::PrimaryHuman => is_primary(id),
        }
    }

    /// Like [`Policy::accepts`], for an identifier that may not be valid UTF-8
    ///
    /// Whitelisted identifiers are plain ASCII, so anything that is not UTF-8 is
    /// rejected under [`Policy::PrimaryHuman`].
    #[must_use]
    pub fn accepts_bytes(&self, id: &[u8]) -> bool {
        match self {
            Self::All => true,
            Self::PrimaryHuman => std::str::from_utf8(id).is_ok_and(is_primary),
        }
    }
}
impl From<bool> for Policy {
    fn from(primary_only: bool) -> Self {
        if primary_only {
            Self::PrimaryHuman
        } else {
            Self::All
        }
    }
}

/// Policy for handling header lines that carry no identifier (e.g. a lone `>`)
///
/// Such a line never opens a record and is never sequence data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeaderPolicy {
    /// Drop the line with a warning and keep reading the current record
    ///
    /// The lines following it are appended to the record that was open before, so
    /// a nameless record (`> chr5 nameless`) merges into the previous one, and a
    /// `C`/`G` pair across the join is reported as a line-spanning CpG.
    #[default]
    Skip,
    /// Close the current record with a warning and drop every line up to the next
    /// header with an identifier
    Close,
    /// Abort the parse with [`ReadError::MalformedHeader`](crate::ReadError::MalformedHeader)
    Fail,
}

#[cfg(test)]
mod testing {
    use super::*;

    #[test]
    fn test_policy_from_flag() {
        assert_eq!(Policy::from(true), Policy::PrimaryHuman);
        assert_eq!(Policy::from(false), Policy::All);
        assert!(!Policy::default().filters());
    }

    #[test]
    fn test_policy_accepts() {
        assert!(Policy::All.accepts("chrUn_random"));
        assert!(Policy::PrimaryHuman.accepts("chr7"));
        assert!(!Policy::PrimaryHuman.accepts("chrUn_random"));
    }

    #[test]
    fn test_policy_accepts_bytes() {
        assert!(Policy::All.accepts_bytes(b"contig\xe9"));
        assert!(Policy::PrimaryHuman.accepts_bytes(b"chrX"));
        assert!(!Policy::PrimaryHuman.accepts_bytes(b"chr1\xff"));
        assert!(!Policy::PrimaryHuman.accepts_bytes(b"scaffold\xff_decoy"));
    }
}
