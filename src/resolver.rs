//! Record identifier resolution
//!
//! Decides whether a record is loaded and guarantees that every accepted identifier
//! is unique within one parse by suffixing duplicates with `_<n>`.

use std::collections::HashSet;

use log::warn;

use crate::Policy;

/// Additional identifiers accepted by the primary whitelist besides `chr1`..`chr22`
const SPECIAL_CHROMOSOMES: [&str; 6] = ["chrX", "chrY", "chrM", "chrMT", "lambda", "pUC19"];

/// Returns whether `id` is part of the primary human assembly whitelist
///
/// The whitelist is `chr1`..`chr22`, `chrX`, `chrY`, `chrM`, `chrMT`, `lambda` and `pUC19`.
/// Matching is exact and case-sensitive.
#[must_use]
pub fn is_primary(id: &str) -> bool {
    if SPECIAL_CHROMOSOMES.contains(&id) {
        return true;
    }
    // Only the literal names chr1..chr22: no leading zeros or signs
    id.strip_prefix("chr")
        .filter(|num| !num.starts_with('0') && num.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|num| num.parse::<u32>().ok())
        .is_some_and(|num| (1..=22).contains(&num))
}

/// Outcome of resolving a candidate identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The record is loaded under the given (possibly renamed) identifier
    Accepted(String),
    /// The record is excluded by the whitelist
    Rejected,
}

/// A duplicate identifier that was renamed during parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    /// The full header text (without the marker) of the renamed record
    pub header: String,
    /// The identifier as found in the header
    pub original: String,
    /// The unique identifier it was registered under
    pub renamed: String,
}

/// Per-parse identifier resolver
#[derive(Debug)]
pub struct Resolver {
    policy: Policy,
    /// Identifiers committed so far
    accepted: HashSet<String>,
    /// Next disambiguation suffix, shared by all collisions
    next_suffix: u32,
    renames: Vec<Rename>,
}
impl Resolver {
    #[must_use]
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            accepted: HashSet::new(),
            next_suffix: 1,
            renames: Vec::new(),
        }
    }

    /// Returns whether the policy lets a record with the raw identifier `id` in
    #[must_use]
    pub fn admits(&self, id: &[u8]) -> bool {
        self.policy.accepts_bytes(id)
    }

    /// Resolves a candidate identifier taken from `header`
    ///
    /// The returned identifier is not yet reserved; call [`Resolver::commit`] once the
    /// record is registered.
    pub fn resolve(&mut self, candidate: &str, header: &str) -> Resolution {
        if !self.policy.accepts(candidate) {
            return Resolution::Rejected;
        }
        if !self.accepted.contains(candidate) {
            return Resolution::Accepted(candidate.to_string());
        }

        let renamed = loop {
            let renamed = format!("{candidate}_{}", self.next_suffix);
            self.next_suffix += 1;
            if !self.accepted.contains(&renamed) {
                break renamed;
            }
        };
        warn!("Chromosome identifier {candidate} found in header {header} is not unique. Renaming to {renamed}");
        self.renames.push(Rename {
            header: header.to_string(),
            original: candidate.to_string(),
            renamed: renamed.clone(),
        });
        Resolution::Accepted(renamed)
    }

    /// Marks an identifier as taken for the remainder of the parse
    pub fn commit(&mut self, id: &str) {
        self.accepted.insert(id.to_string());
    }

    /// Consumes the resolver, returning the rename events in order
    #[must_use]
    pub fn into_renames(self) -> Vec<Rename> {
        self.renames
    }
}
