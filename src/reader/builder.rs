use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::Path;

use log::debug;
use memmap2::Mmap;

use super::{CancelToken, ReferenceReader};
use crate::{
    error::{ReadError, Result},
    HeaderPolicy, Policy,
};

/// Buffer size used when streaming a reference from disk
const READ_BUFFER_SIZE: usize = 1 << 20;

/// Pre-allocation hints for a parse
///
/// The hints only size the initial allocations; wrong values never change the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    /// Expected number of loaded records
    pub records: usize,
    /// Expected length of the longest record
    pub record_len: usize,
    /// Expected total number of CpG sites
    pub cpgs: usize,
}
impl Default for Capacity {
    fn default() -> Self {
        Self {
            records: 32,
            record_len: 1 << 16,
            cpgs: 1 << 16,
        }
    }
}
impl Capacity {
    /// Hints sized for the primary human assembly
    #[must_use]
    pub fn human() -> Self {
        Self {
            records: 25,
            record_len: 250_000_000,
            cpgs: 30_000_000,
        }
    }
}

/// Builder for configured [`ReferenceReader`] instances
///
/// # Examples
///
/// ```
/// # use cpgref::{Capacity, HeaderPolicy, Policy, ReaderBuilder, Result};
/// # fn main() -> Result<()> {
/// let fasta = b">chrUn_random\nCGCG\n>chr2 primary\nacgt\n";
/// let reference = ReaderBuilder::default()
///     .policy(Policy::PrimaryHuman)
///     .header_policy(HeaderPolicy::Fail)
///     .capacity(Capacity::default())
///     .build(&fasta[..])
///     .read()?;
/// assert_eq!(reference.num_records(), 1);
/// assert_eq!(reference.name(0), Some("chr2"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default, Clone)]
pub struct ReaderBuilder {
    /// Optional record selection policy
    policy: Option<Policy>,
    /// Optional handling of headers without identifier
    header_policy: Option<HeaderPolicy>,
    /// Optional allocation hints
    capacity: Option<Capacity>,
    /// Optional token to abort the parse
    cancel: Option<CancelToken>,
}
impl ReaderBuilder {
    #[must_use]
    pub fn policy(mut self, policy: Policy) -> Self {
        self.policy = Some(policy);
        self
    }

    #[must_use]
    pub fn header_policy(mut self, header_policy: HeaderPolicy) -> Self {
        self.header_policy = Some(header_policy);
        self
    }

    #[must_use]
    pub fn capacity(mut self, capacity: Capacity) -> Self {
        self.capacity = Some(capacity);
        self
    }

    #[must_use]
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Builds a reader over any buffered input
    pub fn build<R: BufRead>(self, inner: R) -> ReferenceReader<R> {
        let policy = self.policy.unwrap_or_default();
        debug!("Primary assembly filtering: {}", policy.filters());
        ReferenceReader::with_options(
            inner,
            policy,
            self.header_policy.unwrap_or_default(),
            self.capacity.unwrap_or_default(),
            self.cancel,
        )
    }

    /// Opens a reference file, transparently decompressing gzip, bzip2 or xz input
    pub fn open<P: AsRef<Path>>(
        self,
        path: P,
    ) -> Result<ReferenceReader<BufReader<Box<dyn Read>>>> {
        let path = path.as_ref();
        debug!("Opening reference file {}", path.display());
        let file = open_file(path)?;
        let inner: Box<dyn Read> = match niffler::get_reader(Box::new(file)) {
            Ok((inner, format)) => {
                debug!("Detected compression format {format:?}");
                inner
            }
            Err(e) => {
                // too short to sniff a magic number: read it as plain text
                debug!("Reading {} uncompressed ({e})", path.display());
                Box::new(open_file(path)?)
            }
        };
        Ok(self.build(BufReader::with_capacity(READ_BUFFER_SIZE, inner)))
    }

    /// Memory-maps an uncompressed reference file and streams over the mapped bytes
    pub fn open_mmap<P: AsRef<Path>>(self, path: P) -> Result<ReferenceReader<Cursor<Mmap>>> {
        let path = path.as_ref();
        debug!("Memory-mapping reference file {}", path.display());
        let file = open_file(path)?;

        // Verify it's a regular file before attempting to map
        if !file.metadata()?.is_file() {
            return Err(ReadError::IncompatibleFile.into());
        }

        // Safety: the file is open and is not modified by this crate while mapped
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(self.build(Cursor::new(mmap)))
    }
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| {
        ReadError::Open {
            path: path.display().to_string(),
            source,
        }
        .into()
    })
}
