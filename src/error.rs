/// Custom Result type for cpgref operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the cpgref library, encompassing all possible error cases
/// that can occur while loading a reference.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Errors that occur while reading and parsing the reference
    #[error(transparent)]
    ReadError(#[from] ReadError),
    /// Standard I/O errors from the Rust standard library
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    /// Generic errors that can occur in any part of the system
    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
    /// The parse was aborted through its [`CancelToken`](crate::CancelToken).
    ///
    /// No partial output is returned in this case.
    #[error("Reading the reference was cancelled")]
    Cancelled,
}

/// Errors that can occur while reading reference data
#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    /// The reference file could not be opened
    ///
    /// # Fields
    /// * `path` - The path that was requested
    /// * `source` - The underlying failure
    #[error("Opening genome reference file {path} was unsuccessful: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file being mapped is not a regular file (e.g., it might be a directory or special file)
    #[error("File is not regular")]
    IncompatibleFile,

    /// A header line without an identifier (e.g. a lone `>`)
    ///
    /// Only raised under [`HeaderPolicy::Fail`](crate::HeaderPolicy::Fail).
    ///
    /// # Fields
    /// * `line` - The 1-based line number of the header
    #[error("Malformed header without identifier at line {line}")]
    MalformedHeader { line: usize },

    /// A record exceeds the addressable length of a CpG position
    ///
    /// # Fields
    /// * `chrom` - The identifier of the offending record
    /// * `len` - The length the record would have reached
    #[error("Sequence of record {chrom} exceeds the maximum length ({len} > {max})", max = u32::MAX)]
    SequenceTooLong { chrom: String, len: usize },

    /// More records were accepted than a record index can hold
    #[error("Number of accepted records exceeds {max}", max = u32::MAX)]
    TooManyRecords,
}
