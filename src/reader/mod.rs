//! Single-pass reference reader
//!
//! [`ReferenceReader`] walks a FASTA-style reference once, line by line, and collects
//! the sequence of every loaded record together with its CpG sites. Records can be
//! restricted to the primary assembly with [`Policy`](crate::Policy) and duplicate
//! identifiers are made unique on the fly.
//!
//! ```
//! use cpgref::{ReaderBuilder, Result};
//!
//! fn main() -> Result<()> {
//!     let fasta = b">chr1 assembled\nACGTAC\nGTTT\n";
//!     let reference = ReaderBuilder::default().build(&fasta[..]).read()?;
//!
//!     assert_eq!(reference.name(0), Some("chr1"));
//!     assert_eq!(reference.sequence(0), Some(&b"ACGTACGTTT"[..]));
//!     assert_eq!(reference.cpgs.len(), 2);
//!     assert_eq!(reference.boundary_cpgs.len(), 1);
//!     Ok(())
//! }
//! ```

mod builder;
mod cancel;
mod reader;
mod reference;

pub use builder::{Capacity, ReaderBuilder};
pub use cancel::CancelToken;
pub use reader::ReferenceReader;
pub use reference::Reference;
