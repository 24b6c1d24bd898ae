//! # cpgref
//!
//! Loads a FASTA-style genome reference in a single forward pass and collects, for
//! every loaded record, its raw sequence and the positions of all CpG (`CG`)
//! dinucleotides, including those split across a line break.
//!
//! ```
//! use cpgref::{Policy, ReaderBuilder, Result};
//!
//! fn main() -> Result<()> {
//!     let fasta = b">chr1 primary\nTTAC\nGTcg\n>chrUn_random\nCGCG\n";
//!     let reference = ReaderBuilder::default()
//!         .policy(Policy::PrimaryHuman)
//!         .build(&fasta[..])
//!         .read()?;
//!
//!     assert_eq!(reference.num_records(), 1);
//!     assert_eq!(reference.cpgs.len(), 2);
//!     assert_eq!(reference.boundary_cpgs.len(), 1);
//!     Ok(())
//! }
//! ```

mod error;
pub mod header;
mod policy;
mod reader;
mod record;
mod resolver;
mod scanner;
pub mod writer;

pub use error::{Error, ReadError, Result};
pub use policy::{HeaderPolicy, Policy};
pub use reader::{CancelToken, Capacity, ReaderBuilder, Reference, ReferenceReader};
pub use record::{ChromMap, CpG, SequenceRecord};
pub use resolver::{is_primary, Rename, Resolution, Resolver};
pub use scanner::{CpgScanner, LineHits, LineScanner};
pub use writer::{Table, TableWriter};
