mod chroms;
mod cpg;
mod sequence;

pub use chroms::ChromMap;
pub use cpg::CpG;
pub use sequence::SequenceRecord;
