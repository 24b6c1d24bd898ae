//! Tab-separated export of a loaded [`Reference`]
//!
//! CpG tables are written BED-style (`name`, 0-based start, exclusive end covering
//! both bases of the site); the chromosome map as `index`, `name`, `length`.

use std::io::Write;

use crate::{CpG, Reference, Result};

/// Selects which CpG table to export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Table {
    /// Every CpG site
    #[default]
    All,
    /// Only sites spanning a line break in the reference
    Boundary,
}
impl Table {
    fn sites(self, reference: &Reference) -> &[CpG] {
        match self {
            Self::All => &reference.cpgs,
            Self::Boundary => &reference.boundary_cpgs,
        }
    }
}

/// Writes reference tables as text lines
pub struct TableWriter<W: Write> {
    /// Inner writer
    inner: W,

    /// Reusable integer formatting buffer
    ibuf: itoa::Buffer,

    /// Number of lines written
    records_written: usize,
}
impl<W: Write> TableWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            ibuf: itoa::Buffer::new(),
            records_written: 0,
        }
    }

    fn write_int<I: itoa::Integer>(&mut self, value: I) -> Result<()> {
        self.inner.write_all(self.ibuf.format(value).as_bytes())?;
        Ok(())
    }

    /// Writes one line per site of `table`, returning the number of lines written
    pub fn write_cpgs(&mut self, reference: &Reference, table: Table) -> Result<usize> {
        let sites = table.sites(reference);
        for site in sites {
            let name = reference.name(site.chrom).unwrap_or_default();
            let span = site.span();
            self.inner.write_all(name.as_bytes())?;
            self.inner.write_all(b"\t")?;
            self.write_int(span.start)?;
            self.inner.write_all(b"\t")?;
            self.write_int(span.end)?;
            self.inner.write_all(b"\n")?;
        }
        self.records_written += sites.len();
        Ok(sites.len())
    }

    /// Writes one line per loaded record, returning the number of lines written
    pub fn write_chroms(&mut self, reference: &Reference) -> Result<usize> {
        for (idx, name) in reference.chroms.iter() {
            let len = reference.sequence(idx).map_or(0, <[u8]>::len);
            self.write_int(idx)?;
            self.inner.write_all(b"\t")?;
            self.inner.write_all(name.as_bytes())?;
            self.inner.write_all(b"\t")?;
            self.write_int(len)?;
            self.inner.write_all(b"\n")?;
        }
        self.records_written += reference.num_records();
        Ok(reference.num_records())
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
