use std::{borrow::Cow, io::BufRead};

use log::{debug, info, warn};

use super::{Capacity, CancelToken, Reference};
use crate::{
    error::{Error, ReadError, Result},
    header::{trim_terminator, Line},
    ChromMap, CpG, CpgScanner, HeaderPolicy, LineHits, LineScanner, Policy, Resolution, Resolver,
    SequenceRecord,
};

/// The record currently receiving sequence lines
#[derive(Debug)]
struct Live {
    /// Index in the chromosome map
    chrom: u32,
    /// Resolved identifier, kept for diagnostics
    name: String,
    record: SequenceRecord,
    /// Whether the previous line ended in an unpaired `C`
    carry: bool,
}

/// Single-pass reader turning a FASTA-style reference into a [`Reference`]
///
/// All parse state (record counter, rename counter, live record) belongs to one
/// reader, so separate parses never influence each other. The reader is consumed by
/// [`ReferenceReader::read`]; on any error or cancellation the partial output is
/// dropped with it.
///
/// # Examples
///
/// ```
/// use cpgref::{ReferenceReader, Result};
///
/// fn main() -> Result<()> {
///     let fasta = b">chr1 extra text\nACG\n>chr1 extra text\nTTCG\n";
///     let reference = ReferenceReader::new(&fasta[..]).read()?;
///
///     assert_eq!(reference.name(1), Some("chr1_1"));
///     assert_eq!(reference.renames.len(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct ReferenceReader<R: BufRead> {
    inner: R,
    header_policy: HeaderPolicy,
    capacity: Capacity,
    cancel: Option<CancelToken>,
    resolver: Resolver,

    /// Raw bytes of the current line
    line: Vec<u8>,
    /// 1-based number of the current line
    line_number: usize,
    live: Option<Live>,
    hits: LineHits,

    sequences: Vec<Vec<u8>>,
    cpgs: Vec<CpG>,
    boundary_cpgs: Vec<CpG>,
    chroms: ChromMap,
}
impl<R: BufRead> ReferenceReader<R> {
    /// Creates a reader loading every record with default settings
    pub fn new(inner: R) -> Self {
        Self::with_options(
            inner,
            Policy::default(),
            HeaderPolicy::default(),
            Capacity::default(),
            None,
        )
    }

    pub(crate) fn with_options(
        inner: R,
        policy: Policy,
        header_policy: HeaderPolicy,
        capacity: Capacity,
        cancel: Option<CancelToken>,
    ) -> Self {
        Self {
            inner,
            header_policy,
            capacity,
            cancel,
            resolver: Resolver::new(policy),
            line: Vec::with_capacity(256),
            line_number: 0,
            live: None,
            hits: LineHits::default(),
            sequences: Vec::with_capacity(capacity.records),
            cpgs: Vec::with_capacity(capacity.cpgs),
            boundary_cpgs: Vec::new(),
            chroms: ChromMap::with_capacity(capacity.records),
        }
    }

    /// Reads the whole reference with the default [`CpgScanner`]
    pub fn read(self) -> Result<Reference> {
        self.read_with(CpgScanner)
    }

    /// Reads the whole reference, detecting CpG sites with `scanner`
    pub fn read_with<S: LineScanner>(mut self, mut scanner: S) -> Result<Reference> {
        info!("Start reading reference");
        loop {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                warn!("Reading the reference was cancelled at line {}", self.line_number);
                return Err(Error::Cancelled);
            }

            self.line.clear();
            if self.inner.read_until(b'\n', &mut self.line)? == 0 {
                break;
            }
            self.line_number += 1;

            let line = std::mem::take(&mut self.line);
            let status = self.process_line(trim_terminator(&line), &mut scanner);
            self.line = line;
            status?;
        }
        self.flush();
        Ok(self.finish())
    }

    fn process_line<S: LineScanner>(&mut self, line: &[u8], scanner: &mut S) -> Result<()> {
        match Line::classify(line) {
            Line::Header { id, text } => self.open_record(id, text),
            Line::Malformed => match self.header_policy {
                HeaderPolicy::Skip => {
                    warn!(
                        "Skipping header without identifier at line {}",
                        self.line_number
                    );
                    Ok(())
                }
                HeaderPolicy::Close => {
                    warn!(
                        "Closing record at header without identifier at line {}",
                        self.line_number
                    );
                    self.flush();
                    Ok(())
                }
                HeaderPolicy::Fail => Err(ReadError::MalformedHeader {
                    line: self.line_number,
                }
                .into()),
            },
            Line::Sequence(seq) => self.push_sequence(seq, scanner),
        }
    }

    /// Closes the live record and starts a new one if the identifier is accepted
    fn open_record(&mut self, id: &[u8], text: &[u8]) -> Result<()> {
        self.flush();

        if !self.resolver.admits(id) {
            debug!(
                "Skipping record {}: not part of the primary assembly",
                String::from_utf8_lossy(id)
            );
            return Ok(());
        }

        let id = String::from_utf8_lossy(id);
        if matches!(id, Cow::Owned(_)) {
            warn!(
                "Record identifier at line {} is not valid UTF-8, reading it as {id}",
                self.line_number
            );
        }
        let header = String::from_utf8_lossy(text);

        match self.resolver.resolve(&id, &header) {
            Resolution::Rejected => {
                debug!("Skipping record {id}: not part of the primary assembly");
            }
            Resolution::Accepted(name) => {
                let chrom = self.chroms.push(name.clone())?;
                self.resolver.commit(&name);
                debug!("Reading record {name} (index {chrom})");
                self.live = Some(Live {
                    chrom,
                    name,
                    record: SequenceRecord::with_capacity(self.capacity.record_len),
                    carry: false,
                });
            }
        }
        Ok(())
    }

    /// Appends a sequence line to the live record and records its CpG sites
    fn push_sequence<S: LineScanner>(&mut self, line: &[u8], scanner: &mut S) -> Result<()> {
        // body of a rejected record
        let Some(live) = self.live.as_mut() else {
            return Ok(());
        };

        let base = live.record.len();
        let len = base + line.len();
        if u32::try_from(len).is_err() {
            return Err(ReadError::SequenceTooLong {
                chrom: live.name.clone(),
                len,
            }
            .into());
        }

        self.hits.clear();
        live.carry = scanner.scan(line, live.carry, &mut self.hits);

        let chrom = live.chrom;
        if self.hits.boundary && base > 0 {
            let site = CpG::new(chrom, (base - 1) as u32);
            self.cpgs.push(site);
            self.boundary_cpgs.push(site);
        }
        self.cpgs.extend(
            self.hits
                .positions
                .iter()
                .map(|&pos| CpG::new(chrom, (base + pos) as u32)),
        );

        live.record.push_line(line);
        Ok(())
    }

    /// Moves the live record, if any, into the output
    fn flush(&mut self) {
        if let Some(live) = self.live.take() {
            if live.record.is_empty() {
                debug!("Record {} has no sequence", live.name);
            }
            debug!("Finished record {} ({} bp)", live.name, live.record.len());
            self.sequences.push(live.record.finish());
        }
    }

    fn finish(self) -> Reference {
        let mut reference = Reference {
            sequences: self.sequences,
            cpgs: self.cpgs,
            boundary_cpgs: self.boundary_cpgs,
            chroms: self.chroms,
            renames: self.resolver.into_renames(),
        };
        reference.cpgs.shrink_to_fit();
        reference.sequences.shrink_to_fit();
        info!(
            "Done reading reference: {} records, {} bp, {} CpGs ({} spanning lines)",
            reference.num_records(),
            reference.total_length(),
            reference.cpgs.len(),
            reference.boundary_cpgs.len()
        );
        reference
    }
}

#[cfg(test)]
mod testing {
    use std::io::Cursor;

    use rand::{rngs::SmallRng, Rng, SeedableRng};
    use seq_io::fasta::{Reader, Record};

    use super::*;
    use crate::ReaderBuilder;
    use anyhow::Result;

    fn read(fasta: &str) -> Result<Reference> {
        Ok(ReferenceReader::new(fasta.as_bytes()).read()?)
    }

    fn read_primary(fasta: &str) -> Result<Reference> {
        Ok(ReaderBuilder::default()
            .policy(Policy::PrimaryHuman)
            .build(fasta.as_bytes())
            .read()?)
    }

    /// Every CpG of every record found by a plain pairwise scan
    fn naive_cpgs(sequences: &[Vec<u8>]) -> Vec<CpG> {
        let mut sites = Vec::new();
        for (chrom, seq) in sequences.iter().enumerate() {
            for (pos, pair) in seq.windows(2).enumerate() {
                if pair[0].eq_ignore_ascii_case(&b'C') && pair[1].eq_ignore_ascii_case(&b'G') {
                    sites.push(CpG::new(chrom as u32, pos as u32));
                }
            }
        }
        sites
    }

    fn is_subsequence(sub: &[CpG], full: &[CpG]) -> bool {
        let mut full = full.iter();
        sub.iter().all(|site| full.any(|other| other == site))
    }

    #[test]
    fn test_empty_input() -> Result<()> {
        let reference = read("")?;
        assert!(reference.is_empty());
        assert!(reference.cpgs.is_empty());
        assert!(reference.boundary_cpgs.is_empty());
        assert!(reference.chroms.is_empty());
        assert!(reference.renames.is_empty());
        Ok(())
    }

    #[test]
    fn test_sequence_concatenation() -> Result<()> {
        let reference = read(">chr1\nACGTacgt\nNNnnRY\nT\n>chr2 second\nggcc\n")?;
        assert_eq!(reference.num_records(), 2);
        assert_eq!(reference.sequence(0), Some(&b"ACGTacgtNNnnRYT"[..]));
        assert_eq!(reference.sequence(1), Some(&b"ggcc"[..]));
        assert_eq!(reference.name(0), Some("chr1"));
        assert_eq!(reference.name(1), Some("chr2"));
        assert_eq!(reference.total_length(), 19);
        Ok(())
    }

    #[test]
    fn test_sequence_trimmed() -> Result<()> {
        let reference = ReaderBuilder::default()
            .capacity(Capacity {
                records: 1,
                record_len: 4096,
                cpgs: 16,
            })
            .build(&b">chr1\nACGT\n"[..])
            .read()?;
        assert_eq!(reference.sequences[0].capacity(), 4);
        Ok(())
    }

    #[test]
    fn test_boundary_cpg() -> Result<()> {
        let reference = read(">chr1\nTTAC\nGTT\n")?;
        assert_eq!(reference.cpgs, vec![CpG::new(0, 3)]);
        assert_eq!(reference.boundary_cpgs, vec![CpG::new(0, 3)]);
        Ok(())
    }

    #[test]
    fn test_split_not_boundary() -> Result<()> {
        let reference = read(">chr1\nTTAT\nCGT\n")?;
        assert_eq!(reference.cpgs, vec![CpG::new(0, 4)]);
        assert!(reference.boundary_cpgs.is_empty());
        Ok(())
    }

    #[test]
    fn test_carry_reset_between_records() -> Result<()> {
        let reference = read(">chr1\nAAC\n>chr2\nGAA\n")?;
        assert!(reference.cpgs.is_empty());
        assert!(reference.boundary_cpgs.is_empty());
        Ok(())
    }

    #[test]
    fn test_boundary_ordering() -> Result<()> {
        let reference = read(">a\nCGAC\nGCG\n>b\nc\ng\n")?;
        assert_eq!(
            reference.cpgs,
            vec![
                CpG::new(0, 0),
                CpG::new(0, 3),
                CpG::new(0, 5),
                CpG::new(1, 0)
            ]
        );
        assert_eq!(reference.boundary_cpgs, vec![CpG::new(0, 3), CpG::new(1, 0)]);
        Ok(())
    }

    #[test]
    fn test_duplicate_renamed() -> Result<()> {
        let reference = read(">chr1 extra text\nACGT\n>chr1 extra text\nCCGG\n")?;
        assert_eq!(reference.name(0), Some("chr1"));
        assert_eq!(reference.name(1), Some("chr1_1"));
        assert_eq!(reference.renames.len(), 1);
        assert_eq!(reference.renames[0].header, "chr1 extra text");
        assert_eq!(reference.renames[0].renamed, "chr1_1");
        assert_eq!(reference.index_of("chr1_1"), Some(1));
        Ok(())
    }

    #[test]
    fn test_rename_counter_shared() -> Result<()> {
        let reference = read(">a\nA\n>a\nA\n>b\nA\n>b\nA\n>a\nA\n")?;
        let names: Vec<_> = reference.chroms.iter().map(|(_, name)| name).collect();
        assert_eq!(names, vec!["a", "a_1", "b", "b_2", "a_3"]);
        assert_eq!(reference.renames.len(), 3);
        Ok(())
    }

    #[test]
    fn test_whitespace_identifier() -> Result<()> {
        let reference = read(">chr2 comment\nA\n>chr3\tcomment\nA\n")?;
        assert_eq!(reference.name(0), Some("chr2"));
        assert_eq!(reference.name(1), Some("chr3"));

        let tabbed = read(">chr2\tcomment\nA\n")?;
        assert_eq!(tabbed.name(0), Some("chr2"));
        Ok(())
    }

    #[test]
    fn test_whitelist_excludes_record() -> Result<()> {
        let fasta = ">chr1\nAAC\nGT\n>chrUn_random\nCGCGCG\nCG\n>chrX\nTCGA\n";
        let reference = read_primary(fasta)?;
        assert_eq!(reference.num_records(), 2);
        assert_eq!(reference.name(0), Some("chr1"));
        assert_eq!(reference.name(1), Some("chrX"));
        assert_eq!(reference.index_of("chrUn_random"), None);
        assert_eq!(reference.sequence(1), Some(&b"TCGA"[..]));
        assert_eq!(reference.cpgs, vec![CpG::new(0, 2), CpG::new(1, 1)]);
        assert_eq!(reference.boundary_cpgs, vec![CpG::new(0, 2)]);
        Ok(())
    }

    #[test]
    fn test_whitelist_rejection_closes_live_record() -> Result<()> {
        let reference = read_primary(">chr1\nAC\n>decoy\nGG\n>chr2\nCG\n")?;
        assert_eq!(reference.sequence(0), Some(&b"AC"[..]));
        assert_eq!(reference.sequence(1), Some(&b"CG"[..]));
        assert_eq!(reference.cpgs, vec![CpG::new(1, 0)]);
        Ok(())
    }

    #[test]
    fn test_whitelist_disabled() -> Result<()> {
        let reference = read(">chrUn_random\nCG\n")?;
        assert_eq!(reference.name(0), Some("chrUn_random"));
        assert_eq!(reference.cpgs.len(), 1);
        Ok(())
    }

    #[test]
    fn test_lines_before_first_header() -> Result<()> {
        let reference = read("ACGT\nCG\n>chr1\nA\n")?;
        assert_eq!(reference.num_records(), 1);
        assert_eq!(reference.sequence(0), Some(&b"A"[..]));
        assert!(reference.cpgs.is_empty());
        Ok(())
    }

    #[test]
    fn test_malformed_header_skipped() -> Result<()> {
        let reference = read(">chr1\nAAC\n>\n> \nGTT\n")?;
        assert_eq!(reference.num_records(), 1);
        assert_eq!(reference.sequence(0), Some(&b"AACGTT"[..]));
        assert_eq!(reference.cpgs, vec![CpG::new(0, 2)]);
        assert_eq!(reference.boundary_cpgs, vec![CpG::new(0, 2)]);
        Ok(())
    }

    #[test]
    fn test_malformed_header_fails() {
        let result = ReaderBuilder::default()
            .header_policy(HeaderPolicy::Fail)
            .build(&b">chr1\nACGT\n>\nACGT\n"[..])
            .read();
        assert!(matches!(
            result,
            Err(Error::ReadError(ReadError::MalformedHeader { line: 3 }))
        ));
    }

    #[test]
    fn test_malformed_header_closes_record() -> Result<()> {
        let reference = ReaderBuilder::default()
            .header_policy(HeaderPolicy::Close)
            .build(&b">chr1\nAAC\n> x\nGTT\nCG\n>chr2\nCG\n"[..])
            .read()?;
        assert_eq!(reference.num_records(), 2);
        assert_eq!(reference.sequence(0), Some(&b"AAC"[..]));
        assert_eq!(reference.name(1), Some("chr2"));
        assert_eq!(reference.cpgs, vec![CpG::new(1, 0)]);
        assert!(reference.boundary_cpgs.is_empty());
        Ok(())
    }

    #[test]
    fn test_non_utf8_rejected_by_whitelist() -> Result<()> {
        let fasta = b">chr1\nACG\n>scaffold\xff_decoy\nCG\n>chr2\nCG\n";
        let reference = ReaderBuilder::default()
            .policy(Policy::PrimaryHuman)
            .build(&fasta[..])
            .read()?;
        assert_eq!(reference.num_records(), 2);
        assert_eq!(reference.name(0), Some("chr1"));
        assert_eq!(reference.name(1), Some("chr2"));
        assert_eq!(reference.cpgs, vec![CpG::new(0, 1), CpG::new(1, 0)]);
        Ok(())
    }

    #[test]
    fn test_non_utf8_identifier_read_lossy() -> Result<()> {
        let fasta = b">contig\xe9\nCG\n>contig\xff\nACG\n";
        let reference = ReferenceReader::new(&fasta[..]).read()?;
        assert_eq!(reference.num_records(), 2);
        assert_eq!(reference.name(0), Some("contig\u{FFFD}"));
        assert_eq!(reference.name(1), Some("contig\u{FFFD}_1"));
        assert_eq!(reference.renames.len(), 1);
        assert_eq!(reference.cpgs, vec![CpG::new(0, 0), CpG::new(1, 1)]);
        Ok(())
    }

    #[test]
    fn test_crlf_and_missing_final_newline() -> Result<()> {
        let reference = read(">chr1 desc\r\nAAC\r\nGTT")?;
        assert_eq!(reference.name(0), Some("chr1"));
        assert_eq!(reference.sequence(0), Some(&b"AACGTT"[..]));
        assert_eq!(reference.boundary_cpgs, vec![CpG::new(0, 2)]);
        Ok(())
    }

    #[test]
    fn test_empty_line_keeps_carry() -> Result<()> {
        let reference = read(">chr1\nAC\n\nGA\n")?;
        assert_eq!(reference.sequence(0), Some(&b"ACGA"[..]));
        assert_eq!(reference.boundary_cpgs, vec![CpG::new(0, 1)]);
        Ok(())
    }

    #[test]
    fn test_header_only_record() -> Result<()> {
        let reference = read(">chr1\n>chr2\nCG\n")?;
        assert_eq!(reference.num_records(), 2);
        assert_eq!(reference.sequence(0), Some(&b""[..]));
        assert_eq!(reference.cpgs, vec![CpG::new(1, 0)]);
        Ok(())
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancelToken::new();
        token.cancel();
        let result = ReaderBuilder::default()
            .cancel_token(token)
            .build(&b">chr1\nACGT\n"[..])
            .read();
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    /// Cancels the shared token once a given number of lines were scanned
    struct CancellingScanner {
        token: CancelToken,
        remaining: usize,
    }
    impl LineScanner for CancellingScanner {
        fn scan(&mut self, line: &[u8], carry: bool, hits: &mut LineHits) -> bool {
            self.remaining = self.remaining.saturating_sub(1);
            if self.remaining == 0 {
                self.token.cancel();
            }
            CpgScanner.scan(line, carry, hits)
        }
    }

    #[test]
    fn test_cancelled_mid_parse() {
        let token = CancelToken::new();
        let scanner = CancellingScanner {
            token: token.clone(),
            remaining: 2,
        };
        let result = ReaderBuilder::default()
            .cancel_token(token)
            .build(&b">chr1\nACGT\nACGT\nACGT\n"[..])
            .read_with(scanner);
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    /// Reports no CpG sites and never carries
    struct NullScanner;
    impl LineScanner for NullScanner {
        fn scan(&mut self, _line: &[u8], _carry: bool, _hits: &mut LineHits) -> bool {
            false
        }
    }

    #[test]
    fn test_custom_scanner() -> Result<()> {
        let reference = ReferenceReader::new(&b">chr1\nCGCG\nCG\n"[..]).read_with(NullScanner)?;
        assert_eq!(reference.sequence(0), Some(&b"CGCGCG"[..]));
        assert!(reference.cpgs.is_empty());
        Ok(())
    }

    #[test]
    fn test_scanner_by_reference() -> Result<()> {
        let mut scanner = CpgScanner;
        let reference = ReferenceReader::new(&b">chr1\nCG\n"[..]).read_with(&mut scanner)?;
        assert_eq!(reference.cpgs.len(), 1);
        Ok(())
    }

    #[test]
    fn test_io_error_propagated() {
        struct Failing;
        impl std::io::Read for Failing {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("broken pipe"))
            }
        }
        let result = ReferenceReader::new(std::io::BufReader::new(Failing)).read();
        assert!(matches!(result, Err(Error::IoError(_))));
    }

    fn random_reference(rng: &mut SmallRng, n_records: usize) -> (String, Vec<Vec<u8>>) {
        const ALPHABET: &[u8] = b"ACGTacgtNCGCG";
        let mut fasta = String::new();
        let mut sequences = Vec::with_capacity(n_records);
        for idx in 0..n_records {
            let len = rng.random_range(0..500);
            let seq: Vec<u8> = (0..len)
                .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())])
                .collect();
            let width = rng.random_range(1..80);
            fasta.push_str(&format!(">contig{idx} random record\n"));
            for chunk in seq.chunks(width) {
                fasta.push_str(std::str::from_utf8(chunk).unwrap());
                fasta.push('\n');
            }
            sequences.push(seq);
        }
        (fasta, sequences)
    }

    #[test]
    fn test_random_references() -> Result<()> {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..50 {
            let n_records = rng.random_range(0..6);
            let (fasta, sequences) = random_reference(&mut rng, n_records);
            let reference = read(&fasta)?;

            assert_eq!(reference.sequences, sequences);
            assert_eq!(reference.chroms.len(), n_records);
            assert_eq!(reference.cpgs, naive_cpgs(&sequences));
            assert!(reference.cpgs.windows(2).all(|w| w[0] < w[1]));
            assert!(is_subsequence(&reference.boundary_cpgs, &reference.cpgs));
        }
        Ok(())
    }

    #[test]
    fn test_agrees_with_seq_io() -> Result<()> {
        let mut rng = SmallRng::seed_from_u64(7);
        let (fasta, _) = random_reference(&mut rng, 8);
        let reference = read(&fasta)?;

        let mut reader = Reader::new(Cursor::new(fasta.as_bytes()));
        let mut idx = 0;
        while let Some(record) = reader.next() {
            let record = record?;
            assert_eq!(reference.name(idx), Some(record.id()?));
            assert_eq!(reference.sequence(idx), Some(record.full_seq().as_ref()));
            idx += 1;
        }
        assert_eq!(idx as usize, reference.num_records());
        Ok(())
    }
}
