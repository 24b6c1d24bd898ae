use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use cpgref::{
    Capacity, HeaderPolicy, Policy, ReaderBuilder, Reference, Table, TableWriter,
};

/// Load a genome reference and report its CpG sites
#[derive(Parser)]
#[command(name = "cpgref", version)]
struct Cli {
    /// Reference FASTA file (optionally gzip/bzip2/xz compressed)
    reference: PathBuf,

    /// Only load the primary human assembly (chr1-22, X, Y, M, MT, lambda, pUC19)
    #[arg(long)]
    primary: bool,

    /// Fail on header lines without identifier instead of skipping them
    #[arg(long)]
    strict_headers: bool,

    /// End the current record at a header line without identifier and drop its body
    #[arg(long, conflicts_with = "strict_headers")]
    close_on_malformed: bool,

    /// Memory-map the (uncompressed) reference instead of streaming it
    #[arg(long)]
    mmap: bool,

    /// Size allocations for a human-sized reference
    #[arg(long)]
    human: bool,

    /// Write all CpG sites (BED-like) to this file
    #[arg(long)]
    cpgs: Option<PathBuf>,

    /// Write CpG sites spanning line breaks to this file
    #[arg(long)]
    boundary: Option<PathBuf>,

    /// Write the record index table to this file
    #[arg(long)]
    chroms: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn load(cli: &Cli) -> Result<Reference> {
    let builder = ReaderBuilder::default()
        .policy(Policy::from(cli.primary))
        .header_policy(if cli.strict_headers {
            HeaderPolicy::Fail
        } else if cli.close_on_malformed {
            HeaderPolicy::Close
        } else {
            HeaderPolicy::Skip
        })
        .capacity(if cli.human {
            Capacity::human()
        } else {
            Capacity::default()
        });

    let reference = if cli.mmap {
        builder.open_mmap(&cli.reference)?.read()?
    } else {
        builder.open(&cli.reference)?.read()?
    };
    Ok(reference)
}

fn export<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut TableWriter<BufWriter<File>>) -> cpgref::Result<usize>,
{
    let handle = File::create(path)
        .map(BufWriter::new)
        .with_context(|| format!("Unable to create {}", path.display()))?;
    let mut writer = TableWriter::new(handle);
    let n_lines = write(&mut writer)?;
    writer.flush()?;
    info!("Wrote {n_lines} lines to {}", path.display());
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let reference = load(cli)?;

    if let Some(path) = &cli.cpgs {
        export(path, |writer| writer.write_cpgs(&reference, Table::All))?;
    }
    if let Some(path) = &cli.boundary {
        export(path, |writer| writer.write_cpgs(&reference, Table::Boundary))?;
    }
    if let Some(path) = &cli.chroms {
        export(path, |writer| writer.write_chroms(&reference))?;
    }

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "records\t{}", reference.num_records())?;
    writeln!(stdout, "bases\t{}", reference.total_length())?;
    writeln!(stdout, "cpgs\t{}", reference.cpgs.len())?;
    writeln!(stdout, "boundary_cpgs\t{}", reference.boundary_cpgs.len())?;
    writeln!(stdout, "renamed\t{}", reference.renames.len())?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
