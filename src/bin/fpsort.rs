use std::process;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use fpsort::common::reset_sigpipe;
use fpsort::sort::{
    DEFAULT_PREFIX_LENGTH, SortConfig, TieBreak, parse_buffer_size, sort_and_output,
};

#[derive(Parser)]
#[command(
    name = "fpsort",
    version,
    about = "Sort lines of huge text files by their first N bytes"
)]
struct Cli {
    /// File to sort (repeatable; combined with positional FILEs, in order)
    #[arg(short = 's', long = "source", value_name = "FILE")]
    sources: Vec<String>,

    /// Write result to FILE instead of standard output ("-" = stdout)
    #[arg(
        short = 'd',
        long = "dest",
        visible_alias = "output",
        value_name = "FILE",
        default_value = "-"
    )]
    dest: String,

    /// Number of leading bytes compared per line
    #[arg(short = 'n', long = "prefix-length", value_name = "N", default_value_t = DEFAULT_PREFIX_LENGTH)]
    prefix_length: usize,

    /// Output buffer size; flushes happen each time it fills (K, M, G suffixes)
    #[arg(long = "write-buffer-size", value_name = "SIZE", default_value = "32M")]
    write_buffer_size: String,

    /// Drop the first line of every input file
    #[arg(long = "skip-header")]
    skip_header: bool,

    /// Number of worker threads (default: available CPUs)
    #[arg(short = 'j', long = "parallel", value_name = "N")]
    parallel: Option<usize>,

    /// Keep input order among lines with equal prefixes
    #[arg(long = "stable", conflicts_with = "full_line")]
    stable: bool,

    /// Break prefix ties by comparing whole lines
    #[arg(long = "full-line")]
    full_line: bool,

    /// Report stage timings on standard error
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Files to sort
    files: Vec<String>,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "warn,fpsort=info" } else { "warn" })
    });

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    reset_sigpipe();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut inputs = cli.sources;
    inputs.extend(cli.files);
    if inputs.is_empty() {
        eprintln!("fpsort: no input files");
        eprintln!("Try 'fpsort --help' for more information.");
        process::exit(2);
    }

    let write_buffer_size = parse_buffer_size(&cli.write_buffer_size).unwrap_or_else(|e| {
        eprintln!("fpsort: {}", e);
        process::exit(2);
    });

    let tie_break = if cli.stable {
        TieBreak::InputOrder
    } else if cli.full_line {
        TieBreak::FullLine
    } else {
        TieBreak::Unspecified
    };

    let config = SortConfig {
        prefix_length: cli.prefix_length,
        write_buffer_size,
        skip_header: cli.skip_header,
        concurrency: cli.parallel,
        tie_break,
        output_file: Some(cli.dest),
    };

    if let Err(e) = sort_and_output(&inputs, &config) {
        tracing::debug!(error = ?e, "run failed");
        eprintln!("fpsort: {}", e);
        process::exit(2);
    }
}
