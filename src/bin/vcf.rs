//! CLI tool to format and search vCard files.
//!
//! Usage:
//!   vcf [-f FORMAT] [-i INPUT] [-s FIELD[!],...] [TERMS...]
//!
//! Reads vCards from stdin (or `-i`) and writes one line per rendered
//! combination of properties to stdout (or `-o`).

use clap::{ArgAction, Parser};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;
use vcf_rs::{Config, DEFAULT_FORMAT, execute};

/// Format vCard contacts, one line per combination of property instances.
///
/// Format directives: %n (FN), %e (EMAIL), %p (TEL), %% (literal %).
/// Use %+X to quote the value for CSV output.
#[derive(Parser)]
#[command(name = "vcf", version)]
struct Cli {
    /// Search terms; every term must match some searchable field
    terms: Vec<String>,

    /// Output format (supports \n, \t, \0 and \\ escapes)
    #[arg(short, long, env = "VCF_FORMAT", default_value = DEFAULT_FORMAT)]
    format: String,

    /// Input file (- for stdin)
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Include cards even when a directive has no matching property
    #[arg(short, long)]
    all: bool,

    /// Define formatting directives (KEY=FIELD, comma-separated)
    #[arg(short = 'd', long = "directive", value_name = "KEY=FIELD")]
    directives: Vec<String>,

    /// Add fields to search (comma-separated; FIELD! renders only matching instances)
    #[arg(short = 's', long = "search", value_name = "FIELD[!]")]
    search_fields: Vec<String>,

    /// Separator for the values of a multi-valued property
    #[arg(short, long, default_value = ",")]
    join: String,

    /// Log more to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut builder = Config::builder()
        .format(cli.format.as_str())
        .terms(cli.terms.iter().cloned())
        .include_empty(cli.all)
        .separator(cli.join.as_str());
    for definitions in &cli.directives {
        builder = builder.directive(definitions.as_str());
    }
    for fields in &cli.search_fields {
        builder = builder.search_fields(fields.as_str());
    }

    let config = match builder.build() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("vcf: {e}");
            process::exit(1);
        }
    };
    tracing::debug!(directives = %config.directives, "configuration loaded");

    let input: Box<dyn BufRead> = if cli.input == "-" {
        Box::new(io::stdin().lock())
    } else {
        match File::open(&cli.input) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                eprintln!("vcf: could not open input file '{}': {e}", cli.input);
                process::exit(1);
            }
        }
    };

    let mut output: Box<dyn Write> = match &cli.output {
        Some(out_path) => {
            if let Some(parent) = Path::new(out_path.as_str()).parent()
                && !parent.as_os_str().is_empty()
                && fs::create_dir_all(parent).is_err()
            {
                eprintln!("vcf: could not create output directory for '{out_path}'");
                process::exit(1);
            }
            match File::create(out_path) {
                Ok(file) => Box::new(BufWriter::new(file)),
                Err(e) => {
                    eprintln!("vcf: could not open output file '{out_path}': {e}");
                    process::exit(1);
                }
            }
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    // Cards rendered before a failure are still written out.
    let result = execute(input, &mut output, &config);
    let flushed = output.flush();
    if let Err(e) = result.and_then(|_| Ok(flushed?)) {
        eprintln!("vcf: {e}");
        process::exit(1);
    }
}
