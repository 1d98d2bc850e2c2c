//! Command-line driver for the coverage filter.

use std::fs;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::{Parser, Subcommand};
use coverage_filter::{FilterMode, FilterParams, Result, ThresholdConfig, run};
use log::{LevelFilter, error, info, warn};

/// Filter VCF records by read coverage in a paired or normal sample
#[derive(Parser, Debug)]
#[command(name = "coverage-filter", version, about)]
struct Cli {
    /// Input VCF
    #[arg(long, short = 'v')]
    vcf: PathBuf,

    /// Region statistics file (chrom, pos, ref, alt, ref reads, alt reads)
    #[arg(long, short = 'i')]
    interval: PathBuf,

    /// Output VCF
    #[arg(long, short = 'o')]
    outfile: PathBuf,

    /// Threshold config file (key = value); explicit flags take precedence
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Fail on malformed lines instead of skipping them
    #[arg(long)]
    strict: bool,

    /// Increase log verbosity (once for debug, twice for trace)
    #[arg(long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Filter on coverage in unfiltered calls from the same tumor (B)
    Covb {
        /// Reference reads in B must exceed this (0 disables) [default: 15]
        #[arg(long)]
        min_cov_b: Option<u64>,

        /// Alternate reads in B must stay below this (0 disables) [default: 0]
        #[arg(long)]
        max_alt_b: Option<u64>,

        /// Alternate/reference proportion in B must stay below this (0 disables) [default: 0.0]
        #[arg(long)]
        max_prop_b: Option<f64>,
    },
    /// Filter on coverage in the normal tissue sample
    Nab {
        /// Maximum coverage in the normal sample [default: 5]
        #[arg(long)]
        max_cov_n: Option<u64>,

        /// Maximum alternate reads in the normal sample [default: 15]
        #[arg(long)]
        max_alt_n: Option<u64>,

        /// Maximum alternate proportion in the normal sample [default: 0.3]
        #[arg(long)]
        max_prop_n: Option<f64>,
    },
}

/// Defaults, then the config file, then explicit flags.
fn build_params(cli: &Cli) -> Result<FilterParams> {
    let mut params = FilterParams {
        strict: cli.strict,
        ..FilterParams::default()
    };

    if let Some(path) = &cli.config {
        info!("Reading config file: {}", path.display());
        ThresholdConfig::parse(&fs::read_to_string(path)?)?.apply(&mut params)?;
    }

    match cli.mode {
        Mode::Covb {
            min_cov_b,
            max_alt_b,
            max_prop_b,
        } => {
            params.mode = FilterMode::CoverageInTumorPair;
            params.min_reference_reads_b = min_cov_b.unwrap_or(params.min_reference_reads_b);
            params.max_alternate_reads_b = max_alt_b.unwrap_or(params.max_alternate_reads_b);
            params.max_alternate_proportion_b = max_prop_b.unwrap_or(params.max_alternate_proportion_b);
        }
        Mode::Nab {
            max_cov_n,
            max_alt_n,
            max_prop_n,
        } => {
            params.mode = FilterMode::CoverageInNormal;
            params.normal.max_coverage = max_cov_n.unwrap_or(params.normal.max_coverage);
            params.normal.max_alternate_reads = max_alt_n.unwrap_or(params.normal.max_alternate_reads);
            params.normal.max_alternate_proportion =
                max_prop_n.unwrap_or(params.normal.max_alternate_proportion);
        }
    }

    Ok(params)
}

fn main() {
    let cli = Cli::parse();

    let filter_level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::builder()
        .filter_level(filter_level)
        .parse_default_env()
        .format_timestamp_millis()
        .init();

    let start = Instant::now();

    let result = build_params(&cli).and_then(|params| {
        info!("Mode: {}", params.mode);
        run(&params, &cli.interval, &cli.vcf, &cli.outfile)
    });

    match result {
        Ok(summary) => {
            info!(
                "Wrote {} of {} records to {}",
                summary.passed,
                summary.records,
                cli.outfile.display()
            );
            if summary.malformed > 0 {
                warn!("{} malformed records were dropped", summary.malformed);
            }
            info!("Finished. Runtime: {:.2?}", start.elapsed());
        }
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}
