//! # Coverage Filter Library
//!
//! Filters VCF records against per-position read-coverage statistics from a
//! companion sample, keeping only candidate tumor variants that are not well
//! supported in the paired data.
//!
//! ## Features
//!
//! - Load a tab-delimited statistics file into a chromosome/position index
//! - Reference-read, alternate-read and alternate-proportion cutoffs, each
//!   disabled by a value of zero
//! - Stream filtering that copies header lines and passing records byte for byte
//! - `key = value` threshold config files
//!
//! ## Example
//!
//! ```rust
//! use coverage_filter::{CoverageFilter, PositionIndex, ThresholdSet};
//!
//! // chrom, pos, ref, alt, ref_reads, alt_reads
//! let stats = "chr1\t100\tA\tT\t20\t1\n";
//! let index = PositionIndex::from_reader(stats.as_bytes(), false).unwrap();
//!
//! // ref reads > 10, alt reads < 5, alt/ref < 0.1
//! let engine = CoverageFilter::new(index, ThresholdSet::coverage_b(10, 5, 0.1)).unwrap();
//!
//! assert!(engine.passes("chr1\t100\t.\tA\tT\t50\tPASS\t.").unwrap());
//! assert!(!engine.passes("chr1\t101\t.\tA\tT\t50\tPASS\t.").unwrap());
//!
//! let vcf = "#CHROM\tPOS\nchr1\t100\t.\nchr2\t5\t.\n";
//! let mut out = Vec::new();
//! engine.filter(vcf.as_bytes(), &mut out).unwrap();
//! assert_eq!(out, b"#CHROM\tPOS\nchr1\t100\t.\n");
//! ```
//!
//! ## Threshold semantics (covB mode)
//!
//! A record passes when its position has a statistics entry and:
//! - `min_reference_reads_b == 0` or reference reads `>` the minimum
//! - `max_alternate_reads_b == 0` or alternate reads `<` the maximum
//! - `max_alternate_proportion_b == 0.0` or alternate/reference `<` the maximum;
//!   this check fails when there are no reference reads

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::info;

/// Embedded README.md documentation
const README: &str = include_str!("../README.md");

/// Returns the embedded README.md documentation.
pub fn docs() -> &'static str {
    README
}

pub mod config;
pub mod error;
pub mod index;
pub mod predicate;
pub mod region;
pub mod stream;
pub mod thresholds;

pub use config::{ConfigEntry, ConfigValue, ThresholdConfig};
pub use error::{CoverageFilterError, Result};
pub use index::PositionIndex;
pub use predicate::{Evaluator, NormalPredicate};
pub use region::RegionStats;
pub use stream::FilterSummary;
pub use thresholds::{FilterMode, FilterParams, NormalThresholds, ThresholdSet};

use crate::stream::{filter_records, parse_locus};

/// The main engine: an index, a predicate and the parsing mode.
#[derive(Debug)]
pub struct CoverageFilter {
    index: PositionIndex,
    evaluator: Evaluator,
    strict: bool,
}

impl CoverageFilter {
    /// Create an engine from a built index and thresholds.
    ///
    /// Fails with `UnsupportedMode` for `CoverageInNormal`, which needs a
    /// caller-supplied predicate (see `with_normal_predicate`).
    ///
    /// # Example
    ///
    /// ```rust
    /// use coverage_filter::{CoverageFilter, PositionIndex, ThresholdSet};
    ///
    /// let engine = CoverageFilter::new(PositionIndex::new(), ThresholdSet::disabled()).unwrap();
    /// assert!(engine.index().is_empty());
    /// ```
    pub fn new(index: PositionIndex, thresholds: ThresholdSet) -> Result<Self> {
        let evaluator = Evaluator::new(thresholds);
        evaluator.check_supported()?;
        Ok(Self {
            index,
            evaluator,
            strict: false,
        })
    }

    /// Create an engine whose normal-tissue mode runs `predicate`.
    pub fn with_normal_predicate(
        index: PositionIndex,
        thresholds: ThresholdSet,
        predicate: Box<dyn NormalPredicate>,
    ) -> Self {
        Self {
            index,
            evaluator: Evaluator::new(thresholds).with_normal_predicate(predicate),
            strict: false,
        }
    }

    /// Load the index from a statistics stream and build the engine.
    ///
    /// The mode is checked before the stream is read.
    pub fn from_interval_reader<R: std::io::BufRead>(reader: R, params: &FilterParams) -> Result<Self> {
        let evaluator = supported_evaluator(params)?;
        let index = PositionIndex::from_reader(reader, params.strict)?;
        Ok(Self {
            index,
            evaluator,
            strict: params.strict,
        })
    }

    /// Report malformed data lines as errors instead of dropping them.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Decide whether a single VCF data line passes.
    ///
    /// A line without a numeric POS does not pass, or is a `MalformedLine`
    /// error in strict mode.
    pub fn passes(&self, line: &str) -> Result<bool> {
        match parse_locus(line.as_bytes()) {
            Ok((chrom, pos)) => self.evaluator.evaluate(self.index.get(chrom, pos)),
            Err(reason) if self.strict => Err(CoverageFilterError::MalformedLine(reason)),
            Err(_) => Ok(false),
        }
    }

    /// Filter a whole VCF stream into `output`.
    pub fn filter<R: std::io::BufRead, W: std::io::Write>(&self, input: R, output: W) -> Result<FilterSummary> {
        filter_records(&self.index, &self.evaluator, input, output, self.strict)
    }

    pub fn index(&self) -> &PositionIndex {
        &self.index
    }

    pub fn thresholds(&self) -> &ThresholdSet {
        self.evaluator.thresholds()
    }
}

/// Validate the thresholds and make sure the mode has a predicate.
fn supported_evaluator(params: &FilterParams) -> Result<Evaluator> {
    let evaluator = Evaluator::new(ThresholdSet::from_params(params)?);
    evaluator.check_supported()?;
    Ok(evaluator)
}

/// Filter a VCF file against a statistics file and write the survivors.
///
/// The statistics file is read completely before the VCF is opened. Every
/// file handle is closed when this returns, on success or error.
///
/// # Arguments
///
/// * `params` - Mode, cutoffs and parsing mode
/// * `interval_path` - Tab-delimited statistics file
/// * `vcf_path` - VCF to filter
/// * `out_path` - Output VCF, created or truncated
pub fn run(
    params: &FilterParams,
    interval_path: &Path,
    vcf_path: &Path,
    out_path: &Path,
) -> Result<FilterSummary> {
    let evaluator = supported_evaluator(params)?;

    info!("Reading interval file: {}", interval_path.display());
    let index = {
        let intervals = BufReader::new(File::open(interval_path)?);
        PositionIndex::from_reader(intervals, params.strict)?
    };
    let engine = CoverageFilter {
        index,
        evaluator,
        strict: params.strict,
    };

    info!("Filtering vcf: {} ({})", vcf_path.display(), engine.thresholds());
    let input = BufReader::new(File::open(vcf_path)?);
    let output = BufWriter::new(File::create(out_path)?);
    engine.filter(input, output)
}
