//! Line-by-line VCF filter.
//!
//! Header lines (starting with `#`) are copied through unchanged. Data lines
//! are looked up in the `PositionIndex` by their CHROM and POS columns and
//! written only if the predicate passes. Lines are handled as raw bytes so the
//! output is a byte-exact subset of the input.

use std::io::{BufRead, Write};
use std::str;

use log::{debug, info};

use crate::error::{CoverageFilterError, Result};
use crate::index::PositionIndex;
use crate::predicate::Evaluator;

/// Counts gathered during one filtering pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterSummary {
    /// Header lines copied to the output.
    pub header_lines: usize,
    /// Data lines read.
    pub records: usize,
    /// Data lines written to the output.
    pub passed: usize,
    /// Data lines with no statistics entry.
    pub missing: usize,
    /// Data lines whose statistics failed the thresholds.
    pub rejected: usize,
    /// Data lines without a usable CHROM/POS.
    pub malformed: usize,
}

/// Kind of an input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Header,
    Data,
}

impl LineKind {
    pub fn of(line: &[u8]) -> Self {
        if line.first() == Some(&b'#') {
            LineKind::Header
        } else {
            LineKind::Data
        }
    }
}

/// Strip a trailing `\n` or `\r\n`.
fn trim_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Extract CHROM and POS from a data line.
///
/// Only the first two columns are decoded.
pub fn parse_locus(line: &[u8]) -> std::result::Result<(&str, u64), String> {
    let mut fields = trim_terminator(line).splitn(3, |b| *b == b'\t');

    let chrom = fields.next().unwrap_or_default();
    let pos = fields
        .next()
        .ok_or_else(|| "Expected at least 2 columns, got 1".to_string())?;

    let chrom = str::from_utf8(chrom).map_err(|e| format!("Invalid CHROM: {}", e))?;
    let pos = str::from_utf8(pos).map_err(|e| format!("Invalid POS: {}", e))?;
    let pos = pos
        .parse::<u64>()
        .map_err(|e| format!("Invalid POS '{}': {}", pos, e))?;

    Ok((chrom, pos))
}

/// Filter a VCF stream against an index.
///
/// # Arguments
///
/// * `index` - Statistics for every position that may pass
/// * `evaluator` - The predicate for the active mode
/// * `input` - The VCF to filter, read once from start to end
/// * `output` - Receives header lines and passing data lines, in input order
/// * `strict` - Fail on a data line without a numeric POS instead of dropping it
///
/// # Returns
///
/// Counts for the pass. Lines already written stay written if an error stops
/// the pass part way.
pub fn filter_records<R: BufRead, W: Write>(
    index: &PositionIndex,
    evaluator: &Evaluator,
    mut input: R,
    mut output: W,
    strict: bool,
) -> Result<FilterSummary> {
    evaluator.check_supported()?;

    let mut summary = FilterSummary::default();
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;

        if LineKind::of(&buf) == LineKind::Header {
            output.write_all(&buf)?;
            summary.header_lines += 1;
            continue;
        }

        summary.records += 1;
        let lookup = match parse_locus(&buf) {
            Ok((chrom, pos)) => index.get(chrom, pos),
            Err(reason) if strict => {
                return Err(CoverageFilterError::MalformedRecord {
                    line: line_no,
                    reason,
                });
            }
            Err(reason) => {
                debug!("Dropping line {}: {}", line_no, reason);
                summary.malformed += 1;
                continue;
            }
        };

        if evaluator.evaluate(lookup)? {
            output.write_all(&buf)?;
            summary.passed += 1;
        } else if lookup.is_none() {
            summary.missing += 1;
        } else {
            summary.rejected += 1;
        }
    }

    output.flush()?;

    info!(
        "Kept {} of {} records ({} without statistics, {} below thresholds, {} malformed)",
        summary.passed, summary.records, summary.missing, summary.rejected, summary.malformed
    );

    Ok(summary)
}
