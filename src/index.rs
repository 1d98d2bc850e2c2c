//! Position index over the region statistics file.
//!
//! The statistics file is tab-delimited with no header:
//! `chrom, pos, ref, alt, ref_reads, alt_reads`. Each line becomes one
//! `RegionStats` stored under its chromosome and 1-based position.

use std::collections::HashMap;
use std::io::BufRead;
use std::str;

use log::{debug, info, warn};

use crate::error::{CoverageFilterError, Result};
use crate::region::RegionStats;

/// Minimum number of columns on a statistics line.
const INTERVAL_COLUMNS: usize = 6;

/// Positions on one chromosome.
pub type PositionMap = HashMap<u64, RegionStats>;

/// Two-level index: chromosome name to position to statistics.
///
/// Chromosome names match exactly and case-sensitively. A later line for the
/// same chromosome and position replaces the earlier one.
#[derive(Debug, Clone, Default)]
pub struct PositionIndex {
    regions: HashMap<String, PositionMap>,
    skipped: usize,
}

/// Parse a single statistics line into its key and value.
fn parse_interval_line(line: &str) -> std::result::Result<(&str, u64, RegionStats), String> {
    let fields: Vec<&str> = line.split('\t').collect();

    if fields.len() < INTERVAL_COLUMNS {
        return Err(format!(
            "Expected at least {} columns, got {}",
            INTERVAL_COLUMNS,
            fields.len()
        ));
    }

    let pos = fields[1]
        .parse::<u64>()
        .map_err(|e| format!("Invalid position '{}': {}", fields[1], e))?;

    let stats = RegionStats::from_fields(fields[2], fields[3], fields[4], fields[5]);

    Ok((fields[0], pos, stats))
}

impl PositionIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a statistics stream, consuming it to the end.
    ///
    /// # Arguments
    ///
    /// * `reader` - The tab-delimited statistics file
    /// * `strict` - Fail on the first malformed line instead of skipping it
    ///
    /// # Returns
    ///
    /// The populated `PositionIndex`. In permissive mode lines that are not
    /// UTF-8, have a non-numeric position or too few columns are skipped and
    /// counted in `skipped_lines()`. In strict mode they, and lines whose read counts
    /// do not parse, are reported as `MalformedInterval`.
    pub fn from_reader<R: BufRead>(mut reader: R, strict: bool) -> Result<Self> {
        let mut index = Self::new();
        let mut buf = Vec::new();
        let mut line_no = 0;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;

            let parsed = str::from_utf8(&buf)
                .map_err(|e| format!("Invalid UTF-8: {}", e))
                .and_then(|line| {
                    let line = line.strip_suffix('\n').unwrap_or(line);
                    let line = line.strip_suffix('\r').unwrap_or(line);
                    if line.trim().is_empty() {
                        Ok(None)
                    } else {
                        parse_interval_line(line).map(Some)
                    }
                });

            match parsed {
                Ok(None) => {}
                Ok(Some((chrom, pos, stats))) => {
                    if strict && stats.read_counts().is_none() {
                        return Err(CoverageFilterError::MalformedInterval {
                            line: line_no,
                            reason: "Read counts must be non-negative integers".to_string(),
                        });
                    }
                    index.insert(chrom, pos, stats);
                }
                Err(reason) if strict => {
                    return Err(CoverageFilterError::MalformedInterval {
                        line: line_no,
                        reason,
                    });
                }
                Err(reason) => {
                    debug!("Skipping interval line {}: {}", line_no, reason);
                    index.skipped += 1;
                }
            }
        }

        info!(
            "Loaded {} positions on {} chromosomes",
            index.len(),
            index.chromosome_count()
        );
        if index.skipped > 0 {
            warn!("Skipped {} malformed interval lines", index.skipped);
        }

        Ok(index)
    }

    /// Store statistics for a position, replacing any earlier entry.
    pub fn insert(&mut self, chrom: &str, pos: u64, stats: RegionStats) -> Option<RegionStats> {
        self.regions
            .entry(chrom.to_string())
            .or_default()
            .insert(pos, stats)
    }

    /// Look up the statistics for a chromosome and position.
    pub fn get(&self, chrom: &str, pos: u64) -> Option<&RegionStats> {
        self.regions.get(chrom)?.get(&pos)
    }

    /// All positions indexed for one chromosome.
    pub fn chromosome(&self, chrom: &str) -> Option<&PositionMap> {
        self.regions.get(chrom)
    }

    /// Total number of indexed positions.
    pub fn len(&self) -> usize {
        self.regions.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn chromosome_count(&self) -> usize {
        self.regions.len()
    }

    /// Number of lines skipped as malformed while loading.
    pub fn skipped_lines(&self) -> usize {
        self.skipped
    }
}

impl Extend<(String, u64, RegionStats)> for PositionIndex {
    fn extend<T: IntoIterator<Item = (String, u64, RegionStats)>>(&mut self, iter: T) {
        for (chrom, pos, stats) in iter {
            self.insert(&chrom, pos, stats);
        }
    }
}

impl FromIterator<(String, u64, RegionStats)> for PositionIndex {
    fn from_iter<T: IntoIterator<Item = (String, u64, RegionStats)>>(iter: T) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}
