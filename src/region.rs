//! Per-position read-support statistics.

use std::fmt;

/// Allele strings and read counts for one genomic position.
///
/// Read counts are `None` when the statistics file held text that was not a
/// decimal integer. Such an entry is kept in the index but never passes a
/// predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionStats {
    /// Reference allele.
    pub ref_allele: String,
    /// Alternate allele.
    pub alt_allele: String,
    /// Reads supporting the reference allele.
    pub ref_reads: Option<u64>,
    /// Reads supporting the alternate allele.
    pub alt_reads: Option<u64>,
}

impl RegionStats {
    /// Create statistics from already-parsed counts.
    pub fn new(ref_allele: &str, alt_allele: &str, ref_reads: u64, alt_reads: u64) -> Self {
        Self {
            ref_allele: ref_allele.to_string(),
            alt_allele: alt_allele.to_string(),
            ref_reads: Some(ref_reads),
            alt_reads: Some(alt_reads),
        }
    }

    /// Build statistics from the four raw text columns of an interval line.
    pub fn from_fields(ref_allele: &str, alt_allele: &str, ref_reads: &str, alt_reads: &str) -> Self {
        Self {
            ref_allele: ref_allele.to_string(),
            alt_allele: alt_allele.to_string(),
            ref_reads: ref_reads.trim().parse().ok(),
            alt_reads: alt_reads.trim().parse().ok(),
        }
    }

    /// Both read counts, if both parsed.
    pub fn read_counts(&self) -> Option<(u64, u64)> {
        Some((self.ref_reads?, self.alt_reads?))
    }

    /// Ratio of alternate to reference reads.
    ///
    /// `None` when a count is missing or there are no reference reads.
    pub fn alt_proportion(&self) -> Option<f64> {
        let (ref_reads, alt_reads) = self.read_counts()?;
        if ref_reads == 0 {
            return None;
        }
        Some(alt_reads as f64 / ref_reads as f64)
    }
}

impl fmt::Display for RegionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = |c: Option<u64>| c.map(|n| n.to_string()).unwrap_or_else(|| ".".to_string());
        write!(
            f,
            "{}>{} ({}/{})",
            self.ref_allele,
            self.alt_allele,
            count(self.ref_reads),
            count(self.alt_reads)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fields_parses_counts() {
        let stats = RegionStats::from_fields("A", "T", "20", "1");
        assert_eq!(stats, RegionStats::new("A", "T", 20, 1));
        assert_eq!(stats.read_counts(), Some((20, 1)));
    }

    #[test]
    fn test_unparsable_count_is_missing() {
        let stats = RegionStats::from_fields("A", "T", "twenty", "1");
        assert_eq!(stats.ref_reads, None);
        assert_eq!(stats.alt_reads, Some(1));
        assert_eq!(stats.read_counts(), None);
        assert_eq!(stats.alt_proportion(), None);
    }

    #[test]
    fn test_alt_proportion() {
        assert_eq!(RegionStats::new("A", "T", 20, 1).alt_proportion(), Some(0.05));
        assert_eq!(RegionStats::new("A", "T", 0, 4).alt_proportion(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(RegionStats::new("A", "T", 20, 1).to_string(), "A>T (20/1)");
        assert_eq!(
            RegionStats::from_fields("G", "C", "x", "3").to_string(),
            "G>C (./3)"
        );
    }
}
