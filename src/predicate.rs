//! Pass/fail predicate for a record's region statistics.
//!
//! A record with no statistics entry is always rejected. Otherwise the
//! predicate of the active `FilterMode` decides.

use std::fmt;

use crate::error::{CoverageFilterError, Result};
use crate::region::RegionStats;
use crate::thresholds::{FilterMode, NormalThresholds, ThresholdSet};

/// Decision rule for the normal-tissue mode.
///
/// No built-in rule exists; callers that want `nab` filtering provide one.
pub trait NormalPredicate {
    /// Returns true if the record passes given the normal sample statistics.
    fn passes(&self, thresholds: &NormalThresholds, stats: &RegionStats) -> bool;
}

impl<F> NormalPredicate for F
where
    F: Fn(&NormalThresholds, &RegionStats) -> bool,
{
    fn passes(&self, thresholds: &NormalThresholds, stats: &RegionStats) -> bool {
        self(thresholds, stats)
    }
}

/// Evaluate the tumor-pair ("covB") checks against one entry.
///
/// Each check passes when its cutoff is zero. Bounds are exclusive:
/// reference reads must be strictly greater than the minimum, alternate reads
/// and the alternate/reference proportion strictly less than their maximums.
/// With no reference reads the proportion check fails. Entries whose counts
/// did not parse never pass.
pub fn passes_coverage_b(thresholds: &ThresholdSet, stats: &RegionStats) -> bool {
    let Some((ref_reads, alt_reads)) = stats.read_counts() else {
        return false;
    };

    let min_ref = thresholds.min_reference_reads_b;
    let max_alt = thresholds.max_alternate_reads_b;
    let max_prop = thresholds.max_alternate_proportion_b;

    let ref_ok = min_ref == 0 || ref_reads > min_ref;
    let alt_ok = max_alt == 0 || alt_reads < max_alt;
    let prop_ok = max_prop == 0.0
        || stats
            .alt_proportion()
            .is_some_and(|proportion| proportion < max_prop);

    ref_ok && alt_ok && prop_ok
}

/// Evaluate thresholds against a lookup result.
///
/// # Arguments
///
/// * `thresholds` - The active mode and cutoffs
/// * `lookup` - The index entry for the record, if any
///
/// # Returns
///
/// `true` if the record passes. `UnsupportedMode` in normal-tissue mode,
/// which has no built-in predicate.
pub fn evaluate(thresholds: &ThresholdSet, lookup: Option<&RegionStats>) -> Result<bool> {
    Evaluator::new(*thresholds).evaluate(lookup)
}

/// A threshold set paired with an optional normal-tissue rule.
pub struct Evaluator {
    thresholds: ThresholdSet,
    normal: Option<Box<dyn NormalPredicate>>,
}

impl Evaluator {
    pub fn new(thresholds: ThresholdSet) -> Self {
        Self {
            thresholds,
            normal: None,
        }
    }

    /// Supply the rule used in `CoverageInNormal` mode.
    pub fn with_normal_predicate(mut self, predicate: Box<dyn NormalPredicate>) -> Self {
        self.normal = Some(predicate);
        self
    }

    pub fn thresholds(&self) -> &ThresholdSet {
        &self.thresholds
    }

    /// Fails if the active mode has no predicate to run.
    pub fn check_supported(&self) -> Result<()> {
        match (self.thresholds.mode, &self.normal) {
            (FilterMode::CoverageInNormal, None) => Err(CoverageFilterError::UnsupportedMode(
                format!("{} has no predicate; supply a NormalPredicate", self.thresholds.mode),
            )),
            _ => Ok(()),
        }
    }

    /// Decide pass/fail for a lookup result.
    pub fn evaluate(&self, lookup: Option<&RegionStats>) -> Result<bool> {
        self.check_supported()?;

        let Some(stats) = lookup else {
            return Ok(false);
        };

        match (self.thresholds.mode, &self.normal) {
            (FilterMode::CoverageInNormal, Some(predicate)) => {
                Ok(predicate.passes(&self.thresholds.normal, stats))
            }
            _ => Ok(passes_coverage_b(&self.thresholds, stats)),
        }
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("thresholds", &self.thresholds)
            .field("normal", &self.normal.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(ref_reads: u64, alt_reads: u64) -> RegionStats {
        RegionStats::new("A", "T", ref_reads, alt_reads)
    }

    fn covb(min_ref: u64, max_alt: u64, max_prop: f64, s: &RegionStats) -> bool {
        evaluate(&ThresholdSet::coverage_b(min_ref, max_alt, max_prop), Some(s)).unwrap()
    }

    #[test]
    fn test_all_checks_pass() {
        // 20 > 10, 1 < 5, 1/20 = 0.05 < 0.1
        assert!(covb(10, 5, 0.1, &stats(20, 1)));
    }

    #[test]
    fn test_alt_reads_boundary_is_exclusive() {
        assert!(!covb(10, 1, 0.1, &stats(20, 1)));
        assert!(covb(10, 2, 0.1, &stats(20, 1)));
    }

    #[test]
    fn test_ref_reads_boundary_is_exclusive() {
        assert!(!covb(10, 0, 0.0, &stats(10, 0)));
        assert!(covb(10, 0, 0.0, &stats(11, 0)));
    }

    #[test]
    fn test_proportion_boundary_is_exclusive() {
        // 2/20 = 0.1 is not below 0.1
        assert!(!covb(0, 0, 0.1, &stats(20, 2)));
        assert!(covb(0, 0, 0.11, &stats(20, 2)));
    }

    #[test]
    fn test_zero_disables_every_check() {
        for s in [stats(0, 0), stats(0, 500), stats(3, 1000), stats(1000, 0)] {
            assert!(covb(0, 0, 0.0, &s), "{} should pass", s);
        }
    }

    #[test]
    fn test_zero_reference_reads_fails_proportion() {
        assert!(!covb(0, 0, 0.5, &stats(0, 0)));
        assert!(!covb(0, 0, 100.0, &stats(0, 1)));
    }

    #[test]
    fn test_missing_entry_rejects() {
        let thresholds = ThresholdSet::disabled();
        assert!(!evaluate(&thresholds, None).unwrap());
    }

    #[test]
    fn test_unparsed_counts_reject() {
        let s = RegionStats::from_fields("A", "T", "n/a", "0");
        assert!(!covb(0, 0, 0.0, &s));
    }

    #[test]
    fn test_normal_mode_without_predicate_errors() {
        let thresholds = ThresholdSet {
            mode: FilterMode::CoverageInNormal,
            ..ThresholdSet::disabled()
        };
        assert!(matches!(
            evaluate(&thresholds, Some(&stats(20, 1))),
            Err(CoverageFilterError::UnsupportedMode(_))
        ));
    }

    #[test]
    fn test_normal_mode_with_supplied_predicate() {
        let thresholds = ThresholdSet {
            mode: FilterMode::CoverageInNormal,
            ..ThresholdSet::disabled()
        };
        let evaluator = Evaluator::new(thresholds).with_normal_predicate(Box::new(
            |t: &NormalThresholds, s: &RegionStats| s.alt_reads.is_some_and(|alt| alt < t.max_alternate_reads),
        ));

        assert!(evaluator.evaluate(Some(&stats(3, 2))).unwrap());
        assert!(!evaluator.evaluate(Some(&stats(3, 40))).unwrap());
        assert!(!evaluator.evaluate(None).unwrap());
    }

    #[test]
    fn test_normal_predicate_ignored_in_covb_mode() {
        let evaluator = Evaluator::new(ThresholdSet::coverage_b(10, 0, 0.0))
            .with_normal_predicate(Box::new(|_: &NormalThresholds, _: &RegionStats| false));

        assert!(evaluator.evaluate(Some(&stats(11, 0))).unwrap());
    }
}
