//! Filtering modes and their numeric cutoffs.
//!
//! A cutoff of `0` (or `0.0`) disables its criterion.

use std::fmt;

use crate::error::{CoverageFilterError, Result};

/// Which companion data set the statistics file was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Unfiltered calls from the same tumor ("covB").
    #[default]
    CoverageInTumorPair,
    /// Normal tissue from the same patient ("nab").
    CoverageInNormal,
}

impl FilterMode {
    /// Short name used on the command line and in logs.
    pub fn name(&self) -> &'static str {
        match self {
            FilterMode::CoverageInTumorPair => "covb",
            FilterMode::CoverageInNormal => "nab",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cutoffs for the normal-tissue mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalThresholds {
    /// Maximum coverage in the normal sample.
    pub max_coverage: u64,
    /// Minimum alternate reads in the normal sample.
    pub min_alternate_reads: u64,
    /// Maximum alternate reads in the normal sample.
    pub max_alternate_reads: u64,
    /// Minimum alternate allele frequency in the normal sample.
    pub min_alternate_frequency: f64,
    /// Maximum alternate/reference proportion in the normal sample.
    pub max_alternate_proportion: f64,
}

impl Default for NormalThresholds {
    fn default() -> Self {
        Self {
            max_coverage: 5,
            min_alternate_reads: 0,
            max_alternate_reads: 15,
            min_alternate_frequency: 0.0,
            max_alternate_proportion: 0.3,
        }
    }
}

/// Caller-supplied filtering parameters.
///
/// `Default` carries the command-line defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParams {
    pub mode: FilterMode,
    pub min_reference_reads_b: u64,
    pub max_alternate_reads_b: u64,
    pub max_alternate_proportion_b: f64,
    pub normal: NormalThresholds,
    /// Report malformed input lines as errors instead of skipping them.
    pub strict: bool,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            mode: FilterMode::CoverageInTumorPair,
            min_reference_reads_b: 15,
            max_alternate_reads_b: 0,
            max_alternate_proportion_b: 0.0,
            normal: NormalThresholds::default(),
            strict: false,
        }
    }
}

/// The active mode and its cutoffs, fixed for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdSet {
    pub mode: FilterMode,
    /// Reference reads in the paired sample must exceed this.
    pub min_reference_reads_b: u64,
    /// Alternate reads in the paired sample must stay below this.
    pub max_alternate_reads_b: u64,
    /// Alternate/reference ratio in the paired sample must stay below this.
    pub max_alternate_proportion_b: f64,
    pub normal: NormalThresholds,
}

fn check_proportion(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoverageFilterError::InvalidThreshold(format!(
            "{} must be a non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}

impl ThresholdSet {
    /// Thresholds for the tumor-pair mode.
    pub fn coverage_b(min_reference_reads: u64, max_alternate_reads: u64, max_alternate_proportion: f64) -> Self {
        Self {
            mode: FilterMode::CoverageInTumorPair,
            min_reference_reads_b: min_reference_reads,
            max_alternate_reads_b: max_alternate_reads,
            max_alternate_proportion_b: max_alternate_proportion,
            normal: NormalThresholds::default(),
        }
    }

    /// Thresholds with every tumor-pair criterion disabled.
    pub fn disabled() -> Self {
        Self::coverage_b(0, 0, 0.0)
    }

    /// Build the threshold set from caller parameters.
    ///
    /// Fails with `InvalidThreshold` when a proportion or frequency cutoff is
    /// negative, NaN or infinite.
    pub fn from_params(params: &FilterParams) -> Result<Self> {
        check_proportion("max_alternate_proportion_b", params.max_alternate_proportion_b)?;
        check_proportion("max_alternate_proportion", params.normal.max_alternate_proportion)?;
        check_proportion("min_alternate_frequency", params.normal.min_alternate_frequency)?;

        Ok(Self {
            mode: params.mode,
            min_reference_reads_b: params.min_reference_reads_b,
            max_alternate_reads_b: params.max_alternate_reads_b,
            max_alternate_proportion_b: params.max_alternate_proportion_b,
            normal: params.normal,
        })
    }
}

impl fmt::Display for ThresholdSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            FilterMode::CoverageInTumorPair => write!(
                f,
                "covb: ref reads > {}, alt reads < {}, alt proportion < {}",
                self.min_reference_reads_b, self.max_alternate_reads_b, self.max_alternate_proportion_b
            ),
            FilterMode::CoverageInNormal => write!(
                f,
                "nab: coverage <= {}, alt reads {}..{}, alt frequency >= {}, alt proportion < {}",
                self.normal.max_coverage,
                self.normal.min_alternate_reads,
                self.normal.max_alternate_reads,
                self.normal.min_alternate_frequency,
                self.normal.max_alternate_proportion
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = FilterParams::default();
        assert_eq!(params.mode, FilterMode::CoverageInTumorPair);
        assert_eq!(params.min_reference_reads_b, 15);
        assert_eq!(params.max_alternate_reads_b, 0);
        assert_eq!(params.normal.max_alternate_proportion, 0.3);
        assert!(!params.strict);
    }

    #[test]
    fn test_from_params_copies_cutoffs() {
        let params = FilterParams {
            min_reference_reads_b: 10,
            max_alternate_reads_b: 5,
            max_alternate_proportion_b: 0.1,
            ..FilterParams::default()
        };
        let thresholds = ThresholdSet::from_params(&params).unwrap();
        assert_eq!(thresholds, ThresholdSet::coverage_b(10, 5, 0.1));
    }

    #[test]
    fn test_from_params_rejects_negative_proportion() {
        let params = FilterParams {
            max_alternate_proportion_b: -0.5,
            ..FilterParams::default()
        };
        assert!(matches!(
            ThresholdSet::from_params(&params),
            Err(CoverageFilterError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn test_from_params_rejects_nan() {
        let mut params = FilterParams::default();
        params.normal.min_alternate_frequency = f64::NAN;
        assert!(ThresholdSet::from_params(&params).is_err());
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(FilterMode::CoverageInTumorPair.to_string(), "covb");
        assert_eq!(FilterMode::CoverageInNormal.to_string(), "nab");
    }

    #[test]
    fn test_display_covb() {
        assert_eq!(
            ThresholdSet::coverage_b(10, 5, 0.1).to_string(),
            "covb: ref reads > 10, alt reads < 5, alt proportion < 0.1"
        );
    }
}
