//! Threshold config file parser using chumsky.
//!
//! Config files hold one `key = value` entry per line:
//!
//! ```text
//! # paired sample cutoffs
//! min_covB = 10
//! max_altB = 5
//! max_prop_altB = 0.1   # alt/ref
//! ```
//!
//! Lines starting with `#` are comments. Reading stops at the first line
//! containing `#SBATCH` or `#PBS`, so a batch script may follow the entries.

use chumsky::prelude::*;
use log::debug;

use crate::error::{CoverageFilterError, Result};
use crate::thresholds::FilterParams;

/// Markers that end the config section of a file.
const BATCH_MARKERS: [&str; 2] = ["#SBATCH", "#PBS"];

/// A config value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ConfigValue {
    fn as_count(&self, key: &str) -> Result<u64> {
        match self {
            ConfigValue::Integer(n) if *n >= 0 => Ok(*n as u64),
            _ => Err(CoverageFilterError::InvalidConfigValue {
                key: key.to_string(),
                value: self.to_string(),
            }),
        }
    }

    fn as_fraction(&self, key: &str) -> Result<f64> {
        match self {
            ConfigValue::Integer(n) if *n >= 0 => Ok(*n as f64),
            ConfigValue::Float(n) if *n >= 0.0 => Ok(*n),
            _ => Err(CoverageFilterError::InvalidConfigValue {
                key: key.to_string(),
                value: self.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigValue::Integer(n) => write!(f, "{}", n),
            ConfigValue::Float(n) => write!(f, "{}", n),
            ConfigValue::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// One `key = value` line.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigEntry {
    pub key: String,
    pub value: ConfigValue,
}

/// Create the parser for a single config entry.
pub fn entry_parser() -> impl Parser<char, ConfigEntry, Error = Simple<char>> {
    // Trailing comment
    let comment = just('#').then(any().repeated()).ignored();

    let digits = filter(|c: &char| c.is_ascii_digit()).repeated().at_least(1);

    // Exponent: e5, E-2
    let exponent = one_of("eE")
        .chain::<char, _, _>(one_of("+-").or_not())
        .chain::<char, _, _>(digits.clone());

    // Integer or float, optionally negative. Leading zeros, a bare fraction
    // (.05) and an exponent are accepted.
    let mantissa = choice((
        digits
            .clone()
            .chain::<char, _, _>(just('.').chain::<char, _, _>(digits.clone().or_not().flatten()).or_not().flatten()),
        just('.').chain::<char, _, _>(digits.clone()),
    ));

    let number = just('-')
        .or_not()
        .chain::<char, _, _>(mantissa)
        .chain::<char, _, _>(exponent.or_not().flatten())
        .collect::<String>()
        .try_map(|s, span| {
            if s.contains(['.', 'e', 'E']) {
                s.parse::<f64>().map(ConfigValue::Float).map_err(|e| Simple::custom(span, format!("{}", e)))
            } else {
                s.parse::<i64>().map(ConfigValue::Integer).map_err(|e| Simple::custom(span, format!("{}", e)))
            }
        })
        .padded();

    // Anything else up to a comment
    let free_text = filter(|c: &char| *c != '#')
        .repeated()
        .at_least(1)
        .collect::<String>()
        .try_map(|s, span| {
            let s = s.trim();
            if s.is_empty() {
                Err(Simple::custom(span, "missing value"))
            } else {
                Ok(ConfigValue::Text(s.to_string()))
            }
        });

    let value = number
        .then_ignore(comment.clone().or_not())
        .then_ignore(end())
        .or(free_text.then_ignore(comment.or_not()).then_ignore(end()));

    text::ident()
        .padded()
        .then_ignore(just('='))
        .then(value)
        .map(|(key, value)| ConfigEntry { key, value })
}

/// Parse a single config line.
pub fn parse_entry(line: &str) -> Result<ConfigEntry> {
    entry_parser().parse(line).map_err(|errs| {
        CoverageFilterError::ConfigParseError(
            errs.into_iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        )
    })
}

/// Parsed contents of a config file, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdConfig {
    pub entries: Vec<ConfigEntry>,
}

impl ThresholdConfig {
    /// Parse a whole config file.
    pub fn parse(content: &str) -> Result<Self> {
        let mut entries = Vec::new();

        for (i, line) in content.lines().enumerate() {
            if BATCH_MARKERS.iter().any(|m| line.contains(m)) {
                break;
            }
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let entry = parse_entry(trimmed).map_err(|e| match e {
                CoverageFilterError::ConfigParseError(msg) => {
                    CoverageFilterError::ConfigParseError(format!("line {}: {}", i + 1, msg))
                }
                other => other,
            })?;
            entries.push(entry);
        }

        Ok(Self { entries })
    }

    /// The last value given for a key.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.iter().rev().find(|e| e.key == key).map(|e| &e.value)
    }

    /// Overwrite the fields of `params` named in this config.
    ///
    /// Keys that do not name a threshold are ignored.
    pub fn apply(&self, params: &mut FilterParams) -> Result<()> {
        for ConfigEntry { key, value } in &self.entries {
            match key.as_str() {
                "min_covB" => params.min_reference_reads_b = value.as_count(key)?,
                "max_altB" => params.max_alternate_reads_b = value.as_count(key)?,
                "max_prop_altB" => params.max_alternate_proportion_b = value.as_fraction(key)?,
                "max_covN" => params.normal.max_coverage = value.as_count(key)?,
                "min_reads_altN" => params.normal.min_alternate_reads = value.as_count(key)?,
                "min_freq_altN" => params.normal.min_alternate_frequency = value.as_fraction(key)?,
                _ => debug!("Ignoring config key {}", key),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CONFIG: &str = "# Platypus pipeline settings
qual = 20
min_covA = 10
min_covB = 12
max_altB = 3
max_prop_altB = 0.05   # alt/ref

max_covN = 8
min_freq_altN = 0.2
min_reads_altN = 2
reference = /data/ref/hg38.fa
#SBATCH --time=24:00:00
max_altB = 99
";

    #[test]
    fn test_parse_integer_entry() {
        let entry = parse_entry("min_covB = 15").unwrap();
        assert_eq!(entry.key, "min_covB");
        assert_eq!(entry.value, ConfigValue::Integer(15));
    }

    #[test]
    fn test_parse_float_entry() {
        let entry = parse_entry("max_prop_altB=0.25").unwrap();
        assert_eq!(entry.value, ConfigValue::Float(0.25));
    }

    #[test]
    fn test_parse_negative_entry() {
        let entry = parse_entry("max_altB = -3").unwrap();
        assert_eq!(entry.value, ConfigValue::Integer(-3));
    }

    #[test]
    fn test_parse_leading_zeros() {
        assert_eq!(parse_entry("min_covB = 010").unwrap().value, ConfigValue::Integer(10));
        assert_eq!(parse_entry("min_covB = 00").unwrap().value, ConfigValue::Integer(0));
    }

    #[test]
    fn test_parse_bare_fraction_and_exponent() {
        assert_eq!(parse_entry("max_prop_altB = .05").unwrap().value, ConfigValue::Float(0.05));
        assert_eq!(parse_entry("max_prop_altB = 5e-2").unwrap().value, ConfigValue::Float(0.05));
        assert_eq!(parse_entry("max_prop_altB = 1.").unwrap().value, ConfigValue::Float(1.0));
        assert_eq!(parse_entry("max_prop_altB = 2.5E1").unwrap().value, ConfigValue::Float(25.0));
    }

    #[test]
    fn test_apply_accepts_go_number_forms() {
        let config =
            ThresholdConfig::parse("min_covB = 010\nmax_altB = 00\nmax_prop_altB = 5e-2\nmin_freq_altN = .05\n")
                .unwrap();
        let mut params = FilterParams::default();
        config.apply(&mut params).unwrap();

        assert_eq!(params.min_reference_reads_b, 10);
        assert_eq!(params.max_alternate_reads_b, 0);
        assert_eq!(params.max_alternate_proportion_b, 0.05);
        assert_eq!(params.normal.min_alternate_frequency, 0.05);
    }

    #[test]
    fn test_parse_text_entry() {
        let entry = parse_entry("reference = /data/ref/hg38.fa # genome").unwrap();
        assert_eq!(entry.value, ConfigValue::Text("/data/ref/hg38.fa".to_string()));
    }

    #[test]
    fn test_parse_missing_value() {
        assert!(parse_entry("min_covB =").is_err());
        assert!(parse_entry("min_covB 15").is_err());
    }

    #[test]
    fn test_parse_file_stops_at_batch_marker() {
        let config = ThresholdConfig::parse(CONFIG).unwrap();
        assert_eq!(config.entries.len(), 9);
        assert_eq!(config.get("max_altB"), Some(&ConfigValue::Integer(3)));
    }

    #[test]
    fn test_apply_overrides_params() {
        let config = ThresholdConfig::parse(CONFIG).unwrap();
        let mut params = FilterParams::default();
        config.apply(&mut params).unwrap();

        assert_eq!(params.min_reference_reads_b, 12);
        assert_eq!(params.max_alternate_reads_b, 3);
        assert_eq!(params.max_alternate_proportion_b, 0.05);
        assert_eq!(params.normal.max_coverage, 8);
        assert_eq!(params.normal.min_alternate_frequency, 0.2);
        assert_eq!(params.normal.min_alternate_reads, 2);
        // Untouched by the config
        assert_eq!(params.normal.max_alternate_reads, 15);
    }

    #[test]
    fn test_apply_accepts_integer_proportion() {
        let config = ThresholdConfig::parse("max_prop_altB = 1").unwrap();
        let mut params = FilterParams::default();
        config.apply(&mut params).unwrap();
        assert_eq!(params.max_alternate_proportion_b, 1.0);
    }

    #[test]
    fn test_apply_rejects_float_count() {
        let config = ThresholdConfig::parse("min_covB = 1.5").unwrap();
        let err = config.apply(&mut FilterParams::default()).unwrap_err();
        assert!(matches!(
            err,
            CoverageFilterError::InvalidConfigValue { ref key, .. } if key == "min_covB"
        ));
    }

    #[test]
    fn test_apply_rejects_negative_count() {
        let config = ThresholdConfig::parse("max_altB = -1").unwrap();
        assert!(config.apply(&mut FilterParams::default()).is_err());
    }

    #[test]
    fn test_parse_error_names_line() {
        let err = ThresholdConfig::parse("min_covB = 4\n= 5\n").unwrap_err();
        match err {
            CoverageFilterError::ConfigParseError(msg) => assert!(msg.starts_with("line 2:")),
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }
}
