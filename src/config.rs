//! Analysis configuration
//!
//! Model constants default to the values the explorer was calibrated with and
//! can be overridden from the environment (or a `.env` file).

use crate::error::{ExplorerError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_CONTAMINATION: f64 = 0.05;
pub const DEFAULT_SEED: u64 = 0;
pub const DEFAULT_TREES: usize = 100;
pub const DEFAULT_MAX_SAMPLES: usize = 256;
pub const DEFAULT_MIN_ROWS: usize = 2;
pub const DEFAULT_MAX_AXIS_LABELS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Expected proportion of anomalous rows.
    pub contamination: f64,
    /// Seed for every random draw the model makes.
    pub seed: u64,
    /// Number of isolation trees.
    pub n_estimators: usize,
    /// Rows drawn per tree (capped at the dataset height).
    pub max_samples: usize,
    /// Smallest row count a subset may be scored on.
    pub min_rows: usize,
    /// Distinct axis values shown before labels are thinned.
    pub max_axis_labels: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            contamination: DEFAULT_CONTAMINATION,
            seed: DEFAULT_SEED,
            n_estimators: DEFAULT_TREES,
            max_samples: DEFAULT_MAX_SAMPLES,
            min_rows: DEFAULT_MIN_ROWS,
            max_axis_labels: DEFAULT_MAX_AXIS_LABELS,
        }
    }
}

impl AnalysisConfig {
    /// Build a config from defaults overridden by environment variables.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let mut config = Self::default();
        if let Some(v) = env_override("ANOMALY_CONTAMINATION")? {
            config.contamination = v;
        }
        if let Some(v) = env_override("ANOMALY_SEED")? {
            config.seed = v;
        }
        if let Some(v) = env_override("ANOMALY_TREES")? {
            config.n_estimators = v;
        }
        if let Some(v) = env_override("ANOMALY_MAX_SAMPLES")? {
            config.max_samples = v;
        }
        if let Some(v) = env_override("ANOMALY_MIN_ROWS")? {
            config.min_rows = v;
        }
        if let Some(v) = env_override("AXIS_MAX_LABELS")? {
            config.max_axis_labels = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of this config and re-validate.
    pub fn with_overrides(mut self, contamination: Option<f64>, seed: Option<u64>) -> Result<Self> {
        if let Some(c) = contamination {
            self.contamination = c;
        }
        if let Some(s) = seed {
            self.seed = s;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(ExplorerError::InvalidConfig(format!(
                "contamination must be in (0, 0.5], got {}",
                self.contamination
            )));
        }
        if self.n_estimators == 0 {
            return Err(ExplorerError::InvalidConfig(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        if self.max_samples == 0 {
            return Err(ExplorerError::InvalidConfig(
                "max_samples must be at least 1".to_string(),
            ));
        }
        if self.min_rows < 2 {
            return Err(ExplorerError::InvalidConfig(format!(
                "min_rows must be at least 2, got {}",
                self.min_rows
            )));
        }
        if self.max_axis_labels == 0 {
            return Err(ExplorerError::InvalidConfig(
                "max_axis_labels must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_override<T: FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ExplorerError::InvalidConfig(format!("{}={} is not a valid value", key, raw))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.contamination, 0.05);
        assert_eq!(config.seed, 0);
        assert_eq!(config.max_axis_labels, 20);
    }

    #[test]
    fn test_contamination_out_of_range_is_rejected() {
        let mut config = AnalysisConfig::default();
        config.contamination = 0.0;
        assert!(matches!(config.validate(), Err(ExplorerError::InvalidConfig(_))));

        config.contamination = 0.6;
        assert!(matches!(config.validate(), Err(ExplorerError::InvalidConfig(_))));

        config.contamination = f64::NAN;
        assert!(matches!(config.validate(), Err(ExplorerError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_trees_is_rejected() {
        let config = AnalysisConfig {
            n_estimators: 0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_override_parses_and_rejects() {
        std::env::set_var("ANOMALY_TEST_OVERRIDE_OK", " 42 ");
        let parsed: Option<u64> = env_override("ANOMALY_TEST_OVERRIDE_OK").unwrap();
        assert_eq!(parsed, Some(42));

        std::env::set_var("ANOMALY_TEST_OVERRIDE_BAD", "many");
        let parsed: Result<Option<usize>> = env_override("ANOMALY_TEST_OVERRIDE_BAD");
        assert!(parsed.is_err());

        let missing: Option<usize> = env_override("ANOMALY_TEST_OVERRIDE_MISSING").unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_overrides_are_validated() {
        let config = AnalysisConfig::default()
            .with_overrides(Some(0.1), Some(7))
            .unwrap();
        assert_eq!(config.contamination, 0.1);
        assert_eq!(config.seed, 7);
        assert_eq!(config.n_estimators, DEFAULT_TREES);

        let untouched = AnalysisConfig::default().with_overrides(None, None).unwrap();
        assert_eq!(untouched, AnalysisConfig::default());

        assert!(matches!(
            AnalysisConfig::default().with_overrides(Some(1.5), None),
            Err(ExplorerError::InvalidConfig(_))
        ));
    }
}
