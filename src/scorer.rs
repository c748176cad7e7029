use crate::column_set::ColumnSet;
use crate::config::AnalysisConfig;
use crate::dataset::Dataset;
use crate::error::{ExplorerError, Result};
use crate::isolation_forest::{IsolationForest, IsolationForestParams, ModelError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Anomaly count for one evaluated column subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub column_set: ColumnSet,
    pub anomaly_count: usize,
}

/// Per-row anomaly classification, aligned with the dataset rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyFlags {
    flags: Vec<bool>,
}

impl AnomalyFlags {
    pub fn new(flags: Vec<bool>) -> Self {
        Self { flags }
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.flags
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn is_anomaly(&self, row: usize) -> bool {
        self.flags.get(row).copied().unwrap_or(false)
    }

    pub fn anomaly_count(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }

    pub fn anomaly_indices(&self) -> Vec<usize> {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(i, &f)| if f { Some(i) } else { None })
            .collect()
    }
}

/// Fits an isolation forest on one column subset and classifies every row.
pub struct AnomalyScorer {
    config: AnalysisConfig,
}

impl AnomalyScorer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Score a subset and keep the per-row flags.
    pub fn score(&self, dataset: &Dataset, column_set: &ColumnSet) -> Result<AnomalyFlags> {
        let rows = self.project(dataset, column_set)?;

        let mut model = IsolationForest::new(IsolationForestParams {
            n_estimators: self.config.n_estimators,
            max_samples: self.config.max_samples,
            contamination: self.config.contamination,
            seed: self.config.seed,
        });
        let flags = model
            .fit_predict(&rows)
            .map_err(|e| match e {
                ModelError::InvalidParameter(reason) => ExplorerError::InvalidConfig(reason),
                other => insufficient(column_set, other.to_string()),
            })?;

        let flags = AnomalyFlags::new(flags);
        debug!(
            "Scored [{}]: {} of {} rows anomalous",
            column_set,
            flags.anomaly_count(),
            flags.len()
        );
        Ok(flags)
    }

    /// Score a subset and keep only the count.
    pub fn count(&self, dataset: &Dataset, column_set: &ColumnSet) -> Result<ScoreResult> {
        let flags = self.score(dataset, column_set)?;
        Ok(ScoreResult {
            column_set: column_set.clone(),
            anomaly_count: flags.anomaly_count(),
        })
    }

    /// Row-major projection of the dataset onto the subset's columns.
    fn project(&self, dataset: &Dataset, column_set: &ColumnSet) -> Result<Vec<Vec<f64>>> {
        let height = dataset.height();
        if height < self.config.min_rows {
            return Err(insufficient(
                column_set,
                format!(
                    "only {} rows, need at least {}",
                    height, self.config.min_rows
                ),
            ));
        }

        let mut columns = Vec::with_capacity(column_set.len());
        for name in column_set.columns() {
            let values = dataset.numeric_values(name).map_err(|e| match e {
                ExplorerError::InsufficientData { reason, .. } => insufficient(column_set, reason),
                other => other,
            })?;
            columns.push(values);
        }

        let all_constant = columns
            .iter()
            .all(|values| values.iter().all(|v| *v == values[0]));
        if all_constant {
            return Err(insufficient(
                column_set,
                "all values are identical".to_string(),
            ));
        }

        Ok((0..height)
            .map(|row| columns.iter().map(|values| values[row]).collect())
            .collect())
    }
}

fn insufficient(column_set: &ColumnSet, reason: String) -> ExplorerError {
    ExplorerError::InsufficientData {
        column_set: column_set.label(),
        reason,
    }
}
