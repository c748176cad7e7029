use thiserror::Error;

/// A column subset that could not be scored, with the reason it was dropped.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SubsetFailure {
    pub column_set: String,
    pub reason: String,
}

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("No numeric columns selected")]
    EmptySelection,

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Insufficient data for [{column_set}]: {reason}")]
    InsufficientData { column_set: String, reason: String },

    #[error("Every column subset failed to score: {}", summarize(.failures))]
    AllSubsetsFailed { failures: Vec<SubsetFailure> },

    #[error("Anomaly flags cover {got} rows but the dataset has {expected}")]
    FlagMismatch { expected: usize, got: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Polars error: {0}")]
    Polars(String),
}

impl From<polars::error::PolarsError> for ExplorerError {
    fn from(err: polars::error::PolarsError) -> Self {
        ExplorerError::Polars(err.to_string())
    }
}

fn summarize(failures: &[SubsetFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("[{}] {}", f.column_set, f.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, ExplorerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_display() {
        let error = ExplorerError::InsufficientData {
            column_set: "a, b".to_string(),
            reason: "all values are identical".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Insufficient data for [a, b]: all values are identical"
        );
    }

    #[test]
    fn test_all_subsets_failed_lists_every_failure() {
        let error = ExplorerError::AllSubsetsFailed {
            failures: vec![
                SubsetFailure {
                    column_set: "a".to_string(),
                    reason: "too few rows".to_string(),
                },
                SubsetFailure {
                    column_set: "b".to_string(),
                    reason: "missing values".to_string(),
                },
            ],
        };
        assert_eq!(
            error.to_string(),
            "Every column subset failed to score: [a] too few rows; [b] missing values"
        );
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ExplorerError>();
    }
}
