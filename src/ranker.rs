use crate::scorer::ScoreResult;
use serde::{Deserialize, Serialize};

/// One line of the ranking table shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingRow {
    pub column_set: String,
    pub anomaly_count: usize,
}

impl From<&ScoreResult> for RankingRow {
    fn from(result: &ScoreResult) -> Self {
        Self {
            column_set: result.column_set.label(),
            anomaly_count: result.anomaly_count,
        }
    }
}

pub struct SubsetRanker;

impl SubsetRanker {
    /// Subset with the most anomalies.
    ///
    /// `results` must be in enumeration order: on a tie the earlier entry wins,
    /// which favours smaller subsets and then the user's column order.
    pub fn select_best<'a>(&self, results: &'a [ScoreResult]) -> Option<&'a ScoreResult> {
        results.iter().fold(None, |best, candidate| match best {
            Some(current) if current.anomaly_count >= candidate.anomaly_count => Some(current),
            _ => Some(candidate),
        })
    }

    /// Results sorted by anomaly count, descending. Ties keep enumeration order.
    pub fn ranking_table(&self, results: &[ScoreResult]) -> Vec<RankingRow> {
        let mut rows: Vec<RankingRow> = results.iter().map(RankingRow::from).collect();
        rows.sort_by(|a, b| b.anomaly_count.cmp(&a.anomaly_count));
        rows
    }
}
