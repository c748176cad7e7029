use crate::axis::AxisLabelThinner;
use crate::column_set::ColumnSet;
use crate::config::AnalysisConfig;
use crate::dataset::Dataset;
use crate::enumerator::ColumnSubsetEnumerator;
use crate::error::{ExplorerError, Result, SubsetFailure};
use crate::mapper::{VisualizationMapper, VisualizationPayload};
use crate::ranker::{RankingRow, SubsetRanker};
use crate::scorer::{AnomalyScorer, ScoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{info, info_span, warn};
use uuid::Uuid;

/// What the user picked: numeric columns to search over, and optionally the
/// column to plot them against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub columns: Vec<String>,
    pub axis_column: Option<String>,
}

impl Selection {
    pub fn new(columns: Vec<String>, axis_column: Option<String>) -> Self {
        Self {
            columns,
            axis_column,
        }
    }
}

/// Winning subset, its count, and the full ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsetRanking {
    pub ranking: Vec<RankingRow>,
    pub winner: ScoreResult,
    pub excluded: Vec<SubsetFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub run_id: String,
    pub row_count: usize,
    pub ranking: Vec<RankingRow>,
    pub winner: RankingRow,
    pub excluded: Vec<SubsetFailure>,
    pub visualization: Option<VisualizationPayload>,
}

impl AnalysisReport {
    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        info!("Report written to {}", path.as_ref().display());
        Ok(())
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .ranking
            .iter()
            .map(|r| r.column_set.len())
            .chain(std::iter::once("Columns".len()))
            .max()
            .unwrap_or(0);

        writeln!(f, "{:<width$}  Anomalies", "Columns", width = width)?;
        for row in &self.ranking {
            writeln!(
                f,
                "{:<width$}  {}",
                row.column_set,
                row.anomaly_count,
                width = width
            )?;
        }
        for failure in &self.excluded {
            writeln!(f, "{:<width$}  skipped: {}", failure.column_set, failure.reason, width = width)?;
        }
        writeln!(f)?;
        write!(
            f,
            "Most anomalous: {} ({} rows)",
            self.winner.column_set, self.winner.anomaly_count
        )?;
        if let Some(viz) = &self.visualization {
            write!(
                f,
                "\nPlot: {} against {} ({} points, {} anomalous, {} axis labels every {})",
                viz.value_column,
                viz.axis_column,
                viz.all_points.len(),
                viz.anomaly_points.len(),
                viz.label_plan.displayed_labels.len(),
                viz.label_plan.tick_step
            )?;
        }
        Ok(())
    }
}

/// Runs the subset search end to end on one dataset snapshot.
pub struct AnomalyExplorer {
    enumerator: ColumnSubsetEnumerator,
    scorer: AnomalyScorer,
    ranker: SubsetRanker,
    mapper: VisualizationMapper,
}

impl AnomalyExplorer {
    /// Fails with `InvalidConfig` when the config is out of range.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let thinner = AxisLabelThinner::new(config.max_axis_labels);
        Ok(Self {
            enumerator: ColumnSubsetEnumerator,
            scorer: AnomalyScorer::new(config),
            ranker: SubsetRanker,
            mapper: VisualizationMapper::new(thinner),
        })
    }

    pub fn run(&self, dataset: &Dataset, selection: &Selection) -> Result<AnalysisReport> {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("analysis", run_id = %run_id);
        let _guard = span.enter();

        info!(
            "Analysing {} rows over columns [{}]",
            dataset.height(),
            selection.columns.join(", ")
        );

        let ranked = self.rank_subsets(dataset, &selection.columns)?;
        let visualization = match &selection.axis_column {
            Some(axis) => Some(self.visualize(dataset, &ranked.winner.column_set, axis)?),
            None => None,
        };

        info!(
            "Most anomalous subset: [{}] with {} rows",
            ranked.winner.column_set, ranked.winner.anomaly_count
        );

        Ok(AnalysisReport {
            run_id,
            row_count: dataset.height(),
            winner: RankingRow::from(&ranked.winner),
            ranking: ranked.ranking,
            excluded: ranked.excluded,
            visualization,
        })
    }

    /// Score every subset of the selected columns and pick the most anomalous.
    ///
    /// Subsets that cannot be scored are left out of the ranking; only when
    /// none can be scored does this fail.
    pub fn rank_subsets(&self, dataset: &Dataset, selected: &[String]) -> Result<SubsetRanking> {
        let selected = normalize_selection(dataset, selected)?;
        let subsets = self.enumerator.enumerate(&selected);
        info!("Scoring {} column subsets", subsets.len());

        let mut results = Vec::with_capacity(subsets.len());
        let mut excluded = Vec::new();
        for subset in &subsets {
            match self.scorer.count(dataset, subset) {
                Ok(result) => results.push(result),
                Err(e @ ExplorerError::InvalidConfig(_)) => return Err(e),
                Err(e) => {
                    warn!("Skipping [{}]: {}", subset, e);
                    excluded.push(SubsetFailure {
                        column_set: subset.label(),
                        reason: failure_reason(e),
                    });
                }
            }
        }

        let winner = match self.ranker.select_best(&results) {
            Some(best) => best.clone(),
            None => return Err(ExplorerError::AllSubsetsFailed { failures: excluded }),
        };

        Ok(SubsetRanking {
            ranking: self.ranker.ranking_table(&results),
            winner,
            excluded,
        })
    }

    /// Re-fit the model on the winning subset and map its flags onto the axis.
    ///
    /// The flags from ranking are not kept, so the winner is scored again here.
    pub fn visualize(
        &self,
        dataset: &Dataset,
        winner: &ColumnSet,
        axis_column: &str,
    ) -> Result<VisualizationPayload> {
        if !dataset.has_column(axis_column) {
            return Err(ExplorerError::UnknownColumn(axis_column.to_string()));
        }
        if dataset.height() == 0 {
            return self.mapper.map(dataset, winner.primary(), axis_column, &Default::default());
        }

        let flags = self.scorer.score(dataset, winner)?;
        self.mapper.map(dataset, winner.primary(), axis_column, &flags)
    }
}

/// Drops repeated names (first occurrence wins) and rejects unknown columns.
fn normalize_selection(dataset: &Dataset, selected: &[String]) -> Result<Vec<String>> {
    if selected.is_empty() {
        return Err(ExplorerError::EmptySelection);
    }

    let mut columns: Vec<String> = Vec::with_capacity(selected.len());
    for name in selected {
        if !dataset.has_column(name) {
            return Err(ExplorerError::UnknownColumn(name.clone()));
        }
        if columns.contains(name) {
            warn!("Column '{}' selected more than once, ignoring repeat", name);
            continue;
        }
        columns.push(name.clone());
    }
    Ok(columns)
}

fn failure_reason(err: ExplorerError) -> String {
    match err {
        ExplorerError::InsufficientData { reason, .. } => reason,
        other => other.to_string(),
    }
}
