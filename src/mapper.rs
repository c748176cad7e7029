//! Visualization mapping
//!
//! Every row is emitted as a base-layer point and flagged rows are emitted a
//! second time as an overlay. Splitting rows into two disjoint layers would
//! let a categorical axis reorder itself by layer, so the base layer always
//! holds all rows in table order.

use crate::axis::{AxisLabelPlan, AxisLabelThinner};
use crate::dataset::{distinct_labels, AxisValue, ColumnKind, Dataset};
use crate::error::{ExplorerError, Result};
use crate::scorer::AnomalyFlags;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub row: usize,
    pub axis: AxisValue,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationPayload {
    pub value_column: String,
    pub axis_column: String,
    pub all_points: Vec<PlotPoint>,
    pub anomaly_points: Vec<PlotPoint>,
    pub label_plan: AxisLabelPlan,
    /// Set when the axis has no rows; the payload is then empty.
    pub degenerate: bool,
}

pub struct VisualizationMapper {
    thinner: AxisLabelThinner,
}

impl VisualizationMapper {
    pub fn new(thinner: AxisLabelThinner) -> Self {
        Self { thinner }
    }

    pub fn map(
        &self,
        dataset: &Dataset,
        value_column: &str,
        axis_column: &str,
        flags: &AnomalyFlags,
    ) -> Result<VisualizationPayload> {
        for column in [value_column, axis_column] {
            if !dataset.has_column(column) {
                return Err(ExplorerError::UnknownColumn(column.to_string()));
            }
        }

        if dataset.height() == 0 {
            warn!("Axis column '{}' has no rows, nothing to plot", axis_column);
            return Ok(VisualizationPayload {
                value_column: value_column.to_string(),
                axis_column: axis_column.to_string(),
                all_points: Vec::new(),
                anomaly_points: Vec::new(),
                label_plan: self.thinner.plan(&[]),
                degenerate: true,
            });
        }

        if flags.len() != dataset.height() {
            return Err(ExplorerError::FlagMismatch {
                expected: dataset.height(),
                got: flags.len(),
            });
        }

        let axis = dataset.axis_values(axis_column)?;
        let values = dataset.numeric_values(value_column)?;
        let mut label_plan = self.thinner.plan(&distinct_labels(&axis));
        label_plan.numeric_axis = dataset.column_kind(axis_column) == Some(ColumnKind::Numeric);

        let all_points: Vec<PlotPoint> = axis
            .into_iter()
            .zip(values)
            .enumerate()
            .map(|(row, (axis, value))| PlotPoint { row, axis, value })
            .collect();
        let anomaly_points: Vec<PlotPoint> = all_points
            .iter()
            .filter(|p| flags.is_anomaly(p.row))
            .cloned()
            .collect();

        Ok(VisualizationPayload {
            value_column: value_column.to_string(),
            axis_column: axis_column.to_string(),
            all_points,
            anomaly_points,
            label_plan,
            degenerate: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn dataset() -> Dataset {
        Dataset::from_frame(
            df! [
                "product" => ["P3", "P1", "P2", "P1"],
                "reading" => [1.0, 2.0, 3.0, 4.0],
            ]
            .unwrap(),
        )
    }

    #[test]
    fn test_base_layer_keeps_every_row_in_order() {
        let flags = AnomalyFlags::new(vec![false, true, false, true]);
        let payload = VisualizationMapper::new(AxisLabelThinner::default())
            .map(&dataset(), "reading", "product", &flags)
            .unwrap();

        assert_eq!(payload.all_points.len(), 4);
        assert_eq!(payload.all_points[0].axis, AxisValue::Label("P3".to_string()));
        assert_eq!(payload.anomaly_points.len(), 2);
        assert_eq!(payload.anomaly_points[0], payload.all_points[1]);
        assert_eq!(payload.anomaly_points[1], payload.all_points[3]);
        assert_eq!(payload.label_plan.displayed_labels, vec!["P3", "P1", "P2"]);
        assert_eq!(payload.label_plan.tick_positions(), Some(vec![0, 1, 2]));
        assert!(!payload.degenerate);
    }

    #[test]
    fn test_empty_dataset_is_degenerate_not_an_error() {
        let empty = Dataset::from_frame(dataset().frame().head(Some(0)));
        let payload = VisualizationMapper::new(AxisLabelThinner::default())
            .map(&empty, "reading", "product", &AnomalyFlags::new(vec![]))
            .unwrap();
        assert!(payload.degenerate);
        assert!(payload.all_points.is_empty());
        assert!(payload.label_plan.is_empty());
    }

    #[test]
    fn test_flag_length_must_match() {
        let result = VisualizationMapper::new(AxisLabelThinner::default()).map(
            &dataset(),
            "reading",
            "product",
            &AnomalyFlags::new(vec![true]),
        );
        assert!(matches!(
            result,
            Err(ExplorerError::FlagMismatch { expected: 4, got: 1 })
        ));
    }

    #[test]
    fn test_unknown_axis() {
        let result = VisualizationMapper::new(AxisLabelThinner::default()).map(
            &dataset(),
            "reading",
            "when",
            &AnomalyFlags::new(vec![false; 4]),
        );
        assert!(matches!(result, Err(ExplorerError::UnknownColumn(c)) if c == "when"));
    }

    #[test]
    fn test_numeric_axis_plan_has_no_index_ticks() {
        let flags = AnomalyFlags::new(vec![false; 4]);
        let payload = VisualizationMapper::new(AxisLabelThinner::default())
            .map(&dataset(), "reading", "reading", &flags)
            .unwrap();
        assert!(payload.label_plan.numeric_axis);
        assert_eq!(payload.label_plan.tick_positions(), None);
        assert_eq!(payload.label_plan.displayed_labels, vec!["1", "2", "3", "4"]);
    }
}
