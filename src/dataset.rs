//! Dataset - an uploaded table plus its schema descriptor
//!
//! The schema is computed once when the table is loaded: polars numeric
//! dtypes become `Numeric`, everything else is `Categorical`. The analysis
//! components only consult this descriptor, never the raw dtypes.

use crate::error::{ExplorerError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub kind: ColumnKind,
    pub data_type: String,
}

/// Schema descriptor: column name -> kind, in table order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub columns: Vec<ColumnInfo>,
}

impl TableSchema {
    pub fn from_frame(df: &DataFrame) -> Self {
        let columns = df
            .get_columns()
            .iter()
            .map(|series| {
                let kind = if series.dtype().is_numeric() {
                    ColumnKind::Numeric
                } else {
                    ColumnKind::Categorical
                };
                ColumnInfo {
                    name: series.name().to_string(),
                    kind,
                    data_type: format!("{:?}", series.dtype()),
                }
            })
            .collect();
        Self { columns }
    }

    pub fn kind_of(&self, column: &str) -> Option<ColumnKind> {
        self.columns.iter().find(|c| c.name == column).map(|c| c.kind)
    }
}

/// A value on the horizontal axis of the scatter plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisValue {
    Number(f64),
    Label(String),
    Missing,
}

impl fmt::Display for AxisValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisValue::Number(v) => write!(f, "{}", v),
            AxisValue::Label(s) => write!(f, "{}", s),
            AxisValue::Missing => write!(f, "null"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    schema: TableSchema,
}

impl Dataset {
    pub fn from_frame(frame: DataFrame) -> Self {
        let schema = TableSchema::from_frame(&frame);
        Self { frame, schema }
    }

    /// Load a headed, UTF-8 CSV file.
    pub fn load_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let frame = LazyCsvReader::new(path)
            .with_has_header(true)
            .finish()
            .map_err(|e| ExplorerError::Polars(format!("Failed to scan {}: {}", path.display(), e)))?
            .collect()
            .map_err(|e| ExplorerError::Polars(format!("Failed to read {}: {}", path.display(), e)))?;

        let dataset = Self::from_frame(frame);
        info!(
            "Loaded {} ({} rows, {} numeric / {} categorical columns)",
            path.display(),
            dataset.height(),
            dataset.numeric_columns().len(),
            dataset.categorical_columns().len()
        );
        Ok(dataset)
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.schema.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_kind(&self, column: &str) -> Option<ColumnKind> {
        self.schema.kind_of(column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_kind(column).is_some()
    }

    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns_of(ColumnKind::Numeric)
    }

    pub fn categorical_columns(&self) -> Vec<String> {
        self.columns_of(ColumnKind::Categorical)
    }

    fn columns_of(&self, kind: ColumnKind) -> Vec<String> {
        self.schema
            .columns
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.name.clone())
            .collect()
    }

    /// First `rows` rows, for showing the user what was uploaded.
    pub fn preview(&self, rows: usize) -> DataFrame {
        self.frame.head(Some(rows))
    }

    /// Values of a numeric column as `f64`, in row order.
    ///
    /// Missing cells are rejected rather than imputed.
    pub fn numeric_values(&self, column: &str) -> Result<Vec<f64>> {
        let kind = self
            .column_kind(column)
            .ok_or_else(|| ExplorerError::UnknownColumn(column.to_string()))?;
        if kind != ColumnKind::Numeric {
            return Err(ExplorerError::InsufficientData {
                column_set: column.to_string(),
                reason: format!("column '{}' is not numeric", column),
            });
        }

        let series = self.frame.column(column)?;
        if series.null_count() > 0 {
            return Err(ExplorerError::InsufficientData {
                column_set: column.to_string(),
                reason: format!(
                    "column '{}' has {} missing values",
                    column,
                    series.null_count()
                ),
            });
        }

        let values = series.cast(&DataType::Float64)?;
        let values: Vec<f64> = values
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ExplorerError::InsufficientData {
                column_set: column.to_string(),
                reason: format!("column '{}' has non-finite values", column),
            });
        }
        Ok(values)
    }

    /// Values of any column rendered as axis positions, in row order.
    pub fn axis_values(&self, column: &str) -> Result<Vec<AxisValue>> {
        let kind = self
            .column_kind(column)
            .ok_or_else(|| ExplorerError::UnknownColumn(column.to_string()))?;
        let series = self.frame.column(column)?;

        let values: Vec<AxisValue> = match kind {
            ColumnKind::Numeric => {
                let casted = series.cast(&DataType::Float64)?;
                let values: Vec<AxisValue> = casted
                    .f64()?
                    .into_iter()
                    .map(|v| v.map(AxisValue::Number).unwrap_or(AxisValue::Missing))
                    .collect();
                values
            }
            ColumnKind::Categorical => {
                let casted = series.cast(&DataType::String)?;
                let values: Vec<AxisValue> = casted
                    .str()?
                    .into_iter()
                    .map(|v| {
                        v.map(|s| AxisValue::Label(s.to_string()))
                            .unwrap_or(AxisValue::Missing)
                    })
                    .collect();
                values
            }
        };
        Ok(values)
    }

    /// Distinct axis labels in order of first appearance.
    pub fn distinct_axis_labels(&self, column: &str) -> Result<Vec<String>> {
        let values = self.axis_values(column)?;
        Ok(distinct_labels(&values))
    }
}

/// Identity of an axis value for deduplication. A missing cell never merges
/// with a label that happens to read `null`.
#[derive(PartialEq, Eq, Hash)]
enum AxisKey<'a> {
    Number(u64),
    Label(&'a str),
    Missing,
}

impl<'a> From<&'a AxisValue> for AxisKey<'a> {
    fn from(value: &'a AxisValue) -> Self {
        match value {
            AxisValue::Number(v) => AxisKey::Number(v.to_bits()),
            AxisValue::Label(s) => AxisKey::Label(s),
            AxisValue::Missing => AxisKey::Missing,
        }
    }
}

/// One rendered label per distinct axis value, in order of first appearance.
pub fn distinct_labels(values: &[AxisValue]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut labels = Vec::new();
    for value in values {
        if seen.insert(AxisKey::from(value)) {
            labels.push(value.to_string());
        }
    }
    labels
}
