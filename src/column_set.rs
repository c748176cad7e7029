use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Largest number of columns scored together.
pub const MAX_SUBSET_SIZE: usize = 3;

/// A combination of 1 to 3 distinct numeric columns, scored as one unit.
///
/// Column order is the order the user selected them in; it is what the label
/// (`"a, b"`) and the plotted column (the first one) are derived from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnSet {
    columns: Vec<String>,
}

impl ColumnSet {
    /// Returns `None` when the set is empty, larger than three, or repeats a column.
    pub fn new(columns: Vec<String>) -> Option<Self> {
        if columns.is_empty() || columns.len() > MAX_SUBSET_SIZE {
            return None;
        }
        let unique: HashSet<&String> = columns.iter().collect();
        if unique.len() != columns.len() {
            return None;
        }
        Some(Self { columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The column drawn on the vertical axis.
    pub fn primary(&self) -> &str {
        &self.columns[0]
    }

    pub fn label(&self) -> String {
        self.columns.join(", ")
    }
}

impl fmt::Display for ColumnSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_label_keeps_selection_order() {
        let set = ColumnSet::new(names(&["pressure", "temperature"])).unwrap();
        assert_eq!(set.label(), "pressure, temperature");
        assert_eq!(set.primary(), "pressure");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_rejects_invalid_sizes_and_duplicates() {
        assert!(ColumnSet::new(vec![]).is_none());
        assert!(ColumnSet::new(names(&["a", "b", "c", "d"])).is_none());
        assert!(ColumnSet::new(names(&["a", "a"])).is_none());
        assert!(ColumnSet::new(names(&["a", "b", "c"])).is_some());
    }
}
