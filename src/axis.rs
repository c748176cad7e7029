use crate::config::DEFAULT_MAX_AXIS_LABELS;
use serde::{Deserialize, Serialize};

/// Which axis labels to draw and how far apart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisLabelPlan {
    pub displayed_labels: Vec<String>,
    pub tick_step: usize,
    /// Numeric axes place points by value, not by category index.
    #[serde(default)]
    pub numeric_axis: bool,
}

impl AxisLabelPlan {
    /// Category indices where ticks are drawn. `None` on a numeric axis, where
    /// index positions would not line up with the plotted x values.
    pub fn tick_positions(&self) -> Option<Vec<usize>> {
        if self.numeric_axis {
            return None;
        }
        Some(
            (0..self.displayed_labels.len())
                .map(|i| i * self.tick_step)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.displayed_labels.is_empty()
    }
}

/// Keeps dense categorical axes readable by showing every `step`-th label.
pub struct AxisLabelThinner {
    max_labels: usize,
}

impl Default for AxisLabelThinner {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AXIS_LABELS)
    }
}

impl AxisLabelThinner {
    pub fn new(max_labels: usize) -> Self {
        Self {
            max_labels: max_labels.max(1),
        }
    }

    /// `distinct_labels` must already be deduplicated, in display order.
    pub fn plan(&self, distinct_labels: &[String]) -> AxisLabelPlan {
        let n = distinct_labels.len();
        if n == 0 {
            return AxisLabelPlan {
                displayed_labels: Vec::new(),
                tick_step: 1,
                numeric_axis: false,
            };
        }
        if n <= self.max_labels {
            return AxisLabelPlan {
                displayed_labels: distinct_labels.to_vec(),
                tick_step: 1,
                numeric_axis: false,
            };
        }

        let step = (n / self.max_labels).max(1);
        AxisLabelPlan {
            displayed_labels: distinct_labels.iter().step_by(step).cloned().collect(),
            tick_step: step,
            numeric_axis: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("P{:03}", i)).collect()
    }

    #[test]
    fn test_small_axis_shows_everything() {
        let plan = AxisLabelThinner::default().plan(&labels(15));
        assert_eq!(plan.displayed_labels.len(), 15);
        assert_eq!(plan.tick_step, 1);
    }

    #[test]
    fn test_exactly_twenty_is_not_thinned() {
        let plan = AxisLabelThinner::default().plan(&labels(20));
        assert_eq!(plan.displayed_labels.len(), 20);
        assert_eq!(plan.tick_step, 1);
    }

    #[test]
    fn test_hundred_labels_step_five() {
        let plan = AxisLabelThinner::default().plan(&labels(100));
        assert_eq!(plan.tick_step, 5);
        assert_eq!(plan.displayed_labels.len(), 20);
        assert_eq!(plan.displayed_labels[0], "P000");
        assert_eq!(plan.displayed_labels[1], "P005");
        assert_eq!(plan.tick_positions().unwrap()[19], 95);
    }

    #[test]
    fn test_label_count_stays_bounded() {
        let thinner = AxisLabelThinner::default();
        for n in 21..=500 {
            let plan = thinner.plan(&labels(n));
            assert!(plan.displayed_labels.len() <= 40, "n = {}", n);
            assert_eq!(plan.displayed_labels.len(), (n + plan.tick_step - 1) / plan.tick_step);
        }
        assert_eq!(thinner.plan(&labels(21)).displayed_labels.len(), 21);
        assert_eq!(thinner.plan(&labels(41)).displayed_labels.len(), 21);
    }

    #[test]
    fn test_empty_axis_gives_empty_plan() {
        let plan = AxisLabelThinner::default().plan(&[]);
        assert!(plan.is_empty());
        assert_eq!(plan.tick_step, 1);
        assert_eq!(plan.tick_positions(), Some(vec![]));
    }

    #[test]
    fn test_numeric_axis_has_no_index_ticks() {
        let mut plan = AxisLabelThinner::default().plan(&labels(100));
        plan.numeric_axis = true;
        assert_eq!(plan.tick_positions(), None);
        assert_eq!(plan.displayed_labels.len(), 20);
    }
}
