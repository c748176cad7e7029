use crate::column_set::{ColumnSet, MAX_SUBSET_SIZE};
use itertools::Itertools;

/// Enumerates every column subset of size 1..=3 from a selection.
///
/// Size classes come smallest first; inside a class, combinations follow the
/// selection order. Capping the size keeps the count at O(n^3).
pub struct ColumnSubsetEnumerator;

impl ColumnSubsetEnumerator {
    pub fn enumerate(&self, selected: &[String]) -> Vec<ColumnSet> {
        let max_size = selected.len().min(MAX_SUBSET_SIZE);

        (1..=max_size)
            .flat_map(|k| selected.iter().cloned().combinations(k))
            .filter_map(ColumnSet::new)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("c{}", i)).collect()
    }

    fn binomial(n: usize, k: usize) -> usize {
        if k > n {
            return 0;
        }
        (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
    }

    #[test]
    fn test_subset_count_matches_binomial_sum() {
        for n in 1..=8 {
            let subsets = ColumnSubsetEnumerator.enumerate(&names(n));
            let expected: usize = (1..=n.min(3)).map(|k| binomial(n, k)).sum();
            assert_eq!(subsets.len(), expected, "n = {}", n);

            let unique: HashSet<_> = subsets.iter().map(|s| s.label()).collect();
            assert_eq!(unique.len(), subsets.len());
            assert!(subsets.iter().all(|s| (1..=3).contains(&s.len())));
        }
    }

    #[test]
    fn test_order_is_size_then_selection_order() {
        let selected: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let labels: Vec<String> = ColumnSubsetEnumerator
            .enumerate(&selected)
            .iter()
            .map(|s| s.label())
            .collect();
        assert_eq!(
            labels,
            vec!["a", "b", "c", "a, b", "a, c", "b, c", "a, b, c"]
        );
    }

    #[test]
    fn test_four_columns_stop_at_triples() {
        let subsets = ColumnSubsetEnumerator.enumerate(&names(4));
        assert_eq!(subsets.len(), 4 + 6 + 4);
        assert_eq!(subsets.last().unwrap().label(), "c1, c2, c3");
    }

    #[test]
    fn test_empty_selection_yields_nothing() {
        assert!(ColumnSubsetEnumerator.enumerate(&[]).is_empty());
    }
}
