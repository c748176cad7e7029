//! Isolation Forest
//!
//! Rows that are easy to isolate with random axis-aligned cuts are anomalous.
//! Every tree is grown on a random subsample; the anomaly score of a row is
//! `2^(-E[h(x)] / c(psi))` where `h` is the path length to the leaf and `c`
//! the average unsuccessful-search length of a BST with `psi` nodes.
//!
//! The decision offset is the `contamination` percentile of the negated
//! training scores, so roughly that share of the training rows falls below it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

const EULER_GAMMA: f64 = 0.577_215_664_9;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("no rows to fit on")]
    EmptyInput,

    #[error("row {row} has {got} features, expected {expected}")]
    RaggedInput { row: usize, expected: usize, got: usize },

    #[error("model must be fitted before scoring")]
    NotFitted,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IsolationForestParams {
    pub n_estimators: usize,
    pub max_samples: usize,
    pub contamination: f64,
    pub seed: u64,
}

impl Default for IsolationForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            contamination: 0.05,
            seed: 0,
        }
    }
}

impl IsolationForestParams {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.n_estimators == 0 {
            return Err(ModelError::InvalidParameter(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        if self.max_samples == 0 {
            return Err(ModelError::InvalidParameter(
                "max_samples must be at least 1".to_string(),
            ));
        }
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(ModelError::InvalidParameter(format!(
                "contamination must be in (0, 0.5], got {}",
                self.contamination
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone)]
struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn grow(data: &[Vec<f64>], sample: Vec<usize>, max_depth: usize, rng: &mut StdRng) -> Self {
        let mut nodes = Vec::new();
        grow_node(data, sample, 0, max_depth, rng, &mut nodes);
        Self { nodes }
    }

    fn path_length(&self, row: &[f64]) -> f64 {
        let mut node = 0;
        let mut depth = 0usize;
        loop {
            match &self.nodes[node] {
                Node::Leaf { size } => return depth as f64 + average_path_length(*size),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { *left } else { *right };
                    depth += 1;
                }
            }
        }
    }
}

fn grow_node(
    data: &[Vec<f64>],
    rows: Vec<usize>,
    depth: usize,
    max_depth: usize,
    rng: &mut StdRng,
    nodes: &mut Vec<Node>,
) -> usize {
    let index = nodes.len();
    nodes.push(Node::Leaf { size: rows.len() });

    if depth >= max_depth || rows.len() <= 1 {
        return index;
    }

    // Only features that still vary inside this node can split it.
    let n_features = data[rows[0]].len();
    let candidates: Vec<(usize, f64, f64)> = (0..n_features)
        .filter_map(|feature| {
            let (min, max) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| {
                let v = data[r][feature];
                (lo.min(v), hi.max(v))
            });
            (max > min).then_some((feature, min, max))
        })
        .collect();
    if candidates.is_empty() {
        return index;
    }

    let (feature, min, max) = candidates[rng.gen_range(0..candidates.len())];
    let threshold = rng.gen_range(min..max);
    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
        rows.into_iter().partition(|&r| data[r][feature] <= threshold);

    let left = grow_node(data, left_rows, depth + 1, max_depth, rng, nodes);
    let right = grow_node(data, right_rows, depth + 1, max_depth, rng, nodes);
    nodes[index] = Node::Split {
        feature,
        threshold,
        left,
        right,
    };
    index
}

/// Average path length of an unsuccessful BST search over `n` points.
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Percentile with linear interpolation between closest ranks. `q` is clamped
/// to `[0, 100]`.
fn percentile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let position = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (position - lower as f64)
}

#[derive(Debug, Clone)]
pub struct IsolationForest {
    params: IsolationForestParams,
    trees: Vec<IsolationTree>,
    n_features: usize,
    sample_size: usize,
    offset: f64,
    fitted: bool,
}

impl IsolationForest {
    pub fn new(params: IsolationForestParams) -> Self {
        Self {
            params,
            trees: Vec::new(),
            n_features: 0,
            sample_size: 0,
            offset: 0.0,
            fitted: false,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Threshold on `score_samples` below which a row is anomalous.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn fit(&mut self, data: &[Vec<f64>]) -> Result<(), ModelError> {
        self.params.validate()?;
        if data.is_empty() {
            return Err(ModelError::EmptyInput);
        }
        let n_features = data[0].len();
        check_shape(data, n_features)?;

        let n_rows = data.len();
        let sample_size = self.params.max_samples.min(n_rows).max(1);
        let max_depth = (sample_size.max(2) as f64).log2().ceil() as usize;

        let mut rng = StdRng::seed_from_u64(self.params.seed);
        self.trees = (0..self.params.n_estimators)
            .map(|_| {
                let mut tree_rng = StdRng::seed_from_u64(rng.gen());
                let sample = rand::seq::index::sample(&mut tree_rng, n_rows, sample_size).into_vec();
                IsolationTree::grow(data, sample, max_depth, &mut tree_rng)
            })
            .collect();
        self.n_features = n_features;
        self.sample_size = sample_size;
        self.fitted = true;

        let training_scores = self.score_samples(data)?;
        self.offset = percentile(&training_scores, 100.0 * self.params.contamination);
        Ok(())
    }

    /// Negated anomaly scores; lower means more anomalous.
    pub fn score_samples(&self, data: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        if !self.fitted {
            return Err(ModelError::NotFitted);
        }
        check_shape(data, self.n_features)?;

        let normalizer = average_path_length(self.sample_size).max(f64::EPSILON);
        let n_trees = self.trees.len() as f64;
        Ok(data
            .iter()
            .map(|row| {
                let mean_depth =
                    self.trees.iter().map(|t| t.path_length(row)).sum::<f64>() / n_trees;
                -(2f64).powf(-mean_depth / normalizer)
            })
            .collect())
    }

    /// `true` for rows classified anomalous.
    pub fn predict(&self, data: &[Vec<f64>]) -> Result<Vec<bool>, ModelError> {
        let scores = self.score_samples(data)?;
        Ok(scores.into_iter().map(|s| s < self.offset).collect())
    }

    pub fn fit_predict(&mut self, data: &[Vec<f64>]) -> Result<Vec<bool>, ModelError> {
        self.fit(data)?;
        self.predict(data)
    }
}

fn check_shape(data: &[Vec<f64>], expected: usize) -> Result<(), ModelError> {
    match data.iter().position(|row| row.len() != expected) {
        Some(row) => Err(ModelError::RaggedInput {
            row,
            expected,
            got: data[row].len(),
        }),
        None => Ok(()),
    }
}
