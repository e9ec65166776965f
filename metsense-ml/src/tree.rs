//! Classification tree implementation
//!
//! CART trees grown greedily on Gini impurity. Each node tries up to
//! `max_features` randomly ordered non-constant features and keeps the split
//! with the lowest weighted child impurity. Candidate thresholds sit halfway
//! between consecutive distinct values, and `value <= threshold` goes left.
//!
//! Growth stops at `max_depth`, below `min_samples_split` samples, on a pure
//! node or when no feature varies.

use metsense_core::{MetClass, NUM_FEATURES};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::node::{ClassProbabilities, Node, NodeType};
use crate::{MlError, MlResult};

type ClassCounts = [usize; MetClass::COUNT];

/// Configuration for a single tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth of tree
    pub max_depth: usize,
    /// Minimum samples a node needs to be split
    pub min_samples_split: usize,
    /// Features tried per split, already resolved
    pub max_features: usize,
    /// Random seed for this tree
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 2,
            max_features: NUM_FEATURES,
            seed: 42,
        }
    }
}

/// Best split found for a node
#[derive(Debug, Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f32,
    /// `n_left * gini_left + n_right * gini_right`
    weighted_impurity: f64,
}

/// Classification tree over MET classes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Tree nodes in array representation, root at 0
    nodes: Vec<Node>,
    /// Configuration
    config: TreeConfig,
    /// Row length the tree was trained on
    n_features: usize,
    /// Weighted impurity decrease accumulated per feature
    impurity_decrease: Vec<f64>,
}

impl DecisionTree {
    /// Create an untrained tree
    pub fn new(config: TreeConfig) -> Self {
        Self {
            nodes: Vec::new(),
            config,
            n_features: 0,
            impurity_decrease: Vec::new(),
        }
    }

    /// Configuration
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Train on every row, with an RNG seeded from the config
    pub fn fit(&mut self, x: &[Vec<f32>], y: &[MetClass]) -> MlResult<()> {
        let indices: Vec<usize> = (0..x.len()).collect();
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        self.fit_sample(x, y, &indices, &mut rng)
    }

    /// Train on the rows named by `indices` (repeats allowed)
    pub fn fit_sample(
        &mut self,
        x: &[Vec<f32>],
        y: &[MetClass],
        indices: &[usize],
        rng: &mut StdRng,
    ) -> MlResult<()> {
        if indices.is_empty() || x.is_empty() {
            return Err(MlError::InsufficientData("tree needs at least one sample".into()));
        }
        if x.len() != y.len() {
            return Err(MlError::ShapeMismatch(format!(
                "{} rows but {} labels",
                x.len(),
                y.len()
            )));
        }
        let n_features = x[0].len();
        if n_features == 0 || x.iter().any(|row| row.len() != n_features) {
            return Err(MlError::ShapeMismatch("rows must share a non-zero length".into()));
        }
        if indices.iter().any(|&i| i >= x.len()) {
            return Err(MlError::ShapeMismatch("sample index out of range".into()));
        }

        // Clear existing tree
        self.nodes.clear();
        self.n_features = n_features;
        self.impurity_decrease = vec![0.0; n_features];

        self.build_tree(x, y, indices, 0, rng);
        Ok(())
    }

    /// Grow the subtree for `indices`, returning its root index
    fn build_tree(
        &mut self,
        x: &[Vec<f32>],
        y: &[MetClass],
        indices: &[usize],
        depth: usize,
        rng: &mut StdRng,
    ) -> usize {
        let node_index = self.nodes.len();
        let counts = class_counts(y, indices);
        let node_depth = depth.min(u8::MAX as usize) as u8;

        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        if depth >= self.config.max_depth || indices.len() < self.config.min_samples_split || pure {
            self.nodes.push(Node::leaf(&counts, node_depth));
            return node_index;
        }

        let split = match self.select_split(x, y, indices, &counts, rng) {
            Some(split) => split,
            None => {
                self.nodes.push(Node::leaf(&counts, node_depth));
                return node_index;
            }
        };

        let parent_impurity = indices.len() as f64 * gini(&counts, indices.len());
        self.impurity_decrease[split.feature] +=
            (parent_impurity - split.weighted_impurity).max(0.0);

        // Reserve space for current node
        self.nodes.push(Node::leaf(&counts, node_depth));

        let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[i][split.feature] <= split.threshold);

        let left = self.build_tree(x, y, &left_samples, depth + 1, rng);
        let right = self.build_tree(x, y, &right_samples, depth + 1, rng);

        self.nodes[node_index] = Node::internal(split.feature, split.threshold, left, right, node_depth);
        node_index
    }

    /// Lowest-impurity split over a random subset of varying features
    fn select_split(
        &self,
        x: &[Vec<f32>],
        y: &[MetClass],
        indices: &[usize],
        counts: &ClassCounts,
        rng: &mut StdRng,
    ) -> Option<Split> {
        let n = indices.len();
        let mut features: Vec<usize> = (0..self.n_features).collect();
        features.shuffle(rng);

        let mut best: Option<Split> = None;
        let mut tried = 0;
        let mut column: Vec<(f32, MetClass)> = Vec::with_capacity(n);

        for feature in features {
            if tried >= self.config.max_features {
                break;
            }

            column.clear();
            column.extend(indices.iter().map(|&i| (x[i][feature], y[i])));
            column.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

            // Constant features don't count against max_features
            if column[0].0 == column[n - 1].0 {
                continue;
            }
            tried += 1;

            let mut left: ClassCounts = [0; MetClass::COUNT];
            for k in 0..n - 1 {
                left[column[k].1.index()] += 1;
                if column[k].0 == column[k + 1].0 {
                    continue;
                }

                let mut right = *counts;
                for (r, l) in right.iter_mut().zip(&left) {
                    *r -= l;
                }
                let n_left = k + 1;
                let n_right = n - n_left;
                let weighted = n_left as f64 * gini(&left, n_left) + n_right as f64 * gini(&right, n_right);

                if best.map_or(true, |b| weighted < b.weighted_impurity) {
                    best = Some(Split {
                        feature,
                        threshold: midpoint(column[k].0, column[k + 1].0),
                        weighted_impurity: weighted,
                    });
                }
            }
        }

        best
    }

    /// Class probabilities of the leaf a row lands in
    pub fn predict_proba(&self, features: &[f32]) -> MlResult<ClassProbabilities> {
        if self.nodes.is_empty() {
            return Err(MlError::NotReady);
        }
        if features.len() != self.n_features {
            return Err(MlError::FeatureLengthMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }

        let mut current = 0;
        loop {
            let node = self
                .nodes
                .get(current)
                .ok_or_else(|| MlError::InvalidMetadata(format!("node {} out of range", current)))?;

            match node.node_type {
                NodeType::Leaf { probabilities, .. } => return Ok(probabilities),
                NodeType::Internal { .. } => {
                    let next = node.traverse(features)?;
                    // Children are always stored after their parent
                    if next <= current {
                        return Err(MlError::InvalidMetadata(format!(
                            "node {} points back to {}",
                            current, next
                        )));
                    }
                    current = next;
                }
            }
        }
    }

    /// Per-feature impurity decrease normalized to sum 1, all zero without splits
    pub fn feature_importances(&self) -> Vec<f32> {
        let total: f64 = self.impurity_decrease.iter().sum();
        if total <= 0.0 {
            return vec![0.0; self.n_features];
        }
        self.impurity_decrease
            .iter()
            .map(|&d| (d / total) as f32)
            .collect()
    }

    /// Row length the tree expects
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Get the number of nodes in the tree
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes in array order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Get tree depth
    pub fn depth(&self) -> usize {
        self.nodes
            .iter()
            .map(|n| n.depth as usize)
            .max()
            .unwrap_or(0)
    }
}

fn class_counts(y: &[MetClass], indices: &[usize]) -> ClassCounts {
    let mut counts = [0; MetClass::COUNT];
    for &i in indices {
        counts[y[i].index()] += 1;
    }
    counts
}

fn gini(counts: &ClassCounts, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// Halfway point that still separates `a < b`
fn midpoint(a: f32, b: f32) -> f32 {
    let mid = a + (b - a) / 2.0;
    if mid >= b || !mid.is_finite() {
        a
    } else {
        mid
    }
}
