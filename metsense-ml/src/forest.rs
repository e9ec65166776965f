//! Random forest implementation
//!
//! Bagged classification trees. Tree `i` draws its bootstrap sample and its
//! split features from its own RNG seeded `seed + i`, so a forest is
//! reproducible from its config alone. Trees are built one after another.

use log::debug;
use metsense_core::MetClass;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::ForestConfig;
use crate::node::ClassProbabilities;
use crate::tree::{DecisionTree, TreeConfig};
use crate::{MlError, MlResult};

/// Random forest over MET classes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    /// Configuration
    config: ForestConfig,
    /// Individual trees
    trees: Vec<DecisionTree>,
    /// Row length used for training
    n_features: usize,
    /// Number of samples used for training
    num_samples: usize,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(ForestConfig::default())
    }
}

impl RandomForest {
    /// Create an untrained forest
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_features: 0,
            num_samples: 0,
        }
    }

    /// Configuration
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Train the forest on rows and labels
    pub fn fit(&mut self, x: &[Vec<f32>], y: &[MetClass]) -> MlResult<()> {
        self.config.validate()?;
        if x.is_empty() {
            return Err(MlError::InsufficientData("forest needs at least one sample".into()));
        }
        if x.len() != y.len() {
            return Err(MlError::ShapeMismatch(format!(
                "{} rows but {} labels",
                x.len(),
                y.len()
            )));
        }

        let n = x.len();
        let n_features = x[0].len();
        let max_features = self.config.max_features.resolve(n_features);

        self.trees.clear();
        self.num_samples = n;
        self.n_features = n_features;

        // Build each tree
        for i in 0..self.config.n_estimators {
            // Create tree with unique seed
            let seed = self.config.seed.wrapping_add(i as u64);
            let mut rng = StdRng::seed_from_u64(seed);

            let tree_config = TreeConfig {
                max_depth: self.config.max_depth,
                min_samples_split: self.config.min_samples_split,
                max_features,
                seed,
            };

            // Sample subset for this tree
            let indices: Vec<usize> = if self.config.bootstrap {
                (0..n).map(|_| rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };

            let mut tree = DecisionTree::new(tree_config);
            tree.fit_sample(x, y, &indices, &mut rng)?;
            self.trees.push(tree);
        }

        debug!(
            "Fitted {} trees on {} samples ({} features, {} per split)",
            self.trees.len(),
            n,
            n_features,
            max_features
        );
        Ok(())
    }

    /// Check if the forest has been trained
    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Mean of the tree probabilities for one row
    pub fn predict_proba(&self, features: &[f32]) -> MlResult<ClassProbabilities> {
        if self.trees.is_empty() {
            return Err(MlError::NotReady);
        }

        let mut sum = [0.0f32; MetClass::COUNT];
        for tree in &self.trees {
            let p = tree.predict_proba(features)?;
            for (s, v) in sum.iter_mut().zip(p) {
                *s += v;
            }
        }

        let count = self.trees.len() as f32;
        for s in sum.iter_mut() {
            *s /= count;
        }
        Ok(sum)
    }

    /// Most probable class, ties to the lower index
    pub fn predict(&self, features: &[f32]) -> MlResult<MetClass> {
        let probabilities = self.predict_proba(features)?;
        Ok(argmax_class(&probabilities))
    }

    /// Predict many rows
    pub fn predict_batch(&self, rows: &[Vec<f32>]) -> MlResult<Vec<MetClass>> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    /// Mean decrease in impurity, normalized to sum 1
    ///
    /// All zero if no tree ever split.
    pub fn feature_importances(&self) -> Vec<f32> {
        let mut total = vec![0.0f32; self.n_features];
        for tree in &self.trees {
            for (t, v) in total.iter_mut().zip(tree.feature_importances()) {
                *t += v;
            }
        }

        let sum: f32 = total.iter().sum();
        if sum > 0.0 {
            for t in total.iter_mut() {
                *t /= sum;
            }
        }
        total
    }

    /// Trees in build order
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Row length the forest expects
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Get forest statistics
    pub fn stats(&self) -> ForestStats {
        let total_nodes: usize = self.trees.iter().map(|t| t.node_count()).sum();

        let max_depth = self.trees.iter().map(|t| t.depth()).max().unwrap_or(0);

        ForestStats {
            num_trees: self.trees.len(),
            total_nodes,
            max_depth,
            num_samples: self.num_samples,
        }
    }
}

/// Index of the largest probability as a class
pub(crate) fn argmax_class(probabilities: &ClassProbabilities) -> MetClass {
    let mut best = 0;
    for (i, &p) in probabilities.iter().enumerate() {
        if p > probabilities[best] {
            best = i;
        }
    }
    MetClass::ALL[best]
}

/// Forest statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForestStats {
    /// Number of trees
    pub num_trees: usize,
    /// Total nodes across all trees
    pub total_nodes: usize,
    /// Maximum tree depth reached
    pub max_depth: usize,
    /// Number of training samples
    pub num_samples: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MaxFeatures;
    use proptest::prelude::*;

    fn create_test_data() -> (Vec<Vec<f32>>, Vec<MetClass>) {
        let mut x = Vec::new();
        let mut y = Vec::new();

        // Four clusters along features 0 and 1, feature 2 is noise
        for (k, class) in MetClass::ALL.iter().enumerate() {
            for i in 0..15 {
                let center = k as f32 * 10.0;
                let jitter = (i as f32 - 7.0) * 0.2;
                x.push(vec![center + jitter, center * 0.1 + jitter * 0.01, (i % 3) as f32]);
                y.push(*class);
            }
        }
        (x, y)
    }

    fn small_config() -> ForestConfig {
        ForestConfig {
            n_estimators: 10,
            max_depth: 6,
            seed: 123,
            ..ForestConfig::default()
        }
    }

    #[test]
    fn test_forest_creation() {
        let forest = RandomForest::new(small_config());
        assert!(!forest.is_fitted());
        assert!(matches!(forest.predict_proba(&[0.0]), Err(MlError::NotReady)));
    }

    #[test]
    fn test_forest_fit() {
        let (x, y) = create_test_data();
        let mut forest = RandomForest::new(small_config());
        forest.fit(&x, &y).unwrap();

        let stats = forest.stats();
        assert_eq!(stats.num_trees, 10);
        assert_eq!(stats.num_samples, 60);
        assert!(stats.total_nodes > 10);
        assert!(stats.max_depth <= 6);
    }

    #[test]
    fn test_clusters_are_recovered() {
        let (x, y) = create_test_data();
        let mut forest = RandomForest::new(small_config());
        forest.fit(&x, &y).unwrap();

        assert_eq!(forest.predict(&[0.0, 0.0, 1.0]).unwrap(), MetClass::Sedentary);
        assert_eq!(forest.predict(&[10.0, 1.0, 1.0]).unwrap(), MetClass::Light);
        assert_eq!(forest.predict(&[20.0, 2.0, 1.0]).unwrap(), MetClass::Moderate);
        assert_eq!(forest.predict(&[30.0, 3.0, 1.0]).unwrap(), MetClass::Vigorous);

        let predicted = forest.predict_batch(&x).unwrap();
        assert_eq!(predicted, y);
    }

    #[test]
    fn test_importances_favor_informative_features() {
        let (x, y) = create_test_data();
        let mut forest = RandomForest::new(ForestConfig {
            max_features: MaxFeatures::All,
            ..small_config()
        });
        forest.fit(&x, &y).unwrap();

        let importances = forest.feature_importances();
        assert_eq!(importances.len(), 3);
        assert!((importances.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!(importances[2] < importances[0] + importances[1]);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = create_test_data();
        let mut a = RandomForest::new(small_config());
        let mut b = RandomForest::new(small_config());
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a, b);

        let mut c = RandomForest::new(ForestConfig {
            seed: 999,
            ..small_config()
        });
        c.fit(&x, &y).unwrap();
        assert_ne!(a.trees(), c.trees());
    }

    #[test]
    fn test_single_class_has_zero_importances() {
        let x = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let y = vec![MetClass::Light; 3];
        let mut forest = RandomForest::new(small_config());
        forest.fit(&x, &y).unwrap();

        assert_eq!(forest.feature_importances(), vec![0.0, 0.0]);
        assert_eq!(forest.predict_proba(&[0.0, 0.0]).unwrap(), [0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let (x, y) = create_test_data();
        let mut forest = RandomForest::new(ForestConfig {
            n_estimators: 0,
            ..ForestConfig::default()
        });
        assert!(matches!(forest.fit(&x, &y), Err(MlError::InvalidConfig(_))));
    }

    #[test]
    fn test_argmax_ties_go_low() {
        assert_eq!(argmax_class(&[0.25; 4]), MetClass::Sedentary);
        assert_eq!(argmax_class(&[0.1, 0.4, 0.4, 0.1]), MetClass::Light);
    }

    proptest! {
        #[test]
        fn test_probabilities_sum_to_one(a in -50.0f32..50.0, b in -50.0f32..50.0, c in 0.0f32..3.0) {
            let (x, y) = create_test_data();
            let mut forest = RandomForest::new(ForestConfig { n_estimators: 5, ..small_config() });
            forest.fit(&x, &y).unwrap();

            let p = forest.predict_proba(&[a, b, c]).unwrap();
            prop_assert!((p.iter().sum::<f32>() - 1.0).abs() < 1e-5);
            prop_assert!(p.iter().all(|&v| (0.0..=1.0).contains(&v)));
        }
    }
}
