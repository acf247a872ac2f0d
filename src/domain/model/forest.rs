//! Bagged ensemble of regression trees.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::Regressor;
use super::tree::{RegressionTree, TreeParams};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub tree: TreeParams,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            tree: TreeParams::default(),
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    /// Fits `n_estimators` trees, each on a bootstrap resample of the rows.
    /// The same seed and data always produce the same forest.
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: &ForestParams) -> Self {
        let n = x.len().min(y.len());
        if n == 0 {
            return Self { trees: Vec::new() };
        }

        let mut rng = StdRng::seed_from_u64(params.seed);
        let trees = (0..params.n_estimators.max(1))
            .map(|_| {
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(x, y, &sample, &params.tree)
            })
            .collect();

        Self { trees }
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn validate(&self, width: usize) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(width).map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(())
    }
}

impl Regressor for RandomForest {
    fn predict(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return f64::NAN;
        }
        self.trees.iter().map(|t| t.predict(features)).sum::<f64>() / self.trees.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_data(n: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
        let x: Vec<Vec<f64>> = (0..n).map(|i| vec![i as f64 / n as f64, 0.5]).collect();
        let y: Vec<f64> = x.iter().map(|r| 2.0 * r[0] + 1.0).collect();
        (x, y)
    }

    fn small() -> ForestParams {
        ForestParams {
            n_estimators: 10,
            tree: TreeParams {
                max_depth: 6,
                ..TreeParams::default()
            },
            seed: 7,
        }
    }

    #[test]
    fn fits_requested_number_of_trees() {
        let (x, y) = linear_data(50);
        let forest = RandomForest::fit(&x, &y, &small());
        assert_eq!(forest.len(), 10);
    }

    #[test]
    fn same_seed_same_forest() {
        let (x, y) = linear_data(40);
        let a = RandomForest::fit(&x, &y, &small());
        let b = RandomForest::fit(&x, &y, &small());
        assert_eq!(a, b);
    }

    #[test]
    fn approximates_a_smooth_target() {
        let (x, y) = linear_data(200);
        let forest = RandomForest::fit(&x, &y, &small());
        let pred = forest.predict(&[0.5, 0.5]);
        assert!((pred - 2.0).abs() < 0.1, "prediction {} too far from 2.0", pred);
    }

    #[test]
    fn predictions_stay_within_target_range() {
        let (x, y) = linear_data(60);
        let forest = RandomForest::fit(&x, &y, &small());
        for x0 in [-5.0, 0.0, 0.3, 1.0, 5.0] {
            let p = forest.predict(&[x0, 0.5]);
            assert!((1.0..=3.0).contains(&p), "prediction {} out of range", p);
        }
    }

    #[test]
    fn empty_training_set_predicts_nan() {
        let forest = RandomForest::fit(&[], &[], &small());
        assert!(forest.is_empty());
        assert!(forest.predict(&[1.0]).is_nan());
        assert!(forest.validate(1).is_err());
    }

    #[test]
    fn fitted_forest_is_valid_for_its_width() {
        let (x, y) = linear_data(30);
        let forest = RandomForest::fit(&x, &y, &small());
        assert!(forest.validate(2).is_ok());
    }

    #[test]
    fn invalid_tree_is_reported_with_index() {
        let forest: RandomForest =
            serde_json::from_str(r#"{"trees":[{"nodes":[{"node":"leaf","value":1.0}]},{"nodes":[]}]}"#)
                .unwrap();
        assert!(forest.validate(2).unwrap_err().starts_with("tree 1"));
    }
}
