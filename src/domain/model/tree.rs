//! CART regression tree.
//!
//! Splits minimise the summed squared error of the two children. Samples
//! with `x[feature] <= threshold` go left.

use serde::{Deserialize, Serialize};

use super::Regressor;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

struct Split {
    feature: usize,
    threshold: f64,
    score: f64,
}

impl RegressionTree {
    /// Grows a tree over the rows of `x` listed in `sample` (duplicates allowed).
    ///
    /// `sample` must be non-empty and every index must be in bounds.
    pub fn fit(x: &[Vec<f64>], y: &[f64], sample: &[usize], params: &TreeParams) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(x, y, sample.to_vec(), 0, params);
        tree
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Checks the node layout for a `width`-column input: at least one
    /// node, features in range, and children stored after their parent.
    /// The last rule rules out cycles, so prediction always terminates.
    pub fn validate(&self, width: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (at, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                feature,
                left,
                right,
                ..
            } = node
            {
                if *feature >= width {
                    return Err(format!(
                        "node {} splits on feature {} of {}",
                        at, feature, width
                    ));
                }
                for child in [*left, *right] {
                    if child <= at || child >= self.nodes.len() {
                        return Err(format!("node {} has invalid child {}", at, child));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], at: usize) -> usize {
            match &nodes[at] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() { 0 } else { walk(&self.nodes, 0) }
    }

    fn grow(
        &mut self,
        x: &[Vec<f64>],
        y: &[f64],
        idx: Vec<usize>,
        depth: usize,
        params: &TreeParams,
    ) -> usize {
        let at = self.nodes.len();
        let mean = idx.iter().map(|&i| y[i]).sum::<f64>() / idx.len() as f64;
        self.nodes.push(Node::Leaf { value: mean });

        let pure = idx.iter().all(|&i| y[i] == y[idx[0]]);
        if depth >= params.max_depth || idx.len() < params.min_samples_split || pure {
            return at;
        }

        let Some(split) = best_split(x, y, &idx, params.min_samples_leaf) else {
            return at;
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = idx
            .into_iter()
            .partition(|&i| x[i][split.feature] <= split.threshold);

        let left = self.grow(x, y, left_idx, depth + 1, params);
        let right = self.grow(x, y, right_idx, depth + 1, params);
        self.nodes[at] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        at
    }
}

/// Best split by `sum_l^2 / n_l + sum_r^2 / n_r`, which is maximal exactly
/// where the children's squared error is minimal.
fn best_split(x: &[Vec<f64>], y: &[f64], idx: &[usize], min_leaf: usize) -> Option<Split> {
    let n = idx.len();
    let width = x[idx[0]].len();
    let total: f64 = idx.iter().map(|&i| y[i]).sum();
    let parent_score = total * total / n as f64;

    let mut best: Option<Split> = None;
    let mut order = idx.to_vec();

    for feature in 0..width {
        order.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

        let mut left_sum = 0.0;
        for k in 1..n {
            left_sum += y[order[k - 1]];
            let lo = x[order[k - 1]][feature];
            let hi = x[order[k]][feature];
            if lo == hi || k < min_leaf || n - k < min_leaf {
                continue;
            }

            let right_sum = total - left_sum;
            let score = left_sum * left_sum / k as f64 + right_sum * right_sum / (n - k) as f64;
            if score <= parent_score + 1e-12 * parent_score.abs().max(1.0) {
                continue;
            }
            if best.as_ref().is_none_or(|b| score > b.score) {
                let mid = lo + (hi - lo) / 2.0;
                let threshold = if mid < hi { mid } else { lo };
                best = Some(Split {
                    feature,
                    threshold,
                    score,
                });
            }
        }
    }

    best
}

impl Regressor for RegressionTree {
    fn predict(&self, features: &[f64]) -> f64 {
        let mut at = 0;
        loop {
            match &self.nodes[at] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let v = features.get(*feature).copied().unwrap_or(0.0);
                    at = if v <= *threshold { *left } else { *right };
                }
            }
        }
    }
}
