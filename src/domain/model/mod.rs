//! Regression models that map a scaled feature vector to a scaled target.

pub mod forest;
pub mod linear;
pub mod tree;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::StockcastError;
use forest::{ForestParams, RandomForest};
use linear::LinearModel;
use tree::TreeParams;

pub trait Regressor {
    fn predict(&self, features: &[f64]) -> f64;
}

/// A fitted model as stored in the bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Model {
    RandomForest(RandomForest),
    Linear(LinearModel),
}

impl Regressor for Model {
    fn predict(&self, features: &[f64]) -> f64 {
        match self {
            Model::RandomForest(m) => m.predict(features),
            Model::Linear(m) => m.predict(features),
        }
    }
}

impl Model {
    /// Structural check against the number of input features.
    pub fn validate(&self, width: usize) -> Result<(), StockcastError> {
        let checked = match self {
            Model::RandomForest(m) => m.validate(width),
            Model::Linear(m) => m.validate(width),
        };
        checked.map_err(|reason| StockcastError::ModelInvalid { reason })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    RandomForest,
    Linear,
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "random_forest" | "forest" => Ok(ModelKind::RandomForest),
            "linear" | "ridge" => Ok(ModelKind::Linear),
            other => Err(format!("unknown model kind '{}'", other)),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::RandomForest => write!(f, "random_forest"),
            ModelKind::Linear => write!(f, "linear"),
        }
    }
}

/// Hyperparameters for fitting a [`Model`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelSpec {
    pub kind: ModelKind,
    pub n_estimators: usize,
    pub max_depth: usize,
    pub seed: u64,
    pub ridge_alpha: f64,
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self {
            kind: ModelKind::RandomForest,
            n_estimators: 100,
            max_depth: 10,
            seed: 42,
            ridge_alpha: 1.0,
        }
    }
}

impl ModelSpec {
    pub fn fit(&self, x: &[Vec<f64>], y: &[f64]) -> Result<Model, StockcastError> {
        if x.is_empty() || x.len() != y.len() {
            return Err(StockcastError::ModelInvalid {
                reason: format!("cannot fit on {} rows and {} targets", x.len(), y.len()),
            });
        }

        match self.kind {
            ModelKind::RandomForest => {
                let params = ForestParams {
                    n_estimators: self.n_estimators,
                    tree: TreeParams {
                        max_depth: self.max_depth,
                        ..TreeParams::default()
                    },
                    seed: self.seed,
                };
                Ok(Model::RandomForest(RandomForest::fit(x, y, &params)))
            }
            ModelKind::Linear => LinearModel::fit(x, y, self.ridge_alpha)
                .map(Model::Linear)
                .ok_or_else(|| StockcastError::ModelInvalid {
                    reason: "linear system is singular; raise ridge_alpha".to_string(),
                }),
        }
    }
}
