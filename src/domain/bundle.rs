//! The persisted unit needed to reproduce a prediction.

use serde::{Deserialize, Serialize};

use crate::domain::error::StockcastError;
use crate::domain::features::{FEATURE_COLUMNS, FeatureColumn, FeatureRow};
use crate::domain::model::{Model, Regressor};
use crate::domain::scaler::MinMaxScaler;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    pub model: Model,
    pub scaler_x: MinMaxScaler,
    pub scaler_y: MinMaxScaler,
    pub feature_cols: Vec<FeatureColumn>,
}

impl ModelBundle {
    /// Checks that the scalers, model and column list agree with the
    /// columns the feature pipeline produces, in the same order.
    pub fn validate(&self) -> Result<(), StockcastError> {
        if self.feature_cols.as_slice() != FEATURE_COLUMNS.as_slice() {
            let got: Vec<String> = self.feature_cols.iter().map(|c| c.to_string()).collect();
            return Err(StockcastError::ModelInvalid {
                reason: format!("unexpected feature columns [{}]", got.join(", ")),
            });
        }
        if self.scaler_x.width() != self.feature_cols.len() {
            return Err(StockcastError::ModelInvalid {
                reason: format!(
                    "feature scaler has {} columns, bundle lists {}",
                    self.scaler_x.width(),
                    self.feature_cols.len()
                ),
            });
        }
        if self.scaler_y.width() != 1 {
            return Err(StockcastError::ModelInvalid {
                reason: format!("target scaler has {} columns, expected 1", self.scaler_y.width()),
            });
        }
        self.model.validate(self.feature_cols.len())
    }

    /// Scales `row`, runs the model and maps the output back to price units.
    pub fn predict_row(&self, row: &FeatureRow) -> Result<f64, StockcastError> {
        let raw = row.vector(&self.feature_cols);
        let scaled = self.scaler_x.transform(&raw);
        let output = self.model.predict(&scaled);
        let price = self.scaler_y.inverse_value(output);
        if !price.is_finite() {
            return Err(StockcastError::ModelInvalid {
                reason: format!("model produced a non-finite prediction ({})", price),
            });
        }
        Ok(price)
    }
}
