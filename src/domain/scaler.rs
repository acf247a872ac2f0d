//! Min-max feature scaling.
//!
//! Fitted on training rows, then applied unchanged at inference time. Each
//! column stores `(min, range)`; a constant column gets `range = 1` so it
//! maps to zero instead of dividing by zero.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    params: Vec<(f64, f64)>,
}

impl MinMaxScaler {
    /// Fits one `(min, range)` pair per column of the row-major `rows`.
    ///
    /// Returns `None` when there are no rows or the rows are ragged.
    pub fn fit(rows: &[Vec<f64>]) -> Option<Self> {
        let width = rows.first()?.len();
        if rows.iter().any(|r| r.len() != width) {
            return None;
        }

        let params = (0..width)
            .map(|c| {
                let min = rows.iter().map(|r| r[c]).fold(f64::INFINITY, f64::min);
                let max = rows.iter().map(|r| r[c]).fold(f64::NEG_INFINITY, f64::max);
                let range = max - min;
                (min, if range == 0.0 { 1.0 } else { range })
            })
            .collect();

        Some(Self { params })
    }

    /// Fits a single-column scaler over `values`.
    pub fn fit_column(values: &[f64]) -> Option<Self> {
        let rows: Vec<Vec<f64>> = values.iter().map(|&v| vec![v]).collect();
        Self::fit(&rows)
    }

    pub fn width(&self) -> usize {
        self.params.len()
    }

    pub fn params(&self) -> &[(f64, f64)] {
        &self.params
    }

    /// Scales one row. Extra trailing values beyond the fitted width are ignored.
    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(&self.params)
            .map(|(&x, &(min, range))| (x - min) / range)
            .collect()
    }

    pub fn inverse_transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(&self.params)
            .map(|(&x, &(min, range))| x * range + min)
            .collect()
    }

    /// Scales a single value using the first column.
    pub fn transform_value(&self, x: f64) -> f64 {
        self.params
            .first()
            .map(|&(min, range)| (x - min) / range)
            .unwrap_or(x)
    }

    /// Undoes [`Self::transform_value`].
    pub fn inverse_value(&self, x: f64) -> f64 {
        self.params
            .first()
            .map(|&(min, range)| x * range + min)
            .unwrap_or(x)
    }
}
