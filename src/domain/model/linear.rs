//! Ridge-regularised linear regression solved in closed form.
//!
//! w = (X'X + alpha * I)^-1 X'y over `[1, x...]`; the intercept is not penalised.

use serde::{Deserialize, Serialize};

use super::Regressor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    /// Returns `None` when there are no rows or the system is singular.
    pub fn fit(x: &[Vec<f64>], y: &[f64], alpha: f64) -> Option<Self> {
        let width = x.first()?.len();
        let dim = width + 1;

        let mut a = vec![vec![0.0; dim]; dim];
        let mut b = vec![0.0; dim];
        for (row, &target) in x.iter().zip(y) {
            let aug: Vec<f64> = std::iter::once(1.0).chain(row.iter().copied()).collect();
            for r in 0..dim {
                b[r] += aug[r] * target;
                for c in 0..dim {
                    a[r][c] += aug[r] * aug[c];
                }
            }
        }
        for (d, row) in a.iter_mut().enumerate().skip(1) {
            row[d] += alpha;
        }

        let w = solve(a, b)?;
        Some(Self {
            intercept: w[0],
            coefficients: w[1..].to_vec(),
        })
    }
}

impl LinearModel {
    pub fn validate(&self, width: usize) -> Result<(), String> {
        if self.coefficients.len() != width {
            return Err(format!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                width
            ));
        }
        Ok(())
    }
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for r in col + 1..n {
            let factor = a[r][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for c in col..n {
                a[r][c] -= factor * a[col][c];
            }
            b[r] -= factor * b[col];
        }
    }

    let mut w = vec![0.0; n];
    for r in (0..n).rev() {
        let tail: f64 = (r + 1..n).map(|c| a[r][c] * w[c]).sum();
        w[r] = (b[r] - tail) / a[r][r];
    }
    Some(w)
}

impl Regressor for LinearModel {
    fn predict(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn recovers_exact_relationship_without_penalty() {
        let x: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![i as f64, (i * i % 7) as f64])
            .collect();
        let y: Vec<f64> = x.iter().map(|r| 3.0 + 2.0 * r[0] - 0.5 * r[1]).collect();

        let model = LinearModel::fit(&x, &y, 0.0).unwrap();
        assert_relative_eq!(model.intercept, 3.0, epsilon = 1e-8);
        assert_relative_eq!(model.coefficients[0], 2.0, epsilon = 1e-8);
        assert_relative_eq!(model.coefficients[1], -0.5, epsilon = 1e-8);
        assert_relative_eq!(model.predict(&[10.0, 2.0]), 22.0, epsilon = 1e-8);
    }

    #[test]
    fn penalty_shrinks_coefficients() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = x.iter().map(|r| 4.0 * r[0]).collect();
        let plain = LinearModel::fit(&x, &y, 0.0).unwrap();
        let ridge = LinearModel::fit(&x, &y, 100.0).unwrap();
        assert!(ridge.coefficients[0].abs() < plain.coefficients[0].abs());
    }

    #[test]
    fn collinear_columns_need_penalty() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, i as f64]).collect();
        let y: Vec<f64> = (0..10).map(|i| i as f64).collect();
        assert!(LinearModel::fit(&x, &y, 0.0).is_none());
        assert!(LinearModel::fit(&x, &y, 1.0).is_some());
    }

    #[test]
    fn coefficient_count_must_match_width() {
        let model = LinearModel {
            intercept: 0.0,
            coefficients: vec![1.0, 2.0],
        };
        assert!(model.validate(2).is_ok());
        assert!(model.validate(10).is_err());
    }

    #[test]
    fn empty_input() {
        assert!(LinearModel::fit(&[], &[], 1.0).is_none());
    }
}
