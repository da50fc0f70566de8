//! Per-feature standardization.
//!
//! Provides a `Scaler` holding mean/std per column. It is fit on the training
//! partition only and then applied unchanged to both partitions, so test rows
//! never influence the statistics.

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// Simple standard scaler (per-column mean/std).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f32>,
    pub std: Vec<f32>,
}

impl Scaler {
    /// Variance floor applied before the square root.
    pub const MIN_VARIANCE: f64 = 1e-12;

    /// Fit a `Scaler` where rows are samples and columns are features.
    ///
    /// Statistics use the population variance and are accumulated in f64.
    /// An empty matrix yields mean 0 / std 1 for every column.
    pub fn fit(x: &Array2<f32>) -> Scaler {
        let (nrows, ncols) = x.dim();
        if nrows == 0 {
            return Scaler {
                mean: vec![0.0; ncols],
                std: vec![1.0; ncols],
            };
        }

        let nrows_f = nrows as f64;
        let mut mean = Vec::with_capacity(ncols);
        let mut std = Vec::with_capacity(ncols);
        for column in x.axis_iter(Axis(1)) {
            let m = column.iter().map(|&v| v as f64).sum::<f64>() / nrows_f;
            let var = column
                .iter()
                .map(|&v| {
                    let d = v as f64 - m;
                    d * d
                })
                .sum::<f64>()
                / nrows_f;
            mean.push(m as f32);
            std.push(var.max(Self::MIN_VARIANCE).sqrt() as f32);
        }

        Scaler { mean, std }
    }

    /// Apply `(x - mean) / std` to every element and return a new matrix.
    pub fn transform(&self, x: &Array2<f32>) -> Array2<f32> {
        let mut out = x.clone();
        for mut row in out.axis_iter_mut(Axis(0)) {
            for (c, v) in row.iter_mut().enumerate() {
                *v = (*v - self.mean[c]) / self.std[c];
            }
        }
        out
    }

    pub fn fit_transform(x: &Array2<f32>) -> (Scaler, Array2<f32>) {
        let sc = Scaler::fit(x);
        let out = sc.transform(x);
        (sc, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_population_statistics() {
        let x = array![[1.0f32, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0]];
        let sc = Scaler::fit(&x);
        assert!((sc.mean[0] - 2.5).abs() < 1e-6);
        assert!((sc.mean[1] - 25.0).abs() < 1e-5);
        // population std of 1..4 is sqrt(1.25)
        assert!((sc.std[0] - 1.25f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_constant_column_uses_floor() {
        let x = array![[5.0f32], [5.0], [5.0]];
        let (sc, t) = Scaler::fit_transform(&x);
        assert!((sc.std[0] - 1e-6).abs() < 1e-9);
        assert!(t.iter().all(|v| v.abs() < 1e-3));
    }

    #[test]
    fn test_transform_uses_fitted_statistics() {
        let train = array![[0.0f32], [2.0]];
        let test = array![[4.0f32]];
        let sc = Scaler::fit(&train);
        let t = sc.transform(&test);
        assert!((t[[0, 0]] - 3.0).abs() < 1e-6);
    }
}
