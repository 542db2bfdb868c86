//! Summary statistics over sampled theta and statistic trajectories.

use ndarray::prelude::*;
use ndarray_stats::CorrelationExt;

use crate::error::{AlaamError, Result};

/// Sign with `sign(0) == 0`, unlike [`f64::signum`].
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Column means and population standard deviations (ddof = 0) of a
/// samples × parameters matrix.
pub fn column_mean_std(samples: &Array2<f64>) -> Result<(Array1<f64>, Array1<f64>)> {
    let mean = samples
        .mean_axis(Axis(0))
        .ok_or_else(|| AlaamError::Configuration("no samples to average".to_string()))?;
    let std = samples.std_axis(Axis(0), 0.0);
    Ok((mean, std))
}

/// Population covariance (divisor = number of rows) of a samples × parameters
/// matrix, computed from centred data.
pub fn population_covariance(samples: &Array2<f64>) -> Result<Array2<f64>> {
    samples
        .t()
        .cov(0.0)
        .map_err(|e| AlaamError::Configuration(format!("covariance of empty sample: {e}")))
}

/// Running sum of elementwise products of consecutive vectors, used to detect
/// when a Robbins-Monro subphase has started oscillating around its target.
#[derive(Debug, Clone, PartialEq)]
pub struct SuccessiveProducts {
    previous: Array1<f64>,
    sum: Array1<f64>,
}

impl SuccessiveProducts {
    /// Starts with an all-zero "previous" vector.
    pub fn new(n_params: usize) -> Self {
        Self {
            previous: Array1::zeros(n_params),
            sum: Array1::zeros(n_params),
        }
    }

    pub fn push(&mut self, current: &Array1<f64>) {
        self.sum += &(current * &self.previous);
        self.previous.assign(current);
    }

    #[cfg(test)]
    fn sum(&self) -> &Array1<f64> {
        &self.sum
    }

    /// True while every coordinate of the running sum is strictly negative.
    pub fn all_negative(&self) -> bool {
        self.sum.iter().all(|&v| v < 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn sign_of_zero_is_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-0.0), 0.0);
        assert_eq!(sign(3.5), 1.0);
        assert_eq!(sign(-1e-300), -1.0);
    }

    #[test]
    fn mean_and_population_std() {
        let samples = array![[1.0, 10.0], [3.0, 10.0], [5.0, 10.0]];
        let (mean, std) = column_mean_std(&samples).unwrap();
        assert_abs_diff_eq!(mean[0], 3.0);
        assert_abs_diff_eq!(mean[1], 10.0);
        assert_abs_diff_eq!(std[0], (8.0f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(std[1], 0.0);
    }

    #[test]
    fn covariance_matches_moment_formula() {
        let z = array![[1.0, 2.0], [2.0, 1.0], [4.0, 5.0], [3.0, 0.0]];
        let cov = population_covariance(&z).unwrap();
        // (1/T) Z'Z - mean mean'
        let t = z.nrows() as f64;
        let mean = z.mean_axis(Axis(0)).unwrap();
        let moment = z.t().dot(&z) / t;
        for i in 0..2 {
            for j in 0..2 {
                assert_abs_diff_eq!(
                    cov[[i, j]],
                    moment[[i, j]] - mean[i] * mean[j],
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn constant_column_has_zero_variance() {
        let z = array![[3.0], [3.0], [3.0]];
        let cov = population_covariance(&z).unwrap();
        assert_eq!(cov[[0, 0]], 0.0);
    }

    #[test]
    fn successive_products_flag_sign_changes() {
        let mut sp = SuccessiveProducts::new(2);
        sp.push(&array![1.0, 1.0]);
        // first product is against the zero vector
        assert_eq!(sp.sum(), &array![0.0, 0.0]);
        assert!(!sp.all_negative());
        sp.push(&array![-1.0, -2.0]);
        assert_eq!(sp.sum(), &array![-1.0, -2.0]);
        assert!(sp.all_negative());
        sp.push(&array![-3.0, 1.0]);
        assert_eq!(sp.sum(), &array![2.0, -4.0]);
        assert!(!sp.all_negative());
    }
}
