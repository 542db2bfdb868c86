//! Dense linear algebra on the covariance matrix, delegated to `nalgebra`.

use nalgebra as na;
use ndarray::Array2;

use crate::error::{ensure_finite, AlaamError, Result};

fn to_na(m: &Array2<f64>) -> na::DMatrix<f64> {
    na::DMatrix::from_fn(m.nrows(), m.ncols(), |i, j| m[[i, j]])
}

fn from_na(m: &na::DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

/// Reciprocal of the 2-norm condition number, `s_min / s_max`.
///
/// Returns 0 for a zero or non-finite matrix, so any comparison against a
/// tolerance treats it as singular.
pub fn reciprocal_condition_number(m: &Array2<f64>) -> f64 {
    if m.is_empty() || m.iter().any(|v| !v.is_finite()) {
        return 0.0;
    }
    let sv = to_na(m).singular_values();
    let (s_max, s_min) = (sv.max(), sv.min());
    if s_max <= 0.0 {
        0.0
    } else {
        s_min / s_max
    }
}

pub fn inverse(m: &Array2<f64>) -> Result<Array2<f64>> {
    if m.nrows() != m.ncols() {
        return Err(AlaamError::DimensionMismatch {
            what: "square matrix",
            expected: m.nrows(),
            found: m.ncols(),
        });
    }
    let inv = to_na(m)
        .try_inverse()
        .ok_or(AlaamError::Numerical {
            context: "covariance inverse",
            iteration: 0,
            parameter: 0,
            value: f64::NAN,
        })?;
    ensure_finite(inv.as_slice(), "covariance inverse", 0)?;
    Ok(from_na(&inv))
}
