//! Finite difference Jacobian of a residual function.

use nalgebra::{DMatrix, DVector};

use crate::error::{FitError, FitResult};

/// Forward difference Jacobian of `f` at `x`.
///
/// Column j is `(f(x + dx e_j) - f(x)) / dx` with `dx = epsilon * max(|x_j|, 1)`.
pub fn finite_difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> FitResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> FitResult<DVector<f64>>,
{
    let f_x = f(x)?;
    let mut jac = DMatrix::zeros(f_x.len(), x.len());

    for j in 0..x.len() {
        let step = epsilon * x[j].abs().max(1.0);
        let mut shifted = x.clone();
        shifted[j] += step;

        let column = (f(&shifted)? - &f_x) / step;
        if column.iter().any(|v| !v.is_finite()) {
            return Err(FitError::Numeric {
                what: format!("non-finite Jacobian column {j}"),
            });
        }
        jac.set_column(j, &column);
    }

    Ok(jac)
}
