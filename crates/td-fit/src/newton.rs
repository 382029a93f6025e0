//! Damped Newton iteration for the small square systems of the fitter.

use nalgebra::{DMatrix, DVector};
use tracing::trace;

use crate::error::{FitError, FitResult};

#[derive(Debug, Clone)]
pub struct NewtonConfig {
    pub max_iterations: usize,
    /// Converged once the residual norm drops below this.
    pub tolerance: f64,
    /// Factor applied to the step length on each rejected trial.
    pub step_shrink: f64,
    pub max_step_cuts: usize,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-10,
            step_shrink: 0.5,
            max_step_cuts: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewtonOutcome {
    pub x: DVector<f64>,
    pub residual_norm: f64,
    pub iterations: usize,
}

struct Trial {
    x: DVector<f64>,
    residual: DVector<f64>,
    norm: f64,
    step: f64,
}

/// Shorten `direction` until the residual norm falls below `norm`.
fn backtrack<F>(
    x: &DVector<f64>,
    direction: &DVector<f64>,
    norm: f64,
    residual_fn: &F,
    config: &NewtonConfig,
) -> FitResult<Option<Trial>>
where
    F: Fn(&DVector<f64>) -> FitResult<DVector<f64>>,
{
    let mut step = 1.0;
    for _ in 0..config.max_step_cuts {
        let candidate = x - direction * step;
        let residual = residual_fn(&candidate)?;
        let candidate_norm = residual.norm();
        if candidate_norm.is_finite() && candidate_norm < norm {
            return Ok(Some(Trial {
                x: candidate,
                residual,
                norm: candidate_norm,
                step,
            }));
        }
        step *= config.step_shrink;
    }
    Ok(None)
}

/// Find a root of `residual_fn` starting at `x0`.
///
/// Fails with [`FitError::Numeric`] on a singular Jacobian or a non-finite
/// start, and with [`FitError::ConvergenceFailed`] when no shortened step
/// reduces the residual or the iteration budget runs out.
pub fn newton_solve<F, J>(
    x0: DVector<f64>,
    residual_fn: F,
    jacobian_fn: J,
    config: &NewtonConfig,
) -> FitResult<NewtonOutcome>
where
    F: Fn(&DVector<f64>) -> FitResult<DVector<f64>>,
    J: Fn(&DVector<f64>) -> FitResult<DMatrix<f64>>,
{
    let mut x = x0;
    let mut residual = residual_fn(&x)?;
    let mut norm = residual.norm();
    if !norm.is_finite() {
        return Err(FitError::Numeric {
            what: format!("residual at seed {:?} is not finite", x.as_slice()),
        });
    }

    let mut iterations = 0;
    while norm >= config.tolerance {
        if iterations == config.max_iterations {
            return Err(FitError::ConvergenceFailed {
                what: format!("no root after {iterations} iterations, residual {norm:e}"),
            });
        }

        let direction = jacobian_fn(&x)?
            .lu()
            .solve(&residual)
            .ok_or_else(|| FitError::Numeric {
                what: "singular Jacobian".to_string(),
            })?;

        let Some(trial) = backtrack(&x, &direction, norm, &residual_fn, config)? else {
            return Err(FitError::ConvergenceFailed {
                what: format!("step rejected at iteration {iterations}, residual {norm:e}"),
            });
        };
        iterations += 1;
        trace!(iterations, step = trial.step, residual = trial.norm, "newton step");

        x = trial.x;
        residual = trial.residual;
        norm = trial.norm;
    }

    Ok(NewtonOutcome {
        x,
        residual_norm: norm,
        iterations,
    })
}
