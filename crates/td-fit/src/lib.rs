//! Diffusion curves for technology shares.
//!
//! This crate provides the closed-form sigmoid and linear diffusion paths and a
//! Newton-based two-point fitter for sigmoid curves with a fixed ceiling `L`.
//! Fitting retries over a fixed list of seeds and fails with
//! [`FitError::NonConvergence`] when no seed yields admissible parameters.

pub mod diffusion;
pub mod error;
pub mod fit;
pub mod jacobian;
pub mod newton;

pub use diffusion::{linear_diff, linear_fraction, sigmoid_diffusion};
pub use error::{FitError, FitResult};
pub use fit::{
    DiffusionCurveParams, FitJob, FitPlan, FitPoint, candidate_seeds, fit_batch,
    fit_sigmoid_diffusion, fit_with_retry, plan_fit,
};
pub use newton::{NewtonConfig, NewtonOutcome, newton_solve};
