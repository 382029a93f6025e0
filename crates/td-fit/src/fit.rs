//! Two-point sigmoid fitting with a fixed ceiling.
//!
//! The curve `y(t) = L / (1 + exp(-k (t - x0)))` with `t = year - year_offset`
//! is fit through a start and an end point. Residuals are taken in log-odds
//! space, `ln(L / y - 1) + k (t - x0)`, which keeps the system well scaled
//! across seeds.

use nalgebra::DVector;
use rayon::prelude::*;
use td_core::{TechKey, Year};
use td_scenario::FitConfig;
use tracing::{debug, error, trace};

use crate::error::{FitError, FitResult};
use crate::jacobian::finite_difference_jacobian;
use crate::newton::{NewtonConfig, newton_solve};

const FD_EPSILON: f64 = 1e-7;

/// Fitted diffusion curve of one technology.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffusionCurveParams {
    pub midpoint: f64,
    pub steepness: f64,
    /// Maximum theoretical share.
    pub l_parameter: f64,
}

impl DiffusionCurveParams {
    pub fn evaluate(&self, year: Year, year_offset: Year) -> f64 {
        let t = f64::from(year) - f64::from(year_offset);
        self.l_parameter / (1.0 + (-self.steepness * (t - self.midpoint)).exp())
    }
}

/// Observed share of a technology in a year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitPoint {
    pub year: Year,
    pub share: f64,
}

impl FitPoint {
    pub fn new(year: Year, share: f64) -> Self {
        Self { year, share }
    }
}

/// How the share of a technology moves between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitPlan {
    Sigmoid {
        start: FitPoint,
        end: FitPoint,
        l_parameter: f64,
    },
    /// No increasing transition to fit.
    Linear,
}

/// Prepare the two fitting points of a technology.
///
/// The end share is kept strictly below the ceiling. A technology entering
/// the market after `start.year` starts from a negligible share at its entry
/// year; a zero start share is lifted to the same negligible value.
pub fn plan_fit(
    start: FitPoint,
    end: FitPoint,
    l_parameter: f64,
    market_entry: Year,
    config: &FitConfig,
) -> FitPlan {
    let negligible = config.negligible_share;
    if end.year <= start.year || l_parameter <= negligible {
        return FitPlan::Linear;
    }

    let first = if market_entry > start.year {
        if market_entry >= end.year {
            return FitPlan::Linear;
        }
        FitPoint::new(market_entry, negligible)
    } else {
        FitPoint::new(start.year, start.share.max(negligible))
    };
    let target = end.share.min(l_parameter - negligible);

    if target <= first.share {
        return FitPlan::Linear;
    }

    FitPlan::Sigmoid {
        start: first,
        end: FitPoint::new(end.year, target),
        l_parameter,
    }
}

/// Starting `(midpoint, steepness)` pairs, tried in order.
pub fn candidate_seeds() -> Vec<(f64, f64)> {
    let mut seeds: Vec<f64> = vec![1.0, 0.001, 0.01, 0.1, 60.0, 100.0, 200.0, 400.0, 500.0, 1000.0];
    seeds.extend((0..100).map(|i| 0.05 * f64::from(i)));
    seeds.extend((1..=58).map(f64::from));
    seeds.into_iter().map(|s| (s, s)).collect()
}

/// One Newton fit from `seed`.
pub fn fit_sigmoid_diffusion(
    start: FitPoint,
    end: FitPoint,
    l_parameter: f64,
    seed: (f64, f64),
    config: &FitConfig,
) -> FitResult<DiffusionCurveParams> {
    let points = [start, end].map(|p| {
        (
            f64::from(p.year) - f64::from(config.year_offset),
            (l_parameter / p.share - 1.0).ln(),
        )
    });
    if points.iter().any(|(_, log_odds)| !log_odds.is_finite()) {
        return Err(FitError::InvalidInput {
            what: format!(
                "shares {} and {} must lie in (0, {l_parameter})",
                start.share, end.share
            ),
        });
    }

    let residual = |x: &DVector<f64>| -> FitResult<DVector<f64>> {
        let (midpoint, steepness) = (x[0], x[1]);
        Ok(DVector::from_iterator(
            points.len(),
            points
                .iter()
                .map(|(t, log_odds)| log_odds + steepness * (t - midpoint)),
        ))
    };
    let jacobian = |x: &DVector<f64>| finite_difference_jacobian(x, residual, FD_EPSILON);

    let newton = NewtonConfig {
        max_iterations: config.max_newton_iterations,
        ..NewtonConfig::default()
    };
    let solution = newton_solve(
        DVector::from_vec(vec![seed.0, seed.1]),
        residual,
        jacobian,
        &newton,
    )?;

    Ok(DiffusionCurveParams {
        midpoint: solution.x[0],
        steepness: solution.x[1],
        l_parameter,
    })
}

fn admissible(params: &DiffusionCurveParams, seed: (f64, f64), config: &FitConfig) -> bool {
    let inside = |v: f64| v > config.fit_crit_b && v < config.fit_crit_a;
    inside(params.midpoint)
        && inside(params.steepness)
        && params.midpoint != seed.0
        && params.steepness != seed.1
}

/// Fit with every candidate seed until one yields admissible parameters.
pub fn fit_with_retry(
    key: &TechKey,
    start: FitPoint,
    end: FitPoint,
    l_parameter: f64,
    config: &FitConfig,
) -> FitResult<DiffusionCurveParams> {
    let seeds = candidate_seeds();
    for (attempt, seed) in seeds.iter().enumerate() {
        match fit_sigmoid_diffusion(start, end, l_parameter, *seed, config) {
            Ok(params) if admissible(&params, *seed, config) => {
                debug!(
                    region = %key.share.region,
                    enduse = %key.share.enduse,
                    technology = %key.technology,
                    attempt,
                    midpoint = params.midpoint,
                    steepness = params.steepness,
                    l_parameter,
                    "sigmoid fit accepted"
                );
                return Ok(params);
            }
            Ok(params) => trace!(
                technology = %key.technology,
                attempt,
                midpoint = params.midpoint,
                steepness = params.steepness,
                "fit outside admissible range"
            ),
            Err(e) => trace!(technology = %key.technology, attempt, error = %e, "fit attempt failed"),
        }
    }

    error!(
        region = %key.share.region,
        sector = %key.share.sector,
        enduse = %key.share.enduse,
        technology = %key.technology,
        attempts = seeds.len(),
        "sigmoid fit exhausted all seeds"
    );
    Err(FitError::NonConvergence {
        region: key.share.region.clone(),
        sector: key.share.sector.clone(),
        enduse: key.share.enduse.clone(),
        technology: key.technology.clone(),
        attempts: seeds.len(),
    })
}

/// One technology transition to fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FitJob {
    pub key: TechKey,
    pub start: FitPoint,
    pub end: FitPoint,
    pub l_parameter: f64,
}

/// Fit all jobs in parallel. The first exhausted fit aborts the batch.
pub fn fit_batch(jobs: &[FitJob], config: &FitConfig) -> FitResult<Vec<DiffusionCurveParams>> {
    jobs.par_iter()
        .map(|job| fit_with_retry(&job.key, job.start, job.end, job.l_parameter, config))
        .collect()
}
