//! Closed-form diffusion paths.

use td_core::Year;

/// Half-width of the logistic domain the year range is mapped onto.
const SIGMOID_DOMAIN: f64 = 6.0;

/// Fraction of a transition completed at `curr_yr` along a sigmoid.
///
/// The years `base_yr..=end_yr` are mapped linearly onto `[-6, 6]`. The
/// endpoints are pinned: exactly 0 at `base_yr` and exactly 1 at `end_yr`.
/// With `end_yr == base_yr` the transition is instantaneous and every other
/// year yields 1.
pub fn sigmoid_diffusion(
    base_yr: Year,
    curr_yr: Year,
    end_yr: Year,
    midpoint: f64,
    steepness: f64,
) -> f64 {
    if curr_yr == base_yr {
        return 0.0;
    }
    if end_yr == base_yr || curr_yr == end_yr {
        return 1.0;
    }

    let span = f64::from(end_yr) - f64::from(base_yr);
    let x = -SIGMOID_DOMAIN
        + 2.0 * SIGMOID_DOMAIN * (f64::from(curr_yr) - f64::from(base_yr)) / span;
    1.0 / (1.0 + (-steepness * (x - midpoint)).exp())
}

/// Fraction of a linear transition completed at `curr_yr`, clamped to `[0, 1]`.
pub fn linear_fraction(base_yr: Year, curr_yr: Year, end_yr: Year) -> f64 {
    if curr_yr <= base_yr {
        return 0.0;
    }
    if curr_yr >= end_yr {
        return 1.0;
    }
    (f64::from(curr_yr) - f64::from(base_yr)) / (f64::from(end_yr) - f64::from(base_yr))
}

/// Linear interpolation between `value_by` at `base_yr` and `value_ey` at `end_yr`.
pub fn linear_diff(base_yr: Year, curr_yr: Year, end_yr: Year, value_by: f64, value_ey: f64) -> f64 {
    if curr_yr == base_yr {
        return value_by;
    }
    if curr_yr == end_yr {
        return value_ey;
    }
    value_by + (value_ey - value_by) * linear_fraction(base_yr, curr_yr, end_yr)
}
