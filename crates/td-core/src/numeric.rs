//! Float comparison and share arithmetic.

/// Tolerance on the sum of technology service shares of one enduse.
pub const SHARE_SUM_TOL: f64 = 1e-9;

/// Tolerance on regional capacity allocations summing to the global value,
/// relative to the global value (or absolute below 1).
pub const CAPACITY_SUM_TOL: f64 = 1e-6;

/// Absolute and relative comparison bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub abs: f64,
    pub rel: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

impl Tolerances {
    pub const fn absolute(abs: f64) -> Self {
        Self { abs, rel: 0.0 }
    }
}

/// `a` and `b` agree within either bound of `tol`.
pub fn nearly_equal(a: f64, b: f64, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    diff <= tol.abs || diff <= tol.rel * a.abs().max(b.abs())
}

/// Whether a share total is one within [`SHARE_SUM_TOL`].
pub fn sums_to_one(total: f64) -> bool {
    nearly_equal(total, 1.0, Tolerances::absolute(SHARE_SUM_TOL))
}

/// Whether regional parts add back up to `global` within [`CAPACITY_SUM_TOL`].
pub fn conserves(total: f64, global: f64) -> bool {
    nearly_equal(
        total,
        global,
        Tolerances::absolute(CAPACITY_SUM_TOL * global.abs().max(1.0)),
    )
}

/// Linear interpolation between `a` and `b` at `t` in `[0, 1]`.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn relative_bound_scales_with_magnitude() {
        let tol = Tolerances::default();
        assert!(nearly_equal(1e6, 1e6 + 1e-4, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn absolute_bound_ignores_magnitude() {
        let tol = Tolerances::absolute(1e-9);
        assert!(nearly_equal(0.3, 0.3 + 5e-10, tol));
        assert!(!nearly_equal(1e6, 1e6 + 1e-3, tol));
    }

    #[test]
    fn share_totals() {
        assert!(sums_to_one(0.1 + 0.2 + 0.7));
        assert!(!sums_to_one(0.999));
    }

    #[test]
    fn capacity_bound_is_relative_to_global() {
        assert!(conserves(1e5 + 0.05, 1e5));
        assert!(!conserves(1e5 + 1.0, 1e5));
        assert!(conserves(1e-7, 0.0));
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp(0.2, 0.6, 0.0), 0.2);
        assert_eq!(lerp(0.2, 0.6, 1.0), 0.6);
        assert!((lerp(0.2, 0.6, 0.25) - 0.3).abs() < 1e-15);
    }

    proptest! {
        #[test]
        fn nearly_equal_is_symmetric(
            a in -1e9f64..1e9,
            b in -1e9f64..1e9,
            abs in 0.0f64..1.0,
            rel in 0.0f64..1e-3,
        ) {
            let tol = Tolerances { abs, rel };
            prop_assert_eq!(nearly_equal(a, b, tol), nearly_equal(b, a, tol));
            prop_assert!(nearly_equal(a, a, tol));
        }

        #[test]
        fn lerp_stays_between_endpoints(a in 0.0f64..1.0, b in 0.0f64..1.0, t in 0.0f64..=1.0) {
            let v = lerp(a, b, t);
            prop_assert!(v >= a.min(b) - 1e-15 && v <= a.max(b) + 1e-15);
        }

        #[test]
        fn normalised_weights_sum_to_one(weights in prop::collection::vec(0.01f64..1.0, 1..12)) {
            let total: f64 = weights.iter().sum();
            prop_assert!(sums_to_one(weights.iter().map(|w| w / total).sum()));
        }
    }
}
