//! Outlier flattening of regional indicator distributions.

/// Clip the lowest and highest `p_outlier` percent of `values` to the
/// nearest retained value.
///
/// With `n` values, `floor(n * p_outlier / 100)` values are flattened at
/// each tail. Order of the input is preserved.
pub fn flatten_outliers(values: &[f64], p_outlier: f64) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let k = ((n as f64) * p_outlier.clamp(0.0, 50.0) / 100.0).floor() as usize;
    if k == 0 || 2 * k >= n {
        return values.to_vec();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let lower = sorted[k];
    let upper = sorted[n - 1 - k];

    values.iter().map(|v| v.clamp(lower, upper)).collect()
}
