//! Linear-interpolated percentiles

/// `q`-th percentile (0..=100) of an ascending slice, interpolating linearly
/// between the two nearest ranks. `None` for an empty slice.
pub fn percentile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 100.0);
    let pos = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// Percentile of the absolute values of `data`
pub fn abs_percentile(data: &[f64], q: f64) -> Option<f64> {
    let mut abs: Vec<f64> = data.iter().map(|v| v.abs()).filter(|v| !v.is_nan()).collect();
    abs.sort_by(|a, b| a.total_cmp(b));
    percentile_sorted(&abs, q)
}
