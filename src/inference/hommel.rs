//! Hommel value
//!
//! The Hommel value `h` is the size of the largest set of hypotheses that
//! the closed Simes test cannot reject at level `alpha`. It is found from the
//! sorted p-values in one pass after sorting.
//!
//! Reference: Meijer RJ, Krebs TJP, Goeman JJ. A shortcut for Hommel's
//! procedure in linearithmic time. arXiv:1710.08273, 2017.

use crate::stats::Sidedness;

/// Hommel value of a set of z-scores, in `[0, m]`
///
/// Scores need not be sorted. `alpha` is not validated here; callers are
/// expected to reject values outside `(0, 1)` before calling.
pub fn hommel_value(scores: &[f64], alpha: f64, sidedness: Sidedness) -> usize {
    let mut p_vals: Vec<f64> = scores.iter().map(|&z| sidedness.p_value(z)).collect();
    p_vals.sort_by(|a, b| a.total_cmp(b));
    hommel_value_sorted(&p_vals, alpha)
}

/// Hommel value from ascending p-values
pub(crate) fn hommel_value_sorted(p_vals: &[f64], alpha: f64) -> usize {
    let m = p_vals.len();
    if m == 0 {
        return 0;
    }
    if m == 1 {
        return usize::from(p_vals[0] > alpha);
    }
    if p_vals[0] > alpha {
        return m;
    }
    if p_vals[m - 1] < alpha {
        return 0;
    }

    // Steepest line through (m, alpha) that stays under every p_(i), i < m
    let max_slope = p_vals[..m - 1]
        .iter()
        .enumerate()
        .map(|(i, &p)| (alpha - p) / (m - 1 - i) as f64)
        .fold(f64::NEG_INFINITY, f64::max);

    if max_slope <= 0.0 {
        return m;
    }

    let h = (alpha / max_slope).trunc();
    if h >= m as f64 {
        m
    } else {
        h as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::isf;

    const P_VALUES: [f64; 7] = [1.0e-8, 0.01, 0.08, 0.1, 0.5, 0.7, 0.9];

    #[test]
    fn test_hommel_shortcut_reference_values() {
        let z: Vec<f64> = P_VALUES.iter().map(|&p| isf(p)).collect();
        let cases = [
            (1.0e-9, 7),
            (1.0e-7, 6),
            (0.059, 6),
            (0.061, 5),
            (0.249, 5),
            (0.251, 4),
            (0.399, 4),
            (0.401, 3),
            (0.899, 3),
            (0.901, 0),
        ];
        for &(alpha, expected) in &cases {
            assert_eq!(hommel_value(&z, alpha, Sidedness::OneSided), expected, "alpha={}", alpha);
        }
    }

    #[test]
    fn test_order_does_not_matter() {
        let mut z: Vec<f64> = P_VALUES.iter().map(|&p| isf(p)).collect();
        z.reverse();
        z.swap(1, 4);
        assert_eq!(hommel_value(&z, 0.061, Sidedness::OneSided), 5);
    }

    #[test]
    fn test_degenerate_sizes() {
        assert_eq!(hommel_value(&[], 0.05, Sidedness::OneSided), 0);
        assert_eq!(hommel_value(&[isf(0.01)], 0.05, Sidedness::OneSided), 0);
        assert_eq!(hommel_value(&[isf(0.2)], 0.05, Sidedness::OneSided), 1);
    }

    #[test]
    fn test_bounded_by_count() {
        let z: Vec<f64> = (0..50).map(|i| 4.0 - i as f64 * 0.1).collect();
        for &alpha in &[0.001, 0.01, 0.05, 0.2, 0.5] {
            assert!(hommel_value(&z, alpha, Sidedness::TwoSided) <= z.len());
        }
    }

    #[test]
    fn test_two_sided_uses_magnitude() {
        let z: Vec<f64> = P_VALUES.iter().map(|&p| -isf(p / 2.0)).collect();
        assert_eq!(hommel_value(&z, 0.061, Sidedness::TwoSided), 5);
        assert_eq!(hommel_value(&z, 0.251, Sidedness::TwoSided), 4);
    }
}
