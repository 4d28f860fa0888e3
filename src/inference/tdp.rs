//! True discovery proportion bound
//!
//! Given the Hommel value `h` of the whole family, the number of true
//! discoveries in any subset `S` is at least
//!
//! `max_u  1 - u + #{i in S : ceil(h * p_i / alpha) <= u}`
//!
//! simultaneously over all subsets with probability `1 - alpha`.

use crate::stats::Sidedness;

/// Lower bound on the proportion of true discoveries among `scores`
pub fn true_discovery_proportion(scores: &[f64], hommel: usize, alpha: f64, sidedness: Sidedness) -> f64 {
    let mut p_vals: Vec<f64> = scores.iter().map(|&z| sidedness.p_value(z)).collect();
    p_vals.sort_by(|a, b| a.total_cmp(b));
    tdp_sorted(&p_vals, hommel, alpha)
}

/// Same bound from ascending p-values
///
/// Cutoffs are floored at 1 so that `h = 0` yields a proportion of exactly 1
/// rather than counting from `u = 0`, which would exceed the set size.
pub(crate) fn tdp_sorted(p_vals: &[f64], hommel: usize, alpha: f64) -> f64 {
    let n = p_vals.len();
    if n == 0 {
        return 0.0;
    }

    let h = hommel as f64;
    // Rank at which each p-value starts counting; u >= 1
    let cutoff = |p: f64| (h * p / alpha).ceil().max(1.0);

    let mut best = f64::NEG_INFINITY;
    for i in 0..n {
        let c = cutoff(p_vals[i]);
        // Evaluate once per distinct cutoff, after its last member
        if i + 1 == n || cutoff(p_vals[i + 1]) != c {
            best = best.max(1.0 - c + (i + 1) as f64);
        }
    }

    (best / n as f64).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::isf;

    #[test]
    fn test_strong_cluster_is_fully_active() {
        let p = vec![2.9e-7; 8];
        assert_eq!(tdp_sorted(&p, 982, 0.05), 1.0);
    }

    #[test]
    fn test_weak_singleton_has_no_guarantee() {
        assert_eq!(tdp_sorted(&[0.00101], 982, 0.05), 0.0);
    }

    #[test]
    fn test_zero_hommel_value_guarantees_everything() {
        assert_eq!(tdp_sorted(&[0.01, 0.3, 0.9], 0, 0.05), 1.0);
    }

    #[test]
    fn test_mixed_cluster_partial_guarantee() {
        // h = 10, alpha = 0.1: cutoffs are ceil(100 * p)
        // p = [0.001, 0.001, 0.015, 0.5] -> c = [1, 1, 2, 50]
        // u=1: 1-1+2 = 2, u=2: 1-2+3 = 2, u=50: 1-50+4 < 0
        let p = [0.001, 0.001, 0.015, 0.5];
        assert!((tdp_sorted(&p, 10, 0.1) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_set() {
        assert_eq!(tdp_sorted(&[], 3, 0.05), 0.0);
    }

    #[test]
    fn test_scores_are_sorted_internally() {
        let z = [isf(0.5), isf(0.001), isf(0.015), isf(0.001)];
        let tdp = true_discovery_proportion(&z, 10, 0.1, Sidedness::OneSided);
        assert!((tdp - 0.5).abs() < 1e-12);
    }
}
