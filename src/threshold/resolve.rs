//! Threshold a statistic map
//!
//! Masking, height thresholding and cluster-extent filtering in one call.

use ndarray::{ArrayD, ArrayViewD};

use super::check::{check_threshold, ThresholdValue};
use super::height::{bonferroni_threshold, check_alpha, fdr_threshold, fpr_threshold, HeightControl, HeightRule};
use crate::cluster::filter::filter_small_clusters;
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::stats::Sidedness;
use crate::utils::{flatten, into_array, resolve_mask};

/// Parameters for `threshold_stats_map`
#[derive(Clone, Debug, PartialEq)]
pub struct ThresholdOptions {
    /// Explicit threshold or alpha-driven height control
    pub rule: HeightRule,
    /// Clusters with fewer voxels are removed (0 disables)
    pub cluster_threshold: usize,
    pub sidedness: Sidedness,
}

impl Default for ThresholdOptions {
    fn default() -> Self {
        Self {
            rule: HeightRule::default(),
            cluster_threshold: 0,
            sidedness: Sidedness::TwoSided,
        }
    }
}

/// Compute the height threshold and apply it to a statistic map
///
/// # Arguments
/// * `stat_map` - Voxel-wise z-scores; may be `None` for threshold-only calls
/// * `mask` - Voxels to consider (`None` = all), same shape as `stat_map`
/// * `options` - Height rule, cluster-size threshold and sidedness
/// * `diag` - Sink for non-fatal warnings
///
/// # Returns
/// (thresholded map, scalar threshold). The map is `None` when no stat map
/// was given. Voxels outside the mask or below the threshold are 0; a `+inf`
/// threshold (FDR with no discovery) zeroes the whole map.
pub fn threshold_stats_map(
    stat_map: Option<ArrayViewD<f64>>,
    mask: Option<ArrayViewD<bool>>,
    options: &ThresholdOptions,
    diag: &mut dyn Diagnostics,
) -> Result<(Option<ArrayD<f64>>, f64)> {
    let sidedness = options.sidedness;

    if let Some(alpha) = options.rule.alpha() {
        check_alpha(alpha)?;
    }

    let stat_map = match stat_map {
        Some(m) => m,
        None => {
            return match options.rule {
                HeightRule::Explicit(ThresholdValue::Value(t)) => Ok((None, t)),
                HeightRule::Explicit(ThresholdValue::Percentile(_)) => {
                    Err(Error::invalid("a stat map is required for a percentile threshold"))
                }
                HeightRule::Controlled { method: HeightControl::Fpr, alpha } => {
                    Ok((None, fpr_threshold(alpha, sidedness)))
                }
                HeightRule::Controlled { method, .. } => Err(Error::invalid(format!(
                    "a stat map is required for height control '{}'",
                    method
                ))),
            };
        }
    };

    let shape = stat_map.shape().to_vec();
    let in_mask = resolve_mask(&shape, mask.as_ref())?;
    let values = flatten(&stat_map);

    let masked: Vec<f64> = values
        .iter()
        .zip(in_mask.iter())
        .filter(|(_, &m)| m)
        .map(|(&v, _)| v)
        .collect();

    let threshold = match options.rule {
        HeightRule::Explicit(value) => check_threshold(value, &masked, diag)?,
        HeightRule::Controlled { method, alpha } => match method {
            HeightControl::Fpr => fpr_threshold(alpha, sidedness),
            HeightControl::Fdr => fdr_threshold(&masked, alpha, sidedness)?,
            HeightControl::Bonferroni => bonferroni_threshold(alpha, masked.len(), sidedness),
        },
    };

    let supra: Vec<bool> = values
        .iter()
        .zip(in_mask.iter())
        .map(|(&v, &m)| m && sidedness.is_supra(v, threshold))
        .collect();
    let mut out: Vec<f64> = values
        .iter()
        .zip(supra.iter())
        .map(|(&v, &s)| if s { v } else { 0.0 })
        .collect();

    filter_small_clusters(&mut out, &supra, &shape, options.cluster_threshold, sidedness);

    log::debug!(
        "threshold_stats_map: {:?} over {} voxels -> threshold {}, {} voxels kept",
        options.rule,
        masked.len(),
        threshold,
        out.iter().filter(|&&v| v != 0.0).count()
    );

    Ok((Some(into_array(&shape, out)?), threshold))
}

/// Loosely typed entry point mirroring the flat external interface
///
/// `height_control` of `None` requires `explicit_threshold`; an explicit
/// threshold wins when both are given.
#[allow(clippy::too_many_arguments)]
pub fn resolve_threshold(
    values: Option<ArrayViewD<f64>>,
    mask: Option<ArrayViewD<bool>>,
    alpha: Option<f64>,
    height_control: Option<&str>,
    explicit_threshold: Option<ThresholdValue>,
    cluster_threshold: usize,
    two_sided: bool,
    diag: &mut dyn Diagnostics,
) -> Result<(Option<ArrayD<f64>>, f64)> {
    let options = ThresholdOptions {
        rule: HeightRule::from_parts(alpha, height_control, explicit_threshold)?,
        cluster_threshold,
        sidedness: Sidedness::from_two_sided(two_sided),
    };
    threshold_stats_map(values, mask, &options, diag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{CollectedWarnings, LogDiagnostics, Warning};
    use crate::fixtures::{count_negative, count_positive, graded_map, set_block};
    use crate::stats::isf;
    use ndarray::{ArrayD, IxDyn};

    fn full_mask() -> ArrayD<bool> {
        ArrayD::from_elem(IxDyn(&[9, 10, 11]), true)
    }

    fn run(map: &ArrayD<f64>, mask: Option<&ArrayD<bool>>, options: ThresholdOptions) -> (ArrayD<f64>, f64) {
        let (out, t) = threshold_stats_map(
            Some(map.view()),
            mask.map(|m| m.view()),
            &options,
            &mut LogDiagnostics,
        )
        .unwrap();
        (out.unwrap(), t)
    }

    #[test]
    fn test_fpr_keeps_block() {
        let map = graded_map();
        let mask = full_mask();
        let (out, t) = run(&map, Some(&mask), ThresholdOptions { rule: HeightRule::fpr(0.001), ..Default::default() });
        assert_eq!(count_positive(&out), 8);
        assert_eq!(t, isf(0.0005));
    }

    #[test]
    fn test_excessive_explicit_threshold() {
        let map = graded_map();
        let mask = full_mask();
        let mut sink = CollectedWarnings::new();
        let options = ThresholdOptions { rule: HeightRule::explicit(100.0), ..Default::default() };

        let (out, t) = threshold_stats_map(Some(map.view()), Some(mask.view()), &options, &mut sink).unwrap();
        assert_eq!(t, 100.0);
        assert_eq!(count_positive(&out.unwrap()), 0);
        assert!(matches!(sink.warnings[..], [Warning::ThresholdAboveData { .. }]));
    }

    #[test]
    fn test_excessive_cluster_threshold() {
        let map = graded_map();
        let mask = full_mask();
        let options = ThresholdOptions {
            rule: HeightRule::fpr(0.001),
            cluster_threshold: 10,
            ..Default::default()
        };
        let (out, t) = run(&map, Some(&mask), options);
        assert_eq!(count_positive(&out), 0);
        assert_eq!(t, isf(0.0005));
    }

    #[test]
    fn test_fdr_and_bonferroni_keep_block() {
        let map = graded_map();
        let mask = full_mask();
        for rule in [HeightRule::fdr(0.05), HeightRule::bonferroni(0.05)] {
            let options = ThresholdOptions { rule, cluster_threshold: 5, ..Default::default() };
            let (out, _) = run(&map, Some(&mask), options);
            assert_eq!(count_positive(&out), 8, "{:?}", rule);
        }
    }

    #[test]
    fn test_explicit_threshold_with_and_without_mask() {
        let map = graded_map();
        let mask = full_mask();
        let options = ThresholdOptions { rule: HeightRule::explicit(4.0), ..Default::default() };
        let (out, _) = run(&map, Some(&mask), options.clone());
        assert_eq!(count_positive(&out), 8);
        let (out, _) = run(&map, None, options);
        assert_eq!(count_positive(&out), 8);
    }

    #[test]
    fn test_mask_excludes_voxels() {
        let map = graded_map();
        let mut mask = full_mask();
        mask[[2, 5, 6]] = false;
        mask[[3, 6, 7]] = false;
        let options = ThresholdOptions { rule: HeightRule::explicit(4.0), ..Default::default() };
        let (out, _) = run(&map, Some(&mask), options);
        assert_eq!(count_positive(&out), 6);
        assert_eq!(out[[2, 5, 6]], 0.0);
    }

    #[test]
    fn test_without_map() {
        let mut diag = LogDiagnostics;
        let options = ThresholdOptions { rule: HeightRule::explicit(3.0), ..Default::default() };
        let (out, t) = threshold_stats_map(None, None, &options, &mut diag).unwrap();
        assert!(out.is_none());
        assert_eq!(t, 3.0);

        let options = ThresholdOptions { rule: HeightRule::fpr(0.05), ..Default::default() };
        let (out, t) = threshold_stats_map(None, None, &options, &mut diag).unwrap();
        assert!(out.is_none());
        assert!(t > 1.64);

        for rule in [HeightRule::fdr(0.05), HeightRule::bonferroni(0.05)] {
            let options = ThresholdOptions { rule, ..Default::default() };
            assert!(threshold_stats_map(None, None, &options, &mut diag).is_err());
        }
    }

    #[test]
    fn test_resolve_threshold_round_trip() {
        let mut diag = LogDiagnostics;
        for &t in &[-2.0, 0.0, 3.0, 1e6] {
            let (out, got) = resolve_threshold(None, None, None, None, Some(ThresholdValue::Value(t)), 0, true, &mut diag).unwrap();
            assert!(out.is_none());
            assert_eq!(got, t);
        }
    }

    #[test]
    fn test_resolve_threshold_rejects_bad_input() {
        let mut diag = LogDiagnostics;
        assert!(resolve_threshold(None, None, Some(0.05), Some("plop"), None, 0, true, &mut diag).is_err());
        assert!(resolve_threshold(None, None, Some(0.05), None, None, 0, true, &mut diag).is_err());
        assert!(resolve_threshold(None, None, Some(-0.1), Some("fpr"), None, 0, true, &mut diag).is_err());
        assert!(resolve_threshold(None, None, Some(1.5), Some("fpr"), None, 0, true, &mut diag).is_err());
    }

    #[test]
    fn test_fpr_two_sided_matches_half_alpha() {
        let mut diag = LogDiagnostics;
        let (_, t) = resolve_threshold(None, None, Some(0.1), Some("fpr"), None, 0, true, &mut diag).unwrap();
        assert_eq!(t, isf(0.05));
    }

    #[test]
    fn test_mask_shape_mismatch() {
        let map = graded_map();
        let mask = ArrayD::from_elem(IxDyn(&[9, 10, 10]), true);
        let options = ThresholdOptions { rule: HeightRule::explicit(4.0), ..Default::default() };
        let res = threshold_stats_map(Some(map.view()), Some(mask.view()), &options, &mut LogDiagnostics);
        assert!(matches!(res, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_one_sided_fpr() {
        let map = graded_map();
        let mask = full_mask();
        let options = ThresholdOptions {
            rule: HeightRule::fpr(0.001),
            cluster_threshold: 10,
            sidedness: Sidedness::OneSided,
        };
        let (_, t) = run(&map, Some(&mask), options);
        assert_eq!(t, isf(0.001));
    }

    #[test]
    fn test_two_sided_keeps_negative_block() {
        let mut map = graded_map();
        set_block(&mut map, [0..2, 0..2, 6..8], -5.0);
        let mask = full_mask();

        for rule in [HeightRule::fdr(0.05), HeightRule::bonferroni(0.05)] {
            let two = ThresholdOptions { rule, cluster_threshold: 5, sidedness: Sidedness::TwoSided };
            let (out, _) = run(&map, Some(&mask), two);
            assert_eq!(count_positive(&out), 8);
            assert_eq!(count_negative(&out), 8);

            let one = ThresholdOptions { rule, cluster_threshold: 5, sidedness: Sidedness::OneSided };
            let (out, _) = run(&map, Some(&mask), one);
            assert_eq!(count_positive(&out), 8);
            assert_eq!(count_negative(&out), 0);
        }
    }

    #[test]
    fn test_fdr_without_discovery_zeroes_map() {
        let map = graded_map().mapv(|v| v.clamp(-1.0, 1.0));
        let options = ThresholdOptions { rule: HeightRule::fdr(0.05), ..Default::default() };
        let (out, t) = run(&map, None, options);
        assert_eq!(t, f64::INFINITY);
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_percentile_threshold() {
        let map = graded_map();
        let mask = full_mask();
        // the 8-voxel block of 5.0 is the top of |z|; 99.5% of 990 lands inside it
        let options = ThresholdOptions { rule: HeightRule::percentile(99.5), ..Default::default() };
        let (out, t) = run(&map, Some(&mask), options);
        assert_eq!(t, 5.0);
        assert_eq!(count_positive(&out), 8);

        let mut diag = LogDiagnostics;
        let (out, t) = resolve_threshold(
            Some(map.view()), None, None, None, Some("99.5%".parse().unwrap()), 0, true, &mut diag,
        )
        .unwrap();
        assert_eq!(t, 5.0);
        assert_eq!(count_positive(&out.unwrap()), 8);

        let options = ThresholdOptions { rule: HeightRule::percentile(99.5), ..Default::default() };
        assert!(threshold_stats_map(None, None, &options, &mut diag).is_err());
    }

    #[test]
    fn test_non_positive_threshold_clusters_on_supra_voxels() {
        let map = ArrayD::from_shape_vec(IxDyn(&[5]), vec![4.0, 4.0, -0.5, 4.0, 4.0]).unwrap();
        let options = ThresholdOptions {
            rule: HeightRule::explicit(-1.0),
            cluster_threshold: 3,
            sidedness: Sidedness::OneSided,
        };
        let (out, _) = run(&map, None, options.clone());
        assert_eq!(out.iter().copied().collect::<Vec<f64>>(), vec![4.0, 4.0, -0.5, 4.0, 4.0]);

        let options = ThresholdOptions { cluster_threshold: 6, ..options };
        let (out, _) = run(&map, None, options);
        assert!(out.iter().all(|&v| v == 0.0));
    }
}
