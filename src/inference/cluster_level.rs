//! Cluster-level inference
//!
//! For every candidate cluster-forming threshold the supra-threshold map is
//! split into clusters, and each cluster receives the true discovery
//! proportion it is guaranteed to contain. A voxel that belongs to clusters
//! at several thresholds keeps the largest guarantee.

use ndarray::{ArrayD, ArrayViewD};

use crate::cluster::filter::find_clusters;
use crate::error::{Error, Result};
use crate::stats::{Sign, Sidedness};
use crate::threshold::height::check_alpha;
use crate::utils::{flatten, into_array, resolve_mask};

use super::hommel::hommel_value_sorted;
use super::tdp::tdp_sorted;

/// Parameters for cluster-level inference
#[derive(Clone, Debug, PartialEq)]
pub struct InferenceParams {
    /// Cluster-forming thresholds, visited in the given order
    pub thresholds: Vec<f64>,
    /// Family-wise error level of the guarantee, in (0, 1)
    pub alpha: f64,
    pub sidedness: Sidedness,
}

impl Default for InferenceParams {
    fn default() -> Self {
        Self {
            thresholds: vec![3.0],
            alpha: 0.05,
            sidedness: Sidedness::OneSided,
        }
    }
}

impl InferenceParams {
    pub fn new(thresholds: &[f64], alpha: f64) -> Self {
        Self { thresholds: thresholds.to_vec(), alpha, ..Default::default() }
    }

    fn validate(&self) -> Result<()> {
        check_alpha(self.alpha)?;
        if self.thresholds.is_empty() {
            return Err(Error::invalid("at least one cluster-forming threshold is required"));
        }
        if let Some(t) = self.thresholds.iter().find(|t| t.is_nan()) {
            return Err(Error::invalid(format!("cluster-forming threshold must be a number, got {}", t)));
        }
        Ok(())
    }
}

/// Guarantee attached to one supra-threshold cluster
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterGuarantee {
    /// Cluster-forming threshold that produced the cluster
    pub threshold: f64,
    pub sign: Sign,
    /// Flat row-major voxel indices
    pub voxels: Vec<usize>,
    /// Lower bound on the proportion of truly active voxels, in [0, 1]
    pub proportion: f64,
}

impl ClusterGuarantee {
    pub fn size(&self) -> usize {
        self.voxels.len()
    }
}

/// Guarantee for every cluster at every candidate threshold
///
/// The Hommel value is computed once over all masked voxels; each cluster's
/// bound uses the p-values of its own voxels.
pub fn cluster_guarantees(
    stat_map: ArrayViewD<f64>,
    mask: Option<ArrayViewD<bool>>,
    params: &InferenceParams,
) -> Result<Vec<ClusterGuarantee>> {
    cluster_guarantees_with_progress(stat_map, mask, params, |_, _| {})
}

/// `cluster_guarantees` reporting `(thresholds done, total)` after each threshold
pub fn cluster_guarantees_with_progress<F>(
    stat_map: ArrayViewD<f64>,
    mask: Option<ArrayViewD<bool>>,
    params: &InferenceParams,
    mut progress: F,
) -> Result<Vec<ClusterGuarantee>>
where
    F: FnMut(usize, usize),
{
    params.validate()?;

    let shape = stat_map.shape().to_vec();
    let in_mask = resolve_mask(&shape, mask.as_ref())?;
    let values = flatten(&stat_map);
    let sidedness = params.sidedness;
    let alpha = params.alpha;

    let mut p_vals: Vec<f64> = values
        .iter()
        .zip(in_mask.iter())
        .filter(|(_, &m)| m)
        .map(|(&v, _)| sidedness.p_value(v))
        .collect();
    p_vals.sort_by(|a, b| a.total_cmp(b));
    let hommel = hommel_value_sorted(&p_vals, alpha);

    log::debug!("cluster inference: {} voxels, hommel value {} at alpha={}", p_vals.len(), hommel, alpha);

    let n_thresholds = params.thresholds.len();
    let mut guarantees = Vec::new();
    for (t_idx, &threshold) in params.thresholds.iter().enumerate() {
        let supra: Vec<bool> = values
            .iter()
            .zip(in_mask.iter())
            .map(|(&v, &m)| m && sidedness.is_supra(v, threshold))
            .collect();

        let clusters = find_clusters(&values, &supra, &shape, sidedness);
        log::debug!("cluster inference: threshold {} -> {} clusters", threshold, clusters.len());

        for cluster in clusters {
            let mut cluster_p: Vec<f64> = cluster.voxels.iter().map(|&i| sidedness.p_value(values[i])).collect();
            cluster_p.sort_by(|a, b| a.total_cmp(b));

            guarantees.push(ClusterGuarantee {
                threshold,
                sign: cluster.sign,
                proportion: tdp_sorted(&cluster_p, hommel, alpha),
                voxels: cluster.voxels,
            });
        }
        progress(t_idx + 1, n_thresholds);
    }

    Ok(guarantees)
}

/// Map of guaranteed true discovery proportions
///
/// # Arguments
/// * `stat_map` - Voxel-wise z-scores
/// * `mask` - Voxels to consider (`None` = all)
/// * `params` - Candidate thresholds, alpha and sidedness
///
/// # Returns
/// Same-shape map; each voxel holds the maximum guarantee over the clusters
/// containing it, 0 where no threshold is survived.
pub fn cluster_level_inference(
    stat_map: ArrayViewD<f64>,
    mask: Option<ArrayViewD<bool>>,
    params: &InferenceParams,
) -> Result<ArrayD<f64>> {
    cluster_level_inference_with_progress(stat_map, mask, params, |_, _| {})
}

/// `cluster_level_inference` with a per-threshold progress callback
pub fn cluster_level_inference_with_progress<F>(
    stat_map: ArrayViewD<f64>,
    mask: Option<ArrayViewD<bool>>,
    params: &InferenceParams,
    progress: F,
) -> Result<ArrayD<f64>>
where
    F: FnMut(usize, usize),
{
    let shape = stat_map.shape().to_vec();
    let n_total: usize = shape.iter().product();

    let mut out = vec![0.0f64; n_total];
    for g in cluster_guarantees_with_progress(stat_map, mask, params, progress)? {
        for &idx in &g.voxels {
            out[idx] = out[idx].max(g.proportion);
        }
    }

    into_array(&shape, out)
}
