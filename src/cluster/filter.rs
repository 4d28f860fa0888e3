//! Cluster-extent filtering
//!
//! Positive and negative supra-threshold regions are labelled independently,
//! so a positive blob touching a negative blob never merges with it.

use ndarray::{ArrayD, ArrayViewD};

use super::label::connected_components;
use crate::stats::{Sign, Sidedness};

/// Face-connected, same-signed set of non-zero voxels
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    pub sign: Sign,
    /// Flat row-major voxel indices
    pub voxels: Vec<usize>,
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.voxels.len()
    }
}

/// Extract the clusters of a thresholded map
///
/// Positive voxels are always labelled; negative voxels only when
/// `sidedness` is two-sided.
pub fn clusters(map: ArrayViewD<f64>, sidedness: Sidedness) -> Vec<Cluster> {
    let shape = map.shape().to_vec();
    let values: Vec<f64> = map.iter().copied().collect();
    let nonzero = nonzero_mask(&values, sidedness);
    find_clusters(&values, &nonzero, &shape, sidedness)
}

/// Voxels of an already thresholded map that belong to some cluster
fn nonzero_mask(values: &[f64], sidedness: Sidedness) -> Vec<bool> {
    values
        .iter()
        .map(|&v| sidedness.signs().iter().any(|s| s.matches(v)))
        .collect()
}

/// Label the `supra` voxels into clusters
///
/// One-sided, every supra voxel belongs to a single `Positive` region
/// whatever its sign, so thresholds at or below zero still form whole
/// clusters. Two-sided, supra voxels are split by sign (zero counts as
/// positive) and each side is labelled on its own.
pub(crate) fn find_clusters(values: &[f64], supra: &[bool], shape: &[usize], sidedness: Sidedness) -> Vec<Cluster> {
    let mut out = Vec::new();
    for &sign in sidedness.signs() {
        let binary: Vec<bool> = supra
            .iter()
            .zip(values.iter())
            .map(|(&s, &v)| {
                s && match (sidedness, sign) {
                    (Sidedness::OneSided, _) => true,
                    (Sidedness::TwoSided, Sign::Positive) => v >= 0.0,
                    (Sidedness::TwoSided, Sign::Negative) => v < 0.0,
                }
            })
            .collect();
        out.extend(
            connected_components(&binary, shape)
                .into_iter()
                .map(|voxels| Cluster { sign, voxels }),
        );
    }
    out
}

/// Zero out every cluster smaller than `min_size` voxels
///
/// `min_size == 0` returns the map unchanged. With a one-sided policy the
/// negative voxels are not labelled and pass through as they are.
pub fn cluster_size_filter(map: ArrayViewD<f64>, min_size: usize, sidedness: Sidedness) -> ArrayD<f64> {
    let mut out = map.to_owned();
    if min_size == 0 {
        return out;
    }

    let shape = map.shape().to_vec();
    let mut values: Vec<f64> = map.iter().copied().collect();
    let nonzero = nonzero_mask(&values, sidedness);
    let removed = filter_small_clusters(&mut values, &nonzero, &shape, min_size, sidedness);

    if removed > 0 {
        for (dst, &v) in out.iter_mut().zip(values.iter()) {
            *dst = v;
        }
    }
    out
}

/// In-place version over a flat row-major buffer: clusters of `supra` voxels
/// smaller than `min_size` are zeroed. Returns the number of clusters removed.
pub(crate) fn filter_small_clusters(
    values: &mut [f64],
    supra: &[bool],
    shape: &[usize],
    min_size: usize,
    sidedness: Sidedness,
) -> usize {
    if min_size == 0 {
        return 0;
    }

    let mut removed = 0usize;
    for cluster in find_clusters(values, supra, shape, sidedness) {
        if cluster.size() < min_size {
            for &idx in &cluster.voxels {
                values[idx] = 0.0;
            }
            removed += 1;
        }
    }

    log::debug!("cluster filter: removed {} clusters smaller than {} voxels", removed, min_size);
    removed
}
