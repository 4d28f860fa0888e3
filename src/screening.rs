//! Volume-corrected percentile screening
//!
//! A screening percentile is expressed relative to a standard (MNI152) brain.
//! When the data mask is smaller or larger than that reference, the
//! percentile is rescaled so the same absolute number of voxels is kept.

use ndarray::ArrayViewD;

use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{Error, Result};
use crate::utils::{mask_volume, percentile_sorted};

/// Volume of the MNI152 brain mask in mm^3
pub const MNI152_BRAIN_VOLUME: f64 = 1_827_243.0;

/// Masks above this fraction of the reference volume trigger a warning
pub const MASK_VOLUME_UPPER_RATIO: f64 = 1.1;

/// Masks below this fraction of the reference volume trigger a warning
pub const MASK_VOLUME_LOWER_RATIO: f64 = 0.005;

/// Which ANOVA F-test scores the features
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreeningTask {
    Classification,
    Regression,
}

/// Univariate feature selection keeping the top `percentile` % of features
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureScreening {
    pub percentile: u32,
    pub task: ScreeningTask,
}

impl FeatureScreening {
    /// Support mask over externally computed feature scores
    ///
    /// Scores strictly above the `100 - percentile` quantile are kept; ties
    /// at the quantile are admitted in index order until
    /// `floor(n * percentile / 100)` features are selected. NaN scores rank
    /// lowest.
    pub fn select(&self, scores: &[f64]) -> Vec<bool> {
        let n = scores.len();
        if self.percentile >= 100 {
            return vec![true; n];
        }
        if self.percentile == 0 || n == 0 {
            return vec![false; n];
        }

        let clean: Vec<f64> = scores.iter().map(|&s| if s.is_nan() { f64::MIN } else { s }).collect();
        let mut sorted = clean.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let threshold = match percentile_sorted(&sorted, 100.0 - self.percentile as f64) {
            Some(t) => t,
            None => return vec![false; n],
        };

        let mut support: Vec<bool> = clean.iter().map(|&s| s > threshold).collect();
        let max_feats = n * self.percentile as usize / 100;
        let mut room = max_feats.saturating_sub(support.iter().filter(|&&k| k).count());

        for (keep, &s) in support.iter_mut().zip(clean.iter()) {
            if room == 0 {
                break;
            }
            if s == threshold {
                *keep = true;
                room -= 1;
            }
        }
        support
    }
}

/// Rescale a screening percentile by the mask's physical volume
///
/// # Arguments
/// * `percentile` - Percentile in [0, 100] relative to a standard brain
/// * `mask` - Brain mask of the data
/// * `voxel_volume_mm3` - Volume of one voxel (see `utils::voxel_volume`)
/// * `diag` - Receives a warning for implausibly large or small masks
///
/// # Returns
/// `min(100, percentile * MNI152_BRAIN_VOLUME / mask_volume)`, or 100
/// unchanged
pub fn adjust_screening_percentile(
    percentile: f64,
    mask: ArrayViewD<bool>,
    voxel_volume_mm3: f64,
    diag: &mut dyn Diagnostics,
) -> Result<f64> {
    check_percentile(percentile)?;
    if !(voxel_volume_mm3.is_finite() && voxel_volume_mm3 > 0.0) {
        return Err(Error::invalid(format!(
            "voxel volume should be a positive number of mm^3, got {}",
            voxel_volume_mm3
        )));
    }

    let volume = mask_volume(&mask, voxel_volume_mm3);
    if volume <= 0.0 {
        return Err(Error::invalid("mask is empty, cannot rescale the screening percentile"));
    }

    if volume > MASK_VOLUME_UPPER_RATIO * MNI152_BRAIN_VOLUME {
        diag.warn(Warning::MaskTooLarge { volume, reference: MNI152_BRAIN_VOLUME });
    } else if volume < MASK_VOLUME_LOWER_RATIO * MNI152_BRAIN_VOLUME {
        diag.warn(Warning::MaskTooSmall { volume, reference: MNI152_BRAIN_VOLUME });
    }

    let adjusted = if percentile < 100.0 {
        (percentile * (MNI152_BRAIN_VOLUME / volume)).min(100.0)
    } else {
        percentile
    };

    log::debug!(
        "Mask volume = {:.0}mm^3 = {}cm^3, standard brain volume = {:.0}mm^3",
        volume,
        volume / 1000.0,
        MNI152_BRAIN_VOLUME
    );
    log::debug!("Screening percentile: original {}, volume-corrected {}", percentile, adjusted);

    Ok(adjusted)
}

/// Build the feature selector for a screening percentile
///
/// `None` or 100 disables screening and returns `Ok(None)`.
pub fn check_feature_screening(
    percentile: Option<f64>,
    mask: ArrayViewD<bool>,
    voxel_volume_mm3: f64,
    task: ScreeningTask,
    diag: &mut dyn Diagnostics,
) -> Result<Option<FeatureScreening>> {
    let percentile = match percentile {
        None => return Ok(None),
        Some(p) if p == 100.0 => return Ok(None),
        Some(p) => p,
    };
    check_percentile(percentile)?;

    let adjusted = adjust_screening_percentile(percentile, mask, voxel_volume_mm3, diag)?;
    Ok(Some(FeatureScreening { percentile: adjusted as u32, task }))
}

fn check_percentile(percentile: f64) -> Result<()> {
    if (0.0..=100.0).contains(&percentile) {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "screening_percentile should be in the interval [0, 100], got {}",
            percentile
        )))
    }
}
