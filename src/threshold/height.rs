//! Height-control procedures
//!
//! All cutoffs are expressed in the z domain. Two-sided tests spend
//! `alpha / 2` per tail, which for FDR is the same as comparing the doubled
//! tail probability of `|z|` against `alpha`.

use std::fmt;
use std::str::FromStr;

use super::check::ThresholdValue;
use crate::error::{Error, Result};
use crate::stats::{isf, Sidedness};

/// Statistical procedure used to derive a threshold from `alpha`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeightControl {
    /// False positive rate (uncorrected)
    Fpr,
    /// Benjamini-Hochberg false discovery rate
    Fdr,
    /// Bonferroni family-wise error rate
    Bonferroni,
}

impl HeightControl {
    /// FDR and Bonferroni depend on the voxel values, FPR does not
    pub fn needs_data(self) -> bool {
        !matches!(self, HeightControl::Fpr)
    }
}

impl FromStr for HeightControl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fpr" => Ok(HeightControl::Fpr),
            "fdr" => Ok(HeightControl::Fdr),
            "bonferroni" => Ok(HeightControl::Bonferroni),
            other => Err(Error::invalid(format!(
                "height control should be one of 'fpr', 'fdr', 'bonferroni' or none, got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for HeightControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HeightControl::Fpr => "fpr",
            HeightControl::Fdr => "fdr",
            HeightControl::Bonferroni => "bonferroni",
        };
        f.write_str(name)
    }
}

/// How the scalar threshold is obtained: given directly, or derived from
/// alpha by a height-control procedure. Never both.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HeightRule {
    /// Fixed value, or percentile of `|data|` resolved against the masked map
    Explicit(ThresholdValue),
    Controlled { method: HeightControl, alpha: f64 },
}

impl Default for HeightRule {
    fn default() -> Self {
        HeightRule::Controlled { method: HeightControl::Fpr, alpha: 0.001 }
    }
}

impl HeightRule {
    pub fn explicit(threshold: f64) -> Self {
        HeightRule::Explicit(ThresholdValue::Value(threshold))
    }

    pub fn percentile(q: f64) -> Self {
        HeightRule::Explicit(ThresholdValue::Percentile(q))
    }

    pub fn fpr(alpha: f64) -> Self {
        HeightRule::Controlled { method: HeightControl::Fpr, alpha }
    }

    pub fn fdr(alpha: f64) -> Self {
        HeightRule::Controlled { method: HeightControl::Fdr, alpha }
    }

    pub fn bonferroni(alpha: f64) -> Self {
        HeightRule::Controlled { method: HeightControl::Bonferroni, alpha }
    }

    /// Build a rule from loosely typed parts
    ///
    /// An explicit threshold takes precedence over a height-control method.
    /// A method without an explicit threshold needs `alpha`. Unknown method
    /// names are rejected even when an explicit threshold is present.
    pub fn from_parts(
        alpha: Option<f64>,
        height_control: Option<&str>,
        explicit_threshold: Option<ThresholdValue>,
    ) -> Result<Self> {
        let method = height_control.map(HeightControl::from_str).transpose()?;

        match (explicit_threshold, method) {
            (Some(t), _) => Ok(HeightRule::Explicit(t)),
            (None, Some(method)) => {
                let alpha = alpha.ok_or_else(|| {
                    Error::invalid(format!("alpha is required for height control '{}'", method))
                })?;
                Ok(HeightRule::Controlled { method, alpha })
            }
            (None, None) => Err(Error::invalid(
                "a threshold is required when no height control is requested",
            )),
        }
    }

    /// Alpha if the rule uses one
    pub fn alpha(&self) -> Option<f64> {
        match *self {
            HeightRule::Explicit(_) => None,
            HeightRule::Controlled { alpha, .. } => Some(alpha),
        }
    }
}

/// Reject alpha outside the open interval (0, 1)
pub(crate) fn check_alpha(alpha: f64) -> Result<()> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(Error::invalid(format!("alpha should be between 0 and 1, got {}", alpha)))
    }
}

/// Uncorrected threshold: `isf(alpha)` one-sided, `isf(alpha / 2)` two-sided
pub fn fpr_threshold(alpha: f64, sidedness: Sidedness) -> f64 {
    isf(sidedness.tail_alpha(alpha))
}

/// Bonferroni threshold over `n_tests` voxels; no tests means nothing survives
pub fn bonferroni_threshold(alpha: f64, n_tests: usize, sidedness: Sidedness) -> f64 {
    if n_tests == 0 {
        return f64::INFINITY;
    }
    isf(sidedness.tail_alpha(alpha) / n_tests as f64)
}

/// Benjamini-Hochberg threshold on z-scores
///
/// Returns the score (`|z|` two-sided) of the largest order statistic `k`
/// with `p_(k) <= k / m * alpha`, or `+inf` when no voxel survives.
/// `alpha` must lie in `[0, 1]`.
pub fn fdr_threshold(scores: &[f64], alpha: f64, sidedness: Sidedness) -> Result<f64> {
    if !(0.0..=1.0).contains(&alpha) {
        return Err(Error::invalid(format!("alpha should be between 0 and 1, got {}", alpha)));
    }

    // Descending score is ascending p-value
    let mut ranked: Vec<f64> = scores
        .iter()
        .map(|&z| sidedness.score(z))
        .filter(|s| !s.is_nan())
        .collect();
    ranked.sort_by(|a, b| b.total_cmp(a));

    let m = ranked.len() as f64;
    let mut threshold = f64::INFINITY;
    for (i, &s) in ranked.iter().enumerate() {
        if sidedness.p_value(s) <= alpha * (i + 1) as f64 / m {
            threshold = s;
        }
    }

    log::debug!("fdr threshold at alpha={}: {} ({} tests)", alpha, threshold, ranked.len());
    Ok(threshold)
}
