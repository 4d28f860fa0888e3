//! One- vs two-sided test policy
//!
//! Every component that needs to know whether negative excursions count as
//! evidence goes through `Sidedness` instead of carrying its own flag.

use super::normal::sf;

/// Whether negative statistic values count as evidence
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Sidedness {
    /// Only `value >= threshold` is supra-threshold
    OneSided,
    /// `|value| >= threshold` is supra-threshold, both signs kept
    #[default]
    TwoSided,
}

/// Sign of a cluster; positive and negative clusters are labelled separately
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    /// Strictly same-signed, zero belongs to neither
    #[inline]
    pub fn matches(self, value: f64) -> bool {
        match self {
            Sign::Positive => value > 0.0,
            Sign::Negative => value < 0.0,
        }
    }
}

impl Sidedness {
    pub fn from_two_sided(two_sided: bool) -> Self {
        if two_sided {
            Sidedness::TwoSided
        } else {
            Sidedness::OneSided
        }
    }

    pub fn is_two_sided(self) -> bool {
        self == Sidedness::TwoSided
    }

    /// Score used for ranking: `z` one-sided, `|z|` two-sided
    #[inline]
    pub fn score(self, z: f64) -> f64 {
        match self {
            Sidedness::OneSided => z,
            Sidedness::TwoSided => z.abs(),
        }
    }

    /// p-value of a z-score: `sf(z)` or `min(1, 2 sf(|z|))`
    #[inline]
    pub fn p_value(self, z: f64) -> f64 {
        match self {
            Sidedness::OneSided => sf(z),
            Sidedness::TwoSided => (2.0 * sf(z.abs())).min(1.0),
        }
    }

    /// Alpha spent in a single tail
    #[inline]
    pub fn tail_alpha(self, alpha: f64) -> f64 {
        match self {
            Sidedness::OneSided => alpha,
            Sidedness::TwoSided => alpha / 2.0,
        }
    }

    /// Supra-threshold test. A `+inf` threshold lets nothing through.
    #[inline]
    pub fn is_supra(self, value: f64, threshold: f64) -> bool {
        if threshold == f64::INFINITY {
            return false;
        }
        self.score(value) >= threshold
    }

    /// Signs whose regions are labelled independently
    pub fn signs(self) -> &'static [Sign] {
        match self {
            Sidedness::OneSided => &[Sign::Positive],
            Sidedness::TwoSided => &[Sign::Positive, Sign::Negative],
        }
    }
}
