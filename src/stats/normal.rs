//! Standard normal tail functions
//!
//! Both functions are written in terms of `erfc` / `erfc_inv` rather than the
//! CDF so that tail probabilities down to ~1e-300 keep full relative precision.

use statrs::function::erf::{erfc, erfc_inv};
use std::f64::consts::SQRT_2;

/// Survival function `P(Z > z)` of the standard normal
#[inline]
pub fn sf(z: f64) -> f64 {
    0.5 * erfc(z / SQRT_2)
}

/// Inverse survival function: the `z` such that `P(Z > z) = p`
///
/// `p <= 0` maps to `+inf`, `p >= 1` to `-inf`.
#[inline]
pub fn isf(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::INFINITY;
    }
    if p >= 1.0 {
        return f64::NEG_INFINITY;
    }
    SQRT_2 * erfc_inv(2.0 * p)
}
