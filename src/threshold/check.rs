//! Explicit threshold validation
//!
//! A threshold can be a plain number or a percentile of the absolute data
//! written as a string ending in `%`, e.g. `"99.7%"`.

use std::str::FromStr;

use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{Error, Result};
use crate::utils::abs_percentile;

/// Threshold as given by a caller
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ThresholdValue {
    Value(f64),
    /// Percentile of `|data|`, in `[0, 100]`
    Percentile(f64),
}

impl FromStr for ThresholdValue {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(number) = s.strip_suffix('%') {
            let pct: f64 = number.trim().parse().map_err(|_| {
                Error::invalid(format!(
                    "if threshold is given as string it should be a number followed by the \
                     percent sign, e.g. \"25.3%\", got '{}'",
                    s
                ))
            })?;
            if !(0.0..=100.0).contains(&pct) {
                return Err(Error::invalid(format!(
                    "threshold percentile should be in [0, 100], got {}",
                    pct
                )));
            }
            return Ok(ThresholdValue::Percentile(pct));
        }

        s.parse::<f64>()
            .map(ThresholdValue::Value)
            .map_err(|_| Error::invalid(format!(
                "threshold should be either a number or a string finishing with a percent sign, got '{}'",
                s
            )))
    }
}

/// Resolve a threshold against the data it will be applied to
///
/// Percentiles are computed over `|data|`. A numeric threshold whose
/// magnitude exceeds every `|data|` value is returned unchanged but reported
/// as `ThresholdAboveData`.
pub fn check_threshold(threshold: ThresholdValue, data: &[f64], diag: &mut dyn Diagnostics) -> Result<f64> {
    match threshold {
        ThresholdValue::Percentile(q) => abs_percentile(data, q)
            .ok_or_else(|| Error::invalid("cannot compute a percentile threshold on empty data")),
        ThresholdValue::Value(t) => {
            let max_abs = data
                .iter()
                .filter(|v| !v.is_nan())
                .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v.abs(), |a| a.max(v.abs()))));
            if let Some(max_abs) = max_abs {
                if t.abs() > max_abs {
                    diag.warn(Warning::ThresholdAboveData { threshold: t, max_abs });
                }
            }
            Ok(t)
        }
    }
}
