//! Non-fatal diagnostics
//!
//! Thresholding code never writes warnings to a global registry. Every entry
//! point that can emit an advisory takes a `&mut dyn Diagnostics` and reports
//! through it; the caller decides whether warnings are logged, collected, or
//! shown in a browser console.

use std::fmt;

/// Advisory emitted while computing a threshold or screening percentile.
#[derive(Clone, Debug, PartialEq)]
pub enum Warning {
    /// Mask volume exceeds 1.1x the reference brain volume
    MaskTooLarge { volume: f64, reference: f64 },
    /// Mask volume is below 0.5% of the reference brain volume
    MaskTooSmall { volume: f64, reference: f64 },
    /// Requested threshold is above the largest absolute value in the data
    ThresholdAboveData { threshold: f64, max_abs: f64 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MaskTooLarge { volume, .. } => write!(
                f,
                "Brain mask ({:.0} mm^3) is bigger than the volume of a standard human brain. \
                 This object is probably not tuned to be used on such data.",
                volume
            ),
            Warning::MaskTooSmall { volume, .. } => write!(
                f,
                "Brain mask ({:.0} mm^3) is smaller than .5% of the volume of a human brain. \
                 This object is probably not tuned to be used on such data.",
                volume
            ),
            Warning::ThresholdAboveData { threshold, max_abs } => write!(
                f,
                "The given threshold must not exceed {}. But, you have given threshold={}",
                max_abs, threshold
            ),
        }
    }
}

/// Sink for non-fatal warnings
pub trait Diagnostics {
    fn warn(&mut self, warning: Warning);
}

/// Forwards warnings to the `log` facade
#[derive(Clone, Copy, Debug, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn warn(&mut self, warning: Warning) {
        log::warn!("{}", warning);
    }
}

/// Keeps every warning in emission order
#[derive(Clone, Debug, Default)]
pub struct CollectedWarnings {
    pub warnings: Vec<Warning>,
}

impl CollectedWarnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }
}

impl Diagnostics for CollectedWarnings {
    fn warn(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }
}
