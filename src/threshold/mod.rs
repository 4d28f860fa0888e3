//! Height thresholds for statistic maps
//!
//! - `height`: FPR / FDR / Bonferroni cutoffs and the `HeightRule` that picks one
//! - `check`: explicit or percentile thresholds checked against the data
//! - `resolve`: mask, threshold and cluster-filter a map in one call

pub mod height;
pub mod check;
pub mod resolve;

pub use height::{bonferroni_threshold, fdr_threshold, fpr_threshold, HeightControl, HeightRule};
pub use check::{check_threshold, ThresholdValue};
pub use resolve::{resolve_threshold, threshold_stats_map, ThresholdOptions};
