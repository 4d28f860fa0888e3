//! All-Resolution Inference on statistic maps
//!
//! - `hommel`: Hommel value via the linearithmic shortcut
//! - `tdp`: true discovery proportion lower bound for a voxel set
//! - `cluster_level`: per-cluster guarantees across candidate thresholds
//!
//! Reference: Rosenblatt JD, et al. All-Resolution Inference for brain
//! imaging. NeuroImage. 2018;181:786-796.

pub mod hommel;
pub mod tdp;
pub mod cluster_level;

pub use hommel::hommel_value;
pub use tdp::true_discovery_proportion;
pub use cluster_level::{
    cluster_guarantees, cluster_guarantees_with_progress, cluster_level_inference,
    cluster_level_inference_with_progress, ClusterGuarantee, InferenceParams,
};
