//! Connected-component labelling and cluster-extent filtering
//!
//! - `label`: face-adjacency labelling over arrays of any dimensionality
//! - `filter`: signed cluster extraction and minimum-size filtering

pub mod label;
pub mod filter;

pub use label::{label_components, Labels};
pub use filter::{cluster_size_filter, clusters, Cluster};
