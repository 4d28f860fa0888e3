//! Statistical primitives shared by the thresholding and inference modules
//!
//! - `normal`: standard normal survival / inverse survival functions
//! - `sidedness`: one- vs two-sided test policy

pub mod normal;
pub mod sidedness;

pub use normal::{isf, sf};
pub use sidedness::{Sign, Sidedness};
