//! Utility functions shared across thresholding modules
//!
//! - Flattening / rebuilding n-dimensional voxel arrays
//! - Mask validation and physical volume
//! - Flat Fortran-order volume conversion for the WASM layer
//! - Linear-interpolated percentiles

pub mod volume;
pub mod percentile;

pub use volume::*;
pub use percentile::*;
