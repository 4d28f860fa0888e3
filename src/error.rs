//! Error types for statistic map thresholding

use thiserror::Error;

/// Error raised by thresholding and inference entry points.
///
/// All arguments are validated before any voxel work starts, so an error
/// always means the call did nothing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Bad alpha, unknown height control, missing stat map, shape mismatch...
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
