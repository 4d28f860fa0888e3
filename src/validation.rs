//! Per-run sample mask validation
//!
//! Each run of a multi-run acquisition may come with a sample mask that
//! selects the volumes to keep, given either as booleans or as indices.

use crate::error::{Error, Result};

/// Volumes to keep in one run
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SampleMask {
    Boolean(Vec<bool>),
    Indices(Vec<usize>),
}

impl SampleMask {
    /// Indices of kept volumes
    pub fn to_indices(&self) -> Vec<usize> {
        match self {
            SampleMask::Boolean(keep) => keep
                .iter()
                .enumerate()
                .filter(|(_, &k)| k)
                .map(|(i, _)| i)
                .collect(),
            SampleMask::Indices(idx) => idx.clone(),
        }
    }
}

/// Check that there is one sample mask per run and convert them to indices
pub fn check_run_sample_masks(n_runs: usize, sample_masks: &[SampleMask]) -> Result<Vec<Vec<usize>>> {
    if sample_masks.len() != n_runs {
        return Err(Error::invalid(format!(
            "Number of sample_mask ({}) not matching number of runs ({}).",
            sample_masks.len(),
            n_runs
        )));
    }
    Ok(sample_masks.iter().map(SampleMask::to_indices).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_masks_become_indices() {
        let masks = vec![
            SampleMask::Boolean(vec![true, false, true, true]),
            SampleMask::Indices(vec![0, 2, 5]),
        ];
        let checked = check_run_sample_masks(2, &masks).unwrap();
        assert_eq!(checked, vec![vec![0, 2, 3], vec![0, 2, 5]]);
    }

    #[test]
    fn test_count_mismatch() {
        let masks = vec![SampleMask::Indices(vec![1, 2])];
        let err = check_run_sample_masks(2, &masks).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidArgument("Number of sample_mask (1) not matching number of runs (2).".to_string())
        );
    }
}
