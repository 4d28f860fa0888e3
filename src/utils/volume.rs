//! Voxel array and mask helpers
//!
//! Core code works on flat buffers in logical row-major order; these helpers
//! move between that and `ndarray` views, and between the flat Fortran-order
//! (NIfTI) layout the WASM exports receive.

use ndarray::{Array, ArrayD, ArrayViewD, IxDyn, ShapeBuilder};

use crate::error::{Error, Result};

/// Values of `view` in logical row-major order, whatever its memory layout
pub(crate) fn flatten<T: Copy>(view: &ArrayViewD<T>) -> Vec<T> {
    view.iter().copied().collect()
}

/// Rebuild an array of `shape` from a row-major buffer
pub(crate) fn into_array<T>(shape: &[usize], data: Vec<T>) -> Result<ArrayD<T>> {
    ArrayD::from_shape_vec(IxDyn(shape), data)
        .map_err(|e| Error::invalid(format!("buffer does not match shape {:?}: {}", shape, e)))
}

/// Flat mask for a map of `shape`; `None` means every voxel is in
pub(crate) fn resolve_mask(shape: &[usize], mask: Option<&ArrayViewD<bool>>) -> Result<Vec<bool>> {
    let n_total: usize = shape.iter().product();
    match mask {
        None => Ok(vec![true; n_total]),
        Some(m) => {
            if m.shape() != shape {
                return Err(Error::invalid(format!(
                    "mask shape {:?} does not match stat map shape {:?}",
                    m.shape(),
                    shape
                )));
            }
            Ok(flatten(m))
        }
    }
}

/// Volume of one voxel in mm^3 from a 4x4 row-major affine
///
/// `|det(A[:3, :3])|`, so shears and oblique orientations are accounted for.
pub fn voxel_volume(affine: &[f64; 16]) -> f64 {
    let a = |r: usize, c: usize| affine[r * 4 + c];
    let det = a(0, 0) * (a(1, 1) * a(2, 2) - a(1, 2) * a(2, 1))
        - a(0, 1) * (a(1, 0) * a(2, 2) - a(1, 2) * a(2, 0))
        + a(0, 2) * (a(1, 0) * a(2, 1) - a(1, 1) * a(2, 0));
    det.abs()
}

/// Physical volume of a mask in mm^3
pub fn mask_volume(mask: &ArrayViewD<bool>, voxel_volume_mm3: f64) -> f64 {
    let n_voxels = mask.iter().filter(|&&m| m).count();
    n_voxels as f64 * voxel_volume_mm3
}

/// Wrap a flat Fortran-order (x fastest) volume as an n-d array
pub fn fortran_volume(data: &[f64], nx: usize, ny: usize, nz: usize) -> Result<ArrayD<f64>> {
    Array::from_shape_vec((nx, ny, nz).f(), data.to_vec())
        .map(|a| a.into_dyn())
        .map_err(|e| Error::invalid(format!(
            "volume of {} values does not match {}x{}x{}: {}", data.len(), nx, ny, nz, e
        )))
}

/// Flat Fortran-order `u8` mask (non-zero = in); an empty slice means no mask
pub fn fortran_mask(mask: &[u8], nx: usize, ny: usize, nz: usize) -> Result<Option<ArrayD<bool>>> {
    if mask.is_empty() {
        return Ok(None);
    }
    let bools: Vec<bool> = mask.iter().map(|&m| m != 0).collect();
    Array::from_shape_vec((nx, ny, nz).f(), bools)
        .map(|a| Some(a.into_dyn()))
        .map_err(|e| Error::invalid(format!(
            "mask of {} values does not match {}x{}x{}: {}", mask.len(), nx, ny, nz, e
        )))
}

/// Flatten an array back to Fortran order (first axis fastest)
pub fn to_fortran_vec(arr: &ArrayD<f64>) -> Vec<f64> {
    arr.t().iter().copied().collect()
}
