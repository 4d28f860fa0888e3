//! STATMAP-WASM: statistic map thresholding for browser-based neuroimaging
//!
//! Height thresholding (FPR, FDR, Bonferroni), cluster-extent filtering and
//! All-Resolution Inference on voxel-wise z-maps, compiled to WebAssembly.
//!
//! # Modules
//! - `stats`: Normal tail functions and one/two-sided policy
//! - `cluster`: Connected-component labelling and cluster-size filtering
//! - `threshold`: Height-control procedures and `threshold_stats_map`
//! - `inference`: Hommel value, true discovery proportion, cluster-level inference
//! - `screening`: Volume-corrected screening percentile
//! - `validation`: Per-run sample masks
//! - `diagnostics`: Warning sinks
//! - `utils`: Volume layout, masks and percentiles

// Core modules
pub mod error;
pub mod diagnostics;
pub mod stats;
pub mod utils;

// Algorithm modules
pub mod cluster;
pub mod threshold;
pub mod inference;
pub mod screening;
pub mod validation;

#[cfg(test)]
mod fixtures;

pub use cluster::{cluster_size_filter, label_components};
pub use diagnostics::{CollectedWarnings, Diagnostics, LogDiagnostics, Warning};
pub use error::{Error, Result};
pub use inference::{cluster_guarantees, cluster_level_inference, hommel_value, InferenceParams};
pub use screening::{adjust_screening_percentile, check_feature_screening};
pub use stats::Sidedness;
pub use threshold::{check_threshold, fdr_threshold, threshold_stats_map, ThresholdOptions};
pub use utils::voxel_volume;
pub use validation::check_run_sample_masks;

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

macro_rules! console_log {
    ($($t:tt)*) => (log(&format_args!($($t)*).to_string()))
}

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Prints warnings to the browser console
struct ConsoleDiagnostics;

impl Diagnostics for ConsoleDiagnostics {
    fn warn(&mut self, warning: Warning) {
        console_log!("WASM warning: {}", warning);
    }
}

fn to_js(e: Error) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn progress_reporter(callback: &js_sys::Function) -> impl FnMut(usize, usize) + '_ {
    move |current, total| {
        let this = JsValue::null();
        let _ = callback.call2(&this,
            &JsValue::from(current as u32),
            &JsValue::from(total as u32));
    }
}

// ============================================================================
// WASM Exports: Height Thresholding
// ============================================================================

/// Threshold a z-map with an explicit or alpha-controlled threshold
///
/// # Arguments
/// * `data` - Float64Array of z-scores (nx * ny * nz)
/// * `mask` - Uint8Array mask (nx * ny * nz), 1 = in; empty = whole volume
/// * `nx`, `ny`, `nz` - Array dimensions
/// * `alpha` - Error level for the height control
/// * `height_control` - "fpr", "fdr", "bonferroni", or "" for an explicit threshold
/// * `threshold` - Explicit threshold, a number or a percentile of |z| such as "99.5%"
///   ("" = none); takes precedence over `height_control`
/// * `cluster_threshold` - Minimum cluster size in voxels (0 = no filtering)
/// * `two_sided` - Threshold |z| instead of z
///
/// # Returns
/// Thresholded map (nx * ny * nz) followed by the scalar threshold
#[wasm_bindgen]
pub fn threshold_stats_wasm(
    data: &[f64],
    mask: &[u8],
    nx: usize, ny: usize, nz: usize,
    alpha: f64,
    height_control: &str,
    threshold: &str,
    cluster_threshold: usize,
    two_sided: bool,
) -> std::result::Result<Vec<f64>, JsValue> {
    console_log!("WASM threshold_stats: {}x{}x{}, height_control='{}', alpha={}",
                 nx, ny, nz, height_control, alpha);

    let volume = utils::fortran_volume(data, nx, ny, nz).map_err(to_js)?;
    let mask = utils::fortran_mask(mask, nx, ny, nz).map_err(to_js)?;
    let height_control = Some(height_control).filter(|h| !h.is_empty());
    let explicit = match threshold.trim() {
        "" => None,
        t => Some(t.parse::<threshold::ThresholdValue>().map_err(to_js)?),
    };

    let (map, thr) = threshold::resolve_threshold(
        Some(volume.view()),
        mask.as_ref().map(|m| m.view()),
        Some(alpha),
        height_control,
        explicit,
        cluster_threshold,
        two_sided,
        &mut ConsoleDiagnostics,
    ).map_err(to_js)?;

    let mut result = map.map(|m| utils::to_fortran_vec(&m)).unwrap_or_default();
    result.push(thr);

    console_log!("WASM threshold_stats complete, threshold={}", thr);
    Ok(result)
}

/// Benjamini-Hochberg threshold on a flat list of z-scores
///
/// Returns +Infinity when nothing survives.
#[wasm_bindgen]
pub fn fdr_threshold_wasm(
    scores: &[f64],
    alpha: f64,
    two_sided: bool,
) -> std::result::Result<f64, JsValue> {
    threshold::fdr_threshold(scores, alpha, Sidedness::from_two_sided(two_sided)).map_err(to_js)
}

/// Remove clusters smaller than `min_size` voxels
///
/// # Arguments
/// * `data` - Float64Array (nx * ny * nz), non-zero voxels form clusters
/// * `nx`, `ny`, `nz` - Array dimensions
/// * `min_size` - Minimum cluster size in voxels
/// * `two_sided` - Also filter negative clusters
///
/// # Returns
/// Filtered map
#[wasm_bindgen]
pub fn cluster_size_filter_wasm(
    data: &[f64],
    nx: usize, ny: usize, nz: usize,
    min_size: usize,
    two_sided: bool,
) -> std::result::Result<Vec<f64>, JsValue> {
    console_log!("WASM cluster_size_filter: {}x{}x{}, min_size={}", nx, ny, nz, min_size);

    let volume = utils::fortran_volume(data, nx, ny, nz).map_err(to_js)?;
    let filtered = cluster::cluster_size_filter(
        volume.view(), min_size, Sidedness::from_two_sided(two_sided));

    Ok(utils::to_fortran_vec(&filtered))
}

// ============================================================================
// WASM Exports: All-Resolution Inference
// ============================================================================

/// Hommel value of a flat list of z-scores
#[wasm_bindgen]
pub fn hommel_value_wasm(scores: &[f64], alpha: f64, two_sided: bool) -> usize {
    inference::hommel_value(scores, alpha, Sidedness::from_two_sided(two_sided))
}

/// Cluster-level true discovery proportion map
///
/// # Arguments
/// * `data` - Float64Array of z-scores (nx * ny * nz)
/// * `mask` - Uint8Array mask (nx * ny * nz); empty = whole volume
/// * `nx`, `ny`, `nz` - Array dimensions
/// * `thresholds` - Cluster-forming thresholds
/// * `alpha` - Error level
/// * `two_sided` - Also form clusters from negative z-scores
///
/// # Returns
/// Map of guaranteed proportions (0 outside clusters)
#[wasm_bindgen]
pub fn cluster_level_inference_wasm(
    data: &[f64],
    mask: &[u8],
    nx: usize, ny: usize, nz: usize,
    thresholds: &[f64],
    alpha: f64,
    two_sided: bool,
) -> std::result::Result<Vec<f64>, JsValue> {
    console_log!("WASM cluster_level_inference: {}x{}x{}, {} thresholds, alpha={}",
                 nx, ny, nz, thresholds.len(), alpha);

    let volume = utils::fortran_volume(data, nx, ny, nz).map_err(to_js)?;
    let mask = utils::fortran_mask(mask, nx, ny, nz).map_err(to_js)?;
    let params = inference::InferenceParams {
        thresholds: thresholds.to_vec(),
        alpha,
        sidedness: Sidedness::from_two_sided(two_sided),
    };

    let out = inference::cluster_level_inference(
        volume.view(), mask.as_ref().map(|m| m.view()), &params).map_err(to_js)?;

    console_log!("WASM cluster_level_inference complete");
    Ok(utils::to_fortran_vec(&out))
}

/// Cluster-level inference with progress callback
///
/// `progress_callback(current, total)` is called after each threshold.
#[wasm_bindgen]
pub fn cluster_level_inference_wasm_with_progress(
    data: &[f64],
    mask: &[u8],
    nx: usize, ny: usize, nz: usize,
    thresholds: &[f64],
    alpha: f64,
    two_sided: bool,
    progress_callback: &js_sys::Function,
) -> std::result::Result<Vec<f64>, JsValue> {
    console_log!("WASM cluster_level_inference with progress: {}x{}x{}, {} thresholds",
                 nx, ny, nz, thresholds.len());

    let volume = utils::fortran_volume(data, nx, ny, nz).map_err(to_js)?;
    let mask = utils::fortran_mask(mask, nx, ny, nz).map_err(to_js)?;
    let params = inference::InferenceParams {
        thresholds: thresholds.to_vec(),
        alpha,
        sidedness: Sidedness::from_two_sided(two_sided),
    };

    let out = inference::cluster_level_inference_with_progress(
        volume.view(),
        mask.as_ref().map(|m| m.view()),
        &params,
        progress_reporter(progress_callback),
    ).map_err(to_js)?;

    console_log!("WASM cluster_level_inference complete");
    Ok(utils::to_fortran_vec(&out))
}

// ============================================================================
// WASM Exports: Screening
// ============================================================================

/// Rescale a screening percentile to the mask's physical volume
///
/// # Arguments
/// * `percentile` - Percentile in [0, 100] relative to a standard brain
/// * `mask` - Uint8Array mask (nx * ny * nz)
/// * `nx`, `ny`, `nz` - Array dimensions
/// * `affine` - Row-major 4x4 voxel-to-world affine (16 values)
#[wasm_bindgen]
pub fn adjust_screening_percentile_wasm(
    percentile: f64,
    mask: &[u8],
    nx: usize, ny: usize, nz: usize,
    affine: &[f64],
) -> std::result::Result<f64, JsValue> {
    let affine: &[f64; 16] = affine.try_into()
        .map_err(|_| JsValue::from_str("affine must have 16 values"))?;
    let mask = utils::fortran_mask(mask, nx, ny, nz)
        .map_err(to_js)?
        .ok_or_else(|| JsValue::from_str("a mask is required for screening"))?;

    screening::adjust_screening_percentile(
        percentile, mask.view(), utils::voxel_volume(affine), &mut ConsoleDiagnostics,
    ).map_err(to_js)
}

/// Get version string
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// ============================================================================
// Tests
// ============================================================================
