//! Shared test data

use ndarray::{ArrayD, IxDyn};
use std::ops::Range;

use crate::stats::isf;

/// 9x10x11 map of `isf(linspace(1/p, 1 - 1/p, p))` in row-major order with
/// the block `[2:4, 5:7, 6:8]` set to 5.0
pub(crate) fn graded_map() -> ArrayD<f64> {
    let shape = [9usize, 10, 11];
    let p: usize = shape.iter().product();
    let start = 1.0 / p as f64;
    let step = (1.0 - 2.0 / p as f64) / (p - 1) as f64;
    let values: Vec<f64> = (0..p).map(|i| isf(start + i as f64 * step)).collect();

    let mut map = ArrayD::from_shape_vec(IxDyn(&shape), values).unwrap();
    set_block(&mut map, [2..4, 5..7, 6..8], 5.0);
    map
}

pub(crate) fn set_block(map: &mut ArrayD<f64>, block: [Range<usize>; 3], value: f64) {
    for i in block[0].clone() {
        for j in block[1].clone() {
            for k in block[2].clone() {
                map[[i, j, k]] = value;
            }
        }
    }
}

pub(crate) fn count_positive(map: &ArrayD<f64>) -> usize {
    map.iter().filter(|&&v| v > 0.0).count()
}

pub(crate) fn count_negative(map: &ArrayD<f64>) -> usize {
    map.iter().filter(|&&v| v < 0.0).count()
}
