//! Face-adjacency connected-component labelling
//!
//! Voxels are addressed by their flat row-major index. Two voxels are
//! neighbours when their coordinates differ by exactly one along a single
//! axis (6-connectivity in 3D, 4 in 2D, 2 in 1D).

use ndarray::{ArrayD, ArrayViewD, IxDyn};
use std::collections::VecDeque;

/// Label image and number of components
#[derive(Clone, Debug)]
pub struct Labels {
    /// 0 = background, `1..=n_labels` = component id in discovery order
    pub map: ArrayD<usize>,
    pub n_labels: usize,
}

impl Labels {
    /// Number of voxels carrying each label, indexed by `label - 1`
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.n_labels];
        for &l in self.map.iter() {
            if l > 0 {
                sizes[l - 1] += 1;
            }
        }
        sizes
    }

    /// Flat row-major member indices of each component, indexed by `label - 1`
    pub fn components(&self) -> Vec<Vec<usize>> {
        let mut members = vec![Vec::new(); self.n_labels];
        for (idx, &l) in self.map.iter().enumerate() {
            if l > 0 {
                members[l - 1].push(idx);
            }
        }
        members
    }
}

/// Label the `true` voxels of `binary` into face-connected components
pub fn label_components(binary: ArrayViewD<bool>) -> Labels {
    let shape = binary.shape().to_vec();
    let flat: Vec<bool> = binary.iter().copied().collect();

    let components = connected_components(&flat, &shape);

    let mut labels = vec![0usize; flat.len()];
    for (i, comp) in components.iter().enumerate() {
        for &idx in comp {
            labels[idx] = i + 1;
        }
    }

    let mut map = ArrayD::zeros(IxDyn(&shape));
    for (dst, &l) in map.iter_mut().zip(labels.iter()) {
        *dst = l;
    }

    Labels { map, n_labels: components.len() }
}

/// Row-major strides of `shape`
pub(crate) fn strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; shape.len()];
    for a in (0..shape.len().saturating_sub(1)).rev() {
        strides[a] = strides[a + 1] * shape[a + 1];
    }
    strides
}

/// BFS over face neighbours. Components are returned in order of their first
/// voxel in a row-major scan; members are in BFS order.
pub(crate) fn connected_components(binary: &[bool], shape: &[usize]) -> Vec<Vec<usize>> {
    let strides = strides(shape);
    let mut visited = vec![false; binary.len()];
    let mut queue: VecDeque<usize> = VecDeque::new();
    let mut components = Vec::new();

    for seed in 0..binary.len() {
        if !binary[seed] || visited[seed] {
            continue;
        }

        visited[seed] = true;
        queue.push_back(seed);
        let mut members = Vec::new();

        while let Some(idx) = queue.pop_front() {
            members.push(idx);

            for (axis, &stride) in strides.iter().enumerate() {
                let coord = (idx / stride) % shape[axis];

                if coord > 0 {
                    let n = idx - stride;
                    if binary[n] && !visited[n] {
                        visited[n] = true;
                        queue.push_back(n);
                    }
                }
                if coord + 1 < shape[axis] {
                    let n = idx + stride;
                    if binary[n] && !visited[n] {
                        visited[n] = true;
                        queue.push_back(n);
                    }
                }
            }
        }

        components.push(members);
    }

    components
}
