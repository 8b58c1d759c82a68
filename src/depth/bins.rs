// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fixed-width magnitude bins.

use serde::Serialize;

use super::DepthError;
use crate::constants::{DEFAULT_MAG_MAX, DEFAULT_MAG_MIN, DEFAULT_NUM_MAG_BINS};

/// Equal-width bins over a closed magnitude range. Every bin is half-open
/// `[lo, hi)`, except the last, which also contains the upper edge. This
/// matches the usual histogram convention.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MagnitudeBins {
    edges: Vec<f64>,
    centres: Vec<f64>,
}

impl MagnitudeBins {
    pub fn new(min: f64, max: f64, num_bins: usize) -> Result<MagnitudeBins, DepthError> {
        if num_bins == 0 {
            return Err(DepthError::InvalidParameter(
                "the number of magnitude bins must be at least 1".into(),
            ));
        }
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(DepthError::InvalidParameter(format!(
                "the magnitude range [{min}, {max}] is not a valid range"
            )));
        }

        Ok(MagnitudeBins::build(min, max, num_bins))
    }

    fn build(min: f64, max: f64, num_bins: usize) -> MagnitudeBins {
        let step = (max - min) / num_bins as f64;
        let mut edges: Vec<f64> = (0..=num_bins).map(|i| min + i as f64 * step).collect();
        // Don't let accumulated float error move the final edge.
        edges[num_bins] = max;
        let centres = (0..num_bins)
            .map(|i| min + step * (i as f64 + 0.5))
            .collect();
        MagnitudeBins { edges, centres }
    }

    pub fn num_bins(&self) -> usize {
        self.centres.len()
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn centres(&self) -> &[f64] {
        &self.centres
    }

    pub fn min(&self) -> f64 {
        self.edges[0]
    }

    pub fn max(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// The bin that a magnitude belongs to, if any. NaN and out-of-range
    /// magnitudes belong to no bin.
    pub fn bin_index(&self, mag: f64) -> Option<usize> {
        if !(self.min()..=self.max()).contains(&mag) {
            return None;
        }
        // Number of edges <= mag, minus one.
        let i = self.edges.partition_point(|&e| e <= mag) - 1;
        Some(i.min(self.num_bins() - 1))
    }
}

impl Default for MagnitudeBins {
    /// 30 bins over [22, 28].
    fn default() -> Self {
        MagnitudeBins::build(DEFAULT_MAG_MIN, DEFAULT_MAG_MAX, DEFAULT_NUM_MAG_BINS)
    }
}
