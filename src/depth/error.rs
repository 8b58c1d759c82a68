// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with making depth maps.

use thiserror::Error;

use crate::healpix::HealpixError;

/// Everything that can stop a depth map from being made. A pixel or bin
/// without any usable data is not an error; such pixels get a depth of 0.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DepthError {
    #[error("The input columns have different lengths (ra: {ra}, dec: {dec}, magnitude: {magnitude}, snr: {snr})")]
    ShapeMismatch {
        ra: usize,
        dec: usize,
        magnitude: usize,
        snr: usize,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Row {row} (RA {ra}°, Dec {dec}°) can't be placed on the sky: {err}")]
    InvalidCoordinate {
        row: usize,
        ra: f64,
        dec: f64,
        err: HealpixError,
    },
}
