// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision.
 */

/// The median SNR that defines a pixel's depth.
pub const DEFAULT_SNR_THRESHOLD: f64 = 10.0;

/// The default HEALPix resolution of depth maps.
pub const DEFAULT_NSIDE: i64 = 2048;

/// The bright end of the magnitude bins.
pub const DEFAULT_MAG_MIN: f64 = 22.0;

/// The faint end of the magnitude bins.
pub const DEFAULT_MAG_MAX: f64 = 28.0;

pub const DEFAULT_NUM_MAG_BINS: usize = 30;

/// AB magnitude zero point of fluxes expressed in nanojanskys.
pub const NJY_AB_ZERO_POINT: f64 = 31.4;

/// Square degrees on the whole sky.
pub const FULL_SKY_DEG2: f64 = 4.0 * 180.0 * 180.0 / std::f64::consts::PI;
