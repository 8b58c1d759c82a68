// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use super::NSIDE_MAX;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HealpixError {
    #[error("nside must be a positive integer, but got {0}")]
    NonPositiveNside(i64),

    #[error("nside {0} is larger than the maximum supported value ({NSIDE_MAX})")]
    NsideTooLarge(i64),

    #[error("nside {0} is not a power of two, which is required for NESTED ordering")]
    NsideNotPowerOfTwo(i64),

    #[error("Colatitude {0} rad is not within [0, π]")]
    InvalidColatitude(f64),

    #[error("Longitude {0} rad is not finite")]
    InvalidLongitude(f64),

    #[error("Pixel {pix} is out of range; there are only {npix} pixels")]
    PixelOutOfRange { pix: u64, npix: u64 },
}
