// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! HEALPix (Hierarchical Equal Area isoLatitude Pixelisation) of the sphere.
//!
//! Both the RING and NESTED indexing schemes are supported. Angles are given
//! as a colatitude `theta` in [0, π] (0 at the north pole) and a longitude
//! `phi` in radians; any finite `phi` is accepted and wrapped into [0, 2π).
//!
//! The 12 base pixels ("faces") are laid out as:
//! - 0–3: north polar cap
//! - 4–7: equatorial belt
//! - 8–11: south polar cap

mod error;

pub use error::HealpixError;

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// The largest nside that can be indexed with 64-bit pixel numbers.
pub const NSIDE_MAX: u32 = 1 << 29;

const TWO_THIRDS: f64 = 2.0 / 3.0;

// Ring index of the southern corner of each face (in units of nside), and
// the longitude of that corner (in units of π/4).
const JRLL: [i64; 12] = [2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4];
const JPLL: [i64; 12] = [1, 3, 5, 7, 0, 2, 4, 6, 1, 3, 5, 7];

/// How pixels are numbered.
#[derive(
    Debug, Display, EnumIter, EnumString, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum PixelOrdering {
    /// Pixels are numbered along iso-latitude rings from north to south.
    #[default]
    #[strum(to_string = "RING")]
    #[serde(rename = "RING")]
    Ring,

    /// Pixels are numbered hierarchically within each of the 12 faces.
    #[strum(to_string = "NESTED", serialize = "NEST")]
    #[serde(rename = "NESTED")]
    Nested,
}

/// A validated HEALPix resolution parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nside(u32);

impl Nside {
    /// Validate a user-supplied nside. Any positive value up to
    /// [`NSIDE_MAX`] is allowed for the RING scheme; the NESTED scheme also
    /// requires a power of two.
    pub fn new(value: i64, ordering: PixelOrdering) -> Result<Nside, HealpixError> {
        if value <= 0 {
            return Err(HealpixError::NonPositiveNside(value));
        }
        if value > i64::from(NSIDE_MAX) {
            return Err(HealpixError::NsideTooLarge(value));
        }
        let nside = value as u32;
        if ordering == PixelOrdering::Nested && !nside.is_power_of_two() {
            return Err(HealpixError::NsideNotPowerOfTwo(value));
        }
        Ok(Nside(nside))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Total number of pixels: 12 * nside^2.
    pub fn npix(self) -> u64 {
        let n = u64::from(self.0);
        12 * n * n
    }

    /// Solid angle of a single pixel \[steradians\].
    pub fn pixel_area(self) -> f64 {
        4.0 * PI / self.npix() as f64
    }

    /// log2(nside). Only meaningful for powers of two.
    fn order(self) -> u32 {
        self.0.trailing_zeros()
    }

    /// Convert a colatitude and longitude \[radians\] to a pixel index.
    pub fn ang2pix(
        self,
        theta: f64,
        phi: f64,
        ordering: PixelOrdering,
    ) -> Result<u64, HealpixError> {
        match ordering {
            PixelOrdering::Ring => ang2pix_ring(self, theta, phi),
            PixelOrdering::Nested => ang2pix_nest(self, theta, phi),
        }
    }

    /// The centre of a pixel as (colatitude, longitude) \[radians\].
    pub fn pix2ang(self, pix: u64, ordering: PixelOrdering) -> Result<(f64, f64), HealpixError> {
        match ordering {
            PixelOrdering::Ring => pix2ang_ring(self, pix),
            PixelOrdering::Nested => pix2ang_nest(self, pix),
        }
    }
}

impl std::fmt::Display for Nside {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Check the angles and reduce them to (z = cos θ, longitude in units of π/2
/// within [0, 4)).
fn z_and_tt(theta: f64, phi: f64) -> Result<(f64, f64), HealpixError> {
    if !(0.0..=PI).contains(&theta) {
        return Err(HealpixError::InvalidColatitude(theta));
    }
    if !phi.is_finite() {
        return Err(HealpixError::InvalidLongitude(phi));
    }
    let tt = (phi / FRAC_PI_2).rem_euclid(4.0);
    // rem_euclid can round up to exactly 4.0 for tiny negative inputs.
    let tt = if tt >= 4.0 { 0.0 } else { tt };
    Ok((theta.cos(), tt))
}

/// RING-scheme pixel index of a colatitude and longitude \[radians\].
pub fn ang2pix_ring(nside: Nside, theta: f64, phi: f64) -> Result<u64, HealpixError> {
    let (z, tt) = z_and_tt(theta, phi)?;
    let za = z.abs();
    let ns = i64::from(nside.get());
    let nl4 = 4 * ns;
    let ncap = 2 * ns * (ns - 1);
    let npix = 12 * ns * ns;

    let pix = if za <= TWO_THIRDS {
        // Equatorial belt.
        let temp1 = ns as f64 * (0.5 + tt);
        let temp2 = ns as f64 * z * 0.75;
        // Indices of the ascending and descending edge lines.
        let jp = (temp1 - temp2) as i64;
        let jm = (temp1 + temp2) as i64;
        // Ring number counted from z = 2/3, in 1..=2*nside+1.
        let ir = ns + 1 + jp - jm;
        let kshift = 1 - (ir & 1);
        let ip = ((jp + jm - ns + kshift + 1 + 2 * nl4) / 2).rem_euclid(nl4);
        ncap + (ir - 1) * nl4 + ip
    } else {
        // Polar caps.
        let tp = tt - tt.floor();
        let tmp = ns as f64 * (3.0 * (1.0 - za)).sqrt();
        let jp = (tp * tmp) as i64;
        let jm = ((1.0 - tp) * tmp) as i64;
        // Ring number counted from the closest pole.
        let ir = jp + jm + 1;
        let ip = ((tt * ir as f64) as i64).rem_euclid(4 * ir);
        if z > 0.0 {
            2 * ir * (ir - 1) + ip
        } else {
            npix - 2 * ir * (ir + 1) + ip
        }
    };

    Ok(pix as u64)
}

/// NESTED-scheme pixel index of a colatitude and longitude \[radians\].
pub fn ang2pix_nest(nside: Nside, theta: f64, phi: f64) -> Result<u64, HealpixError> {
    if !nside.get().is_power_of_two() {
        return Err(HealpixError::NsideNotPowerOfTwo(i64::from(nside.get())));
    }
    let (z, tt) = z_and_tt(theta, phi)?;
    let za = z.abs();
    let ns = i64::from(nside.get());
    let order = nside.order();

    let (face, ix, iy) = if za <= TWO_THIRDS {
        let temp1 = ns as f64 * (0.5 + tt);
        let temp2 = ns as f64 * z * 0.75;
        let jp = (temp1 - temp2) as i64;
        let jm = (temp1 + temp2) as i64;
        let ifp = jp >> order;
        let ifm = jm >> order;
        let face = if ifp == ifm {
            ifp | 4
        } else if ifp < ifm {
            ifp
        } else {
            ifm + 8
        };
        let ix = jm & (ns - 1);
        let iy = ns - (jp & (ns - 1)) - 1;
        (face, ix, iy)
    } else {
        let ntt = (tt as i64).min(3);
        let tp = tt - ntt as f64;
        let tmp = ns as f64 * (3.0 * (1.0 - za)).sqrt();
        let jp = ((tp * tmp) as i64).min(ns - 1);
        let jm = (((1.0 - tp) * tmp) as i64).min(ns - 1);
        if z >= 0.0 {
            (ntt, ns - jm - 1, ns - jp - 1)
        } else {
            (ntt + 8, jp, jm)
        }
    };

    Ok(face as u64 * (ns * ns) as u64 + xy_to_nested_sub(ix as u64, iy as u64))
}

/// Centre (colatitude, longitude) \[radians\] of a RING-scheme pixel.
pub fn pix2ang_ring(nside: Nside, pix: u64) -> Result<(f64, f64), HealpixError> {
    let npix = nside.npix();
    if pix >= npix {
        return Err(HealpixError::PixelOutOfRange { pix, npix });
    }
    let ns = i64::from(nside.get());
    let pix = pix as i64;
    let npix = npix as i64;
    let ncap = 2 * ns * (ns - 1);
    let fact2 = 4.0 / npix as f64;

    let (z, phi) = if pix < ncap {
        // North polar cap.
        let iring = (1 + isqrt(1 + 2 * pix)) >> 1;
        let iphi = pix + 1 - 2 * iring * (iring - 1);
        let z = 1.0 - (iring * iring) as f64 * fact2;
        let phi = (iphi as f64 - 0.5) * FRAC_PI_2 / iring as f64;
        (z, phi)
    } else if pix < npix - ncap {
        // Equatorial belt.
        let fact1 = (2 * ns) as f64 * fact2;
        let ip = pix - ncap;
        let tmp = ip / (4 * ns);
        let iring = tmp + ns;
        let iphi = ip - 4 * ns * tmp + 1;
        let fodd = if (iring + ns) & 1 != 0 { 1.0 } else { 0.5 };
        let z = (2 * ns - iring) as f64 * fact1;
        let phi = (iphi as f64 - fodd) * PI * 0.75 * fact1;
        (z, phi)
    } else {
        // South polar cap.
        let ip = npix - pix;
        let iring = (1 + isqrt(2 * ip - 1)) >> 1;
        let iphi = 4 * iring + 1 - (ip - 2 * iring * (iring - 1));
        let z = -1.0 + (iring * iring) as f64 * fact2;
        let phi = (iphi as f64 - 0.5) * FRAC_PI_2 / iring as f64;
        (z, phi)
    };

    Ok((z.clamp(-1.0, 1.0).acos(), phi))
}

/// Centre (colatitude, longitude) \[radians\] of a NESTED-scheme pixel.
pub fn pix2ang_nest(nside: Nside, pix: u64) -> Result<(f64, f64), HealpixError> {
    if !nside.get().is_power_of_two() {
        return Err(HealpixError::NsideNotPowerOfTwo(i64::from(nside.get())));
    }
    let npix = nside.npix();
    if pix >= npix {
        return Err(HealpixError::PixelOutOfRange { pix, npix });
    }
    let ns = i64::from(nside.get());
    let order = nside.order();
    let npface = (ns * ns) as u64;
    let fact2 = 4.0 / npix as f64;
    let fact1 = (2 * ns) as f64 * fact2;

    let face = (pix >> (2 * order)) as usize;
    let (ix, iy) = nested_sub_to_xy(pix & (npface - 1));
    let (ix, iy) = (ix as i64, iy as i64);

    let jr = (JRLL[face] << order) - ix - iy - 1;
    let (nr, z) = if jr < ns {
        (jr, 1.0 - (jr * jr) as f64 * fact2)
    } else if jr > 3 * ns {
        let nr = 4 * ns - jr;
        (nr, (nr * nr) as f64 * fact2 - 1.0)
    } else {
        (ns, (2 * ns - jr) as f64 * fact1)
    };

    let mut tmp = JPLL[face] * nr + ix - iy;
    if tmp < 0 {
        tmp += 8 * nr;
    }
    let phi = if nr == ns {
        0.75 * FRAC_PI_2 * tmp as f64 * fact1
    } else {
        FRAC_PI_4 * tmp as f64 / nr as f64
    };

    Ok((z.clamp(-1.0, 1.0).acos(), phi))
}

/// Integer square root, robust to float rounding.
fn isqrt(v: i64) -> i64 {
    let mut r = (v as f64).sqrt() as i64;
    while r * r > v {
        r -= 1;
    }
    while (r + 1) * (r + 1) <= v {
        r += 1;
    }
    r
}

/// Bit-interleave (x, y) into a sub-index. x provides even bits, y provides
/// odd bits.
fn xy_to_nested_sub(x: u64, y: u64) -> u64 {
    let mut result = 0;
    let mut xx = x;
    let mut yy = y;
    let mut bit = 0;
    while xx > 0 || yy > 0 {
        result |= (xx & 1) << bit;
        bit += 1;
        result |= (yy & 1) << bit;
        bit += 1;
        xx >>= 1;
        yy >>= 1;
    }
    result
}

/// De-interleave a sub-index into (x, y).
fn nested_sub_to_xy(sub: u64) -> (u64, u64) {
    let mut x = 0;
    let mut y = 0;
    let mut s = sub;
    let mut bit = 0;
    while s > 0 {
        x |= (s & 1) << bit;
        s >>= 1;
        y |= (s & 1) << bit;
        s >>= 1;
        bit += 1;
    }
    (x, y)
}
