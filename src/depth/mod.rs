// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Survey-depth maps.
//!
//! Sources are placed into HEALPix pixels. Within each pixel, the sources are
//! binned by magnitude, and the median SNR of each bin is found. The depth of
//! the pixel is the centre of the bin whose median SNR is closest to the SNR
//! threshold.

mod bins;
mod error;

pub use bins::MagnitudeBins;
pub use error::DepthError;

use indicatif::{ParallelProgressIterator, ProgressBar};
use log::{debug, trace};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    constants::{DEFAULT_NSIDE, DEFAULT_SNR_THRESHOLD, FULL_SKY_DEG2},
    healpix::{Nside, PixelOrdering},
};

/// Which rows survive the NaN check on their coordinates.
#[derive(
    Debug, Display, EnumIter, EnumString, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CoordinateFilter {
    /// Keep a row only if both RA and Dec are not NaN.
    #[default]
    Both,

    /// Keep a row if either of RA or Dec is not NaN. A kept row with a NaN
    /// coordinate can't be pixelised, so the whole map fails.
    Either,
}

impl CoordinateFilter {
    pub fn keeps(self, ra: f64, dec: f64) -> bool {
        match self {
            CoordinateFilter::Both => !ra.is_nan() && !dec.is_nan(),
            CoordinateFilter::Either => !ra.is_nan() || !dec.is_nan(),
        }
    }
}

/// Everything that controls how a depth map is made, other than the sources
/// themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthMapParams {
    /// The median SNR that defines the depth.
    pub snr_threshold: f64,

    /// The HEALPix resolution. Validated when the map is made.
    pub nside: i64,

    pub ordering: PixelOrdering,

    pub coord_filter: CoordinateFilter,

    pub bins: MagnitudeBins,
}

impl Default for DepthMapParams {
    fn default() -> Self {
        DepthMapParams {
            snr_threshold: DEFAULT_SNR_THRESHOLD,
            nside: DEFAULT_NSIDE,
            ordering: PixelOrdering::default(),
            coord_filter: CoordinateFilter::default(),
            bins: MagnitudeBins::default(),
        }
    }
}

/// A depth for every pixel on the sky. Pixels without usable data have a
/// depth of 0.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthMap {
    nside: Nside,
    ordering: PixelOrdering,
    snr_threshold: f64,
    depths: Vec<f64>,
}

impl DepthMap {
    /// Assemble a map from existing depths, e.g. ones read from disk. There
    /// must be a depth for every pixel.
    pub fn new(
        nside: Nside,
        ordering: PixelOrdering,
        snr_threshold: f64,
        depths: Vec<f64>,
    ) -> Result<DepthMap, DepthError> {
        if depths.len() as u64 != nside.npix() {
            return Err(DepthError::InvalidParameter(format!(
                "nside {nside} needs {} depths, but {} were given",
                nside.npix(),
                depths.len()
            )));
        }
        Ok(DepthMap {
            nside,
            ordering,
            snr_threshold,
            depths,
        })
    }

    pub fn nside(&self) -> Nside {
        self.nside
    }

    pub fn ordering(&self) -> PixelOrdering {
        self.ordering
    }

    pub fn snr_threshold(&self) -> f64 {
        self.snr_threshold
    }

    /// The number of pixels, which is always 12 * nside^2.
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    pub fn get(&self, pix: u64) -> Option<f64> {
        usize::try_from(pix)
            .ok()
            .and_then(|i| self.depths.get(i).copied())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.depths
    }

    /// Pixels with a non-zero depth, in pixel order.
    pub fn populated(&self) -> impl Iterator<Item = (u64, f64)> + '_ {
        self.depths
            .iter()
            .enumerate()
            .filter(|&(_, &d)| d != 0.0)
            .map(|(i, &d)| (i as u64, d))
    }

    /// The (RA, Dec) \[degrees\] of a pixel's centre.
    pub fn pixel_centre(&self, pix: u64) -> Option<(f64, f64)> {
        self.nside
            .pix2ang(pix, self.ordering)
            .ok()
            .map(|(theta, phi)| (phi.to_degrees(), 90.0 - theta.to_degrees()))
    }

    pub fn summary(&self) -> DepthSummary {
        let mut populated: Vec<f64> = self.populated().map(|(_, d)| d).collect();
        let num_populated = populated.len();
        let deg2_per_sr = (180.0 / std::f64::consts::PI).powi(2);
        let area_deg2 = num_populated as f64 * self.nside.pixel_area() * deg2_per_sr;
        let min_depth = populated.iter().copied().min_by(f64::total_cmp);
        let max_depth = populated.iter().copied().max_by(f64::total_cmp);
        let median_depth = median(&mut populated);
        DepthSummary {
            num_pixels: self.depths.len(),
            num_populated,
            area_deg2,
            sky_fraction: area_deg2 / FULL_SKY_DEG2,
            min_depth,
            median_depth,
            max_depth,
        }
    }
}

/// Statistics over the populated pixels of a [`DepthMap`].
#[derive(Debug, Clone, PartialEq)]
pub struct DepthSummary {
    pub num_pixels: usize,
    pub num_populated: usize,
    /// Area covered by populated pixels \[square degrees\].
    pub area_deg2: f64,
    pub sky_fraction: f64,
    pub min_depth: Option<f64>,
    pub median_depth: Option<f64>,
    pub max_depth: Option<f64>,
}

/// Make a depth map from parallel columns of source positions \[degrees\],
/// magnitudes and SNRs.
///
/// NaN magnitudes and SNRs are tolerated; they are ignored when the
/// per-pixel medians are formed. Empty inputs give a map of zeros.
pub fn compute_depth_map(
    ra: &[f64],
    dec: &[f64],
    magnitude: &[f64],
    snr: &[f64],
    params: &DepthMapParams,
) -> Result<DepthMap, DepthError> {
    compute_depth_map_inner(ra, dec, magnitude, snr, params, ProgressBar::hidden())
}

/// The same as [`compute_depth_map`], but `progress` is incremented once for
/// every pixel that contains sources.
pub fn compute_depth_map_with_progress(
    ra: &[f64],
    dec: &[f64],
    magnitude: &[f64],
    snr: &[f64],
    params: &DepthMapParams,
    progress: &ProgressBar,
) -> Result<DepthMap, DepthError> {
    compute_depth_map_inner(ra, dec, magnitude, snr, params, progress.clone())
}

fn compute_depth_map_inner(
    ra: &[f64],
    dec: &[f64],
    magnitude: &[f64],
    snr: &[f64],
    params: &DepthMapParams,
    progress: ProgressBar,
) -> Result<DepthMap, DepthError> {
    let DepthMapParams {
        snr_threshold,
        nside,
        ordering,
        coord_filter,
        bins,
    } = params;

    let num_rows = ra.len();
    if dec.len() != num_rows || magnitude.len() != num_rows || snr.len() != num_rows {
        return Err(DepthError::ShapeMismatch {
            ra: ra.len(),
            dec: dec.len(),
            magnitude: magnitude.len(),
            snr: snr.len(),
        });
    }
    let nside =
        Nside::new(*nside, *ordering).map_err(|e| DepthError::InvalidParameter(e.to_string()))?;
    if !(snr_threshold.is_finite() && *snr_threshold > 0.0) {
        return Err(DepthError::InvalidParameter(format!(
            "the SNR threshold must be a positive number, but got {snr_threshold}"
        )));
    }
    let npix = usize::try_from(nside.npix()).map_err(|_| {
        DepthError::InvalidParameter(format!("nside {nside} has too many pixels for this machine"))
    })?;

    let mut pixelised = pixelise(ra, dec, nside, *ordering, *coord_filter)?;
    debug!(
        "{} of {num_rows} sources survived the coordinate filter",
        pixelised.len()
    );

    // Sorting by (pixel, row) groups each pixel's rows together and keeps
    // the result independent of thread scheduling.
    pixelised.par_sort_unstable();
    let pixel_groups: Vec<&[(u64, usize)]> = pixelised.chunk_by(|a, b| a.0 == b.0).collect();
    debug!("Sources occupy {} of {npix} pixels", pixel_groups.len());

    progress.set_length(pixel_groups.len() as u64);
    let pixel_depths: Vec<(u64, f64)> = pixel_groups
        .into_par_iter()
        .progress_with(progress.clone())
        .filter_map(|group| {
            let pix = group[0].0;
            let rows = group.iter().map(|&(_, row)| (magnitude[row], snr[row]));
            pixel_depth(rows, bins, *snr_threshold).map(|depth| (pix, depth))
        })
        .collect();
    progress.finish();
    trace!("{} pixels have a depth", pixel_depths.len());

    let mut depths = vec![0.0; npix];
    for (pix, depth) in pixel_depths {
        depths[pix as usize] = depth;
    }

    Ok(DepthMap {
        nside,
        ordering: *ordering,
        snr_threshold: *snr_threshold,
        depths,
    })
}

/// Pair every row that passes the coordinate filter with its pixel.
fn pixelise(
    ra: &[f64],
    dec: &[f64],
    nside: Nside,
    ordering: PixelOrdering,
    coord_filter: CoordinateFilter,
) -> Result<Vec<(u64, usize)>, DepthError> {
    ra.par_iter()
        .zip(dec.par_iter())
        .enumerate()
        .filter(|&(_, (&ra, &dec))| coord_filter.keeps(ra, dec))
        .map(|(row, (&ra, &dec))| {
            let theta = (90.0 - dec).to_radians();
            let phi = ra.to_radians();
            nside
                .ang2pix(theta, phi, ordering)
                .map(|pix| (pix, row))
                .map_err(|err| DepthError::InvalidCoordinate { row, ra, dec, err })
        })
        .collect()
}

/// The depth of a single pixel from the (magnitude, SNR) pairs of its
/// sources, or `None` if no magnitude bin has a usable SNR.
pub(crate) fn pixel_depth<I>(rows: I, bins: &MagnitudeBins, snr_threshold: f64) -> Option<f64>
where
    I: Iterator<Item = (f64, f64)>,
{
    let mut binned_snrs: Vec<Vec<f64>> = vec![vec![]; bins.num_bins()];
    for (mag, snr) in rows {
        if snr.is_nan() {
            continue;
        }
        if let Some(i_bin) = bins.bin_index(mag) {
            binned_snrs[i_bin].push(snr);
        }
    }

    // On ties, the brighter bin wins.
    let mut best: Option<(usize, f64)> = None;
    for (i_bin, snrs) in binned_snrs.iter_mut().enumerate() {
        let Some(median_snr) = median(snrs) else {
            continue;
        };
        let distance = (median_snr - snr_threshold).abs();
        if distance.is_nan() {
            continue;
        }
        match best {
            Some((_, best_distance)) if best_distance <= distance => (),
            _ => best = Some((i_bin, distance)),
        }
    }

    best.map(|(i_bin, _)| bins.centres()[i_bin])
}

/// The median of NaN-free values; the mean of the middle two for an even
/// count. The values are reordered.
pub(crate) fn median(values: &mut [f64]) -> Option<f64> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    let (lower_half, &mut upper, _) = values.select_nth_unstable_by(n / 2, f64::total_cmp);
    if n % 2 == 1 {
        Some(upper)
    } else {
        let lower = lower_half.iter().copied().max_by(f64::total_cmp)?;
        Some((lower + upper) / 2.0)
    }
}
