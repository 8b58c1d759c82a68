// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Survey-depth maps: the limiting magnitude of a source catalog across the sky,
on a HEALPix grid.

Each source is placed into a HEALPix pixel. Within a pixel, sources are binned
by magnitude and the median signal-to-noise ratio of each bin is found; the
pixel's depth is the centre of the bin whose median SNR is closest to a
threshold. See [`compute_depth_map`].
 */

pub mod catalog;
mod cli;
pub mod constants;
pub mod depth;
pub mod healpix;
pub mod io;
mod misc;
mod params;

use crossbeam_utils::atomic::AtomicCell;

/// Should progress bars be drawn? Only the binary turns these on.
pub(crate) static PROGRESS_BARS: AtomicCell<bool> = AtomicCell::new(false);

// Re-exports.
pub use catalog::{get_quantities, load_catalog, Catalog, CatalogError, DerivedQuantities};
pub use cli::{SurveyDepth, SurveyDepthError};
pub use depth::{
    compute_depth_map, compute_depth_map_with_progress, CoordinateFilter, DepthError, DepthMap,
    DepthMapParams, DepthSummary, MagnitudeBins,
};
pub use healpix::{HealpixError, Nside, PixelOrdering};
pub use io::{read::read_depth_map, write::write_depth_map};
