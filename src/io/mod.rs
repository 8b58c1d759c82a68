// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! File stuff (reading and writing depth maps, FITS helpers).

pub mod read;
pub mod write;
#[cfg(test)]
mod tests;

use std::path::Path;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::healpix::PixelOrdering;

/// All supported depth-map file formats.
#[derive(Debug, Display, EnumIter, EnumString, Clone, Copy, PartialEq, Eq)]
#[strum(ascii_case_insensitive)]
pub enum DepthMapFileType {
    /// A HEALPix-convention FITS binary table.
    #[strum(serialize = "fits")]
    Fits,
    #[strum(serialize = "json")]
    Json,
}

lazy_static::lazy_static! {
    pub(crate) static ref DEPTH_MAP_EXTENSIONS: String = DepthMapFileType::iter().join(", ");
}

impl DepthMapFileType {
    pub fn from_path(path: &Path) -> Option<DepthMapFileType> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }
}

/// The JSON layout of a depth map. Only populated pixels are listed.
#[derive(Debug, Serialize, Deserialize)]
struct DepthMapJson {
    nside: u32,
    ordering: PixelOrdering,
    /// Maps made elsewhere may not record a threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    snr_threshold: Option<f64>,
    npix: u64,
    pixels: Vec<PixelJson>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PixelJson {
    pixel: u64,
    /// Pixel centre \[degrees\].
    ra: f64,
    dec: f64,
    depth: f64,
}
