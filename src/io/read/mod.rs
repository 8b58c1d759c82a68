// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reading depth maps back from disk.

pub(crate) mod fits;

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    str::FromStr,
};

use log::debug;
use thiserror::Error;

use self::fits::{
    fits_get_col, fits_get_optional_key, fits_get_required_key, fits_get_table_layout, fits_open,
    fits_open_hdu, FitsError,
};
use super::{DepthMapFileType, DepthMapJson, DEPTH_MAP_EXTENSIONS};
use crate::{
    depth::{DepthError, DepthMap},
    healpix::{HealpixError, Nside, PixelOrdering},
};

#[derive(Error, Debug)]
pub enum ReadDepthMapError {
    #[error("Depth map '{}' doesn't have a recognised file extension. Supported: {}", .0.display(), *DEPTH_MAP_EXTENSIONS)]
    UnknownType(PathBuf),

    #[error("Depth map '{}' has an unrecognised ORDERING '{ordering}'", .file.display())]
    BadOrdering { file: PathBuf, ordering: String },

    #[error("Depth map '{}' has no columns", .0.display())]
    NoColumns(PathBuf),

    #[error("Couldn't decode json depth map: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Fits(#[from] FitsError),

    #[error(transparent)]
    Healpix(#[from] HealpixError),

    #[error(transparent)]
    Depth(#[from] DepthError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

/// Read a depth map written by [`write_depth_map`](super::write::write_depth_map).
/// FITS maps written by other HEALPix software can be read too, as long as
/// they have one full-sky column.
pub fn read_depth_map(path: &Path) -> Result<DepthMap, ReadDepthMapError> {
    match DepthMapFileType::from_path(path) {
        Some(DepthMapFileType::Fits) => read_fits(path),
        Some(DepthMapFileType::Json) => read_json(path),
        None => Err(ReadDepthMapError::UnknownType(path.to_path_buf())),
    }
}

fn read_fits(path: &Path) -> Result<DepthMap, ReadDepthMapError> {
    let mut fptr = fits_open(path)?;
    let hdu = fits_open_hdu(&mut fptr, 1)?;
    let nside: i64 = fits_get_required_key(&mut fptr, &hdu, "NSIDE")?;
    let ordering_str: String = fits_get_required_key(&mut fptr, &hdu, "ORDERING")?;
    let ordering =
        PixelOrdering::from_str(&ordering_str).map_err(|_| ReadDepthMapError::BadOrdering {
            file: path.to_path_buf(),
            ordering: ordering_str.clone(),
        })?;
    let snr_threshold: Option<f64> = fits_get_optional_key(&mut fptr, &hdu, "SNRTHRSH")?;

    let column = {
        let (column_descriptions, _) = fits_get_table_layout(&fptr, &hdu)?;
        let first = column_descriptions
            .first()
            .ok_or_else(|| ReadDepthMapError::NoColumns(path.to_path_buf()))?;
        column_descriptions
            .iter()
            .find(|cd| cd.name.eq_ignore_ascii_case("DEPTH"))
            .unwrap_or(first)
            .name
            .clone()
    };
    debug!("Reading column {column} of {}", path.display());
    let depths: Vec<f64> = fits_get_col(&mut fptr, &hdu, &column)?;

    let nside = Nside::new(nside, ordering)?;
    Ok(DepthMap::new(
        nside,
        ordering,
        snr_threshold.unwrap_or(f64::NAN),
        depths,
    )?)
}

fn read_json(path: &Path) -> Result<DepthMap, ReadDepthMapError> {
    let f = BufReader::new(File::open(path)?);
    let DepthMapJson {
        nside,
        ordering,
        snr_threshold,
        npix: _,
        pixels,
    } = serde_json::from_reader(f)?;

    let nside = Nside::new(i64::from(nside), ordering)?;
    let npix = nside.npix();
    let mut depths = vec![0.0; npix as usize];
    for pixel in pixels {
        let depth = usize::try_from(pixel.pixel)
            .ok()
            .and_then(|i| depths.get_mut(i))
            .ok_or(HealpixError::PixelOutOfRange {
                pix: pixel.pixel,
                npix,
            })?;
        *depth = pixel.depth;
    }
    Ok(DepthMap::new(
        nside,
        ordering,
        snr_threshold.unwrap_or(f64::NAN),
        depths,
    )?)
}
