// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading FITS files.

use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FitsError {
    /// Error when opening a fits file.
    #[error(
        "{source_file}:{source_line}:{source_column}: Couldn't open {}: {fits_error}", .fits_filename.display()
    )]
    Open {
        fits_error: Box<fitsio::errors::Error>,
        fits_filename: Box<Path>,
        source_file: &'static str,
        source_line: u32,
        source_column: u32,
    },

    /// A key that couldn't be found in a fits header.
    #[error("{source_file}:{source_line}:{source_column}: {} HDU {hdu_num}: Couldn't find key {key}", .fits_filename.display())]
    MissingKey {
        key: Box<str>,
        fits_filename: Box<Path>,
        hdu_num: usize,
        source_file: &'static str,
        source_line: u32,
        source_column: u32,
    },

    /// A HDU that was expected to hold a table.
    #[error("{source_file}:{source_line}:{source_column}: {} HDU {hdu_num}: Tried to use as a table, but not a table", .fits_filename.display())]
    NotTable {
        fits_filename: Box<Path>,
        hdu_num: usize,
        source_file: &'static str,
        source_line: u32,
        source_column: u32,
    },

    /// A generic error associated with the fitsio crate.
    #[error(
        "{source_file}:{source_line}:{source_column}: {} HDU '{hdu_description}': {fits_error}", .fits_filename.display()
    )]
    Fitsio {
        fits_error: Box<fitsio::errors::Error>,
        fits_filename: Box<Path>,
        hdu_description: Box<str>,
        source_file: &'static str,
        source_line: u32,
        source_column: u32,
    },

    /// A header value that couldn't be parsed into the wanted type.
    #[error("{source_file}:{source_line}:{source_column}: Couldn't parse {key} in {} HDU {hdu_num}", .fits_filename.display())]
    Parse {
        key: Box<str>,
        fits_filename: Box<Path>,
        hdu_num: usize,
        source_file: &'static str,
        source_line: u32,
        source_column: u32,
    },
}
