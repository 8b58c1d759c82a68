// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helper functions for reading FITS files. Errors record where in this crate
//! they happened, because cfitsio errors alone are often too terse to act on.

mod error;

pub use error::FitsError;

use std::{fmt::Display, panic::Location, path::Path};

use fitsio::{
    hdu::{DescribesHdu, FitsHdu, HduInfo},
    tables::{ConcreteColumnDescription, ReadsCol},
    FitsFile,
};

/// Wrap a fitsio error with the file, the HDU and the caller's location.
fn fitsio_error(
    fits_error: fitsio::errors::Error,
    fits_fptr: &FitsFile,
    hdu_description: String,
    caller: &'static Location<'static>,
) -> FitsError {
    FitsError::Fitsio {
        fits_error: Box::new(fits_error),
        fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
        hdu_description: hdu_description.into_boxed_str(),
        source_file: caller.file(),
        source_line: caller.line(),
        source_column: caller.column(),
    }
}

/// Open a fits file.
#[track_caller]
pub(crate) fn fits_open<P: AsRef<Path>>(file: P) -> Result<FitsFile, FitsError> {
    FitsFile::open(file.as_ref()).map_err(|e| {
        let caller = Location::caller();
        FitsError::Open {
            fits_error: Box::new(e),
            fits_filename: file.as_ref().to_path_buf().into_boxed_path(),
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }
    })
}

/// Open a fits file's HDU.
#[track_caller]
pub(crate) fn fits_open_hdu<T: DescribesHdu + Display + Copy>(
    fits_fptr: &mut FitsFile,
    hdu_description: T,
) -> Result<FitsHdu, FitsError> {
    let caller = Location::caller();
    fits_fptr
        .hdu(hdu_description)
        .map_err(|e| fitsio_error(e, fits_fptr, hdu_description.to_string(), caller))
}

/// The column layout and row count of a binary-table HDU.
#[track_caller]
pub(crate) fn fits_get_table_layout<'a>(
    fits_fptr: &FitsFile,
    hdu: &'a FitsHdu,
) -> Result<(&'a [ConcreteColumnDescription], usize), FitsError> {
    match &hdu.info {
        HduInfo::TableInfo {
            column_descriptions,
            num_rows,
        } => Ok((column_descriptions, *num_rows)),
        _ => {
            let caller = Location::caller();
            Err(FitsError::NotTable {
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_num: hdu.number + 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            })
        }
    }
}

/// Given a FITS file pointer, a HDU that belongs to it, and a keyword that may
/// or may not exist, pull out the value of the keyword, parsing it into the
/// desired type.
#[track_caller]
pub(crate) fn fits_get_optional_key<T: std::str::FromStr>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    keyword: &str,
) -> Result<Option<T>, FitsError> {
    let caller = Location::caller();
    let unparsed_value: String = match hdu.read_key(fits_fptr, keyword) {
        Ok(key_value) => key_value,
        // 202 = KEY_NO_EXIST, 204 = VALUE_UNDEFINED
        Err(fitsio::errors::Error::Fits(fe)) if matches!(fe.status, 202 | 204) => {
            return Ok(None)
        }
        Err(e) => {
            return Err(fitsio_error(
                e,
                fits_fptr,
                format!("{}", hdu.number + 1),
                caller,
            ))
        }
    };

    // String values come back with their quotes stripped but may keep
    // trailing padding.
    match unparsed_value.trim().parse() {
        Ok(parsed_value) => Ok(Some(parsed_value)),
        Err(_) => Err(FitsError::Parse {
            key: keyword.to_string().into_boxed_str(),
            fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
            hdu_num: hdu.number + 1,
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }),
    }
}

/// Like [`fits_get_optional_key`], but the key must exist.
#[track_caller]
pub(crate) fn fits_get_required_key<T: std::str::FromStr>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    keyword: &str,
) -> Result<T, FitsError> {
    let caller = Location::caller();
    fits_get_optional_key(fits_fptr, hdu, keyword)?.ok_or_else(|| FitsError::MissingKey {
        key: keyword.to_string().into_boxed_str(),
        fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
        hdu_num: hdu.number + 1,
        source_file: caller.file(),
        source_line: caller.line(),
        source_column: caller.column(),
    })
}

/// Get a column from a fits file's HDU. cfitsio converts numeric columns to
/// the requested type.
#[track_caller]
pub(crate) fn fits_get_col<T: ReadsCol>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    column: &str,
) -> Result<Vec<T>, FitsError> {
    let caller = Location::caller();
    hdu.read_col(fits_fptr, column)
        .map_err(|e| fitsio_error(e, fits_fptr, format!("{}", hdu.number + 1), caller))
}
