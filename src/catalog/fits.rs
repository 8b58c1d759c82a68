// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Catalogs stored as FITS binary tables.

use std::path::{Path, PathBuf};

use fitsio::tables::ColumnDataType;
use log::{debug, trace};

use super::{Catalog, CatalogError};
use crate::io::read::fits::{fits_get_col, fits_get_table_layout, fits_open, fits_open_hdu};

/// A binary-table HDU of a FITS file. Only the table layout is read up front;
/// columns are read when they're asked for.
#[derive(Debug)]
pub struct FitsCatalog {
    file: PathBuf,
    /// Zero-indexed HDU number.
    hdu: usize,
    num_rows: usize,
    /// Columns with scalar numeric cells.
    columns: Vec<String>,
}

impl FitsCatalog {
    /// Open `file` and inspect the table in `hdu` (zero indexed). If no HDU is
    /// given, the first extension is used.
    pub fn new(file: &Path, hdu: Option<usize>) -> Result<FitsCatalog, CatalogError> {
        let hdu_num = hdu.unwrap_or(1);
        debug!("Opening FITS catalog {} HDU {hdu_num}", file.display());
        let mut fptr = fits_open(file)?;
        let hdu = fits_open_hdu(&mut fptr, hdu_num)?;

        let (column_descriptions, num_rows) = fits_get_table_layout(&fptr, &hdu)?;
        let columns = column_descriptions
            .iter()
            .filter(|cd| {
                let numeric = !matches!(cd.data_type.typ, ColumnDataType::String)
                    && cd.data_type.repeat == 1;
                if !numeric {
                    trace!("Skipping non-scalar or non-numeric column {}", cd.name);
                }
                numeric
            })
            .map(|cd| cd.name.clone())
            .collect();

        Ok(FitsCatalog {
            file: file.to_path_buf(),
            hdu: hdu_num,
            num_rows,
            columns,
        })
    }

    /// FITS column names are case insensitive; find the stored spelling.
    fn column_name(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.as_str() == name)
            .or_else(|| self.columns.iter().find(|c| c.eq_ignore_ascii_case(name)))
            .map(|c| c.as_str())
    }
}

impl Catalog for FitsCatalog {
    fn description(&self) -> String {
        format!("{} (FITS HDU {})", self.file.display(), self.hdu)
    }

    fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn native_quantities(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn has_native(&self, name: &str) -> bool {
        self.column_name(name).is_some()
    }

    fn read_native(&mut self, name: &str) -> Result<Vec<f64>, CatalogError> {
        let col_name = self
            .column_name(name)
            .ok_or_else(|| CatalogError::UnknownQuantity(name.to_string()))?;
        trace!("Reading FITS column {col_name}");
        let mut fptr = fits_open(&self.file)?;
        let hdu = fits_open_hdu(&mut fptr, self.hdu)?;
        let col: Vec<f64> = fits_get_col(&mut fptr, &hdu, col_name)?;
        Ok(col)
    }
}
