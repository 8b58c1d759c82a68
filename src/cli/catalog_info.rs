// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to report what is in catalog files.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use clap::Parser;
use itertools::Itertools;
use log::info;

use super::common::CATALOG_TYPE_HELP;
use crate::{
    catalog::{load_catalog, CatalogType},
    misc::expensive_op,
    SurveyDepthError,
};

/// Print the number of rows and the quantities of catalogs.
#[derive(Parser, Debug)]
pub(super) struct CatalogInfoArgs {
    /// Path to the catalog(s) to be inspected.
    #[clap(name = "CATALOGS", parse(from_os_str))]
    catalogs: Vec<PathBuf>,

    #[clap(long, help = CATALOG_TYPE_HELP.as_str())]
    catalog_type: Option<String>,

    /// The HDU of FITS catalogs holding the source table (zero indexed).
    #[clap(long)]
    hdu: Option<usize>,
}

impl CatalogInfoArgs {
    /// If the `catalog_type` is given, then all provided catalogs are assumed
    /// to be of that type, otherwise each catalog's type is guessed.
    pub(super) fn run(&self) -> Result<(), SurveyDepthError> {
        let catalog_type = self
            .catalog_type
            .as_ref()
            .map(|t| {
                CatalogType::from_str(t).map_err(|_| CatalogInfoArgsError::BadCatalogType(t.clone()))
            })
            .transpose()?;
        let num_read = catalog_info(&self.catalogs, catalog_type, self.hdu)?;
        info!("Read {num_read} of {} catalogs", self.catalogs.len());
        Ok(())
    }
}

/// Read and print stats out for each catalog. If a catalog couldn't be read,
/// print the error, and continue trying to read the other catalogs. Returns
/// the number of catalogs that could be read.
fn catalog_info<P: AsRef<Path>>(
    catalogs: &[P],
    catalog_type: Option<CatalogType>,
    hdu: Option<usize>,
) -> Result<usize, CatalogInfoArgsError> {
    if catalogs.is_empty() {
        return Err(CatalogInfoArgsError::NoCatalogs);
    }

    let mut num_read = 0;
    for catalog in catalogs {
        let catalog = catalog.as_ref();
        info!("{}:", catalog.display());
        let catalog = match expensive_op(
            || load_catalog(catalog, catalog_type, hdu),
            "Still reading catalog",
        ) {
            Ok(c) => c,
            Err(e) => {
                info!("{}", e);
                info!("");
                continue;
            }
        };

        info!("    {} rows", catalog.num_rows());
        let quantities = catalog.native_quantities();
        info!(
            "    {} quantities: {}",
            quantities.len(),
            quantities.iter().join(", ")
        );
        info!("");
        num_read += 1;
    }

    Ok(num_read)
}

#[derive(thiserror::Error, Debug)]
pub(super) enum CatalogInfoArgsError {
    #[error("No catalogs were supplied")]
    NoCatalogs,

    #[error("Unrecognised catalog type '{0}'")]
    BadCatalogType(String),
}
