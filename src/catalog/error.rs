// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading quantities out of catalogs.

use std::path::PathBuf;

use thiserror::Error;

use super::CATALOG_TYPES_COMMA_SEPARATED;
use crate::io::read::fits::FitsError;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Couldn't work out the type of catalog '{}'. Supported types: {}", .0.display(), *CATALOG_TYPES_COMMA_SEPARATED)]
    UnknownType(PathBuf),

    #[error("'{0}' is neither a column of the catalog nor a derived quantity")]
    UnknownQuantity(String),

    #[error("Column '{name}' has {len} rows, but the catalog has {expected} rows")]
    UnequalLengths {
        name: String,
        len: usize,
        expected: usize,
    },

    #[error("Couldn't parse the filter '{0}'. Filters look like '<quantity> <op> <number>' (op is one of <, <=, >, >=, ==, !=) or 'isfinite(<quantity>)'")]
    BadFilter(String),

    #[error("The derived quantity '{0}' depends on itself")]
    DerivedCycle(String),

    #[error("Couldn't decode json columns from '{}': {err}", .file.display())]
    Json {
        file: PathBuf,
        err: serde_json::Error,
    },

    #[error("Couldn't decode yaml columns from '{}': {err}", .file.display())]
    Yaml {
        file: PathBuf,
        err: serde_yaml::Error,
    },

    #[error(transparent)]
    Fits(#[from] FitsError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
