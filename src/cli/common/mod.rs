// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Things shared by the `survey-depth` subcommands: argument files, catalog
//! input arguments and printers.

mod printers;

pub(super) use printers::InfoPrinter;
pub(crate) use printers::{display_warnings, Warn};

use std::path::PathBuf;

use clap::Parser;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::catalog::CATALOG_TYPES_COMMA_SEPARATED;

lazy_static::lazy_static! {
    pub(super) static ref ARG_FILE_TYPES_COMMA_SEPARATED: String = ArgFileTypes::iter().join(", ");

    pub(super) static ref ARG_FILE_HELP: String =
        format!("All arguments may be specified in a file. Any CLI arguments override arguments set in the file. Supported formats: {}", *ARG_FILE_TYPES_COMMA_SEPARATED);

    pub(super) static ref CATALOG_TYPE_HELP: String =
        format!("The type of the catalog. If not specified, it is worked out from the file extension. Supported types: {}", *CATALOG_TYPES_COMMA_SEPARATED);
}

#[derive(Debug, Display, EnumIter, EnumString)]
pub(super) enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

macro_rules! unpack_arg_file {
    ($arg_file:expr) => ({
        use std::{fs::File, io::Read, str::FromStr};

        use crate::cli::common::{ArgFileTypes, ARG_FILE_TYPES_COMMA_SEPARATED};

        debug!("Attempting to parse argument file {}", $arg_file.display());

        let mut contents = String::new();
        let arg_file_type = $arg_file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ArgFileTypes::from_str(&e).ok());

        match arg_file_type {
            Some(ArgFileTypes::Toml) => {
                debug!("Parsing toml file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match toml::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(SurveyDepthError::ArgFile(format!(
                            "Couldn't decode toml structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }
            Some(ArgFileTypes::Json) => {
                debug!("Parsing json file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match serde_json::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(SurveyDepthError::ArgFile(format!(
                            "Couldn't decode json structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }

            _ => {
                return Err(SurveyDepthError::ArgFile(format!(
                    "Argument file '{:?}' doesn't have a recognised file extension! Valid extensions are: {}", $arg_file, *ARG_FILE_TYPES_COMMA_SEPARATED)
                ))
            }
        }
    });
}

/// Arguments describing where a catalog is and how to open it.
#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct CatalogArgs {
    /// Path to the source catalog.
    #[clap(short, long, help_heading = "CATALOG")]
    pub(super) catalog: Option<PathBuf>,

    #[clap(long, help = CATALOG_TYPE_HELP.as_str(), help_heading = "CATALOG")]
    pub(super) catalog_type: Option<String>,

    /// The HDU of a FITS catalog holding the source table (zero indexed). The
    /// default is the first extension (1).
    #[clap(long, help_heading = "CATALOG")]
    pub(super) hdu: Option<usize>,
}

impl CatalogArgs {
    /// Prefer `self`'s values over `other`'s.
    pub(super) fn merge(self, other: CatalogArgs) -> CatalogArgs {
        CatalogArgs {
            catalog: self.catalog.or(other.catalog),
            catalog_type: self.catalog_type.or(other.catalog_type),
            hdu: self.hdu.or(other.hdu),
        }
    }
}
