// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#[cfg(test)]
mod tests;

use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use itertools::Itertools;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use super::common::{display_warnings, CatalogArgs, InfoPrinter, Warn, ARG_FILE_HELP};
use crate::{
    catalog::{CatalogError, CatalogType, DerivedQuantities, QuantityFilter},
    constants::{DEFAULT_NSIDE, DEFAULT_SNR_THRESHOLD},
    depth::{CoordinateFilter, DepthMapParams, MagnitudeBins},
    healpix::{HealpixError, Nside, PixelOrdering},
    io::{
        write::{check_depth_map_output, WriteDepthMapError},
        DEPTH_MAP_EXTENSIONS,
    },
    params::{DepthMapFields, DepthMapRunParams},
    SurveyDepthError,
};

const DEFAULT_OUTPUT: &str = "depth_map.fits";
/// The names given to quantities made by --mag-from-flux and --snr-from-flux.
/// They can be used in filters.
const DERIVED_MAG: &str = "derived_mag";
const DERIVED_SNR: &str = "derived_snr";

lazy_static::lazy_static! {
    static ref OUTPUT_HELP: String =
        format!("Path to the output depth map. Supported formats: {}. Default: {DEFAULT_OUTPUT}", *DEPTH_MAP_EXTENSIONS);

    static ref SNR_THRESHOLD_HELP: String =
        format!("The median SNR that defines the depth of a pixel. Default: {DEFAULT_SNR_THRESHOLD}");

    static ref NSIDE_HELP: String =
        format!("The HEALPix nside of the map. Default: {DEFAULT_NSIDE}");
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct DepthMapArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(flatten)]
    pub(super) catalog_args: CatalogArgs,

    /// The catalog quantity holding right ascensions (degrees). Default: ra
    #[clap(long, help_heading = "QUANTITIES")]
    pub(super) ra_col: Option<String>,

    /// The catalog quantity holding declinations (degrees). Default: dec
    #[clap(long, help_heading = "QUANTITIES")]
    pub(super) dec_col: Option<String>,

    /// The catalog quantity holding magnitudes.
    #[clap(long, help_heading = "QUANTITIES")]
    pub(super) mag_col: Option<String>,

    /// The catalog quantity holding signal-to-noise ratios.
    #[clap(long, help_heading = "QUANTITIES")]
    pub(super) snr_col: Option<String>,

    /// Derive SNRs as FLUX / FLUX_ERR instead of reading an SNR column. The
    /// result can be filtered on as "derived_snr".
    #[clap(long, number_of_values = 2, value_names = &["FLUX", "FLUX_ERR"], help_heading = "QUANTITIES")]
    pub(super) snr_from_flux: Option<Vec<String>>,

    /// Derive AB magnitudes from a flux column in nanojanskys instead of
    /// reading a magnitude column. The result can be filtered on as
    /// "derived_mag".
    #[clap(long, value_name = "FLUX", help_heading = "QUANTITIES")]
    pub(super) mag_from_flux: Option<String>,

    /// Only use catalog rows that satisfy this condition. May be given many
    /// times; rows must satisfy all of them. Conditions look like "mag < 27"
    /// (operators: <, <=, >, >=, ==, !=) or "isfinite(snr)".
    #[clap(long = "filter", multiple_occurrences(true), help_heading = "QUANTITIES")]
    pub(super) filters: Option<Vec<String>>,

    #[clap(long, help = SNR_THRESHOLD_HELP.as_str(), help_heading = "DEPTH MAP")]
    pub(super) snr_threshold: Option<f64>,

    #[clap(long, help = NSIDE_HELP.as_str(), help_heading = "DEPTH MAP")]
    pub(super) nside: Option<i64>,

    /// Use NESTED pixel ordering rather than RING.
    #[clap(long, help_heading = "DEPTH MAP")]
    #[serde(default)]
    pub(super) nested: bool,

    /// Keep sources that have either a valid RA or a valid Dec, rather than
    /// requiring both. A kept source with a NaN coordinate is an error.
    #[clap(long, help_heading = "DEPTH MAP")]
    #[serde(default)]
    pub(super) loose_coord_filter: bool,

    #[clap(short, long, help = OUTPUT_HELP.as_str(), help_heading = "OUTPUT FILES")]
    pub(super) output: Option<PathBuf>,
}

impl DepthMapArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified into
    /// a single struct. Where applicable, it will prefer CLI parameters over
    /// those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<DepthMapArgs, SurveyDepthError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Read in the file arguments. Ensure all of the file args are
            // accounted for by pattern matching.
            let DepthMapArgs {
                args_file: _,
                catalog_args,
                ra_col,
                dec_col,
                mag_col,
                snr_col,
                snr_from_flux,
                mag_from_flux,
                filters,
                snr_threshold,
                nside,
                nested,
                loose_coord_filter,
                output,
            } = unpack_arg_file!(arg_file);

            // Merge all the arguments, preferring the CLI args when available.
            Ok(DepthMapArgs {
                args_file: None,
                catalog_args: cli_args.catalog_args.merge(catalog_args),
                ra_col: cli_args.ra_col.or(ra_col),
                dec_col: cli_args.dec_col.or(dec_col),
                mag_col: cli_args.mag_col.or(mag_col),
                snr_col: cli_args.snr_col.or(snr_col),
                snr_from_flux: cli_args.snr_from_flux.or(snr_from_flux),
                mag_from_flux: cli_args.mag_from_flux.or(mag_from_flux),
                filters: cli_args.filters.or(filters),
                snr_threshold: cli_args.snr_threshold.or(snr_threshold),
                nside: cli_args.nside.or(nside),
                nested: cli_args.nested || nested,
                loose_coord_filter: cli_args.loose_coord_filter || loose_coord_filter,
                output: cli_args.output.or(output),
            })
        } else {
            Ok(cli_args)
        }
    }

    pub(super) fn parse(self) -> Result<DepthMapRunParams, DepthMapArgsError> {
        debug!("{:#?}", self);

        let Self {
            args_file: _,
            catalog_args:
                CatalogArgs {
                    catalog,
                    catalog_type,
                    hdu,
                },
            ra_col,
            dec_col,
            mag_col,
            snr_col,
            snr_from_flux,
            mag_from_flux,
            filters,
            snr_threshold,
            nside,
            nested,
            loose_coord_filter,
            output,
        } = self;

        let catalog = catalog.ok_or(DepthMapArgsError::NoCatalog)?;
        let catalog_type = catalog_type
            .map(|t| CatalogType::from_str(&t).map_err(|_| DepthMapArgsError::BadCatalogType(t)))
            .transpose()?;
        if hdu.is_some()
            && catalog_type.or_else(|| CatalogType::from_path(&catalog)) != Some(CatalogType::Fits)
        {
            "An HDU was given, but the catalog doesn't look like a FITS file; ignoring it".warn();
        }

        let mut derived = DerivedQuantities::new();
        let magnitude = match (mag_col, mag_from_flux) {
            (Some(_), Some(_)) => return Err(DepthMapArgsError::ConflictingMagnitude),
            (Some(col), None) => col,
            (None, Some(flux)) => {
                derived.insert_mag_from_flux_njy(DERIVED_MAG, &flux);
                DERIVED_MAG.to_string()
            }
            (None, None) => return Err(DepthMapArgsError::NoMagnitude),
        };
        let snr = match (snr_col, snr_from_flux) {
            (Some(_), Some(_)) => return Err(DepthMapArgsError::ConflictingSnr),
            (Some(col), None) => col,
            (None, Some(flux_and_err)) => match flux_and_err.as_slice() {
                [flux, flux_err] => {
                    derived.insert_snr_from_flux(DERIVED_SNR, flux, flux_err);
                    DERIVED_SNR.to_string()
                }
                // clap insists on two values, but argument files don't.
                _ => return Err(DepthMapArgsError::NoSnr),
            },
            (None, None) => return Err(DepthMapArgsError::NoSnr),
        };
        let fields = DepthMapFields {
            ra: ra_col.unwrap_or_else(|| "ra".to_string()),
            dec: dec_col.unwrap_or_else(|| "dec".to_string()),
            magnitude,
            snr,
        };

        let filters = filters
            .unwrap_or_default()
            .iter()
            .map(|f| QuantityFilter::from_str(f))
            .collect::<Result<Vec<_>, _>>()?;

        let snr_threshold = snr_threshold.unwrap_or(DEFAULT_SNR_THRESHOLD);
        if !snr_threshold.is_finite() || snr_threshold <= 0.0 {
            return Err(DepthMapArgsError::BadSnrThreshold(snr_threshold));
        }
        let ordering = if nested {
            PixelOrdering::Nested
        } else {
            PixelOrdering::Ring
        };
        let nside = Nside::new(nside.unwrap_or(DEFAULT_NSIDE), ordering)?;
        if !nside.get().is_power_of_two() {
            format!("nside {nside} is not a power of two; most HEALPix software expects one").warn();
        }
        let coord_filter = if loose_coord_filter {
            CoordinateFilter::Either
        } else {
            CoordinateFilter::Both
        };
        let depth_params = DepthMapParams {
            snr_threshold,
            nside: i64::from(nside.get()),
            ordering,
            coord_filter,
            bins: MagnitudeBins::default(),
        };

        let output = output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
        check_depth_map_output(&output)?;

        let mut printer = InfoPrinter::new("Catalog".into());
        printer.push_line(
            format!(
                "{} ({})",
                catalog.display(),
                catalog_type
                    .or_else(|| CatalogType::from_path(&catalog))
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "unknown type".to_string())
            )
            .into(),
        );
        printer.push_block(vec![
            format!("RA: {}, Dec: {}", fields.ra, fields.dec).into(),
            format!("magnitude: {}, SNR: {}", fields.magnitude, fields.snr).into(),
        ]);
        if !filters.is_empty() {
            printer.push_line(format!("filters: {}", filters.iter().join(" AND ")).into());
        }
        printer.display();

        let mut printer = InfoPrinter::new("Depth map".into());
        printer.push_block(vec![
            format!("nside {nside} ({ordering} ordering)").into(),
            format!(
                "{} pixels of {:.2} arcmin²",
                nside.npix(),
                nside.pixel_area() * (180.0 * 60.0 / std::f64::consts::PI).powi(2)
            )
            .into(),
        ]);
        printer.push_line(format!("SNR threshold: {snr_threshold}").into());
        printer.push_line(
            format!(
                "magnitude bins: {} over [{}, {}]",
                depth_params.bins.num_bins(),
                depth_params.bins.min(),
                depth_params.bins.max()
            )
            .into(),
        );
        printer.push_line(format!("coordinate filter: {coord_filter}").into());
        printer.push_line(format!("output: {}", output.display()).into());
        printer.display();

        display_warnings();

        Ok(DepthMapRunParams {
            catalog,
            catalog_type,
            hdu,
            fields,
            filters,
            derived,
            depth_params,
            output,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), SurveyDepthError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        params.run()?;
        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub(super) enum DepthMapArgsError {
    #[error("No catalog was specified")]
    NoCatalog,

    #[error("Unrecognised catalog type '{0}'")]
    BadCatalogType(String),

    #[error("No magnitudes were specified; use --mag-col or --mag-from-flux")]
    NoMagnitude,

    #[error("No SNRs were specified; use --snr-col or --snr-from-flux with a flux and its error")]
    NoSnr,

    #[error("Only one of --mag-col and --mag-from-flux may be given")]
    ConflictingMagnitude,

    #[error("Only one of --snr-col and --snr-from-flux may be given")]
    ConflictingSnr,

    #[error("The SNR threshold must be a positive number, but got {0}")]
    BadSnrThreshold(f64),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Healpix(#[from] HealpixError),

    #[error(transparent)]
    Write(#[from] WriteDepthMapError),
}
