// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, info};
use thiserror::Error;

use crate::{
    catalog::{
        get_quantities, load_catalog, CatalogError, CatalogType, DerivedQuantities,
        QuantityFilter,
    },
    depth::{compute_depth_map_with_progress, DepthError, DepthMap, DepthMapParams},
    io::write::{write_depth_map, WriteDepthMapError},
    misc::expensive_op,
    PROGRESS_BARS,
};

/// The names of the catalog quantities that feed the estimator.
pub(crate) struct DepthMapFields {
    pub(crate) ra: String,
    pub(crate) dec: String,
    pub(crate) magnitude: String,
    pub(crate) snr: String,
}

pub(crate) struct DepthMapRunParams {
    pub(crate) catalog: PathBuf,
    pub(crate) catalog_type: Option<CatalogType>,
    pub(crate) hdu: Option<usize>,
    pub(crate) fields: DepthMapFields,
    pub(crate) filters: Vec<QuantityFilter>,
    pub(crate) derived: DerivedQuantities,
    pub(crate) depth_params: DepthMapParams,
    pub(crate) output: PathBuf,
}

impl DepthMapRunParams {
    pub(crate) fn run(&self) -> Result<DepthMap, DepthMapRunError> {
        let Self {
            catalog,
            catalog_type,
            hdu,
            fields,
            filters,
            derived,
            depth_params,
            output,
        } = self;

        let field_names = [&fields.ra, &fields.dec, &fields.magnitude, &fields.snr];
        let table = expensive_op(
            || -> Result<_, CatalogError> {
                let mut catalog = load_catalog(catalog, *catalog_type, *hdu)?;
                info!(
                    "Reading {} rows from {}",
                    catalog.num_rows(),
                    catalog.description()
                );
                get_quantities(catalog.as_mut(), &field_names, filters, derived)
            },
            "Still reading catalog",
        )?;
        // A quantity named by more than one field only appears once.
        let column = |name: &str| table.get(name).cloned().unwrap_or_default();
        let ra = column(&fields.ra);
        let dec = column(&fields.dec);
        let magnitude = column(&fields.magnitude);
        let snr = column(&fields.snr);
        info!("Using {} sources", ra.len());

        let progress = ProgressBar::with_draw_target(
            Some(0),
            if PROGRESS_BARS.load() {
                ProgressDrawTarget::stdout()
            } else {
                ProgressDrawTarget::hidden()
            },
        )
        .with_style(
            ProgressStyle::default_bar()
                .template("{msg:18}: [{wide_bar:.blue}] {pos:2}/{len:2} pixels ({elapsed_precise}<{eta_precise})")
                .expect("progress bar template is valid")
                .progress_chars("=> "),
        )
        .with_position(0)
        .with_message("Estimating depths");

        let map =
            compute_depth_map_with_progress(&ra, &dec, &magnitude, &snr, depth_params, &progress)?;

        let summary = map.summary();
        info!(
            "{} of {} pixels have a depth ({:.1} deg², {:.2}% of the sky)",
            summary.num_populated,
            summary.num_pixels,
            summary.area_deg2,
            summary.sky_fraction * 100.0
        );
        if let (Some(min), Some(median), Some(max)) =
            (summary.min_depth, summary.median_depth, summary.max_depth)
        {
            info!("Depths: min {min:.2}, median {median:.2}, max {max:.2}");
        }

        debug!("Writing depth map to {}", output.display());
        write_depth_map(&map, output)?;
        info!("Depth map written to {}", output.display());

        Ok(map)
    }
}

#[derive(Error, Debug)]
pub(crate) enum DepthMapRunError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Depth(#[from] DepthError),

    #[error(transparent)]
    Write(#[from] WriteDepthMapError),
}
