// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use approx::assert_abs_diff_eq;
use clap::Parser;
use indoc::indoc;
use tempfile::TempDir;

use super::{DepthMapArgs, DepthMapArgsError};
use crate::{
    depth::CoordinateFilter, healpix::PixelOrdering, io::read::read_depth_map, SurveyDepthError,
};

fn write_json_catalog(dir: &Path) -> PathBuf {
    let file = dir.join("catalog.json");
    std::fs::write(
        &file,
        indoc! {r#"
            {
                "ra": [10.0, 200.0, null],
                "dec": [20.0, -45.0, 5.0],
                "mag": [24.0, 30.0, 24.0],
                "snr": [10.0, 3.0, 10.0],
                "flux": [1000.0, 10.0, 1000.0],
                "flux_err": [100.0, 5.0, 100.0]
            }
        "#},
    )
    .unwrap();
    file
}

fn args(dir: &Path, extra: &[&str]) -> DepthMapArgs {
    let catalog = write_json_catalog(dir).display().to_string();
    let output = dir.join("map.json").display().to_string();
    #[rustfmt::skip]
    let mut args = vec![
        "depth-map",
        "--catalog", &catalog,
        "-o", &output,
    ];
    args.extend_from_slice(extra);
    DepthMapArgs::parse_from(args)
}

#[test]
fn test_merge_prefers_cli_args() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let arg_file = tmp_dir.path().join("args.toml");
    std::fs::write(
        &arg_file,
        indoc! {r#"
            catalog = "file_catalog.fits"
            hdu = 2
            mag_col = "mag_i"
            snr_col = "snr_i"
            filters = ["mag_i < 27", "isfinite(snr_i)"]
            snr_threshold = 5.0
            nside = 64
            nested = true
        "#},
    )
    .unwrap();

    let arg_file = arg_file.display().to_string();
    #[rustfmt::skip]
    let args = DepthMapArgs::parse_from([
        "depth-map",
        &arg_file,
        "--catalog", "cli_catalog.json",
        "--nside", "32",
    ]);
    let merged = args.merge().unwrap();
    assert!(merged.args_file.is_none());
    assert_eq!(
        merged.catalog_args.catalog,
        Some(PathBuf::from("cli_catalog.json"))
    );
    assert_eq!(merged.catalog_args.hdu, Some(2));
    assert_eq!(merged.nside, Some(32));
    assert_eq!(merged.snr_threshold, Some(5.0));
    assert_eq!(merged.mag_col.as_deref(), Some("mag_i"));
    assert_eq!(
        merged.filters,
        Some(vec!["mag_i < 27".to_string(), "isfinite(snr_i)".to_string()])
    );
    assert!(merged.nested);
    assert!(!merged.loose_coord_filter);
    assert!(merged.ra_col.is_none());
}

#[test]
fn test_json_arg_file() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let arg_file = tmp_dir.path().join("args.json");
    std::fs::write(
        &arg_file,
        r#"{"snr_from_flux": ["flux", "flux_err"], "loose_coord_filter": true}"#,
    )
    .unwrap();
    let arg_file = arg_file.display().to_string();
    let merged = DepthMapArgs::parse_from(["depth-map", &arg_file])
        .merge()
        .unwrap();
    assert_eq!(
        merged.snr_from_flux,
        Some(vec!["flux".to_string(), "flux_err".to_string()])
    );
    assert!(merged.loose_coord_filter);
    assert!(merged.catalog_args.catalog.is_none());
}

#[test]
fn test_bad_arg_files() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let arg_file = tmp_dir.path().join("args.yaml");
    std::fs::write(&arg_file, "nside: 4\n").unwrap();
    let arg_file = arg_file.display().to_string();
    let result = DepthMapArgs::parse_from(["depth-map", &arg_file]).merge();
    assert!(matches!(result, Err(SurveyDepthError::ArgFile(_))));

    let arg_file = tmp_dir.path().join("args.toml");
    std::fs::write(&arg_file, "nside = \"big\"\n").unwrap();
    let arg_file = arg_file.display().to_string();
    let result = DepthMapArgs::parse_from(["depth-map", &arg_file]).merge();
    assert!(matches!(result, Err(SurveyDepthError::ArgFile(_))));
}

#[test]
fn test_parse_defaults() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let params = args(tmp_dir.path(), &["--mag-col", "mag", "--snr-col", "snr"])
        .parse()
        .unwrap();
    assert_eq!(params.fields.ra, "ra");
    assert_eq!(params.fields.dec, "dec");
    assert_eq!(params.fields.magnitude, "mag");
    assert_eq!(params.fields.snr, "snr");
    assert!(params.filters.is_empty());
    assert!(params.derived.is_empty());
    assert_abs_diff_eq!(params.depth_params.snr_threshold, 10.0);
    assert_eq!(params.depth_params.nside, 2048);
    assert_eq!(params.depth_params.ordering, PixelOrdering::Ring);
    assert_eq!(params.depth_params.coord_filter, CoordinateFilter::Both);
    assert!(params.catalog_type.is_none());
}

#[test]
fn test_parse_derived_quantities() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    #[rustfmt::skip]
    let params = args(tmp_dir.path(), &[
        "--mag-from-flux", "flux",
        "--snr-from-flux", "flux", "flux_err",
        "--filter", "derived_snr > 2",
        "--filter", "isfinite(derived_mag)",
        "--nested", "--nside", "8",
        "--loose-coord-filter",
    ])
    .parse()
    .unwrap();
    assert_eq!(params.fields.magnitude, "derived_mag");
    assert_eq!(params.fields.snr, "derived_snr");
    assert!(params.derived.contains("derived_mag"));
    assert!(params.derived.contains("derived_snr"));
    assert_eq!(params.filters.len(), 2);
    assert_eq!(params.depth_params.ordering, PixelOrdering::Nested);
    assert_eq!(params.depth_params.nside, 8);
    assert_eq!(params.depth_params.coord_filter, CoordinateFilter::Either);
}

#[test]
fn test_parse_errors() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let dir = tmp_dir.path();

    let result = DepthMapArgs::parse_from(["depth-map", "--mag-col", "m"]).parse();
    assert!(matches!(result, Err(DepthMapArgsError::NoCatalog)));

    let result = args(dir, &["--snr-col", "snr"]).parse();
    assert!(matches!(result, Err(DepthMapArgsError::NoMagnitude)));

    let result = args(dir, &["--mag-col", "mag"]).parse();
    assert!(matches!(result, Err(DepthMapArgsError::NoSnr)));

    #[rustfmt::skip]
    let result = args(dir, &["--mag-col", "mag", "--mag-from-flux", "flux", "--snr-col", "snr"]).parse();
    assert!(matches!(result, Err(DepthMapArgsError::ConflictingMagnitude)));

    let ok = ["--mag-col", "mag", "--snr-col", "snr"];
    let with = |extra: &[&str]| {
        let mut a = ok.to_vec();
        a.extend_from_slice(extra);
        args(dir, &a).parse()
    };
    assert!(matches!(
        with(&["--snr-threshold", "0"]),
        Err(DepthMapArgsError::BadSnrThreshold(_))
    ));
    assert!(matches!(
        with(&["--snr-threshold", "NaN"]),
        Err(DepthMapArgsError::BadSnrThreshold(_))
    ));
    assert!(matches!(
        with(&["--nside", "0"]),
        Err(DepthMapArgsError::Healpix(_))
    ));
    assert!(matches!(
        with(&["--nside", "3", "--nested"]),
        Err(DepthMapArgsError::Healpix(_))
    ));
    // Non-power-of-two nsides are fine for RING.
    assert!(with(&["--nside", "3"]).is_ok());
    assert!(matches!(
        with(&["--filter", "mag <> 3"]),
        Err(DepthMapArgsError::Catalog(_))
    ));
    assert!(matches!(
        with(&["--catalog-type", "csv"]),
        Err(DepthMapArgsError::BadCatalogType(_))
    ));
    let png = dir.join("map.png").display().to_string();
    assert!(matches!(
        with(&["-o", &png]),
        Err(DepthMapArgsError::Write(_))
    ));
}

#[test]
fn test_dry_run_and_run() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("map.json");
    #[rustfmt::skip]
    let args = args(tmp_dir.path(), &[
        "--mag-col", "mag",
        "--snr-col", "snr",
        "--nside", "1",
    ]);

    // A dry run doesn't write anything.
    args.clone().run(true).unwrap();
    assert!(!output.exists());

    args.run(false).unwrap();
    let map = read_depth_map(&output).unwrap();
    assert_eq!(map.len(), 12);
    let populated: Vec<(u64, f64)> = map.populated().collect();
    // The second source is too faint to be binned, and the third has no RA.
    assert_eq!(populated.len(), 1);
    assert_abs_diff_eq!(populated[0].1, 24.1, epsilon = 1e-10);
}

#[test]
fn test_run_with_derived_quantities() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("map.json");
    #[rustfmt::skip]
    let args = args(tmp_dir.path(), &[
        "--mag-from-flux", "flux",
        "--snr-from-flux", "flux", "flux_err",
        "--filter", "dec > 0",
        "--nside", "1",
    ]);
    args.run(false).unwrap();

    // flux 1000 nJy is magnitude 23.9 and the SNR is 10.
    let map = read_depth_map(&output).unwrap();
    let populated: Vec<(u64, f64)> = map.populated().collect();
    assert_eq!(populated.len(), 1);
    assert_abs_diff_eq!(populated[0].1, 23.9, epsilon = 1e-10);
}

#[test]
fn test_run_with_unknown_quantity() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("map.json");
    let args = args(tmp_dir.path(), &["--mag-col", "mag_z", "--snr-col", "snr"]);
    let result = args.run(false);
    assert!(matches!(result, Err(SurveyDepthError::Catalog(_))));
    assert!(!output.exists());
}
