// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests for making depth maps.

use approx::assert_abs_diff_eq;

use crate::*;
use survey_depth::{read_depth_map, PixelOrdering};

#[test]
fn test_depth_map_writes_a_map() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let catalog = write_catalog(tmp_dir.path());
    let output = tmp_dir.path().join("map.fits");

    #[rustfmt::skip]
    let cmd = survey_depth()
        .args([
            "depth-map",
            "--catalog", &catalog.display().to_string(),
            "--mag-col", "mag_i",
            "--snr-col", "snr_i",
            "--nside", "2",
            "--nested",
            "-o", &output.display().to_string(),
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "depth-map failed on simple test data: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("depth-map complete"), "{stdout}");

    let map = read_depth_map(&output).unwrap();
    assert_eq!(map.len(), 48);
    assert_eq!(map.ordering(), PixelOrdering::Nested);
    let populated: Vec<(u64, f64)> = map.populated().collect();
    assert_eq!(populated.len(), 1);
    // Both bright sources are in the [24.0, 24.2) bin, with a median SNR of
    // exactly 10.
    assert_abs_diff_eq!(populated[0].1, 24.1, epsilon = 1e-10);
}

#[test]
fn test_depth_map_with_arg_file_and_save_toml() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let catalog = write_catalog(tmp_dir.path());
    let output = tmp_dir.path().join("map.json");
    let arg_file = tmp_dir.path().join("args.toml");
    std::fs::write(
        &arg_file,
        format!(
            "catalog = {:?}\nmag_col = \"mag_i\"\nsnr_col = \"snr_i\"\nnside = 1\noutput = {:?}\n",
            catalog.display().to_string(),
            output.display().to_string()
        ),
    )
    .unwrap();
    let saved = tmp_dir.path().join("saved.toml");

    #[rustfmt::skip]
    let cmd = survey_depth()
        .args([
            "--save-toml", &saved.display().to_string(),
            "depth-map",
            &arg_file.display().to_string(),
            "--snr-threshold", "9",
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", cmd.err().unwrap());
    assert!(output.exists());

    let map = read_depth_map(&output).unwrap();
    assert_abs_diff_eq!(map.snr_threshold(), 9.0);

    let saved = std::fs::read_to_string(saved).unwrap();
    assert!(saved.contains("snr_threshold = 9.0"), "{saved}");
    assert!(saved.contains("mag_col = \"mag_i\""), "{saved}");
}

#[test]
fn test_depth_map_dry_run_writes_nothing() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let catalog = write_catalog(tmp_dir.path());
    let output = tmp_dir.path().join("map.fits");

    #[rustfmt::skip]
    let cmd = survey_depth()
        .args([
            "depth-map",
            "--catalog", &catalog.display().to_string(),
            "--mag-col", "mag_i",
            "--snr-col", "snr_i",
            "-o", &output.display().to_string(),
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Dry run"), "{stdout}");
    assert!(!output.exists());
}

#[test]
fn test_depth_map_bad_args_exit_with_1() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let catalog = write_catalog(tmp_dir.path());
    let catalog = catalog.display().to_string();
    let output = tmp_dir.path().join("map.fits").display().to_string();

    // No SNRs.
    #[rustfmt::skip]
    let result = survey_depth()
        .args([
            "depth-map",
            "--catalog", &catalog,
            "--mag-col", "mag_i",
            "-o", &output,
        ])
        .assert();
    result.failure().code(1);

    // Invalid nside.
    #[rustfmt::skip]
    let cmd = survey_depth()
        .args([
            "depth-map",
            "--catalog", &catalog,
            "--mag-col", "mag_i",
            "--snr-col", "snr_i",
            "--nside", "0",
            "-o", &output,
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.starts_with("Error: nside must be a positive integer"), "{stderr}");

    // A quantity that isn't in the catalog.
    #[rustfmt::skip]
    let cmd = survey_depth()
        .args([
            "depth-map",
            "--catalog", &catalog,
            "--mag-col", "mag_z",
            "--snr-col", "snr_i",
            "-o", &output,
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("mag_z"), "{stderr}");
}
