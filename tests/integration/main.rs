// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod catalog_info;
mod depth_map;

use std::path::{Path, PathBuf};
use std::process::Output;
use std::str::from_utf8;

use assert_cmd::{output::OutputError, Command};
use indoc::indoc;
use tempfile::TempDir;

fn survey_depth() -> Command {
    Command::cargo_bin("survey-depth").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

/// A small catalog of four sources. Two sources share a pixel at low nsides,
/// one is too faint to be binned and one has no RA.
fn write_catalog<T: AsRef<Path>>(dir: T) -> PathBuf {
    let path = dir.as_ref().join("catalog.yaml");
    std::fs::write(
        &path,
        indoc! {"
            ra: [10.0, 10.5, 250.0, ~]
            dec: [20.0, 20.5, -30.0, 0.0]
            mag_i: [24.0, 24.05, 29.0, 24.0]
            snr_i: [9.0, 11.0, 5.0, 10.0]
        "},
    )
    .expect("couldn't write catalog");
    path
}
