// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::*;

#[test]
fn test_catalog_info() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let catalog = write_catalog(tmp_dir.path());
    let missing = tmp_dir.path().join("missing.json");

    let cmd = survey_depth()
        .args([
            "catalog-info",
            &missing.display().to_string(),
            &catalog.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("4 rows"), "{stdout}");
    assert!(stdout.contains("ra, dec, mag_i, snr_i"), "{stdout}");
    assert!(stdout.contains("Read 1 of 2 catalogs"), "{stdout}");
}

#[test]
fn test_catalog_info_without_catalogs() {
    survey_depth().arg("catalog-info").assert().failure().code(1);
}
