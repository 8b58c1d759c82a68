// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use super::{
    read::{
        fits::{fits_get_optional_key, fits_get_required_key, fits_open, fits_open_hdu},
        read_depth_map, ReadDepthMapError,
    },
    write::{can_write_to_file, check_depth_map_output, write_depth_map, WriteDepthMapError},
    DepthMapFileType,
};
use crate::{
    depth::{compute_depth_map, DepthMap, DepthMapParams},
    healpix::{Nside, PixelOrdering},
};

fn small_map(ordering: PixelOrdering) -> DepthMap {
    let ra = [10.0, 10.1, 200.0, 300.0];
    let dec = [20.0, 20.1, -60.0, 45.0];
    let mag = [24.1, 24.3, 25.3, 27.9];
    let snr = [9.0, 11.0, 10.0, 3.0];
    let params = DepthMapParams {
        nside: 4,
        ordering,
        ..Default::default()
    };
    compute_depth_map(&ra, &dec, &mag, &snr, &params).unwrap()
}

#[test]
fn test_file_types() {
    assert_eq!(
        DepthMapFileType::from_path(&PathBuf::from("a/b/map.fits")),
        Some(DepthMapFileType::Fits)
    );
    assert_eq!(
        DepthMapFileType::from_path(&PathBuf::from("map.JSON")),
        Some(DepthMapFileType::Json)
    );
    assert_eq!(DepthMapFileType::from_path(&PathBuf::from("map.png")), None);
    assert_eq!(DepthMapFileType::from_path(&PathBuf::from("map")), None);
}

#[test]
fn test_fits_map_reads_back() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let file = tmp_dir.path().join("depth.fits");
    for ordering in [PixelOrdering::Ring, PixelOrdering::Nested] {
        let map = small_map(ordering);
        write_depth_map(&map, &file).unwrap();
        let read = read_depth_map(&file).unwrap();
        assert_eq!(read, map);
    }
}

#[test]
fn test_fits_map_header() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let file = tmp_dir.path().join("depth.fits");
    let map = small_map(PixelOrdering::Nested);
    write_depth_map(&map, &file).unwrap();

    let mut fptr = fits_open(&file).unwrap();
    let hdu = fits_open_hdu(&mut fptr, 1).unwrap();
    let pixtype: String = fits_get_required_key(&mut fptr, &hdu, "PIXTYPE").unwrap();
    assert_eq!(pixtype, "HEALPIX");
    let ordering: String = fits_get_required_key(&mut fptr, &hdu, "ORDERING").unwrap();
    assert_eq!(ordering, "NESTED");
    let nside: i64 = fits_get_required_key(&mut fptr, &hdu, "NSIDE").unwrap();
    assert_eq!(nside, 4);
    let lastpix: i64 = fits_get_required_key(&mut fptr, &hdu, "LASTPIX").unwrap();
    assert_eq!(lastpix, 191);
    let indxschm: String = fits_get_required_key(&mut fptr, &hdu, "INDXSCHM").unwrap();
    assert_eq!(indxschm, "IMPLICIT");
    let threshold: f64 = fits_get_required_key(&mut fptr, &hdu, "SNRTHRSH").unwrap();
    assert_abs_diff_eq!(threshold, 10.0);
    let missing: Option<String> = fits_get_optional_key(&mut fptr, &hdu, "NOTHERE").unwrap();
    assert!(missing.is_none());
}

#[test]
fn test_json_map_reads_back() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let file = tmp_dir.path().join("depth.json");
    let map = small_map(PixelOrdering::Ring);
    write_depth_map(&map, &file).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(json["nside"], 4);
    assert_eq!(json["ordering"], "RING");
    assert_eq!(json["npix"], 192);
    let pixels = json["pixels"].as_array().unwrap();
    assert_eq!(pixels.len(), map.populated().count());
    for (pixel, (pix, depth)) in pixels.iter().zip(map.populated()) {
        assert_eq!(pixel["pixel"], pix);
        assert_abs_diff_eq!(pixel["depth"].as_f64().unwrap(), depth);
        let (ra, dec) = map.pixel_centre(pix).unwrap();
        assert_abs_diff_eq!(pixel["ra"].as_f64().unwrap(), ra);
        assert_abs_diff_eq!(pixel["dec"].as_f64().unwrap(), dec);
    }

    let read = read_depth_map(&file).unwrap();
    assert_eq!(read, map);
}

#[test]
fn test_json_with_bad_pixel() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let file = tmp_dir.path().join("bad.json");
    std::fs::write(
        &file,
        r#"{"nside": 1, "ordering": "RING", "snr_threshold": 10.0, "npix": 12,
            "pixels": [{"pixel": 12, "ra": 0.0, "dec": 0.0, "depth": 24.1}]}"#,
    )
    .unwrap();
    assert!(matches!(
        read_depth_map(&file),
        Err(ReadDepthMapError::Healpix(_))
    ));
}

#[test]
fn test_unknown_output_type() {
    let map = DepthMap::new(
        Nside::new(1, PixelOrdering::Ring).unwrap(),
        PixelOrdering::Ring,
        10.0,
        vec![0.0; 12],
    )
    .unwrap();
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let file = tmp_dir.path().join("depth.png");
    assert!(matches!(
        write_depth_map(&map, &file),
        Err(WriteDepthMapError::UnknownType(_))
    ));
    assert!(matches!(
        check_depth_map_output(&file),
        Err(WriteDepthMapError::UnknownType(_))
    ));
    assert!(!file.exists());
}

#[test]
fn test_can_write_makes_directories() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let file = tmp_dir.path().join("new").join("dirs").join("depth.fits");
    check_depth_map_output(&file).unwrap();
    assert!(file.parent().unwrap().is_dir());
    // The probe doesn't leave a file behind.
    assert!(!file.exists());

    // Existing files are left alone.
    let existing = tmp_dir.path().join("existing.json");
    std::fs::write(&existing, "{}").unwrap();
    can_write_to_file(&existing).unwrap();
    assert_eq!(std::fs::read_to_string(&existing).unwrap(), "{}");
}

#[test]
fn test_depth_map_needs_every_pixel() {
    let nside = Nside::new(2, PixelOrdering::Ring).unwrap();
    assert!(DepthMap::new(nside, PixelOrdering::Ring, 10.0, vec![0.0; 47]).is_err());
    assert!(DepthMap::new(nside, PixelOrdering::Ring, 10.0, vec![0.0; 48]).is_ok());
}

#[test]
fn test_map_without_snr_threshold_converts_between_formats() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let fits_file = tmp_dir.path().join("no_threshold.fits");
    let json_file = tmp_dir.path().join("no_threshold.json");
    let nside = Nside::new(1, PixelOrdering::Ring).unwrap();
    let mut depths = vec![0.0; 12];
    depths[3] = 24.1;
    let map = DepthMap::new(nside, PixelOrdering::Ring, f64::NAN, depths).unwrap();

    write_depth_map(&map, &fits_file).unwrap();
    let mut fptr = fits_open(&fits_file).unwrap();
    let hdu = fits_open_hdu(&mut fptr, 1).unwrap();
    let threshold: Option<f64> = fits_get_optional_key(&mut fptr, &hdu, "SNRTHRSH").unwrap();
    assert!(threshold.is_none());
    let from_fits = read_depth_map(&fits_file).unwrap();
    assert!(from_fits.snr_threshold().is_nan());

    write_depth_map(&from_fits, &json_file).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_file).unwrap()).unwrap();
    assert!(json.get("snr_threshold").is_none());
    let from_json = read_depth_map(&json_file).unwrap();
    assert!(from_json.snr_threshold().is_nan());
    assert_eq!(from_json.as_slice(), map.as_slice());
    assert_eq!(from_json.ordering(), PixelOrdering::Ring);
}
