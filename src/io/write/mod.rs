// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to write out depth maps.

mod error;

pub use error::{FileWriteError, WriteDepthMapError};

use std::{
    ffi::CString,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use fitsio::{
    errors::check_status as fits_check_status,
    tables::{ColumnDataType, ColumnDescription},
    FitsFile,
};
use log::{debug, trace};

use super::{DepthMapFileType, DepthMapJson, PixelJson};
use crate::{cli::Warn, depth::DepthMap};

/// Write a depth map. The format is chosen by the file extension.
pub fn write_depth_map(map: &DepthMap, file: &Path) -> Result<(), WriteDepthMapError> {
    let file_type = DepthMapFileType::from_path(file)
        .ok_or_else(|| WriteDepthMapError::UnknownType(file.to_path_buf()))?;
    debug!("Writing depth map to {} ({file_type})", file.display());
    match file_type {
        DepthMapFileType::Fits => write_fits(map, file),
        DepthMapFileType::Json => write_json(map, file),
    }
}

/// Check that a depth map can be written to `file`, before any work is done.
pub(crate) fn check_depth_map_output(file: &Path) -> Result<(), WriteDepthMapError> {
    if DepthMapFileType::from_path(file).is_none() {
        return Err(WriteDepthMapError::UnknownType(file.to_path_buf()));
    }
    can_write_to_file(file)?;
    Ok(())
}

/// The full-sky map goes into a single `DEPTH` column with implicit pixel
/// indices, which is how HEALPix software expects maps to be stored.
fn write_fits(map: &DepthMap, file: &Path) -> Result<(), WriteDepthMapError> {
    if file.exists() {
        std::fs::remove_file(file)?;
    }
    let mut fptr = FitsFile::create(file).open()?;

    let col = ColumnDescription::new("DEPTH")
        .with_type(ColumnDataType::Double)
        .create()?;
    let hdu = fptr.create_table("DEPTH_MAP", &[col])?;
    hdu.write_col(&mut fptr, "DEPTH", map.as_slice())?;

    let npix = map.nside().npix() as i64;
    hdu.write_key(&mut fptr, "PIXTYPE", "HEALPIX")?;
    hdu.write_key(&mut fptr, "ORDERING", map.ordering().to_string())?;
    hdu.write_key(&mut fptr, "COORDSYS", "C")?;
    hdu.write_key(&mut fptr, "NSIDE", i64::from(map.nside().get()))?;
    hdu.write_key(&mut fptr, "FIRSTPIX", 0_i64)?;
    hdu.write_key(&mut fptr, "LASTPIX", npix - 1)?;
    hdu.write_key(&mut fptr, "INDXSCHM", "IMPLICIT")?;
    hdu.write_key(&mut fptr, "OBJECT", "FULLSKY")?;
    if map.snr_threshold().is_finite() {
        hdu.write_key(&mut fptr, "SNRTHRSH", map.snr_threshold())?;
    }
    hdu.write_key(
        &mut fptr,
        "SOFTWARE",
        format!(
            "Created by {} v{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ),
    )?;

    // Write out the current command-line call ("CMDLINE").
    unsafe {
        // It's possible that the command-line call has invalid UTF-8. So use
        // args_os and attempt to convert to UTF-8 strings. If there are
        // problems on the way, don't bother trying to write the CMDLINE key.
        match std::env::args_os()
            .map(|a| a.into_string())
            .collect::<Result<Vec<String>, _>>()
            .and_then(|v| CString::new(v.join(" ")).map_err(|_| std::ffi::OsString::from("")))
        {
            Err(_) => trace!("Not writing CMDLINE; the command line isn't valid UTF-8"),
            Ok(value) => {
                let key_name = CString::new("CMDLINE").unwrap();
                let comment = CString::new("Command-line call").unwrap();
                let mut status = 0;
                // ffpkls = fits_write_key_longstr
                fitsio_sys::ffpkls(
                    fptr.as_raw(),     /* I - FITS file pointer        */
                    key_name.as_ptr(), /* I - name of keyword to write */
                    value.as_ptr(),    /* I - keyword value            */
                    comment.as_ptr(),  /* I - keyword comment          */
                    &mut status,       /* IO - error status            */
                );
                fits_check_status(status)?;
            }
        }
    }

    Ok(())
}

fn write_json(map: &DepthMap, file: &Path) -> Result<(), WriteDepthMapError> {
    let pixels = map
        .populated()
        .map(|(pixel, depth)| {
            let (ra, dec) = map.pixel_centre(pixel).unwrap_or((f64::NAN, f64::NAN));
            PixelJson {
                pixel,
                ra,
                dec,
                depth,
            }
        })
        .collect();
    let json = DepthMapJson {
        nside: map.nside().get(),
        ordering: map.ordering(),
        snr_threshold: Some(map.snr_threshold()).filter(|t| t.is_finite()),
        npix: map.nside().npix(),
        pixels,
    };

    let mut f = BufWriter::new(File::create(file)?);
    serde_json::to_writer_pretty(&mut f, &json)?;
    f.flush()?;
    Ok(())
}

/// Test whether a file can be written to, creating any missing parent
/// directories. Warns if the file already exists.
pub(crate) fn can_write_to_file(file: &Path) -> Result<(), FileWriteError> {
    trace!("Testing whether we can write to {}", file.display());

    let file_exists = file.exists();
    match std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(file)
        .map_err(|e| e.kind())
    {
        // File is writable. If it didn't already exist, `OpenOptions::new`
        // created it; don't leave an empty file behind.
        Ok(_) => {
            if file_exists {
                format!("Will overwrite the existing file '{}'", file.display()).warn();
            } else {
                std::fs::remove_file(file)?;
            }
        }

        // The parent directory doesn't exist. Make it; if this fails, then we
        // can't write the file anyway.
        Err(std::io::ErrorKind::NotFound) => {
            if let Some(p) = file.parent() {
                match std::fs::DirBuilder::new()
                    .recursive(true)
                    .create(p)
                    .map_err(|e| e.kind())
                {
                    Ok(()) => (),
                    Err(std::io::ErrorKind::PermissionDenied) => {
                        return Err(FileWriteError::NewDirectory(p.to_path_buf()))
                    }
                    Err(e) => return Err(FileWriteError::IO(e.into())),
                }
            }
        }

        Err(std::io::ErrorKind::PermissionDenied) => {
            return Err(FileWriteError::FileNotWritable {
                file: file.display().to_string(),
            })
        }

        Err(e) => return Err(FileWriteError::IO(e.into())),
    }

    Ok(())
}
