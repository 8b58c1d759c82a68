// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with writing out depth maps.

use std::path::PathBuf;

use thiserror::Error;

use crate::io::DEPTH_MAP_EXTENSIONS;

#[derive(Error, Debug)]
pub enum WriteDepthMapError {
    #[error("Depth map '{}' doesn't have a recognised file extension. Supported: {}", .0.display(), *DEPTH_MAP_EXTENSIONS)]
    UnknownType(PathBuf),

    #[error(transparent)]
    FileWrite(#[from] FileWriteError),

    #[error(transparent)]
    Fitsio(#[from] fitsio::errors::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum FileWriteError {
    #[error("Cannot write to the specified file '{file}'. Do you have write permissions set?")]
    FileNotWritable { file: String },

    #[error("Couldn't create directory '{}' for output files. Do you have write permissions set?", .0.display())]
    NewDirectory(PathBuf),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
