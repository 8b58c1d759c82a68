// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all survey-depth-related errors. This should be the *only*
//! error enum that is publicly visible.

use thiserror::Error;

use super::{catalog_info::CatalogInfoArgsError, depth_map::DepthMapArgsError};
use crate::{
    catalog::CatalogError,
    depth::DepthError,
    healpix::HealpixError,
    io::{
        read::fits::FitsError,
        write::{FileWriteError, WriteDepthMapError},
    },
    params::DepthMapRunError,
};

/// The *only* publicly visible error from survey-depth. Each message points at
/// where to look for more help, unless it's "generic".
#[derive(Error, Debug)]
pub enum SurveyDepthError {
    /// An error related to depth-map.
    #[error("{0}\n\nSee for more info: survey-depth depth-map --help")]
    DepthMap(String),

    /// An error related to catalog-info.
    #[error("{0}\n\nSee for more info: survey-depth catalog-info --help")]
    CatalogInfo(String),

    /// Generic error surrounding catalogs.
    #[error("{0}\n\nCatalogs are FITS binary tables, or JSON/YAML documents mapping column names to lists of numbers.")]
    Catalog(String),

    /// An error related to HEALPix pixelisation.
    #[error("{0}\n\nHEALPix nsides must be positive and no larger than 2^29; NESTED ordering also needs a power of two.")]
    Healpix(String),

    /// An error related to reading or writing depth-map files.
    #[error("{0}\n\nDepth maps are written as HEALPix FITS tables (.fits) or json (.json).")]
    DepthMapFile(String),

    /// An error related to argument files.
    #[error("{0}\n\nArgument files are toml or json files with the same names as the long command-line arguments, e.g. snr_threshold = 5.0")]
    ArgFile(String),

    /// A cfitsio error. Because these are usually quite spartan, some
    /// suggestions are provided here.
    #[error("cfitsio error: {0}\n\nIf you don't know what this means, try turning up verbosity (-v or -vv) and maybe disabling progress bars.")]
    Cfitsio(String),

    /// A generic error that can't be clarified further with documentation, e.g.
    /// IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

// Binary sub-command errors.

impl From<DepthMapArgsError> for SurveyDepthError {
    fn from(e: DepthMapArgsError) -> Self {
        let s = e.to_string();
        match e {
            DepthMapArgsError::NoCatalog
            | DepthMapArgsError::NoMagnitude
            | DepthMapArgsError::NoSnr
            | DepthMapArgsError::ConflictingMagnitude
            | DepthMapArgsError::ConflictingSnr
            | DepthMapArgsError::BadSnrThreshold(_) => Self::DepthMap(s),
            DepthMapArgsError::BadCatalogType(_) => Self::Catalog(s),
            DepthMapArgsError::Catalog(e) => Self::from(e),
            DepthMapArgsError::Healpix(e) => Self::from(e),
            DepthMapArgsError::Write(e) => Self::from(e),
        }
    }
}

impl From<DepthMapRunError> for SurveyDepthError {
    fn from(e: DepthMapRunError) -> Self {
        match e {
            DepthMapRunError::Catalog(e) => Self::from(e),
            DepthMapRunError::Depth(e) => Self::from(e),
            DepthMapRunError::Write(e) => Self::from(e),
        }
    }
}

impl From<CatalogInfoArgsError> for SurveyDepthError {
    fn from(e: CatalogInfoArgsError) -> Self {
        let s = e.to_string();
        match e {
            CatalogInfoArgsError::NoCatalogs => Self::CatalogInfo(s),
            CatalogInfoArgsError::BadCatalogType(_) => Self::Catalog(s),
        }
    }
}

// Library code errors.

impl From<CatalogError> for SurveyDepthError {
    fn from(e: CatalogError) -> Self {
        let s = e.to_string();
        match e {
            CatalogError::UnknownType(_)
            | CatalogError::UnknownQuantity(_)
            | CatalogError::UnequalLengths { .. }
            | CatalogError::DerivedCycle(_)
            | CatalogError::Json { .. }
            | CatalogError::Yaml { .. } => Self::Catalog(s),
            CatalogError::BadFilter(_) => Self::DepthMap(s),
            CatalogError::Fits(e) => Self::from(e),
            CatalogError::IO(e) => Self::from(e),
        }
    }
}

impl From<DepthError> for SurveyDepthError {
    fn from(e: DepthError) -> Self {
        let s = e.to_string();
        match e {
            DepthError::InvalidParameter(_) => Self::DepthMap(s),
            DepthError::ShapeMismatch { .. } | DepthError::InvalidCoordinate { .. } => {
                Self::Catalog(s)
            }
        }
    }
}

impl From<HealpixError> for SurveyDepthError {
    fn from(e: HealpixError) -> Self {
        Self::Healpix(e.to_string())
    }
}

impl From<WriteDepthMapError> for SurveyDepthError {
    fn from(e: WriteDepthMapError) -> Self {
        let s = e.to_string();
        match e {
            WriteDepthMapError::UnknownType(_) | WriteDepthMapError::Json(_) => {
                Self::DepthMapFile(s)
            }
            WriteDepthMapError::FileWrite(e) => Self::from(e),
            WriteDepthMapError::Fitsio(_) => Self::Cfitsio(s),
            WriteDepthMapError::IO(e) => Self::from(e),
        }
    }
}

impl From<FileWriteError> for SurveyDepthError {
    fn from(e: FileWriteError) -> Self {
        Self::DepthMapFile(e.to_string())
    }
}

impl From<FitsError> for SurveyDepthError {
    fn from(e: FitsError) -> Self {
        Self::Cfitsio(e.to_string())
    }
}

impl From<std::io::Error> for SurveyDepthError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
