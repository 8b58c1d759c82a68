// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reading numeric quantities out of source catalogs.
//!
//! A [`Catalog`] only knows about its own ("native") columns. Quantities that
//! need computing, e.g. an SNR from a flux and its uncertainty, are registered
//! in [`DerivedQuantities`] and resolved by [`get_quantities`].

mod column;
mod derived;
mod error;
mod filter;
mod fits;

pub use column::ColumnCatalog;
pub use derived::{mag_from_flux_njy, snr_from_flux, DerivedQuantities, DerivedQuantity};
pub use error::CatalogError;
pub use filter::{Comparison, QuantityFilter};
pub use fits::FitsCatalog;

use std::{fs::File, io::BufReader, path::Path};

use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// Named columns of equal length, in the order they were requested.
pub type Table = IndexMap<String, Vec<f64>>;

#[derive(
    Debug, Display, EnumIter, EnumString, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum CatalogType {
    #[strum(serialize = "fits")]
    Fits,
    #[strum(serialize = "json")]
    Json,
    #[strum(serialize = "yaml")]
    Yaml,
}

lazy_static::lazy_static! {
    pub(crate) static ref CATALOG_TYPES_COMMA_SEPARATED: String = CatalogType::iter().join(", ");
}

impl CatalogType {
    /// Guess the type from a file name. Gzipped FITS files are recognised.
    pub fn from_path(path: &Path) -> Option<CatalogType> {
        let name = path.file_name()?.to_str()?.to_lowercase();
        if name.ends_with(".fits.gz") || name.ends_with(".fit.gz") {
            return Some(CatalogType::Fits);
        }
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "fits" | "fit" => Some(CatalogType::Fits),
            "json" => Some(CatalogType::Json),
            "yaml" | "yml" => Some(CatalogType::Yaml),
            _ => None,
        }
    }
}

/// A source of named, numeric, per-row quantities.
pub trait Catalog: Send {
    /// Something human readable that identifies the catalog.
    fn description(&self) -> String;

    fn num_rows(&self) -> usize;

    /// The names of the columns that can be read directly.
    fn native_quantities(&self) -> Vec<String>;

    fn has_native(&self, name: &str) -> bool {
        self.native_quantities().iter().any(|q| q == name)
    }

    /// Read a whole native column.
    fn read_native(&mut self, name: &str) -> Result<Vec<f64>, CatalogError>;
}

/// Open a catalog. If `catalog_type` isn't given, it's worked out from the file
/// name. `hdu` (zero indexed) is only used by FITS catalogs.
pub fn load_catalog(
    path: &Path,
    catalog_type: Option<CatalogType>,
    hdu: Option<usize>,
) -> Result<Box<dyn Catalog>, CatalogError> {
    let catalog_type = catalog_type
        .or_else(|| CatalogType::from_path(path))
        .ok_or_else(|| CatalogError::UnknownType(path.to_path_buf()))?;
    debug!("Reading {} as a {catalog_type} catalog", path.display());
    if hdu.is_some() && catalog_type != CatalogType::Fits {
        debug!("Ignoring the HDU; {catalog_type} catalogs don't have them");
    }

    let catalog: Box<dyn Catalog> = match catalog_type {
        CatalogType::Fits => Box::new(FitsCatalog::new(path, hdu)?),
        CatalogType::Json => {
            let f = BufReader::new(File::open(path)?);
            Box::new(ColumnCatalog::from_json(f, path)?)
        }
        CatalogType::Yaml => {
            let f = BufReader::new(File::open(path)?);
            Box::new(ColumnCatalog::from_yaml(f, path)?)
        }
    };
    trace!(
        "{} has {} rows and native quantities {:?}",
        catalog.description(),
        catalog.num_rows(),
        catalog.native_quantities()
    );
    Ok(catalog)
}

/// Read `fields` out of `catalog`, keeping only the rows that satisfy every
/// filter. Each field (and each filtered quantity) is a native column, or
/// failing that, a quantity in `derived`.
pub fn get_quantities<S: AsRef<str>>(
    catalog: &mut dyn Catalog,
    fields: &[S],
    filters: &[QuantityFilter],
    derived: &DerivedQuantities,
) -> Result<Table, CatalogError> {
    let mut resolver = Resolver {
        catalog,
        derived,
        resolved: Table::new(),
        stack: vec![],
    };
    for name in fields
        .iter()
        .map(|f| f.as_ref())
        .chain(filters.iter().map(|f| f.quantity()))
    {
        resolver.resolve(name)?;
    }
    let num_rows = resolver.catalog.num_rows();
    let resolved = resolver.resolved;

    let mut keep = vec![true; num_rows];
    for filter in filters {
        let col = &resolved[filter.quantity()];
        for (k, &v) in keep.iter_mut().zip(col.iter()) {
            *k = *k && filter.passes(v);
        }
    }
    let num_kept = keep.iter().filter(|&&k| k).count();
    if !filters.is_empty() {
        debug!("{num_kept} of {num_rows} rows passed the filters");
    }

    Ok(fields
        .iter()
        .map(|f| {
            let name = f.as_ref();
            let col = resolved[name]
                .iter()
                .zip(keep.iter())
                .filter(|&(_, &k)| k)
                .map(|(&v, _)| v)
                .collect();
            (name.to_string(), col)
        })
        .collect())
}

struct Resolver<'a> {
    catalog: &'a mut dyn Catalog,
    derived: &'a DerivedQuantities,
    resolved: Table,
    /// Derived quantities being resolved, outermost first.
    stack: Vec<String>,
}

impl Resolver<'_> {
    fn resolve(&mut self, name: &str) -> Result<(), CatalogError> {
        if self.resolved.contains_key(name) {
            return Ok(());
        }

        let derived_quantities = self.derived;
        let col = if self.catalog.has_native(name) {
            self.catalog.read_native(name)?
        } else {
            let derived = derived_quantities
                .get(name)
                .ok_or_else(|| CatalogError::UnknownQuantity(name.to_string()))?;
            if self.stack.iter().any(|s| s == name) {
                return Err(CatalogError::DerivedCycle(name.to_string()));
            }

            self.stack.push(name.to_string());
            for input in derived.inputs() {
                self.resolve(input)?;
            }
            self.stack.pop();

            let inputs: Vec<&[f64]> = derived
                .inputs()
                .iter()
                .map(|i| self.resolved[i.as_str()].as_slice())
                .collect();
            trace!("Deriving {name} from {:?}", derived.inputs());
            derived.compute(&inputs)
        };

        let expected = self.catalog.num_rows();
        if col.len() != expected {
            return Err(CatalogError::UnequalLengths {
                name: name.to_string(),
                len: col.len(),
                expected,
            });
        }
        self.resolved.insert(name.to_string(), col);
        Ok(())
    }
}
