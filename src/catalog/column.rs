// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Column-oriented catalogs, e.g.
//!
//! ```json
//! {"ra": [10.0, 11.5], "dec": [-30.0, null], "mag": [24.1, 25.0]}
//! ```
//!
//! `null` entries are read as NaN.

use std::{io::Read, path::Path};

use indexmap::IndexMap;

use super::{Catalog, CatalogError, Table};

/// A catalog held entirely in memory.
#[derive(Debug, Clone)]
pub struct ColumnCatalog {
    description: String,
    columns: Table,
    num_rows: usize,
}

impl ColumnCatalog {
    /// All columns must have the same length.
    pub fn new(description: String, columns: Table) -> Result<ColumnCatalog, CatalogError> {
        let num_rows = columns.values().next().map(|c| c.len()).unwrap_or(0);
        if let Some((name, col)) = columns.iter().find(|(_, c)| c.len() != num_rows) {
            return Err(CatalogError::UnequalLengths {
                name: name.clone(),
                len: col.len(),
                expected: num_rows,
            });
        }

        Ok(ColumnCatalog {
            description,
            columns,
            num_rows,
        })
    }

    pub fn from_json<R: Read>(reader: R, file: &Path) -> Result<ColumnCatalog, CatalogError> {
        let raw: IndexMap<String, Vec<Option<f64>>> =
            serde_json::from_reader(reader).map_err(|err| CatalogError::Json {
                file: file.to_path_buf(),
                err,
            })?;
        ColumnCatalog::new(file.display().to_string(), nulls_to_nans(raw))
    }

    pub fn from_yaml<R: Read>(reader: R, file: &Path) -> Result<ColumnCatalog, CatalogError> {
        let raw: IndexMap<String, Vec<Option<f64>>> =
            serde_yaml::from_reader(reader).map_err(|err| CatalogError::Yaml {
                file: file.to_path_buf(),
                err,
            })?;
        ColumnCatalog::new(file.display().to_string(), nulls_to_nans(raw))
    }
}

fn nulls_to_nans(raw: IndexMap<String, Vec<Option<f64>>>) -> Table {
    raw.into_iter()
        .map(|(name, col)| {
            let col = col.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
            (name, col)
        })
        .collect()
}

impl Catalog for ColumnCatalog {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn native_quantities(&self) -> Vec<String> {
        self.columns.keys().cloned().collect()
    }

    fn has_native(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    fn read_native(&mut self, name: &str) -> Result<Vec<f64>, CatalogError> {
        self.columns
            .get(name)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownQuantity(name.to_string()))
    }
}
