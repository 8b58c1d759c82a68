// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Quantities computed from other quantities.

use std::fmt;

use indexmap::IndexMap;

use crate::constants::NJY_AB_ZERO_POINT;

type DeriveFn = Box<dyn Fn(&[&[f64]]) -> Vec<f64> + Send + Sync>;

/// A named function of other (native or derived) quantities. The function
/// receives one column per input, in the order the inputs were given.
pub struct DerivedQuantity {
    inputs: Vec<String>,
    func: DeriveFn,
}

impl DerivedQuantity {
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub(super) fn compute(&self, columns: &[&[f64]]) -> Vec<f64> {
        (self.func)(columns)
    }
}

impl fmt::Debug for DerivedQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedQuantity")
            .field("inputs", &self.inputs)
            .finish_non_exhaustive()
    }
}

/// The registry of derived quantities available to
/// [`get_quantities`](super::get_quantities). Native catalog columns always
/// take precedence over a derived quantity of the same name.
#[derive(Debug, Default)]
pub struct DerivedQuantities {
    quantities: IndexMap<String, DerivedQuantity>,
}

impl DerivedQuantities {
    pub fn new() -> DerivedQuantities {
        DerivedQuantities::default()
    }

    /// Register `name`. An existing quantity of the same name is replaced.
    pub fn insert<F>(&mut self, name: &str, inputs: &[&str], func: F)
    where
        F: Fn(&[&[f64]]) -> Vec<f64> + Send + Sync + 'static,
    {
        self.quantities.insert(
            name.to_string(),
            DerivedQuantity {
                inputs: inputs.iter().map(|s| s.to_string()).collect(),
                func: Box::new(func),
            },
        );
    }

    /// Register `name` as `flux / flux_err`.
    pub fn insert_snr_from_flux(&mut self, name: &str, flux: &str, flux_err: &str) {
        self.insert(name, &[flux, flux_err], |cols| {
            snr_from_flux(cols[0], cols[1])
        });
    }

    /// Register `name` as the AB magnitude of a flux in nanojanskys.
    pub fn insert_mag_from_flux_njy(&mut self, name: &str, flux: &str) {
        self.insert(name, &[flux], |cols| mag_from_flux_njy(cols[0]));
    }

    pub fn get(&self, name: &str) -> Option<&DerivedQuantity> {
        self.quantities.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.quantities.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.quantities.keys().map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }
}

pub fn snr_from_flux(flux: &[f64], flux_err: &[f64]) -> Vec<f64> {
    flux.iter()
        .zip(flux_err.iter())
        .map(|(&f, &e)| f / e)
        .collect()
}

/// Non-positive fluxes have no magnitude and give NaN.
pub fn mag_from_flux_njy(flux: &[f64]) -> Vec<f64> {
    flux.iter()
        .map(|&f| {
            if f > 0.0 {
                -2.5 * f.log10() + NJY_AB_ZERO_POINT
            } else {
                f64::NAN
            }
        })
        .collect()
}
