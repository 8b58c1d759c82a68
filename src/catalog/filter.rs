// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Simple row filters on catalog quantities.

use std::{fmt, str::FromStr};

use regex::Regex;
use strum_macros::{Display, EnumIter, EnumString};

use super::CatalogError;

lazy_static::lazy_static! {
    static ref IS_FINITE: Regex =
        Regex::new(r"^\s*isfinite\(\s*([A-Za-z_][\w.]*)\s*\)\s*$").unwrap();

    static ref COMPARISON: Regex =
        Regex::new(r"^\s*([A-Za-z_][\w.]*)\s*(<=|>=|==|!=|<|>)\s*(\S+)\s*$").unwrap();
}

#[derive(Debug, Display, EnumIter, EnumString, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = "<=")]
    Le,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = ">=")]
    Ge,
    #[strum(serialize = "==")]
    Eq,
    #[strum(serialize = "!=")]
    Ne,
}

impl Comparison {
    /// IEEE semantics; a NaN on either side fails everything except `!=`.
    pub fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparison::Lt => lhs < rhs,
            Comparison::Le => lhs <= rhs,
            Comparison::Gt => lhs > rhs,
            Comparison::Ge => lhs >= rhs,
            Comparison::Eq => lhs == rhs,
            Comparison::Ne => lhs != rhs,
        }
    }
}

/// A condition on a single quantity that every kept row must satisfy.
#[derive(Debug, Clone, PartialEq)]
pub enum QuantityFilter {
    Compare {
        quantity: String,
        op: Comparison,
        value: f64,
    },

    IsFinite(String),
}

impl QuantityFilter {
    /// The quantity this filter looks at.
    pub fn quantity(&self) -> &str {
        match self {
            QuantityFilter::Compare { quantity, .. } => quantity,
            QuantityFilter::IsFinite(quantity) => quantity,
        }
    }

    pub fn passes(&self, value: f64) -> bool {
        match self {
            QuantityFilter::Compare { op, value: rhs, .. } => op.apply(value, *rhs),
            QuantityFilter::IsFinite(_) => value.is_finite(),
        }
    }
}

impl FromStr for QuantityFilter {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(caps) = IS_FINITE.captures(s) {
            return Ok(QuantityFilter::IsFinite(caps[1].to_string()));
        }

        let caps = COMPARISON
            .captures(s)
            .ok_or_else(|| CatalogError::BadFilter(s.to_string()))?;
        let op = Comparison::from_str(&caps[2]).map_err(|_| CatalogError::BadFilter(s.to_string()))?;
        let value = caps[3]
            .parse()
            .map_err(|_| CatalogError::BadFilter(s.to_string()))?;
        Ok(QuantityFilter::Compare {
            quantity: caps[1].to_string(),
            op,
            value,
        })
    }
}

impl fmt::Display for QuantityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantityFilter::Compare {
                quantity,
                op,
                value,
            } => write!(f, "{quantity} {op} {value}"),
            QuantityFilter::IsFinite(quantity) => write!(f, "isfinite({quantity})"),
        }
    }
}
