// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameters that are ready to be used by `survey-depth` subcommands.
//!
//! The code here is kind of "mirroring" the code within the `cli` module; the
//! idea is that `cli` is unparsed, user-facing code, whereas parameters have
//! been parsed and are ready to be used directly. The code here should be
//! public to the entire `survey-depth` crate.

mod depth_map;

pub(crate) use depth_map::{DepthMapFields, DepthMapRunError, DepthMapRunParams};
