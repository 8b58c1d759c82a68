// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pretty printers for reporting information.
//!
//! Lines are grouped into blocks and drawn as a tree under a bold title:
//!
//! ```text
//! Depth map
//! ├ nside 2048 (RING ordering)
//! ├ SNR threshold: 10
//! │ magnitude bins: 30 over [22, 28]
//! └ coordinate filter: both
//! ```

use std::{
    borrow::Cow,
    sync::{Mutex, MutexGuard},
};

const VERTICAL: char = '│';
const UP_AND_RIGHT: char = '└';
const VERTICAL_AND_RIGHT: char = '├';

type Block = Vec<Cow<'static, str>>;

lazy_static::lazy_static! {
    static ref WARNINGS: Mutex<Vec<Block>> = Mutex::new(vec![]);
}

/// Pair every line of every block with the tree symbol drawn before it.
pub(super) fn tree_lines(blocks: &[Block]) -> Vec<(char, &str)> {
    let num_blocks = blocks.len();
    let mut lines = vec![];
    for (i_block, block) in blocks.iter().enumerate() {
        let last_block = i_block + 1 == num_blocks;
        for (i_line, line) in block.iter().enumerate() {
            let symbol = match (i_line, last_block && block.len() == 1) {
                (0, true) => UP_AND_RIGHT,
                (0, false) => VERTICAL_AND_RIGHT,
                _ => VERTICAL,
            };
            lines.push((symbol, line.as_ref()));
        }
    }
    lines
}

pub(crate) struct InfoPrinter {
    title: Cow<'static, str>,
    blocks: Vec<Block>,
}

impl InfoPrinter {
    pub(crate) fn new(title: Cow<'static, str>) -> Self {
        Self {
            title,
            blocks: vec![],
        }
    }

    pub(crate) fn push_line(&mut self, line: Cow<'static, str>) {
        self.blocks.push(vec![line]);
    }

    pub(crate) fn push_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub(crate) fn display(self) {
        log::info!("{}", console::style(&self.title).bold());
        for (symbol, line) in tree_lines(&self.blocks) {
            log::info!("{symbol} {line}");
        }
        log::info!("");
    }
}

fn warnings() -> MutexGuard<'static, Vec<Block>> {
    // A panic while holding the lock can't leave the warnings half-written.
    WARNINGS.lock().unwrap_or_else(|e| e.into_inner())
}

/// Things that can be deferred as a warning, to be displayed alongside all
/// other warnings by [`display_warnings`].
pub(crate) trait Warn {
    fn warn(self);
}

impl Warn for &'static str {
    fn warn(self) {
        warnings().push(vec![self.into()]);
    }
}

impl Warn for String {
    fn warn(self) {
        warnings().push(vec![self.into()]);
    }
}

impl Warn for Cow<'static, str> {
    fn warn(self) {
        warnings().push(vec![self]);
    }
}

impl Warn for Vec<Cow<'static, str>> {
    fn warn(self) {
        warnings().push(self);
    }
}

/// Print out any warnings that have been collected, then forget them. This
/// should be called once all arguments have been parsed.
pub(crate) fn display_warnings() {
    let mut warnings = warnings();
    log::debug!("Displaying {} warnings", warnings.len());
    if warnings.is_empty() {
        return;
    }

    log::warn!("{}", console::style("Warnings").bold());
    for (symbol, line) in tree_lines(&warnings) {
        log::warn!("{symbol} {line}");
    }
    log::warn!("");
    warnings.clear();
}
